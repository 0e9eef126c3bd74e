// This file is part of Arena.

// Copyright (C) 2026 Arena Labs.
// SPDX-License-Identifier: GPL-3.0-or-later

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Log-and-bail macros. Every service logs under its own target so a
//! single filter line per component selects its output.

/// Returns `Err($err)` after logging when the condition does not hold.
#[macro_export]
macro_rules! arena_ensure {
    ($cond:expr, $err:expr, target: $target:expr, $($msg:tt)+) => {
        if !($cond) {
            log::error!(target: $target, $($msg)+);
            return Err($err.into());
        }
    };
}

/// Unwraps an `Option`, logging and producing `Err($err)` on `None`.
#[macro_export]
macro_rules! ok_or_error {
    ($option:expr, $err:expr, target: $target:expr, $($msg:tt)+) => {
        match $option {
            Some(value) => Ok(value),
            None => {
                log::error!(target: $target, $($msg)+);
                Err($err)
            }
        }
    };
}
