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

//! # Arena Utils
//!
//! Edge conversions (hex, 256-bit numerics, unix timestamps) and the
//! `arena_ensure!`/`ok_or_error!` macros used by services to log and
//! bail in one step.

#![forbid(unsafe_code)]

pub mod ensure;
pub mod hex;
pub mod num;
pub mod time;
