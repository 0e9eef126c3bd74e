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

//! Block timestamps are unix seconds on the wire.

use chrono::{DateTime, TimeZone, Utc};

/// Unix seconds into a UTC instant. `None` outside chrono's range.
pub fn from_unix_secs(secs: u64) -> Option<DateTime<Utc>> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

/// UTC instant down to unix seconds. Saturates at zero for pre-epoch
/// instants, which never occur for block timestamps.
pub fn to_unix_secs(at: DateTime<Utc>) -> u64 {
    u64::try_from(at.timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let at = from_unix_secs(1_700_000_000).unwrap();
        assert_eq!(to_unix_secs(at), 1_700_000_000);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(from_unix_secs(u64::MAX).is_none());
    }
}
