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

//! Read-only access to competitions. The competition service owns the
//! rows; the indexer only asks which boost windows are open.

use arena_primitives::competition::BoostWindow;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::StoreError;

pub struct CompetitionsRepo;

impl CompetitionsRepo {
    /// Competitions whose boost window contains `at`. The window is
    /// closed on both ends.
    pub async fn get_open_for_boosting(
        conn: &mut PgConnection,
        at: DateTime<Utc>,
    ) -> Result<Vec<BoostWindow>, StoreError> {
        let rows: Vec<(String, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            "SELECT id, boost_start_date, boost_end_date FROM competitions \
             WHERE boost_start_date IS NOT NULL AND boost_end_date IS NOT NULL \
               AND boost_start_date <= $1 AND boost_end_date >= $1 \
             ORDER BY id",
        )
        .bind(at)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(competition_id, boost_start_date, boost_end_date)| BoostWindow {
                competition_id,
                boost_start_date,
                boost_end_date,
            })
            .collect())
    }
}
