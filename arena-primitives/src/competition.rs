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

//! Read-only view of competitions as the indexing core consumes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CompetitionId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionStatus {
    Pending,
    Active,
    Ended,
}

impl CompetitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionStatus::Pending => "pending",
            CompetitionStatus::Active => "active",
            CompetitionStatus::Ended => "ended",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionType {
    Trading,
    PerpetualFutures,
    SportsPrediction,
    Other,
}

impl CompetitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionType::Trading => "trading",
            CompetitionType::PerpetualFutures => "perpetual_futures",
            CompetitionType::SportsPrediction => "sports_prediction",
            CompetitionType::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "trading" => CompetitionType::Trading,
            "perpetual_futures" => CompetitionType::PerpetualFutures,
            "sports_prediction" => CompetitionType::SportsPrediction,
            _ => CompetitionType::Other,
        }
    }
}

impl core::fmt::Display for CompetitionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A competition's boost window. The interval is closed on both ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoostWindow {
    pub competition_id: CompetitionId,
    pub boost_start_date: DateTime<Utc>,
    pub boost_end_date: DateTime<Utc>,
}

impl BoostWindow {
    /// Whether `at` falls inside `[boost_start_date, boost_end_date]`.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.boost_start_date <= at && at <= self.boost_end_date
    }
}
