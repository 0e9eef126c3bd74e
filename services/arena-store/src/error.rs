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

//! Store error taxonomy. Constraint violations that carry meaning for
//! callers (idempotency races, foreign keys) are lifted out of the raw
//! database error by SQLSTATE.

use crate::stakes::TransitionError;

/// Unique-constraint violation.
const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";
/// Foreign-key violation.
const SQLSTATE_FOREIGN_KEY_VIOLATION: &str = "23503";
/// Serialization failure under concurrent transactions.
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// Deadlock detected.
const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Two writers raced on the same idempotency key; exactly one wins.
    #[error("idempotency key already used")]
    IdempotencyConflict,

    #[error("referenced row does not exist")]
    ForeignKeyViolation,

    #[error("boost balance would go negative for user {user_id} in competition {competition_id}")]
    InsufficientBoost {
        user_id: String,
        competition_id: String,
    },

    #[error("invalid stake transition: {0}")]
    InvalidStateTransition(#[from] TransitionError),

    /// A stored value does not fit its domain type. Indicates writes
    /// from outside the repositories.
    #[error("stored value out of range: {0}")]
    OutOfRange(&'static str),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(SQLSTATE_UNIQUE_VIOLATION) => return StoreError::IdempotencyConflict,
                Some(SQLSTATE_FOREIGN_KEY_VIOLATION) => return StoreError::ForeignKeyViolation,
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

impl StoreError {
    /// Whether retrying the whole transaction can succeed: deadlocks,
    /// serialization failures and connection-level problems.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db_err)) => matches!(
                db_err.code().as_deref(),
                Some(SQLSTATE_SERIALIZATION_FAILURE) | Some(SQLSTATE_DEADLOCK_DETECTED)
            ),
            StoreError::Database(sqlx::Error::Io(_))
            | StoreError::Database(sqlx::Error::PoolTimedOut) => true,
            _ => false,
        }
    }
}
