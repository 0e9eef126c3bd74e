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

use std::path::PathBuf;

use clap::Parser;

/// Arena indexing node: tails the staking, rewards and conviction
/// claims contracts into the platform database.
#[derive(Debug, Parser)]
#[command(name = "arena-node", version)]
pub struct Cli {
    /// Path to the TOML settings file.
    #[arg(long, default_value = "config/arena.toml")]
    pub config: PathBuf,

    /// Apply database migrations and exit.
    #[arg(long)]
    pub migrate_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let cli = Cli::parse_from(["arena-node"]);
        assert_eq!(cli.config, PathBuf::from("config/arena.toml"));
        assert!(!cli.migrate_only);
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::parse_from(["arena-node", "--config", "/tmp/custom.toml", "--migrate-only"]);
        assert_eq!(cli.config, PathBuf::from("/tmp/custom.toml"));
        assert!(cli.migrate_only);
    }
}
