pub mod import;
pub mod init;
pub mod orphans;
pub mod rematch;
pub mod report;
pub mod shifts;
pub mod validate;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use rusqlite::Connection;

use shiftledger::db::{get_connection, init_db};
use shiftledger::error::Result;
use shiftledger::settings::db_path;

pub(crate) fn parse_datetime(raw: &str) -> std::result::Result<NaiveDateTime, String> {
    ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
        .ok_or_else(|| format!("expected YYYY-MM-DD HH:MM, got '{raw}'"))
}

pub(crate) fn open_store() -> Result<Connection> {
    let path = db_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = get_connection(&path)?;
    init_db(&conn)?;
    Ok(conn)
}

pub(crate) fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[derive(Parser)]
#[command(
    name = "shiftledger",
    about = "Import rideshare earnings statements and reconcile them against logged shifts."
)]
pub struct Cli {
    /// Log pipeline progress to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for shiftledger data (default: ~/Documents/shiftledger)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage logged shifts.
    Shifts {
        #[command(subcommand)]
        command: ShiftsCommands,
    },
    /// Import a statement, match it against shifts and update shift totals.
    Import {
        /// Path to a statement PDF or fragment JSON file
        file: String,
        /// Layout family key for documents that do not name one
        #[arg(long)]
        layout: Option<String>,
    },
    /// Re-match all stored transactions against the current shifts.
    Rematch,
    /// Parse a statement and show what would be imported, without saving.
    Validate {
        /// Path to a statement PDF or fragment JSON file
        file: String,
        /// Layout family key for documents that do not name one
        #[arg(long)]
        layout: Option<String>,
        /// Print transactions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show shift earnings.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// List unmatched transactions grouped into candidate missing shifts.
    Orphans {
        /// Write the clusters to a CSV file
        #[arg(long)]
        csv: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ShiftsCommands {
    /// Log a shift.
    Add {
        /// Start time: YYYY-MM-DD HH:MM
        #[arg(value_parser = parse_datetime)]
        start: NaiveDateTime,
        /// End time: YYYY-MM-DD HH:MM (omit for a shift in progress)
        #[arg(value_parser = parse_datetime)]
        end: Option<NaiveDateTime>,
    },
    /// Set the end time of a shift in progress.
    End {
        /// Shift ID (shown in `shiftledger shifts list`)
        id: i64,
        /// End time: YYYY-MM-DD HH:MM
        #[arg(value_parser = parse_datetime)]
        end: NaiveDateTime,
    },
    /// List all shifts.
    List,
    /// Delete a shift. Its transactions become orphans.
    Delete {
        /// Shift ID (shown in `shiftledger shifts list`)
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Earnings for one shift, grouped by category.
    Shift {
        /// Shift ID (shown in `shiftledger shifts list`)
        id: i64,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Totals for every shift.
    Totals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime() {
        assert!(parse_datetime("2025-10-11 18:30").is_ok());
        assert!(parse_datetime("2025-10-11T18:30").is_ok());
        assert!(parse_datetime("10/11/2025 6:30 PM").is_err());
    }
}
