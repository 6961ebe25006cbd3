use std::path::PathBuf;

use comfy_table::{Cell, Table};

use shiftledger::db;
use shiftledger::error::Result;
use shiftledger::fmt::{money, timestamp};
use shiftledger::orphans::{export_csv, orphan_clusters};
use shiftledger::settings::load_settings;

use super::open_store;

pub fn run(csv: Option<&str>) -> Result<()> {
    let settings = load_settings();
    settings.matching.validate()?;
    let conn = open_store()?;
    let transactions = db::load_transactions(&conn)?;
    let clusters = orphan_clusters(&transactions, settings.matching.boundary_offset());

    if clusters.is_empty() {
        println!("No unmatched transactions.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Day", "Earliest", "Latest", "Txns", "Revenue"]);
    for cluster in &clusters {
        table.add_row(vec![
            Cell::new(cluster.day.format("%a %b %-d, %Y")),
            Cell::new(timestamp(cluster.earliest)),
            Cell::new(timestamp(cluster.latest)),
            Cell::new(cluster.transactions.len()),
            Cell::new(money(cluster.revenue())),
        ]);
    }
    println!("Unmatched transactions (possible missing shifts)\n{table}");

    if let Some(path) = csv {
        let path = PathBuf::from(path);
        export_csv(&clusters, &path)?;
        println!("Exported {} cluster(s) to {}", clusters.len(), path.display());
    }
    Ok(())
}
