use shiftledger::error::Result;
use shiftledger::importer::rematch;
use shiftledger::settings::load_settings;

use super::open_store;

pub fn run() -> Result<()> {
    let mut conn = open_store()?;
    let summary = rematch(&mut conn, &load_settings().matching)?;
    println!(
        "{} transaction(s) across {} shift(s): {} matched, {} orphaned, {} reassigned",
        summary.transactions, summary.shifts, summary.matched, summary.orphaned, summary.reassigned
    );
    Ok(())
}
