use chrono::NaiveDateTime;
use comfy_table::{Cell, Table};

use shiftledger::db;
use shiftledger::error::Result;
use shiftledger::fmt::{hours, money, span};
use shiftledger::importer::rematch;
use shiftledger::settings::load_settings;

use super::open_store;

fn rematch_after_change(conn: &mut rusqlite::Connection) -> Result<()> {
    let summary = rematch(conn, &load_settings().matching)?;
    if summary.reassigned > 0 {
        println!(
            "{} transaction(s) re-matched, {} still orphaned",
            summary.reassigned, summary.orphaned
        );
    }
    Ok(())
}

pub fn add(start: NaiveDateTime, end: Option<NaiveDateTime>) -> Result<()> {
    let mut conn = open_store()?;
    let id = db::add_shift(&conn, start, end)?;
    println!("Added shift {id}: {}", span(start, end));
    rematch_after_change(&mut conn)
}

pub fn end(id: i64, end: NaiveDateTime) -> Result<()> {
    let mut conn = open_store()?;
    db::end_shift(&conn, id, end)?;
    println!("Ended shift {id}");
    rematch_after_change(&mut conn)
}

pub fn delete(id: i64) -> Result<()> {
    let mut conn = open_store()?;
    db::delete_shift(&conn, id)?;
    println!("Deleted shift {id}; its transactions are now unmatched");
    rematch_after_change(&mut conn)
}

pub fn list() -> Result<()> {
    let conn = open_store()?;
    let shifts = db::load_shifts(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Shift", "Length", "Net Fare", "Tips", "Promotions", "Tolls"]);
    for shift in shifts {
        let totals = db::load_shift_totals(&conn, shift.id)?;
        let length = shift
            .end_date
            .map(|end| hours(end - shift.start_date))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(shift.id),
            Cell::new(span(shift.start_date, shift.end_date)),
            Cell::new(length),
            Cell::new(money(totals.net_fare)),
            Cell::new(money(totals.tips)),
            Cell::new(money(totals.promotions)),
            Cell::new(money(totals.tolls)),
        ]);
    }
    println!("Shifts\n{table}");
    Ok(())
}
