use colored::Colorize;
use comfy_table::{Cell, Table};

use shiftledger::aggregator::{summarize_shift, ShiftTotals};
use shiftledger::db;
use shiftledger::error::Result;
use shiftledger::fmt::{money, span, timestamp};

use super::open_store;

pub fn shift(id: i64, json: bool) -> Result<()> {
    let conn = open_store()?;
    let shift = db::get_shift(&conn, id)?;
    let transactions = db::load_shift_transactions(&conn, id)?;
    let summary = summarize_shift(&shift, &transactions);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Shift {id}: {}", span(shift.start_date, shift.end_date));
    for group in &summary.groups {
        println!("\n{} {}", group.category.name().bold(), money(group.total));
        let mut table = Table::new();
        table.set_header(vec!["Date", "Event", "Amount"]);
        for txn in &group.transactions {
            let event = if txn.needs_manual_verification {
                format!("{} (verify)", txn.event_type)
            } else {
                txn.event_type.clone()
            };
            table.add_row(vec![
                Cell::new(timestamp(txn.effective_timestamp())),
                Cell::new(event),
                Cell::new(money(txn.amount)),
            ]);
        }
        println!("{table}");
    }
    print_totals(&summary.totals);
    Ok(())
}

fn print_totals(totals: &ShiftTotals) {
    println!();
    println!("  Net fare:   {}", money(totals.net_fare));
    println!("  Tips:       {}", money(totals.tips));
    println!("  Promotions: {}", money(totals.promotions));
    println!("  Tolls:      {}", money(totals.tolls));
    println!("  Revenue:    {}", money(totals.revenue()).bold());
    if totals.needs_verification > 0 {
        println!(
            "  {}",
            format!("{} transaction(s) need manual verification", totals.needs_verification).yellow()
        );
    }
}

pub fn totals() -> Result<()> {
    let conn = open_store()?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Shift", "Txns", "Net Fare", "Tips", "Promotions", "Revenue"]);
    let mut grand = ShiftTotals::default();
    for shift in db::load_shifts(&conn)? {
        let totals = db::load_shift_totals(&conn, shift.id)?;
        table.add_row(vec![
            Cell::new(shift.id),
            Cell::new(span(shift.start_date, shift.end_date)),
            Cell::new(totals.transaction_count),
            Cell::new(money(totals.net_fare)),
            Cell::new(money(totals.tips)),
            Cell::new(money(totals.promotions)),
            Cell::new(money(totals.revenue())),
        ]);
        grand.net_fare += totals.net_fare;
        grand.tips += totals.tips;
        grand.promotions += totals.promotions;
        grand.tolls += totals.tolls;
        grand.transaction_count += totals.transaction_count;
        grand.needs_verification += totals.needs_verification;
    }
    println!("Shift Totals\n{table}");
    print_totals(&grand);
    Ok(())
}
