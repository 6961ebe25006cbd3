use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::aggregator::{aggregate, ShiftTotals};
use crate::error::Result;
use crate::matcher::operational_day;
use crate::models::Transaction;

/// Unmatched transactions from one operational day: a shift the driver
/// probably worked but never logged.
#[derive(Debug, Clone, Serialize)]
pub struct OrphanCluster {
    pub day: NaiveDate,
    pub earliest: NaiveDateTime,
    pub latest: NaiveDateTime,
    pub totals: ShiftTotals,
    pub transactions: Vec<Transaction>,
}

impl OrphanCluster {
    pub fn revenue(&self) -> f64 {
        self.totals.revenue()
    }
}

pub fn orphan_clusters(transactions: &[Transaction], offset: Duration) -> Vec<OrphanCluster> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&Transaction>> = BTreeMap::new();
    for txn in transactions.iter().filter(|t| t.shift_id.is_none()) {
        by_day
            .entry(operational_day(txn.effective_timestamp(), offset))
            .or_default()
            .push(txn);
    }

    let clusters: Vec<OrphanCluster> = by_day
        .into_iter()
        .filter_map(|(day, mut txns)| {
            txns.sort_by_key(|t| t.effective_timestamp());
            let earliest = txns.first()?.effective_timestamp();
            let latest = txns.last()?.effective_timestamp();
            Some(OrphanCluster {
                day,
                earliest,
                latest,
                totals: aggregate(txns.iter().copied()),
                transactions: txns.into_iter().cloned().collect(),
            })
        })
        .collect();
    log::info!("{} orphan cluster(s)", clusters.len());
    clusters
}

#[derive(Serialize)]
struct ClusterRow {
    day: String,
    earliest: String,
    latest: String,
    transactions: usize,
    net_fare: f64,
    tips: f64,
    promotions: f64,
    tolls: f64,
    revenue: f64,
}

pub fn write_csv<W: Write>(clusters: &[OrphanCluster], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for cluster in clusters {
        wtr.serialize(ClusterRow {
            day: cluster.day.format("%Y-%m-%d").to_string(),
            earliest: cluster.earliest.format("%Y-%m-%d %H:%M").to_string(),
            latest: cluster.latest.format("%Y-%m-%d %H:%M").to_string(),
            transactions: cluster.totals.transaction_count,
            net_fare: cluster.totals.net_fare,
            tips: cluster.totals.tips,
            promotions: cluster.totals.promotions,
            tolls: cluster.totals.tolls,
            revenue: cluster.revenue(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(clusters: &[OrphanCluster], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(clusters, file)
}
