use std::collections::BTreeMap;

use serde::Serialize;

use crate::categorizer::Category;
use crate::models::{Shift, Transaction};

pub(crate) fn round_cents(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}

/// Category totals for one group of transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShiftTotals {
    pub tips: f64,
    pub promotions: f64,
    pub net_fare: f64,
    /// Summed across every category; a fare or tip can carry a toll.
    pub tolls: f64,
    pub transaction_count: usize,
    pub needs_verification: usize,
}

impl ShiftTotals {
    /// Revenue consumed by profit and tax calculations.
    pub fn revenue(&self) -> f64 {
        round_cents(self.tips + self.promotions + self.net_fare)
    }

    fn add(&mut self, txn: &Transaction) {
        match txn.category() {
            Category::Tip => self.tips += txn.amount,
            Category::Promotion => self.promotions += txn.amount,
            Category::NetFare => self.net_fare += txn.amount,
            Category::Ignore => {}
        }
        self.tolls += txn.tolls_reimbursed.unwrap_or(0.0);
        self.transaction_count += 1;
        if txn.needs_manual_verification {
            self.needs_verification += 1;
        }
    }

    fn rounded(mut self) -> Self {
        self.tips = round_cents(self.tips);
        self.promotions = round_cents(self.promotions);
        self.net_fare = round_cents(self.net_fare);
        self.tolls = round_cents(self.tolls);
        self
    }
}

pub fn aggregate<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> ShiftTotals {
    let mut totals = ShiftTotals::default();
    for txn in transactions {
        totals.add(txn);
    }
    totals.rounded()
}

/// Totals for every shift that has at least one matched transaction.
pub fn totals_by_shift(transactions: &[Transaction]) -> BTreeMap<i64, ShiftTotals> {
    let mut grouped: BTreeMap<i64, Vec<&Transaction>> = BTreeMap::new();
    for txn in transactions {
        if let Some(shift_id) = txn.shift_id {
            grouped.entry(shift_id).or_default().push(txn);
        }
    }
    grouped
        .into_iter()
        .map(|(id, txns)| (id, aggregate(txns)))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: Category,
    pub total: f64,
    pub transactions: Vec<Transaction>,
}

/// Everything a summary renderer needs for one shift.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftSummary {
    pub shift: Shift,
    pub totals: ShiftTotals,
    pub revenue: f64,
    pub groups: Vec<CategoryGroup>,
}

pub fn summarize_shift(shift: &Shift, transactions: &[Transaction]) -> ShiftSummary {
    let matched: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.shift_id == Some(shift.id))
        .collect();
    let totals = aggregate(matched.iter().copied());

    let mut by_category: BTreeMap<Category, Vec<Transaction>> = BTreeMap::new();
    for txn in &matched {
        by_category.entry(txn.category()).or_default().push((*txn).clone());
    }
    let groups = by_category
        .into_iter()
        .map(|(category, mut txns)| {
            txns.sort_by_key(|t| t.effective_timestamp());
            CategoryGroup {
                category,
                total: round_cents(txns.iter().map(|t| t.amount).sum()),
                transactions: txns,
            }
        })
        .collect();

    ShiftSummary {
        shift: shift.clone(),
        revenue: totals.revenue(),
        totals,
        groups,
    }
}
