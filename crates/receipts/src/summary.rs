use std::collections::HashSet;

use crate::model::{MemberSummary, Receipt};

/// Compute member-view KPIs from its receipts.
pub fn summarize(receipts: &[Receipt]) -> MemberSummary {
    let mut sales = 0.0;
    let mut qty = 0.0;
    let mut days: HashSet<&str> = HashSet::new();
    let mut stores: HashSet<&str> = HashSet::new();

    for r in receipts {
        sales += r.sales;
        qty += r.qty;
        days.insert(r.date.as_str());
        stores.insert(r.store.as_str());
    }

    let avg_ticket = if receipts.is_empty() {
        0.0
    } else {
        sales / receipts.len() as f64
    };

    MemberSummary {
        receipts: receipts.len(),
        sales,
        qty,
        avg_ticket,
        days: days.len(),
        stores: stores.len(),
    }
}
