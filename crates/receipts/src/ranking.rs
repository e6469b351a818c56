//! Dataset-wide member ranking.
//!
//! Independent of the member view: it reads every line, and with a product query
//! it aggregates only the matching lines (co-purchases are not pulled in).

use std::collections::{HashMap, HashSet};

use crate::filter::ProductQuery;
use crate::model::{MemberRankingRow, NormalizedLine, RankMetric, RankQuery};
use crate::sort::cmp_num;

#[derive(Default)]
struct Totals<'a> {
    sales: f64,
    qty: f64,
    receipts: HashSet<&'a str>,
    stores: HashSet<&'a str>,
    last_dt: &'a str,
}

/// Rank members by `query.metric`.
///
/// | metric       | primary   | tie-breaks                    |
/// |--------------|-----------|-------------------------------|
/// | `sales_desc` | sales     | last_dt desc, receipts desc   |
/// | `qty_desc`   | qty       | sales desc, last_dt desc      |
/// | `rcpt_desc`  | receipts  | sales desc, last_dt desc      |
/// | `last_desc`  | last_dt   | sales desc, receipts desc     |
pub fn rank_members(lines: &[NormalizedLine], query: &RankQuery) -> Vec<MemberRankingRow> {
    let product = ProductQuery::new(&query.jan, &query.item);

    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, Totals> = HashMap::new();

    for line in lines {
        if line.member.is_empty() || !product.matches(line) {
            continue;
        }
        let t = totals.entry(line.member.as_str()).or_insert_with(|| {
            order.push(line.member.as_str());
            Totals::default()
        });
        t.sales += line.amount;
        t.qty += line.qty;
        t.receipts.insert(line.receipt_id.as_str());
        t.stores.insert(line.store.as_str());
        if line.dt_key.as_str() > t.last_dt {
            t.last_dt = line.dt_key.as_str();
        }
    }

    let mut rows: Vec<MemberRankingRow> = order
        .into_iter()
        .filter_map(|member| {
            totals.remove(member).map(|t| MemberRankingRow {
                member: member.to_string(),
                sales: t.sales,
                qty: t.qty,
                receipts: t.receipts.len(),
                stores: t.stores.len(),
                last_dt: t.last_dt.to_string(),
            })
        })
        .collect();

    rows.sort_by(|a, b| match query.metric {
        RankMetric::SalesDesc => cmp_num(b.sales, a.sales)
            .then_with(|| b.last_dt.cmp(&a.last_dt))
            .then_with(|| b.receipts.cmp(&a.receipts)),
        RankMetric::QtyDesc => cmp_num(b.qty, a.qty)
            .then_with(|| cmp_num(b.sales, a.sales))
            .then_with(|| b.last_dt.cmp(&a.last_dt)),
        RankMetric::RcptDesc => b
            .receipts
            .cmp(&a.receipts)
            .then_with(|| cmp_num(b.sales, a.sales))
            .then_with(|| b.last_dt.cmp(&a.last_dt)),
        RankMetric::LastDesc => b
            .last_dt
            .cmp(&a.last_dt)
            .then_with(|| cmp_num(b.sales, a.sales))
            .then_with(|| b.receipts.cmp(&a.receipts)),
    });

    if let Some(limit) = query.limit.filter(|&n| n > 0) {
        rows.truncate(limit);
    }

    log::debug!(
        "ranking: {} member(s), metric={}, product query={}",
        rows.len(),
        query.metric,
        !product.is_empty()
    );
    rows
}
