use serde::Serialize;

use crate::aggregate::build_receipts;
use crate::dataset::Dataset;
use crate::error::LoadError;
use crate::filter::filter_lines;
use crate::model::{
    FilterSet, ItemSort, MemberRankingRow, MemberSummary, RankQuery, Receipt, ReceiptSort,
};
use crate::profile::ProfileRegistry;
use crate::ranking::rank_members;
use crate::sort::{sort_items, sort_receipts};
use crate::summary::summarize;

/// Receipt and item ordering for a member view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewSort {
    pub receipts: ReceiptSort,
    pub items: ItemSort,
}

/// One member's filtered, aggregated and ordered receipts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberView {
    pub member: String,
    pub summary: MemberSummary,
    pub receipts: Vec<Receipt>,
}

/// Parse `text` into a dataset using the first matching profile of `registry`.
pub fn load(text: &str, registry: &ProfileRegistry) -> Result<Dataset, LoadError> {
    Dataset::load(text, registry)
}

/// Filter → aggregate → sort → summarize. Items inside each receipt are
/// ordered by `sort.items`. An unknown member yields an empty view.
pub fn build_view(dataset: &Dataset, member: &str, filters: &FilterSet, sort: ViewSort) -> MemberView {
    let lines = filter_lines(&dataset.lines, member, filters);
    log::debug!("view {member}: {} line(s) after filters", lines.len());

    let mut receipts = sort_receipts(build_receipts(lines), sort.receipts);
    for r in &mut receipts {
        r.items = sort_items(&r.items, sort.items);
    }
    log::debug!("view {member}: {} receipt(s), sorted {}", receipts.len(), sort.receipts);

    MemberView {
        member: member.to_string(),
        summary: summarize(&receipts),
        receipts,
    }
}

/// Dataset-wide member ranking.
pub fn rank(dataset: &Dataset, query: &RankQuery) -> Vec<MemberRankingRow> {
    rank_members(&dataset.lines, query)
}
