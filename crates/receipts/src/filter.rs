use std::collections::HashSet;

use crate::model::{FilterSet, NormalizedLine, ProductScope};
use crate::profile::Facet;

/// Trimmed JAN/item-name substring query shared by member views and ranking.
#[derive(Debug, Clone, Copy)]
pub struct ProductQuery<'q> {
    jan: &'q str,
    item: &'q str,
}

impl<'q> ProductQuery<'q> {
    pub fn new(jan: &'q str, item: &'q str) -> Self {
        Self { jan: jan.trim(), item: item.trim() }
    }

    pub fn is_empty(&self) -> bool {
        self.jan.is_empty() && self.item.is_empty()
    }

    pub fn matches(&self, line: &NormalizedLine) -> bool {
        (self.jan.is_empty() || line.jan.contains(self.jan))
            && (self.item.is_empty() || line.item.contains(self.item))
    }
}

/// Member + exact-match facets. Empty filter values leave a facet unconstrained.
fn passes_facets(line: &NormalizedLine, member: &str, filters: &FilterSet) -> bool {
    let eq = |want: &str, have: &str| want.is_empty() || want == have;

    line.member == member
        && eq(&filters.date, &line.date)
        && eq(&filters.store, &line.store)
        && Facet::ALL.iter().all(|&f| eq(filters.facet(f), line.facet(f)))
}

/// Select the lines of `member` that satisfy `filters`, in dataset order.
///
/// Without a product query the facet-filtered lines pass through regardless of
/// scope. With one, `DetailOnly` keeps matching lines and `ReceiptAll` keeps every
/// facet-filtered line whose receipt contains a match.
pub fn filter_lines<'d>(
    lines: &'d [NormalizedLine],
    member: &str,
    filters: &FilterSet,
) -> Vec<&'d NormalizedLine> {
    let base: Vec<&NormalizedLine> = lines
        .iter()
        .filter(|l| passes_facets(l, member, filters))
        .collect();

    let query = ProductQuery::new(&filters.jan, &filters.item);
    if query.is_empty() {
        return base;
    }

    match filters.scope {
        ProductScope::DetailOnly => base.into_iter().filter(|l| query.matches(l)).collect(),
        ProductScope::ReceiptAll => {
            let receipts: HashSet<&str> = base
                .iter()
                .filter(|l| query.matches(l))
                .map(|l| l.receipt_id.as_str())
                .collect();
            base.into_iter()
                .filter(|l| receipts.contains(l.receipt_id.as_str()))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::line;

    fn dataset() -> Vec<NormalizedLine> {
        vec![
            line("M1", "S1", "2024-01-05", "13:05:00", "りんご", 100.0).with_jan("4901001"),
            line("M1", "S1", "2024-01-05", "13:05:00", "牛乳", 200.0).with_jan("4902002"),
            line("M1", "S2", "2024-01-06", "10:00:00", "バナナ", 150.0).with_jan("4903003"),
            line("M1", "S2", "2024-01-06", "10:00:00", "りんごジュース", 180.0).with_jan("4901009"),
            line("M2", "S1", "2024-01-05", "13:05:00", "りんご", 100.0).with_jan("4901001"),
        ]
    }

    fn names(lines: &[&NormalizedLine]) -> Vec<String> {
        lines.iter().map(|l| l.item.clone()).collect()
    }

    #[test]
    fn member_only() {
        let data = dataset();
        let out = filter_lines(&data, "M1", &FilterSet::default());
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|l| l.member == "M1"));
    }

    #[test]
    fn unknown_member_is_empty() {
        let data = dataset();
        assert!(filter_lines(&data, "nobody", &FilterSet::default()).is_empty());
        assert!(filter_lines(&[], "M1", &FilterSet::default()).is_empty());
    }

    #[test]
    fn exact_facets() {
        let data = dataset();
        let filters = FilterSet { store: "S2".into(), ..Default::default() };
        assert_eq!(names(&filter_lines(&data, "M1", &filters)), vec!["バナナ", "りんごジュース"]);

        let filters = FilterSet { date: "2024-01-05".into(), ..Default::default() };
        assert_eq!(names(&filter_lines(&data, "M1", &filters)), vec!["りんご", "牛乳"]);

        // Facets are exact, not substring.
        let filters = FilterSet { store: "S".into(), ..Default::default() };
        assert!(filter_lines(&data, "M1", &filters).is_empty());
    }

    #[test]
    fn category_facet() {
        let mut data = dataset();
        data[1].cat_l = "乳製品".into();
        let filters = FilterSet { cat_l: "乳製品".into(), ..Default::default() };
        assert_eq!(names(&filter_lines(&data, "M1", &filters)), vec!["牛乳"]);
    }

    #[test]
    fn detail_only_keeps_matching_lines() {
        let data = dataset();
        let filters = FilterSet { item: "りんご".into(), ..Default::default() };
        assert_eq!(
            names(&filter_lines(&data, "M1", &filters)),
            vec!["りんご", "りんごジュース"]
        );
    }

    #[test]
    fn receipt_all_readmits_co_purchases() {
        let data = dataset();
        let filters = FilterSet {
            jan: "4901001".into(),
            scope: ProductScope::ReceiptAll,
            ..Default::default()
        };
        assert_eq!(names(&filter_lines(&data, "M1", &filters)), vec!["りんご", "牛乳"]);
    }

    #[test]
    fn jan_and_item_both_required() {
        let data = dataset();
        let filters = FilterSet {
            jan: "4901".into(),
            item: "ジュース".into(),
            ..Default::default()
        };
        assert_eq!(names(&filter_lines(&data, "M1", &filters)), vec!["りんごジュース"]);
    }

    #[test]
    fn whitespace_query_is_no_query() {
        let data = dataset();
        let filters = FilterSet {
            item: "   ".into(),
            scope: ProductScope::ReceiptAll,
            ..Default::default()
        };
        assert_eq!(filter_lines(&data, "M1", &filters).len(), 4);
    }

    #[test]
    fn receipt_all_respects_facets() {
        // A co-purchased line excluded by a facet stays excluded.
        let mut data = dataset();
        data[0].cat_l = "青果".into();
        data[1].cat_l = "乳製品".into();
        let filters = FilterSet {
            cat_l: "青果".into(),
            item: "りんご".into(),
            scope: ProductScope::ReceiptAll,
            ..Default::default()
        };
        assert_eq!(names(&filter_lines(&data, "M1", &filters)), vec!["りんご"]);
    }
}
