// Property-based tests for receipt reconstruction.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use rcptscope_receipts::receipt_id::synthesize;
use rcptscope_receipts::{
    build_view, load, Dataset, FilterSet, ItemSort, MemberView, ProductScope, ProfileRegistry,
    ReceiptSort, ViewSort,
};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

const HEADER: &str = "匿名会員番号,買上日,買上時間,店舗名,商品名,JANコード,買上点数（会員),買上金額（会員)";

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Row {
    member: &'static str,
    store: &'static str,
    date: &'static str,
    time: &'static str,
    item: &'static str,
    jan: &'static str,
    qty: i32,
    amount: i32,
}

fn arb_row() -> impl Strategy<Value = Row> {
    (
        prop::sample::select(vec!["M1", "M2", "M3"]),
        // "Aa" and "BB" collide in the receipt hash.
        prop::sample::select(vec!["S1", "S2", "Aa", "BB"]),
        prop::sample::select(vec!["2024-01-05", "2024/01/06", "2024-01-07"]),
        prop::sample::select(vec!["09:00", "1305", "13:05:00", "18:30:15"]),
        prop::sample::select(vec!["りんご", "牛乳", "パン", ""]),
        prop::sample::select(vec!["4901", "4902", "4903"]),
        0..5i32,
        -500..5000i32,
    )
        .prop_map(|(member, store, date, time, item, jan, qty, amount)| Row {
            member,
            store,
            date,
            time,
            item,
            jan,
            qty,
            amount,
        })
}

fn to_csv(rows: &[Row]) -> String {
    let mut text = String::from(HEADER);
    for r in rows {
        text.push_str(&format!(
            "\n{},{},{},{},{},{},{},{}",
            r.member, r.store, r.date, r.time, r.item, r.jan, r.qty, r.amount
        ));
    }
    text
}

fn dataset(rows: &[Row]) -> Dataset {
    load(&to_csv(rows), &ProfileRegistry::builtin()).unwrap()
}

/// Lines of a view as a multiset of (receipt id, item, amount bits).
fn line_counts(view: &MemberView) -> HashMap<(String, String, u64), usize> {
    let mut counts = HashMap::new();
    for r in &view.receipts {
        for l in &r.lines {
            *counts
                .entry((l.receipt_id.clone(), l.item.clone(), l.amount.to_bits()))
                .or_insert(0) += 1;
        }
    }
    counts
}

fn arb_filters() -> impl Strategy<Value = FilterSet> {
    (
        prop::sample::select(vec!["", "S1", "S2"]),
        prop::sample::select(vec!["", "4901", "490"]),
        prop::sample::select(vec!["", "りんご", "ん"]),
    )
        .prop_map(|(store, jan, item)| FilterSet {
            store: store.into(),
            jan: jan.into(),
            item: item.into(),
            ..Default::default()
        })
}

fn arb_sort() -> impl Strategy<Value = ViewSort> {
    (
        prop::sample::select(ReceiptSort::ALL.to_vec()),
        prop::sample::select(ItemSort::ALL.to_vec()),
    )
        .prop_map(|(receipts, items)| ViewSort { receipts, items })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn receipt_id_is_deterministic(
        member in "[A-Z0-9]{0,8}",
        store in "\\PC{0,6}",
        date in "[0-9/-]{0,10}",
        time in "[0-9:]{0,8}",
    ) {
        let a = synthesize(&member, &store, &date, &time);
        let b = synthesize(&member, &store, &date, &time);
        prop_assert_eq!(a.clone(), b);
        prop_assert!(a.starts_with('R'));
    }

    #[test]
    fn receipt_sums_are_consistent(rows in prop::collection::vec(arb_row(), 1..40)) {
        let ds = dataset(&rows);
        for member in ds.members() {
            let view = build_view(&ds, &member, &FilterSet::default(), ViewSort::default());
            for r in &view.receipts {
                let items: f64 = r.items.iter().map(|i| i.amount).sum();
                let lines: f64 = r.lines.iter().map(|l| l.amount).sum();
                prop_assert_eq!(r.sales, items);
                prop_assert_eq!(r.sales, lines);
                let ids: HashSet<&str> = r.lines.iter().map(|l| l.receipt_id.as_str()).collect();
                prop_assert_eq!(ids.len(), 1);
                prop_assert!(r
                    .lines
                    .iter()
                    .all(|l| l.store == r.store && l.dt_key == r.dt_key));
            }
            let total: usize = view.receipts.iter().map(|r| r.lines.len()).sum();
            let expected = ds.lines.iter().filter(|l| l.member == member).count();
            prop_assert_eq!(total, expected);
        }
    }

    #[test]
    fn receipt_all_contains_detail_only(
        rows in prop::collection::vec(arb_row(), 1..40),
        filters in arb_filters(),
    ) {
        let ds = dataset(&rows);
        for member in ds.members() {
            let detail = build_view(
                &ds,
                &member,
                &FilterSet { scope: ProductScope::DetailOnly, ..filters.clone() },
                ViewSort::default(),
            );
            let all = build_view(
                &ds,
                &member,
                &FilterSet { scope: ProductScope::ReceiptAll, ..filters.clone() },
                ViewSort::default(),
            );

            let all_ids: HashSet<&str> = all.receipts.iter().map(|r| r.receipt_id.as_str()).collect();
            let detail_ids: HashSet<&str> =
                detail.receipts.iter().map(|r| r.receipt_id.as_str()).collect();
            prop_assert_eq!(&all_ids, &detail_ids);

            let all_lines = line_counts(&all);
            for (key, n) in line_counts(&detail) {
                let have = all_lines.get(&key).copied().unwrap_or(0);
                prop_assert!(have >= n, "{:?}: {} in receipt_all, {} in detail_only", key, have, n);
            }
        }
    }

    #[test]
    fn view_is_idempotent(
        rows in prop::collection::vec(arb_row(), 1..40),
        filters in arb_filters(),
        sort in arb_sort(),
    ) {
        let ds = dataset(&rows);
        for member in ds.members() {
            let first = build_view(&ds, &member, &filters, sort);
            let second = build_view(&ds, &member, &filters, sort);
            prop_assert_eq!(first, second);
        }
    }
}
