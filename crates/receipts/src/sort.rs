use std::cmp::Ordering;

use crate::model::{Item, ItemSort, Receipt, ReceiptSort};

/// Numeric order; incomparable values compare equal.
pub(crate) fn cmp_num(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Order receipts by `mode`. String keys compare by code point.
///
/// | mode         | primary       | tie-break     |
/// |--------------|---------------|---------------|
/// | `dt_asc`     | dt_key asc    | store asc     |
/// | `dt_desc`    | dt_key desc   | store asc     |
/// | `sales_asc`  | sales asc     | dt_key asc    |
/// | `sales_desc` | sales desc    | dt_key desc   |
/// | `qty_asc`    | qty asc       | dt_key asc    |
/// | `qty_desc`   | qty desc      | dt_key desc   |
pub fn sort_receipts(mut receipts: Vec<Receipt>, mode: ReceiptSort) -> Vec<Receipt> {
    receipts.sort_by(|p, q| match mode {
        ReceiptSort::DtAsc => p.dt_key.cmp(&q.dt_key).then_with(|| p.store.cmp(&q.store)),
        ReceiptSort::DtDesc => q.dt_key.cmp(&p.dt_key).then_with(|| p.store.cmp(&q.store)),
        ReceiptSort::SalesAsc => cmp_num(p.sales, q.sales).then_with(|| p.dt_key.cmp(&q.dt_key)),
        ReceiptSort::SalesDesc => cmp_num(q.sales, p.sales).then_with(|| q.dt_key.cmp(&p.dt_key)),
        ReceiptSort::QtyAsc => cmp_num(p.qty, q.qty).then_with(|| p.dt_key.cmp(&q.dt_key)),
        ReceiptSort::QtyDesc => cmp_num(q.qty, p.qty).then_with(|| q.dt_key.cmp(&p.dt_key)),
    });
    receipts
}

/// Order items by `mode`. Stable: ties keep their prior relative order.
pub fn sort_items(items: &[Item], mode: ItemSort) -> Vec<Item> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|p, q| match mode {
        ItemSort::AmtAsc => cmp_num(p.amount, q.amount),
        ItemSort::AmtDesc => cmp_num(q.amount, p.amount),
        ItemSort::QtyAsc => cmp_num(p.qty, q.qty),
        ItemSort::QtyDesc => cmp_num(q.qty, p.qty),
        ItemSort::NameAsc => p.name.cmp(&q.name),
    });
    sorted
}
