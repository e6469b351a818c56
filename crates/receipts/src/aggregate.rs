use std::collections::HashMap;

use crate::model::{Item, NormalizedLine, Receipt, UNKNOWN_ITEM};

/// Group lines by receipt id, sum amounts and quantities, roll up items by name.
///
/// Receipts appear in order of their first line; lines and items keep first-seen
/// order. Date, time and store are taken from a receipt's first line.
pub fn build_receipts<'a, I>(lines: I) -> Vec<Receipt>
where
    I: IntoIterator<Item = &'a NormalizedLine>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&NormalizedLine>> = Vec::new();

    for line in lines {
        let slot = *index.entry(line.receipt_id.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(line);
    }

    groups.into_iter().map(|group| build_one(&group)).collect()
}

fn build_one(group: &[&NormalizedLine]) -> Receipt {
    let first = group[0];

    let mut items: Vec<Item> = Vec::new();
    let mut item_index: HashMap<&str, usize> = HashMap::new();
    for line in group {
        let name = if line.item.is_empty() { UNKNOWN_ITEM } else { line.item.as_str() };
        let slot = *item_index.entry(name).or_insert_with(|| {
            items.push(Item { name: name.to_string(), amount: 0.0, qty: 0.0 });
            items.len() - 1
        });
        items[slot].amount += line.amount;
        items[slot].qty += line.qty;
    }

    Receipt {
        receipt_id: first.receipt_id.clone(),
        date: first.date.clone(),
        time: first.time.clone(),
        dt_key: first.dt_key.clone(),
        store: first.store.clone(),
        sales: group.iter().map(|l| l.amount).sum(),
        qty: group.iter().map(|l| l.qty).sum(),
        items,
        lines: group.iter().map(|&l| l.clone()).collect(),
    }
}
