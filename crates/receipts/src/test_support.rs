use crate::model::NormalizedLine;
use crate::receipt_id;

/// Line with no facets and quantity 1.
pub(crate) fn line(
    member: &str,
    store: &str,
    date: &str,
    time: &str,
    item: &str,
    amount: f64,
) -> NormalizedLine {
    NormalizedLine {
        member: member.into(),
        date: date.into(),
        time: time.into(),
        store: store.into(),
        item: item.into(),
        amount,
        qty: 1.0,
        maker: String::new(),
        line: String::new(),
        corner: String::new(),
        cat_l: String::new(),
        cat_m: String::new(),
        cat_s: String::new(),
        jan: String::new(),
        dt_key: format!("{date} {time}"),
        receipt_id: receipt_id::synthesize(member, store, date, time),
    }
}

impl NormalizedLine {
    pub(crate) fn with_jan(mut self, jan: &str) -> Self {
        self.jan = jan.into();
        self
    }

    pub(crate) fn with_qty(mut self, qty: f64) -> Self {
        self.qty = qty;
        self
    }
}
