//! Machine-readable output: JSON envelopes and per-item CSV.

use std::io::Write;

use serde::Serialize;

use rcptscope_receipts::Receipt;

use crate::exit_codes::EXIT_ERROR;
use crate::CliError;

#[derive(Debug, Serialize)]
pub struct Meta {
    pub engine_version: String,
    /// Key of the profile the export was loaded with; absent for `profiles`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub run_at: String,
}

impl Meta {
    pub fn new(profile: Option<&str>) -> Self {
        Self {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            profile: profile.map(str::to_string),
            run_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    meta: Meta,
    #[serde(flatten)]
    body: &'a T,
}

/// Print `{ "meta": …, <body fields> }` to stdout.
pub fn print_json<T: Serialize>(profile: Option<&str>, body: &T) -> Result<(), CliError> {
    let envelope = Envelope { meta: Meta::new(profile), body };
    let json = serde_json::to_string_pretty(&envelope).map_err(|e| CliError {
        code: EXIT_ERROR,
        message: format!("JSON serialization error: {e}"),
        hint: None,
    })?;
    println!("{json}");
    Ok(())
}

pub const ITEM_CSV_HEADER: [&str; 7] = ["receipt_id", "date", "time", "store", "item", "amount", "qty"];

/// One row per receipt item, receipts and items in their current order.
pub fn write_items_csv<W: Write>(out: W, receipts: &[Receipt]) -> Result<(), CliError> {
    let io_err = |e: csv::Error| CliError::io(format!("cannot write CSV: {e}"));
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(ITEM_CSV_HEADER).map_err(io_err)?;
    for r in receipts {
        for item in &r.items {
            let amount = item.amount.to_string();
            let qty = item.qty.to_string();
            writer
                .write_record([
                    r.receipt_id.as_str(),
                    r.date.as_str(),
                    r.time.as_str(),
                    r.store.as_str(),
                    item.name.as_str(),
                    amount.as_str(),
                    qty.as_str(),
                ])
                .map_err(io_err)?;
        }
    }
    writer.flush().map_err(|e| CliError::io(format!("cannot write CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcptscope_receipts::Item;

    fn receipt() -> Receipt {
        Receipt {
            receipt_id: "R1a_20240105_130500".into(),
            date: "2024-01-05".into(),
            time: "13:05:00".into(),
            dt_key: "2024-01-05 13:05:00".into(),
            store: "渋谷店".into(),
            sales: 1778.0,
            qty: 3.0,
            items: vec![
                Item { name: "ハンドクリーム".into(), amount: 1280.0, qty: 1.0 },
                Item { name: "マスク, 50枚".into(), amount: 498.0, qty: 2.0 },
            ],
            lines: Vec::new(),
        }
    }

    #[test]
    fn items_csv_rows() {
        let mut buf = Vec::new();
        write_items_csv(&mut buf, &[receipt()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "receipt_id,date,time,store,item,amount,qty");
        assert_eq!(lines[1], "R1a_20240105_130500,2024-01-05,13:05:00,渋谷店,ハンドクリーム,1280,1");
        assert_eq!(lines[2], "R1a_20240105_130500,2024-01-05,13:05:00,渋谷店,\"マスク, 50枚\",498,2");
    }

    #[test]
    fn meta_has_rfc3339_timestamp() {
        let meta = Meta::new(Some("TOMODS"));
        assert!(chrono::DateTime::parse_from_rfc3339(&meta.run_at).is_ok());
        assert_eq!(meta.profile.as_deref(), Some("TOMODS"));
    }
}
