//! `rcptscope rank`: member ranking across the export.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use rcptscope_receipts::{rank, MemberRankingRow, ProfileRegistry, RankMetric, RankQuery};

use crate::output::print_json;
use crate::util::{display_width, format_number, pad_left, pad_right};
use crate::{load_dataset, CliError};

#[derive(Serialize)]
struct RankReport<'a> {
    query: &'a RankQuery,
    rows: &'a [MemberRankingRow],
}

pub fn cmd_rank(
    input: &Path,
    registry: &ProfileRegistry,
    jan: Option<String>,
    item: Option<String>,
    metric: RankMetric,
    limit: usize,
    json: bool,
) -> Result<(), CliError> {
    let ds = load_dataset(input, registry)?;
    let query = RankQuery {
        jan: jan.unwrap_or_default(),
        item: item.unwrap_or_default(),
        metric,
        limit: Some(limit),
    };
    let rows = rank(&ds, &query);

    if json {
        return print_json(Some(&ds.profile.key), &RankReport { query: &query, rows: &rows });
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_table(&mut out, &rows).map_err(|e| CliError::io(e.to_string()))?;
    if rows.is_empty() {
        eprintln!("no member matched");
    }
    Ok(())
}

fn write_table<W: Write>(out: &mut W, rows: &[MemberRankingRow]) -> io::Result<()> {
    let member_width = rows
        .iter()
        .map(|r| display_width(&r.member))
        .max()
        .unwrap_or(0)
        .max(6);

    writeln!(
        out,
        "{:>4}  {}{:>12}{:>8}{:>10}{:>8}  {}",
        "#",
        pad_right("member", member_width),
        "sales",
        "qty",
        "receipts",
        "stores",
        "last",
    )?;
    for (i, r) in rows.iter().enumerate() {
        writeln!(
            out,
            "{:>4}  {}{}{}{}{}  {}",
            i + 1,
            pad_right(&r.member, member_width),
            pad_left(&format_number(r.sales), 12),
            pad_left(&format_number(r.qty), 8),
            pad_left(&r.receipts.to_string(), 10),
            pad_left(&r.stores.to_string(), 8),
            r.last_dt,
        )?;
    }
    Ok(())
}
