//! `rcptscope receipts`: one member's reconstructed receipts.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use rcptscope_receipts::{
    build_view, Dataset, Facet, FilterSet, ItemSort, MemberView, ProfileRegistry, ReceiptSort,
    ViewSort,
};

use crate::output::{print_json, write_items_csv};
use crate::util::{display_width, format_number, pad_left, pad_right};
use crate::{load_dataset, require_member, CliError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
    Csv,
}

#[derive(Serialize)]
struct ReceiptsReport<'a> {
    filters: &'a FilterSet,
    sort: ViewSort,
    #[serde(flatten)]
    view: &'a MemberView,
}

pub fn cmd_receipts(
    input: &Path,
    registry: &ProfileRegistry,
    member: &str,
    filters: FilterSet,
    sort: ReceiptSort,
    item_sort: ItemSort,
    format: Format,
) -> Result<(), CliError> {
    let ds = load_dataset(input, registry)?;
    require_member(&ds, input, member)?;

    let unavailable = unavailable_facet_flags(&ds, &filters);
    if !unavailable.is_empty() {
        return Err(CliError::args(format!(
            "{} not available for this export (profile {})",
            unavailable.join(", "),
            ds.profile.key
        ))
        .with_hint(format!(
            "list the filters this export supports with: rcptscope facets {} --member {member}",
            input.display()
        )));
    }

    let sort = ViewSort { receipts: sort, items: item_sort };
    let view = build_view(&ds, member, &filters, sort);

    match format {
        Format::Json => print_json(
            Some(&ds.profile.key),
            &ReceiptsReport { filters: &filters, sort, view: &view },
        ),
        Format::Csv => write_items_csv(io::stdout().lock(), &view.receipts),
        Format::Table => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_table(&mut out, &view).map_err(|e| CliError::io(e.to_string()))
        }
    }
}

/// Flags set for facets the export has no column for, e.g. `--maker` on a SUMMIT file.
fn unavailable_facet_flags(ds: &Dataset, filters: &FilterSet) -> Vec<String> {
    Facet::ALL
        .into_iter()
        .filter(|&f| !filters.facet(f).is_empty() && !ds.facet_available(f))
        .map(|f| format!("--{}", f.to_string().replace('_', "-")))
        .collect()
}

const ITEM_WIDTH: usize = 32;
const NUM_WIDTH: usize = 10;

fn write_table<W: Write>(out: &mut W, view: &MemberView) -> io::Result<()> {
    let s = &view.summary;
    writeln!(
        out,
        "member {}: {} receipt(s), sales {}, qty {}, avg {}, {} day(s), {} store(s)",
        view.member,
        s.receipts,
        format_number(s.sales),
        format_number(s.qty),
        format_number(s.avg_ticket.round()),
        s.days,
        s.stores,
    )?;
    if view.receipts.is_empty() {
        writeln!(out, "no receipts match the current filters")?;
        return Ok(());
    }

    for r in &view.receipts {
        writeln!(out)?;
        let head = format!("{} {}  {}", r.date, r.time, r.store);
        let pad = (ITEM_WIDTH + 2 * NUM_WIDTH + 2).saturating_sub(display_width(&head) + NUM_WIDTH);
        writeln!(
            out,
            "{head}{}{}",
            " ".repeat(pad.max(2)),
            pad_left(&format_number(r.sales), NUM_WIDTH)
        )?;
        for item in &r.items {
            writeln!(
                out,
                "  {}{}{}",
                pad_right(&item.name, ITEM_WIDTH),
                pad_left(&format_number(item.qty), NUM_WIDTH),
                pad_left(&format_number(item.amount), NUM_WIDTH),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcptscope_receipts::load;

    fn view() -> MemberView {
        let text = "匿名会員番号,買上日,買上時間,店舗名,商品名,買上点数（会員),買上金額（会員)\n\
                    S-1,2024-02-01,10:05,桜上水店,りんご,2,396\n\
                    S-1,2024-02-01,10:05,桜上水店,牛乳,1,218\n";
        let ds = load(text, &ProfileRegistry::builtin()).unwrap();
        build_view(&ds, "S-1", &FilterSet::default(), ViewSort::default())
    }

    #[test]
    fn table_lists_receipts_and_items() {
        let mut buf = Vec::new();
        write_table(&mut buf, &view()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("member S-1: 1 receipt(s), sales 614"));
        assert!(lines[2].starts_with("2024-02-01 10:05:00  桜上水店"));
        assert!(lines[2].ends_with("614"));
        assert!(lines[3].starts_with("  りんご"));
        assert!(lines[3].ends_with("396"));
        // Item rows share one width regardless of CJK content.
        assert_eq!(display_width(lines[3]), display_width(lines[4]));
    }

    #[test]
    fn facet_flags_without_a_column_are_reported() {
        let text = "匿名会員番号,買上日,買上時間,店舗名,商品名,ライン名,買上金額（会員)\n\
                    S-1,2024-02-01,10:05,桜上水店,りんご,生鮮,396\n";
        let ds = load(text, &ProfileRegistry::builtin()).unwrap();

        let ok = FilterSet { line: "生鮮".into(), ..Default::default() };
        assert!(unavailable_facet_flags(&ds, &ok).is_empty());

        let bad = FilterSet {
            line: "生鮮".into(),
            maker: "花王".into(),
            cat_m: "果物".into(),
            ..Default::default()
        };
        assert_eq!(unavailable_facet_flags(&ds, &bad), vec!["--maker", "--cat-m"]);
    }

    #[test]
    fn empty_view_says_so() {
        let mut v = view();
        v.receipts.clear();
        let mut buf = Vec::new();
        write_table(&mut buf, &v).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("no receipts match"));
    }
}
