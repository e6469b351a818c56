use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::LoadError;
use crate::model::NormalizedLine;
use crate::normalize::{is_blank, RowNormalizer};
use crate::profile::{ChainProfile, Facet, ProfileRegistry};
use crate::receipt_id::ReceiptIds;
use crate::tokenizer::tokenize;

/// A loaded export: the selected profile, its header row and every normalized line.
/// Read-only once built; every view and ranking is computed from it.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub profile: ChainProfile,
    pub headers: Vec<String>,
    pub lines: Vec<NormalizedLine>,
}

/// Distinct values a member's lines offer for the exact-match filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FacetOptions {
    pub stores: Vec<String>,
    /// Only facets available in the dataset.
    pub facets: BTreeMap<Facet, Vec<String>>,
}

impl Dataset {
    /// Tokenize, pick a profile, and normalize every non-blank data row.
    ///
    /// Fails on fewer than two rows, on missing required columns (before any row
    /// is read), and on the first row whose time cannot be normalized.
    /// Receipt ids are unique per (member, store, date, time) across the dataset.
    pub fn load(text: &str, registry: &ProfileRegistry) -> Result<Self, LoadError> {
        let grid = tokenize(text);
        if grid.len() < 2 {
            return Err(LoadError::EmptyInput);
        }

        let mut rows = grid.into_iter();
        let headers: Vec<String> = rows
            .next()
            .unwrap_or_default()
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let profile = registry.resolve(&headers);
        let normalizer = RowNormalizer::new(profile, &headers)?;

        let mut lines = Vec::new();
        let mut ids = ReceiptIds::new();
        let mut skipped = 0usize;
        for (i, row) in rows.enumerate() {
            if is_blank(&row) {
                skipped += 1;
                continue;
            }
            let mut line = normalizer.normalize(i + 1, &row)?;
            let id = std::mem::take(&mut line.receipt_id);
            line.receipt_id = ids.claim(id, [
                line.member.as_str(),
                line.store.as_str(),
                line.date.as_str(),
                line.time.as_str(),
            ]);
            lines.push(line);
        }

        log::info!(
            "loaded {} line(s) with profile {} ({} blank row(s) skipped)",
            lines.len(),
            profile.key,
            skipped
        );
        log::debug!(
            "qty column: {}, facets: [{}]",
            normalizer.has_qty(),
            normalizer.facets().map(|f| f.to_string()).collect::<Vec<_>>().join(", ")
        );

        Ok(Self { profile: profile.clone(), headers, lines })
    }

    /// Distinct non-empty member ids, ascending.
    pub fn members(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter(|l| !l.member.is_empty())
            .map(|l| l.member.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Members containing `query` (trimmed), at most `cap` of them.
    pub fn search_members(&self, query: &str, cap: usize) -> Vec<String> {
        let query = query.trim();
        self.members()
            .into_iter()
            .filter(|m| m.contains(query))
            .take(cap)
            .collect()
    }

    pub fn has_member(&self, member: &str) -> bool {
        !member.is_empty() && self.lines.iter().any(|l| l.member == member)
    }

    /// The profile maps `facet` to a column and that column is in the header.
    pub fn facet_available(&self, facet: Facet) -> bool {
        self.profile
            .facet_column(facet)
            .is_some_and(|col| self.headers.iter().any(|h| h == col))
    }

    pub fn available_facets(&self) -> Vec<Facet> {
        Facet::ALL.into_iter().filter(|&f| self.facet_available(f)).collect()
    }

    pub fn has_qty(&self) -> bool {
        self.profile
            .columns
            .qty
            .as_deref()
            .is_some_and(|col| self.headers.iter().any(|h| h == col))
    }

    /// Sorted distinct non-empty store and facet values of one member.
    pub fn facet_options(&self, member: &str) -> FacetOptions {
        if member.is_empty() {
            return FacetOptions::default();
        }
        let mine: Vec<&NormalizedLine> = self.lines.iter().filter(|l| l.member == member).collect();

        FacetOptions {
            stores: distinct(mine.iter().map(|l| l.store.as_str())),
            facets: self
                .available_facets()
                .into_iter()
                .map(|f| (f, distinct(mine.iter().map(|l| l.facet(f)))))
                .collect(),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOMODS_HEADER: &str =
        "会員番号/匿名会員番号,買上日,買上時間,店舗名,商品名,買上金額（会員）,買上点数（会員）,メーカー/取引先,大分類,JANコード";

    fn tomods(rows: &[&str]) -> String {
        let mut text = String::from(TOMODS_HEADER);
        for r in rows {
            text.push('\n');
            text.push_str(r);
        }
        text
    }

    fn load(text: &str) -> Result<Dataset, LoadError> {
        Dataset::load(text, &ProfileRegistry::builtin())
    }

    #[test]
    fn header_only_is_empty_input() {
        assert_eq!(load(TOMODS_HEADER).unwrap_err(), LoadError::EmptyInput);
        assert_eq!(load("").unwrap_err(), LoadError::EmptyInput);
    }

    #[test]
    fn missing_amount_column_is_schema_error() {
        let text = "会員番号/匿名会員番号,買上日,買上時間,店舗名,商品名\nM1,2024-01-05,13:05,S1,Apple";
        match load(text).unwrap_err() {
            LoadError::MissingColumns { profile, columns } => {
                assert_eq!(profile, "TOMODS");
                assert_eq!(columns, vec!["買上金額（会員）".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_time_aborts_load() {
        let text = tomods(&[
            "M1,2024-01-05,13:05,S1,Apple,100,1,,,",
            "M1,2024-01-05,abc,S1,Banana,200,1,,,",
        ]);
        assert_eq!(
            load(&text).unwrap_err(),
            LoadError::RowFormat { record: 2, column: "買上時間".into(), value: "abc".into() }
        );
    }

    #[test]
    fn colliding_receipt_keys_get_distinct_ids() {
        let ds = load(&tomods(&[
            "M1,2024-01-05,13:05,Aa,Apple,100",
            "M1,2024-01-05,13:05,BB,Pear,200",
            "M1,2024-01-05,13:05,Aa,Plum,50",
        ]))
        .unwrap();
        let ids: Vec<&str> = ds.lines.iter().map(|l| l.receipt_id.as_str()).collect();
        assert_ne!(ids[0], ids[1]);
        assert_eq!(ids[0], ids[2]);
        assert_eq!(ids[1], format!("{}-2", ids[0]));
    }

    #[test]
    fn blank_rows_skipped_and_headers_trimmed() {
        let text = "\u{feff} 会員番号/匿名会員番号 ,買上日,買上時間,店舗名,商品名,買上金額（会員）\n\
                    M1,2024/01/05,1305,S1,Apple,\"1,200\"\n\
                    , , ,,,\n\
                    M2,2024-01-06,9:00,S2,Pear,80\n";
        let ds = load(text).unwrap();
        assert_eq!(ds.profile.key, "TOMODS");
        assert_eq!(ds.headers[0], "会員番号/匿名会員番号");
        assert_eq!(ds.lines.len(), 2);
        assert_eq!(ds.lines[0].date, "2024-01-05");
        assert_eq!(ds.lines[0].time, "13:05:00");
        assert_eq!(ds.lines[0].amount, 1200.0);
        assert_eq!(ds.lines[0].qty, 1.0);
        assert!(!ds.has_qty());
    }

    #[test]
    fn members_sorted_and_searchable() {
        let text = tomods(&[
            "M20,2024-01-05,13:05,S1,a,1,1,,,",
            "M10,2024-01-05,13:05,S1,b,1,1,,,",
            ",2024-01-05,13:05,S1,c,1,1,,,",
            "M20,2024-01-06,13:05,S1,d,1,1,,,",
            "X9,2024-01-06,13:05,S1,e,1,1,,,",
        ]);
        let ds = load(&text).unwrap();
        assert_eq!(ds.members(), vec!["M10", "M20", "X9"]);
        assert_eq!(ds.search_members(" M ", 50), vec!["M10", "M20"]);
        assert_eq!(ds.search_members("", 2), vec!["M10", "M20"]);
        assert!(ds.search_members("zzz", 50).is_empty());
        assert!(ds.has_member("X9"));
        assert!(!ds.has_member(""));
    }

    #[test]
    fn facet_availability_follows_header() {
        let ds = load(&tomods(&["M1,2024-01-05,13:05,S1,a,1,1,花王,日用品,4901"])).unwrap();
        assert!(ds.has_qty());
        assert!(ds.facet_available(Facet::Maker));
        assert!(ds.facet_available(Facet::CatL));
        // Configured for TOMODS but absent from this header.
        assert!(!ds.facet_available(Facet::CatM));
        // Not configured for TOMODS.
        assert!(!ds.facet_available(Facet::Line));
        assert_eq!(ds.available_facets(), vec![Facet::Maker, Facet::CatL]);
    }

    #[test]
    fn facet_options_per_member() {
        let text = tomods(&[
            "M1,2024-01-05,13:05,S2,a,1,1,花王,日用品,",
            "M1,2024-01-05,13:05,S2,b,1,1,,食品,",
            "M1,2024-01-06,10:00,S1,c,1,1,花王,日用品,",
            "M2,2024-01-06,10:00,S9,d,1,1,ライオン,日用品,",
        ]);
        let ds = load(&text).unwrap();
        let opts = ds.facet_options("M1");
        assert_eq!(opts.stores, vec!["S1", "S2"]);
        assert_eq!(opts.facets[&Facet::Maker], vec!["花王"]);
        assert_eq!(opts.facets[&Facet::CatL], vec!["日用品", "食品"]);
        assert!(!opts.facets.contains_key(&Facet::CatM));

        assert_eq!(ds.facet_options(""), FacetOptions::default());
        assert!(ds.facet_options("nobody").stores.is_empty());
    }
}
