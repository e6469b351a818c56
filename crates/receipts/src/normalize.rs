use crate::error::LoadError;
use crate::model::NormalizedLine;
use crate::profile::{ChainProfile, Facet};
use crate::receipt_id;

// ---------------------------------------------------------------------------
// Field normalizers
// ---------------------------------------------------------------------------

/// `2024/01/05 13:05` → `2024-01-05`. Shapes other than `YYYY-MM-DD…` pass through.
pub fn normalize_date(raw: &str) -> String {
    let s = raw.trim().replace('/', "-");
    if s.chars().count() >= 10 {
        s.chars().take(10).collect()
    } else {
        s
    }
}

/// Normalize a time cell to `HH:MM:SS`. Returns `None` when no supported shape applies.
///
/// - colon form: `13:5` → `13:05:00`, `9:05:07` → `09:05:07`
/// - digit runs: `130522` → `13:05:22`, `1305` → `13:05:00`, `13` → `13:00:00`
pub fn normalize_time(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.contains(':') {
        let parts: Vec<&str> = s.split(':').map(str::trim).filter(|p| !p.is_empty()).collect();
        let part = |i: usize| pad2(parts.get(i).copied().unwrap_or("00"));
        return Some(format!("{}:{}:{}", part(0), part(1), part(2)));
    }

    let d: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    match d.len() {
        6 => Some(format!("{}:{}:{}", &d[0..2], &d[2..4], &d[4..6])),
        4 => Some(format!("{}:{}:00", &d[0..2], &d[2..4])),
        2 => Some(format!("{d}:00:00")),
        _ => None,
    }
}

/// Left-pad to two characters with `0`, then keep the first two.
fn pad2(part: &str) -> String {
    let n = part.chars().count();
    let padded = if n < 2 {
        format!("{}{part}", "0".repeat(2 - n))
    } else {
        part.to_string()
    };
    padded.chars().take(2).collect()
}

/// `"1,280"` → 1280.0. Unparseable or non-finite input is 0, never an error.
pub fn parse_number(raw: &str) -> f64 {
    raw.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Row normalizer
// ---------------------------------------------------------------------------

/// Column positions of one profile within one header row.
#[derive(Debug)]
pub struct RowNormalizer<'a> {
    profile: &'a ChainProfile,
    member: usize,
    date: usize,
    time: usize,
    store: usize,
    item: usize,
    amount: usize,
    qty: Option<usize>,
    facets: Vec<(Facet, usize)>,
    jan: Option<usize>,
}

impl<'a> RowNormalizer<'a> {
    /// Fails with every missing required column when the header does not fit the profile.
    pub fn new(profile: &'a ChainProfile, headers: &[String]) -> Result<Self, LoadError> {
        let missing = profile.missing_columns(headers);
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns {
                profile: profile.key.clone(),
                columns: missing,
            });
        }

        let find = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            find(name).ok_or_else(|| LoadError::MissingColumns {
                profile: profile.key.clone(),
                columns: vec![name.to_string()],
            })
        };
        let optional = |name: Option<&str>| name.and_then(find);

        let c = &profile.columns;
        let facets = Facet::ALL
            .iter()
            .filter_map(|&f| optional(profile.facet_column(f)).map(|i| (f, i)))
            .collect();

        Ok(Self {
            profile,
            member: required(&c.member)?,
            date: required(&c.date)?,
            time: required(&c.time)?,
            store: required(&c.store)?,
            item: required(&c.item)?,
            amount: required(&c.amount)?,
            qty: optional(c.qty.as_deref()),
            facets,
            jan: optional(c.jan.as_deref()),
        })
    }

    pub fn has_qty(&self) -> bool {
        self.qty.is_some()
    }

    /// Facets whose configured column exists in the header.
    pub fn facets(&self) -> impl Iterator<Item = Facet> + '_ {
        self.facets.iter().map(|(f, _)| *f)
    }

    /// Normalize one data row. `record` is the 1-based data record number,
    /// used only for error reporting.
    pub fn normalize(&self, record: usize, row: &[String]) -> Result<NormalizedLine, LoadError> {
        let cell = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or("");
        let opt_cell = |i: Option<usize>| i.map(cell).unwrap_or("").to_string();

        let raw_time = cell(self.time);
        let time = normalize_time(raw_time).ok_or_else(|| LoadError::RowFormat {
            record,
            column: self.profile.columns.time.clone(),
            value: raw_time.to_string(),
        })?;

        let member = cell(self.member).to_string();
        let store = cell(self.store).to_string();
        let date = normalize_date(cell(self.date));
        let facet = |f: Facet| {
            self.facets
                .iter()
                .find(|(g, _)| *g == f)
                .map(|&(_, i)| cell(i).to_string())
                .unwrap_or_default()
        };

        let dt_key = format!("{date} {time}");
        let receipt_id = receipt_id::synthesize(&member, &store, &date, &time);

        Ok(NormalizedLine {
            item: cell(self.item).to_string(),
            amount: parse_number(cell(self.amount)),
            qty: self.qty.map(|i| parse_number(cell(i))).unwrap_or(1.0),
            maker: facet(Facet::Maker),
            line: facet(Facet::Line),
            corner: facet(Facet::Corner),
            cat_l: facet(Facet::CatL),
            cat_m: facet(Facet::CatM),
            cat_s: facet(Facet::CatS),
            jan: opt_cell(self.jan),
            member,
            date,
            time,
            store,
            dt_key,
            receipt_id,
        })
    }
}

/// A row whose every cell is blank after trimming carries no transaction.
pub fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}
