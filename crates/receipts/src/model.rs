use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::profile::Facet;

/// Label used for lines with an empty item name.
pub const UNKNOWN_ITEM: &str = "（不明商品）";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One normalized transaction line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedLine {
    pub member: String,
    /// `YYYY-MM-DD`-shaped.
    pub date: String,
    /// `HH:MM:SS`. Never empty.
    pub time: String,
    pub store: String,
    pub item: String,
    pub amount: f64,
    pub qty: f64,
    pub maker: String,
    pub line: String,
    pub corner: String,
    pub cat_l: String,
    pub cat_m: String,
    pub cat_s: String,
    pub jan: String,
    /// `date + " " + time`, sorts lexicographically.
    pub dt_key: String,
    pub receipt_id: String,
}

impl NormalizedLine {
    pub fn facet(&self, facet: Facet) -> &str {
        match facet {
            Facet::Maker => &self.maker,
            Facet::Line => &self.line,
            Facet::Corner => &self.corner,
            Facet::CatL => &self.cat_l,
            Facet::CatM => &self.cat_m,
            Facet::CatS => &self.cat_s,
        }
    }
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// Per-name rollup inside one receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub name: String,
    pub amount: f64,
    pub qty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub receipt_id: String,
    pub date: String,
    pub time: String,
    pub dt_key: String,
    pub store: String,
    pub sales: f64,
    pub qty: f64,
    /// First-seen order until sorted.
    pub items: Vec<Item>,
    pub lines: Vec<NormalizedLine>,
}

/// KPIs over the receipts of one member view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberSummary {
    pub receipts: usize,
    pub sales: f64,
    pub qty: f64,
    /// Average sales per receipt; 0 when there are no receipts.
    pub avg_ticket: f64,
    pub days: usize,
    pub stores: usize,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductScope {
    /// Only lines matching the product query.
    #[default]
    DetailOnly,
    /// Every line of any receipt that contains a matching line.
    ReceiptAll,
}

/// Exact-match facets (empty = unconstrained) plus the product query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSet {
    pub date: String,
    pub store: String,
    pub maker: String,
    pub line: String,
    pub corner: String,
    pub cat_l: String,
    pub cat_m: String,
    pub cat_s: String,
    /// JAN substring.
    pub jan: String,
    /// Item-name substring.
    pub item: String,
    pub scope: ProductScope,
}

impl FilterSet {
    pub fn facet(&self, facet: Facet) -> &str {
        match facet {
            Facet::Maker => &self.maker,
            Facet::Line => &self.line,
            Facet::Corner => &self.corner,
            Facet::CatL => &self.cat_l,
            Facet::CatM => &self.cat_m,
            Facet::CatS => &self.cat_s,
        }
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptSort {
    DtAsc,
    #[default]
    DtDesc,
    SalesAsc,
    SalesDesc,
    QtyAsc,
    QtyDesc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSort {
    AmtAsc,
    #[default]
    AmtDesc,
    QtyAsc,
    QtyDesc,
    NameAsc,
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    #[default]
    SalesDesc,
    QtyDesc,
    RcptDesc,
    LastDesc,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankQuery {
    pub jan: String,
    pub item: String,
    pub metric: RankMetric,
    /// `None` or `Some(0)` = no truncation.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberRankingRow {
    pub member: String,
    pub sales: f64,
    pub qty: f64,
    pub receipts: usize,
    pub stores: usize,
    /// Most recent `dt_key` among the member's qualifying lines.
    pub last_dt: String,
}

// ---------------------------------------------------------------------------
// Mode names
// ---------------------------------------------------------------------------

/// `dt_desc`, `dt-desc` and `DT_DESC` all parse to the same mode.
fn mode_key(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('-', "_")
}

macro_rules! named_modes {
    ($ty:ident, $what:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let key = mode_key(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|m| m.name() == key)
                    .ok_or_else(|| {
                        let names: Vec<&str> = Self::ALL.iter().map(|m| m.name()).collect();
                        format!("unknown {} '{}' (expected one of: {})", $what, s, names.join(", "))
                    })
            }
        }
    };
}

named_modes!(ProductScope, "product scope", {
    DetailOnly => "detail_only",
    ReceiptAll => "receipt_all",
});

named_modes!(ReceiptSort, "receipt sort", {
    DtAsc => "dt_asc",
    DtDesc => "dt_desc",
    SalesAsc => "sales_asc",
    SalesDesc => "sales_desc",
    QtyAsc => "qty_asc",
    QtyDesc => "qty_desc",
});

named_modes!(ItemSort, "item sort", {
    AmtAsc => "amt_asc",
    AmtDesc => "amt_desc",
    QtyAsc => "qty_asc",
    QtyDesc => "qty_desc",
    NameAsc => "name_asc",
});

named_modes!(RankMetric, "rank metric", {
    SalesDesc => "sales_desc",
    QtyDesc => "qty_desc",
    RcptDesc => "rcpt_desc",
    LastDesc => "last_desc",
});
