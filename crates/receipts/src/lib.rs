//! `rcptscope-receipts`: receipt reconstruction engine for loyalty-program exports.
//!
//! Pure engine crate: receives CSV text, returns per-member receipts, summaries
//! and rankings. No CLI or IO dependencies.

pub mod aggregate;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod profile;
pub mod ranking;
pub mod receipt_id;
pub mod sort;
pub mod summary;
pub mod tokenizer;

#[cfg(test)]
mod test_support;

pub use dataset::{Dataset, FacetOptions};
pub use engine::{build_view, load, rank, MemberView, ViewSort};
pub use error::LoadError;
pub use model::{
    FilterSet, Item, ItemSort, MemberRankingRow, MemberSummary, NormalizedLine, ProductScope,
    RankMetric, RankQuery, Receipt, ReceiptSort,
};
pub use profile::{BuiltinChain, ChainProfile, ColumnMapping, Facet, ProfileRegistry};
