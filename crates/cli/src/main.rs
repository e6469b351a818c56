// rcptscope CLI - per-member receipts from loyalty-program transaction exports

mod exit_codes;
mod input;
mod inspect;
mod members;
mod output;
mod rank;
mod util;
mod view;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use rcptscope_receipts::normalize::normalize_date;
use rcptscope_receipts::{
    Dataset, FilterSet, ItemSort, LoadError, ProductScope, ProfileRegistry, RankMetric, ReceiptSort,
};

use exit_codes::{load_exit_code, EXIT_IO, EXIT_SUCCESS, EXIT_UNKNOWN_MEMBER, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rcptscope")]
#[command(about = "Reconstruct and browse per-member receipts from loyalty-program exports")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Extra chain profiles (TOML); built-in profiles stay available unless the file opts out
    #[arg(long, global = true, env = "RCPTSCOPE_PROFILES", value_name = "FILE")]
    profiles: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered chain profiles and the columns they expect
    #[command(after_help = "\
Examples:
  rcptscope profiles
  rcptscope profiles --json
  rcptscope --profiles chains.toml profiles")]
    Profiles {
        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Load an export and report profile, size and facet availability
    #[command(after_help = "\
Examples:
  rcptscope inspect export.csv
  cat export.csv | rcptscope inspect - --json")]
    Inspect {
        /// Export CSV (`-` for stdin)
        input: PathBuf,

        /// Output JSON to stdout instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// List member ids, optionally filtered by substring
    #[command(after_help = "\
Examples:
  rcptscope members export.csv
  rcptscope members export.csv --search 0012 --limit 20")]
    Members {
        /// Export CSV (`-` for stdin)
        input: PathBuf,

        /// Substring to look for in member ids
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Maximum number of members shown
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Output JSON to stdout instead of a list
        #[arg(long)]
        json: bool,
    },

    /// Show the filter values available for one member
    #[command(after_help = "\
Examples:
  rcptscope facets export.csv --member M001
  rcptscope facets export.csv --member M001 --json")]
    Facets {
        /// Export CSV (`-` for stdin)
        input: PathBuf,

        /// Member id
        #[arg(long, short = 'm')]
        member: String,

        /// Output JSON to stdout instead of a list
        #[arg(long)]
        json: bool,
    },

    /// Rebuild one member's receipts with filters and sorting
    #[command(after_help = "\
Examples:
  rcptscope receipts export.csv --member M001
  rcptscope receipts export.csv --member M001 --store 渋谷店 --sort sales_desc
  rcptscope receipts export.csv --member M001 --jan 4901301 --scope receipt_all
  rcptscope receipts export.csv --member M001 --csv > items.csv")]
    Receipts {
        /// Export CSV (`-` for stdin)
        input: PathBuf,

        /// Member id
        #[arg(long, short = 'm')]
        member: String,

        #[command(flatten)]
        filters: FilterArgs,

        /// Receipt order: dt_desc, dt_asc, sales_desc, sales_asc, qty_desc, qty_asc
        #[arg(long, default_value = "dt_desc")]
        sort: ReceiptSort,

        /// Item order inside each receipt: amt_desc, amt_asc, qty_desc, qty_asc, name_asc
        #[arg(long, default_value = "amt_desc")]
        item_sort: ItemSort,

        /// Output JSON to stdout instead of a table
        #[arg(long, conflicts_with = "csv")]
        json: bool,

        /// Output one CSV row per receipt item
        #[arg(long)]
        csv: bool,
    },

    /// Rank members across the whole export
    #[command(after_help = "\
Examples:
  rcptscope rank export.csv
  rcptscope rank export.csv --item ハンドクリーム --metric qty_desc
  rcptscope rank export.csv --jan 4901301 --limit 0 --json")]
    Rank {
        /// Export CSV (`-` for stdin)
        input: PathBuf,

        /// Only count lines whose JAN contains this
        #[arg(long)]
        jan: Option<String>,

        /// Only count lines whose item name contains this
        #[arg(long)]
        item: Option<String>,

        /// Ranking metric: sales_desc, qty_desc, rcpt_desc, last_desc
        #[arg(long, default_value = "sales_desc")]
        metric: RankMetric,

        /// Number of members shown (0 = all)
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Output JSON to stdout instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Exact-match facets and the product query for `receipts`.
#[derive(Args)]
pub struct FilterArgs {
    /// Purchase date (YYYY-MM-DD or YYYY/MM/DD)
    #[arg(long)]
    date: Option<String>,

    /// Store name
    #[arg(long)]
    store: Option<String>,

    /// Maker / supplier
    #[arg(long)]
    maker: Option<String>,

    /// Product line
    #[arg(long)]
    line: Option<String>,

    /// Sales corner
    #[arg(long)]
    corner: Option<String>,

    /// Top-level category
    #[arg(long)]
    cat_l: Option<String>,

    /// Mid-level category
    #[arg(long)]
    cat_m: Option<String>,

    /// Sub-category
    #[arg(long)]
    cat_s: Option<String>,

    /// JAN substring
    #[arg(long)]
    jan: Option<String>,

    /// Item-name substring
    #[arg(long)]
    item: Option<String>,

    /// With --jan/--item: detail_only keeps matching lines, receipt_all keeps whole receipts
    #[arg(long, default_value = "detail_only")]
    scope: ProductScope,
}

impl From<FilterArgs> for FilterSet {
    fn from(a: FilterArgs) -> Self {
        FilterSet {
            date: a.date.as_deref().map(normalize_date).unwrap_or_default(),
            store: a.store.unwrap_or_default(),
            maker: a.maker.unwrap_or_default(),
            line: a.line.unwrap_or_default(),
            corner: a.corner.unwrap_or_default(),
            cat_l: a.cat_l.unwrap_or_default(),
            cat_m: a.cat_m.unwrap_or_default(),
            cat_s: a.cat_s.unwrap_or_default(),
            jan: a.jan.unwrap_or_default(),
            item: a.item.unwrap_or_default(),
            scope: a.scope,
        }
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  rcptscope-receipts ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  rcptscope-receipts ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = match load_registry(cli.profiles.as_deref()) {
        Ok(r) => r,
        Err(e) => return report(e),
    };

    let result = match cli.command {
        Commands::Profiles { json } => inspect::cmd_profiles(&registry, json),
        Commands::Inspect { input, json } => inspect::cmd_inspect(&input, &registry, json),
        Commands::Members { input, search, limit, json } => {
            members::cmd_members(&input, &registry, search.as_deref(), limit, json)
        }
        Commands::Facets { input, member, json } => {
            members::cmd_facets(&input, &registry, &member, json)
        }
        Commands::Receipts { input, member, filters, sort, item_sort, json, csv } => {
            let format = if json {
                view::Format::Json
            } else if csv {
                view::Format::Csv
            } else {
                view::Format::Table
            };
            view::cmd_receipts(&input, &registry, &member, filters.into(), sort, item_sort, format)
        }
        Commands::Rank { input, jan, item, metric, limit, json } => {
            rank::cmd_rank(&input, &registry, jan, item, metric, limit, json)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => report(e),
    }
}

fn report(e: CliError) -> ExitCode {
    eprintln!("error: {}", e.message);
    if let Some(hint) = &e.hint {
        eprintln!("hint:  {hint}");
    }
    ExitCode::from(e.code)
}

// ============================================================================
// Shared loading
// ============================================================================

fn load_registry(path: Option<&Path>) -> Result<ProfileRegistry, CliError> {
    let Some(path) = path else {
        return Ok(ProfileRegistry::builtin());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read profiles {}: {e}", path.display())))?;
    let registry = ProfileRegistry::from_toml(&text)
        .map_err(|e| CliError::load(e).with_hint(format!("check {}", path.display())))?;
    log::info!("{} profile(s) registered from {}", registry.profiles().len(), path.display());
    Ok(registry)
}

pub(crate) fn load_dataset(input: &Path, registry: &ProfileRegistry) -> Result<Dataset, CliError> {
    let text = input::read_export(input).map_err(CliError::io)?;
    rcptscope_receipts::load(&text, registry).map_err(CliError::load)
}

/// Fails with the unknown-member code unless `member` has lines in `dataset`.
pub(crate) fn require_member(dataset: &Dataset, input: &Path, member: &str) -> Result<(), CliError> {
    if dataset.has_member(member) {
        return Ok(());
    }
    Err(CliError {
        code: EXIT_UNKNOWN_MEMBER,
        message: format!("member '{member}' not found"),
        hint: Some(format!(
            "list member ids with: rcptscope members {} --search <text>",
            input.display()
        )),
    })
}

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Create error from a load error with its exit code and a hint where one helps.
    pub fn load(err: LoadError) -> Self {
        let hint = match &err {
            LoadError::EmptyInput => {
                Some("the export needs a header row and at least one data row".to_string())
            }
            LoadError::MissingColumns { .. } => {
                Some("run `rcptscope profiles` to see the columns each chain expects".to_string())
            }
            LoadError::RowFormat { .. } => {
                Some("times must look like 13:05, 13:05:22, 1305 or 130522".to_string())
            }
            LoadError::ProfileConfig(_) => None,
        };
        Self { code: load_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
