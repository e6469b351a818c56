//! `rcptscope members` and `rcptscope facets`.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use rcptscope_receipts::{Dataset, Facet, ProfileRegistry};

use crate::output::print_json;
use crate::util::pad_right;
use crate::{load_dataset, require_member, CliError};

#[derive(Serialize)]
struct MembersReport<'a> {
    query: &'a str,
    total: usize,
    members: Vec<String>,
}

pub fn cmd_members(
    input: &Path,
    registry: &ProfileRegistry,
    search: Option<&str>,
    limit: usize,
    json: bool,
) -> Result<(), CliError> {
    if limit == 0 {
        return Err(CliError::args("--limit must be at least 1"));
    }
    let ds = load_dataset(input, registry)?;
    let query = search.unwrap_or("").trim();
    let report = MembersReport {
        query,
        total: ds.members().len(),
        members: ds.search_members(query, limit),
    };

    if json {
        return print_json(Some(&ds.profile.key), &report);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for m in &report.members {
        writeln!(out, "{m}").map_err(|e| CliError::io(e.to_string()))?;
    }
    if report.members.is_empty() && !query.is_empty() {
        eprintln!("no member id contains '{query}'");
    } else {
        eprintln!("{} of {} member(s)", report.members.len(), report.total);
    }
    Ok(())
}

#[derive(Serialize)]
struct FacetsReport<'a> {
    member: &'a str,
    stores: Vec<String>,
    facets: Vec<FacetValues<'a>>,
}

#[derive(Serialize)]
struct FacetValues<'a> {
    facet: Facet,
    label: &'a str,
    values: Vec<String>,
}

fn facets_report<'a>(ds: &'a Dataset, member: &'a str) -> FacetsReport<'a> {
    let opts = ds.facet_options(member);
    FacetsReport {
        member,
        stores: opts.stores,
        facets: opts
            .facets
            .into_iter()
            .map(|(facet, values)| FacetValues { facet, label: ds.profile.label(facet), values })
            .collect(),
    }
}

pub fn cmd_facets(
    input: &Path,
    registry: &ProfileRegistry,
    member: &str,
    json: bool,
) -> Result<(), CliError> {
    let ds = load_dataset(input, registry)?;
    require_member(&ds, input, member)?;
    let report = facets_report(&ds, member);

    if json {
        return print_json(Some(&ds.profile.key), &report);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let w = |e: io::Error| CliError::io(e.to_string());
    writeln!(out, "{} {}", pad_right("店舗", 16), report.stores.join(" / ")).map_err(w)?;
    for f in &report.facets {
        writeln!(out, "{} {}", pad_right(f.label, 16), f.values.join(" / ")).map_err(w)?;
    }
    Ok(())
}
