//! `rcptscope profiles` and `rcptscope inspect`.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use rcptscope_receipts::{ChainProfile, Dataset, Facet, ProfileRegistry};

use crate::output::print_json;
use crate::util::pad_right;
use crate::{load_dataset, CliError};

#[derive(Serialize)]
struct ProfileEntry<'a> {
    key: &'a str,
    name: &'a str,
    default: bool,
    required_columns: Vec<&'a str>,
    optional_columns: Vec<&'a str>,
    labels: Vec<FacetLabel<'a>>,
    notices: &'a [String],
}

#[derive(Serialize)]
struct FacetLabel<'a> {
    facet: Facet,
    column: &'a str,
    label: &'a str,
}

#[derive(Serialize)]
struct ProfilesReport<'a> {
    profiles: Vec<ProfileEntry<'a>>,
}

fn profile_entry<'a>(profile: &'a ChainProfile, default: bool) -> ProfileEntry<'a> {
    ProfileEntry {
        key: &profile.key,
        name: &profile.name,
        default,
        required_columns: profile.required_columns(),
        optional_columns: profile.optional_columns(),
        labels: Facet::ALL
            .into_iter()
            .filter_map(|f| {
                profile
                    .facet_column(f)
                    .map(|column| FacetLabel { facet: f, column, label: profile.label(f) })
            })
            .collect(),
        notices: &profile.notices,
    }
}

pub fn cmd_profiles(registry: &ProfileRegistry, json: bool) -> Result<(), CliError> {
    let default_key = registry.default_profile().key.as_str();
    let report = ProfilesReport {
        profiles: registry
            .profiles()
            .iter()
            .map(|p| profile_entry(p, p.key == default_key))
            .collect(),
    };

    if json {
        return print_json(None, &report);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let w = |e: io::Error| CliError::io(e.to_string());
    for (i, p) in report.profiles.iter().enumerate() {
        if i > 0 {
            writeln!(out).map_err(w)?;
        }
        let marker = if p.default { " (default)" } else { "" };
        writeln!(out, "{} {}{}", p.key, p.name, marker).map_err(w)?;
        writeln!(out, "  required: {}", p.required_columns.join(", ")).map_err(w)?;
        if !p.optional_columns.is_empty() {
            writeln!(out, "  optional: {}", p.optional_columns.join(", ")).map_err(w)?;
        }
        for l in &p.labels {
            writeln!(out, "  {} {} ← {}", pad_right(&l.facet.to_string(), 7), l.label, l.column)
                .map_err(w)?;
        }
        for n in p.notices {
            writeln!(out, "  note: {n}").map_err(w)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct InspectReport<'a> {
    profile: &'a str,
    profile_name: &'a str,
    columns: &'a [String],
    lines: usize,
    members: usize,
    has_qty: bool,
    facets: Vec<FacetStatus<'a>>,
}

#[derive(Serialize)]
struct FacetStatus<'a> {
    facet: Facet,
    label: &'a str,
    available: bool,
}

fn inspect_report(ds: &Dataset) -> InspectReport<'_> {
    InspectReport {
        profile: &ds.profile.key,
        profile_name: &ds.profile.name,
        columns: &ds.headers,
        lines: ds.lines.len(),
        members: ds.members().len(),
        has_qty: ds.has_qty(),
        facets: Facet::ALL
            .into_iter()
            .filter(|&f| ds.profile.facet_column(f).is_some())
            .map(|f| FacetStatus {
                facet: f,
                label: ds.profile.label(f),
                available: ds.facet_available(f),
            })
            .collect(),
    }
}

pub fn cmd_inspect(input: &Path, registry: &ProfileRegistry, json: bool) -> Result<(), CliError> {
    let ds = load_dataset(input, registry)?;
    let report = inspect_report(&ds);

    if json {
        return print_json(Some(&ds.profile.key), &report);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let w = |e: io::Error| CliError::io(e.to_string());
    writeln!(out, "profile:  {} ({})", report.profile, report.profile_name).map_err(w)?;
    writeln!(out, "lines:    {}", report.lines).map_err(w)?;
    writeln!(out, "members:  {}", report.members).map_err(w)?;
    writeln!(out, "quantity: {}", if report.has_qty { "column" } else { "1 per line" }).map_err(w)?;
    for f in &report.facets {
        let state = if f.available { "yes" } else { "no (column missing)" };
        writeln!(out, "  {} {}", pad_right(f.label, 16), state).map_err(w)?;
    }
    Ok(())
}
