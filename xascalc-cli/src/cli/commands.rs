use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;
use tracing::info;
use xascalc::batch::ComputedEdge;
use xascalc::xraydb::XrayDb;
use xascalc::{
    AbsorptionModel, BatchRequest, CachedProvider, CompoundContribution, EdgeOutcome, EdgeResult,
    run_batch,
};

use super::CliError;
use super::output;

/// Highest atomic number listed by `xascalc elements`.
const MAX_LISTED_Z: u16 = 100;

#[derive(clap::Args)]
pub(super) struct CalcArgs {
    /// Absorbing element, e.g. Fe
    #[arg(short, long)]
    pub(super) element: String,
    /// Absorption edge: K, L1, L2 or L3
    #[arg(long, default_value = "K")]
    pub(super) edge: String,
    /// Compound as FORMULA:AREA_DENSITY in g/cm², repeated once per layer
    #[arg(
        short,
        long = "compound",
        value_name = "FORMULA:DENSITY",
        required = true,
        value_parser = parse_compound
    )]
    pub(super) compounds: Vec<CompoundContribution>,
    /// Edge-jump window in eV instead of edge ± 50 eV
    #[arg(long, num_args = 2, value_names = ["E1", "E2"], allow_negative_numbers = true)]
    pub(super) window: Option<Vec<f64>>,
    /// Print JSON instead of the text report
    #[arg(long)]
    pub(super) json: bool,
    /// Include energy, absorption and transmission curves in JSON output
    #[arg(long, requires = "json")]
    pub(super) curves: bool,
    /// Also write the spectrum as tab-separated columns to this file
    #[arg(short, long, value_name = "PATH")]
    pub(super) output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct BatchArgs {
    /// Request file with `compounds` and `edges`; `-` reads stdin
    #[arg(value_name = "REQUEST")]
    pub(super) request: PathBuf,
    /// Include energy, absorption and transmission curves
    #[arg(long)]
    pub(super) curves: bool,
    /// Pretty-print the JSON response
    #[arg(long)]
    pub(super) pretty: bool,
}

#[derive(clap::Args)]
pub(super) struct ElementsArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub(super) json: bool,
}

fn parse_compound(value: &str) -> Result<CompoundContribution, String> {
    let (formula, density) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected FORMULA:DENSITY, got '{value}'"))?;
    if formula.is_empty() {
        return Err(format!("missing formula in '{value}'"));
    }
    let area_density: f64 = density
        .trim()
        .parse()
        .map_err(|_| format!("invalid area density '{density}'"))?;
    Ok(CompoundContribution::new(formula.trim(), area_density))
}

pub(super) fn run_calc_command(args: &CalcArgs, out: &mut impl Write) -> Result<(), CliError> {
    let mut model = AbsorptionModel::new(
        XrayDb::new(),
        args.compounds.clone(),
        &args.element,
        &args.edge,
    )?;
    model.compute()?;
    if let Some(window) = args.window.as_deref() {
        model.edge_jump(window.first().copied(), window.get(1).copied())?;
    }

    if let Some(path) = &args.output {
        output::write_spectrum(path, &model)?;
        info!(path = %path.display(), "wrote spectrum");
    }

    if args.json {
        let result = EdgeResult {
            element: args.element.clone(),
            edge: model.edge_kind().to_string(),
            outcome: EdgeOutcome::Computed(ComputedEdge::from_model(&model, args.curves)?),
        };
        output::write_json(out, &result, true)?;
    } else {
        output::write_report(out, &model)?;
    }
    Ok(())
}

pub(super) fn run_batch_command(args: &BatchArgs, out: &mut impl Write) -> Result<(), CliError> {
    let text = if args.request.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        fs::read_to_string(&args.request)
            .with_context(|| format!("failed to read {}", args.request.display()))?
    };
    let request: BatchRequest = serde_json::from_str(&text).context("invalid request JSON")?;

    // Edges of one sample share compounds, so lookups are memoised across them.
    let provider = CachedProvider::new(XrayDb::new());
    let response = run_batch(&provider, &request, args.curves);
    output::write_json(out, &response, args.pretty)?;
    Ok(())
}

#[derive(Serialize)]
struct ElementEntry<'a> {
    symbol: &'a str,
    atomic_number: u16,
}

pub(super) fn run_elements_command(
    args: &ElementsArgs,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let db = XrayDb::new();
    let entries: Vec<ElementEntry<'_>> = (1..=MAX_LISTED_Z)
        .filter_map(|z| {
            db.symbol(&z.to_string())
                .ok()
                .map(|symbol| ElementEntry {
                    symbol,
                    atomic_number: z,
                })
        })
        .collect();

    if args.json {
        output::write_json(out, &entries, false)?;
    } else {
        for entry in &entries {
            writeln!(out, "{:>3}  {}", entry.atomic_number, entry.symbol)
                .context("failed to write output")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound() {
        let c = parse_compound("LiNi0.5Mn0.25Co0.25O2:0.012").unwrap();
        assert_eq!(c.formula, "LiNi0.5Mn0.25Co0.25O2");
        assert_eq!(c.area_density, 0.012);
    }

    #[test]
    fn test_parse_compound_rejects_malformed() {
        assert!(parse_compound("Fe").is_err());
        assert!(parse_compound(":0.1").is_err());
        assert!(parse_compound("Fe:abc").is_err());
    }
}
