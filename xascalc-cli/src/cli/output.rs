use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use xascalc::AbsorptionModel;

const RULE_WIDTH: usize = 80;

pub(super) fn write_json<T: Serialize>(
    out: &mut impl Write,
    value: &T,
    pretty: bool,
) -> anyhow::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)
    } else {
        serde_json::to_writer(&mut *out, value)
    }
    .context("failed to serialize output")?;
    writeln!(out).context("failed to write output")?;
    Ok(())
}

/// Plain-text report: composition banner, edge, then the window summary.
pub(super) fn write_report<P>(out: &mut impl Write, model: &AbsorptionModel<P>) -> anyhow::Result<()> {
    let summary = model.summary()?;
    let rule = "=".repeat(RULE_WIDTH);
    writeln!(out, "{rule}")?;
    writeln!(out, " {} ", model.composition_label())?;
    writeln!(out, "{rule}")?;
    writeln!(
        out,
        "{} {} edge at {:.1} eV",
        model.element(),
        model.edge_kind(),
        model.edge_energy_ev()
    )?;
    writeln!(out, "{summary}")?;
    Ok(())
}

/// Tab-separated energy (eV), absorption and transmission (%) columns.
pub(super) fn write_spectrum<P>(path: &Path, model: &AbsorptionModel<P>) -> anyhow::Result<()> {
    let (Some(absorption), Some(transmission)) =
        (model.total_absorption(), model.transmitted_percentage())
    else {
        anyhow::bail!("absorption has not been computed yet");
    };

    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(w, "# energy_ev\tabsorption\ttransmission_percent")?;
    for ((e, a), t) in model.energies_ev().iter().zip(absorption).zip(transmission) {
        writeln!(w, "{e:.1}\t{a:.6e}\t{t:.6}")?;
    }
    w.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
