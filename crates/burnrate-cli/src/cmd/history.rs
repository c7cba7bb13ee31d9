//! `burnrate history`: the normalized daily burndown series.

use std::io::Write;

use burnrate_core::model::{NormalizedBurndownHistory, ReleaseId, TrackedQuantity};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use super::{CommandContext, release_id};
use crate::output::{fmt_quantity, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Release whose history to show.
    pub release: String,

    /// Quantity to show (`points` or `estimated_days`).
    #[arg(short, long)]
    pub quantity: Option<TrackedQuantity>,
}

#[derive(Debug, Serialize)]
pub struct HistoryDay {
    pub date: NaiveDate,
    pub value: f64,
}

/// Normalized history as returned in JSON output.
#[derive(Debug, Serialize)]
pub struct HistoryOutput {
    pub release: ReleaseId,
    pub quantity: TrackedQuantity,
    pub start: Option<NaiveDate>,
    pub days: Vec<HistoryDay>,
}

impl HistoryOutput {
    fn new(
        release: ReleaseId,
        quantity: TrackedQuantity,
        series: Option<&NormalizedBurndownHistory>,
    ) -> Self {
        Self {
            release,
            quantity,
            start: series.map(NormalizedBurndownHistory::start),
            days: series
                .map(|s| {
                    s.iter()
                        .map(|(date, value)| HistoryDay { date, value })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

pub fn run_history(args: &HistoryArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let forecaster = ctx.open()?;
    let release = release_id(&args.release);
    let quantity = ctx.quantity(args.quantity);

    let series = forecaster
        .normalized_history(&release, quantity)
        .map_err(|e| ctx.fail(e))?;
    let output = HistoryOutput::new(release, quantity, series.as_deref());

    render_mode(ctx.output, &output, render_text, render_pretty)
}

fn render_text(output: &HistoryOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for day in &output.days {
        writeln!(w, "{}\t{}", day.date, fmt_quantity(day.value))?;
    }
    Ok(())
}

fn render_pretty(output: &HistoryOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("History: {} ({})", output.release, output.quantity))?;
    let Some(start) = output.start else {
        writeln!(w, "No history yet.")?;
        return Ok(());
    };
    pretty_kv(w, "Start", start.to_string())?;
    pretty_kv(w, "Days", output.days.len().to_string())?;
    writeln!(w)?;
    for day in &output.days {
        writeln!(
            w,
            "  {} {}  {:>10}",
            day.date,
            day.date.format("%a"),
            fmt_quantity(day.value)
        )?;
    }
    Ok(())
}
