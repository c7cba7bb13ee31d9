//! `burnrate forecast`: remaining work, velocity and predicted completion.

use std::io::Write;

use burnrate_core::model::TrackedQuantity;
use burnrate_forecast::ForecastSummary;
use clap::Args;

use super::{CommandContext, release_id};
use crate::output::{fmt_quantity, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// Release to forecast.
    pub release: String,

    /// Quantity to forecast (`points` or `estimated_days`).
    #[arg(short, long)]
    pub quantity: Option<TrackedQuantity>,

    /// Also print the projected excess per day.
    #[arg(long)]
    pub projection: bool,
}

pub fn run_forecast(args: &ForecastArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let forecaster = ctx.open()?;
    let release = release_id(&args.release);
    let quantity = ctx.quantity(args.quantity);

    let summary = forecaster
        .summary(&release, quantity)
        .map_err(|e| ctx.fail(e))?;

    let show_projection = args.projection;
    render_mode(
        ctx.output,
        &summary,
        |s, w| render_text(s, show_projection, w),
        |s, w| render_pretty(s, show_projection, w),
    )
}

fn status(summary: &ForecastSummary) -> &'static str {
    if summary.on_track {
        "on track"
    } else if summary.completion.is_never() {
        "stalled"
    } else {
        "behind"
    }
}

fn render_text(
    summary: &ForecastSummary,
    show_projection: bool,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(
        w,
        "{}\t{}\tremaining={}\tvelocity={}\tdays={}\texcess={}\tcompletion={}\t{}",
        summary.release,
        summary.quantity,
        fmt_quantity(summary.remaining),
        fmt_quantity(summary.velocity),
        summary.remaining_working_days,
        fmt_quantity(summary.excess),
        summary.completion,
        status(summary),
    )?;
    if show_projection {
        for (day, value) in &summary.projection {
            writeln!(w, "{day}\t{}", fmt_quantity(*value))?;
        }
    }
    Ok(())
}

fn render_pretty(
    summary: &ForecastSummary,
    show_projection: bool,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    let unit = summary.unit;
    pretty_section(w, &format!("Forecast: {} ({})", summary.name, summary.release))?;
    pretty_kv(w, "Quantity", summary.quantity.to_string())?;
    pretty_kv(w, "Today", summary.today.to_string())?;
    pretty_kv(
        w,
        "Started",
        summary
            .start
            .map_or_else(|| "not started".to_string(), |d| d.to_string()),
    )?;
    pretty_kv(w, "Deadline", summary.deadline.to_string())?;
    pretty_kv(w, "Remaining", format!("{} {unit}", fmt_quantity(summary.remaining)))?;
    pretty_kv(
        w,
        "Velocity",
        format!(
            "{} {unit}/day ({}-day span)",
            fmt_quantity(summary.velocity),
            summary.prediction_span
        ),
    )?;
    pretty_kv(w, "Working days left", summary.remaining_working_days.to_string())?;
    pretty_kv(w, "Excess", format!("{} {unit}", fmt_quantity(summary.excess)))?;
    pretty_kv(w, "Completion", summary.completion.to_string())?;
    pretty_kv(w, "Status", status(summary))?;

    if show_projection && !summary.projection.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Projection")?;
        for (day, value) in &summary.projection {
            writeln!(w, "  {day}  {:>10} {unit}", fmt_quantity(*value))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnrate_core::model::ReleaseId;
    use burnrate_forecast::CompletionForecast;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn summary(excess: f64, completion: CompletionForecast) -> ForecastSummary {
        ForecastSummary {
            release: ReleaseId::new("r1"),
            name: "Release 1".to_string(),
            quantity: TrackedQuantity::Points,
            unit: "pts",
            today: day(19),
            start: Some(day(12)),
            deadline: day(30),
            remaining: 40.0,
            velocity: 4.0,
            prediction_span: 5,
            remaining_working_days: 9,
            excess,
            completion,
            on_track: excess <= 0.0,
            projection: BTreeMap::from([(day(20), 36.0), (day(21), 32.0)]),
        }
    }

    #[test]
    fn text_line_is_tab_separated() {
        let mut buf = Vec::new();
        render_text(&summary(4.0, CompletionForecast::On(day(30))), false, &mut buf).unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert_eq!(
            line,
            "r1\tpoints\tremaining=40.00\tvelocity=4.00\tdays=9\texcess=4.00\tcompletion=2026-10-30\tbehind\n"
        );
    }

    #[test]
    fn text_projection_lists_each_day() {
        let mut buf = Vec::new();
        render_text(&summary(-4.0, CompletionForecast::On(day(28))), true, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("on track"));
        assert!(out.contains("2026-10-20\t36.00"));
        assert!(out.contains("2026-10-21\t32.00"));
    }

    #[test]
    fn pretty_reports_stalled_release() {
        let mut buf = Vec::new();
        render_pretty(&summary(40.0, CompletionForecast::Never), false, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("Forecast: Release 1 (r1)"));
        assert!(out.contains("never"));
        assert!(out.contains("stalled"));
        assert!(!out.contains("Projection"));
    }
}
