//! `burnrate risk`: split the remaining backlog into low, medium and high
//! risk of missing the deadline.

use std::io::Write;

use burnrate_core::model::{ReleaseId, TrackedQuantity};
use burnrate_forecast::{RiskBuckets, RiskLevel, RiskedItem};
use clap::Args;
use serde::Serialize;

use super::{CommandContext, release_id};
use crate::output::{fmt_quantity, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct RiskArgs {
    /// Release whose backlog to classify.
    pub release: String,

    /// Quantity to classify by (`points` or `estimated_days`).
    #[arg(short, long)]
    pub quantity: Option<TrackedQuantity>,

    /// Width of the medium band around capacity, between 0 and 1.
    #[arg(long)]
    pub risk_factor: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RiskOutput {
    pub release: ReleaseId,
    pub quantity: TrackedQuantity,
    pub risk_factor: f64,
    #[serde(flatten)]
    pub buckets: RiskBuckets,
}

pub fn run_risk(args: &RiskArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let forecaster = ctx.open()?;
    let release = release_id(&args.release);
    let quantity = ctx.quantity(args.quantity);
    let risk_factor = args
        .risk_factor
        .unwrap_or(ctx.config.forecast.risk_factor);

    let buckets = forecaster
        .classify_by_risk(&release, quantity, risk_factor)
        .map_err(|e| ctx.fail(e))?;
    let output = RiskOutput {
        release,
        quantity,
        risk_factor,
        buckets,
    };

    render_mode(ctx.output, &output, render_text, render_pretty)
}

const LEVELS: [(RiskLevel, &str); 3] = [
    (RiskLevel::Low, "low"),
    (RiskLevel::Medium, "medium"),
    (RiskLevel::High, "high"),
];

fn render_text(output: &RiskOutput, w: &mut dyn Write) -> std::io::Result<()> {
    for (level, label) in LEVELS {
        for item in output.buckets.bucket(level) {
            writeln!(
                w,
                "{label}\t{}\t{}\t{}",
                item.id,
                fmt_quantity(item.quantity),
                fmt_quantity(item.cumulative)
            )?;
        }
    }
    Ok(())
}

fn render_pretty(output: &RiskOutput, w: &mut dyn Write) -> std::io::Result<()> {
    let unit = output.quantity.unit();
    pretty_section(w, &format!("Risk: {} ({})", output.release, output.quantity))?;
    pretty_kv(w, "Risk factor", format!("{}", output.risk_factor))?;
    pretty_kv(
        w,
        "Capacity band",
        format!(
            "{} .. {} {unit}",
            fmt_quantity(output.buckets.lower_threshold),
            fmt_quantity(output.buckets.upper_threshold)
        ),
    )?;

    for (level, label) in LEVELS {
        let items = output.buckets.bucket(level);
        writeln!(w)?;
        writeln!(w, "{label} ({})", items.len())?;
        if items.is_empty() {
            writeln!(w, "  (none)")?;
        }
        for item in items {
            write_item(w, item, unit)?;
        }
    }
    Ok(())
}

fn write_item(w: &mut dyn Write, item: &RiskedItem, unit: &str) -> std::io::Result<()> {
    let name = if item.name.is_empty() {
        item.id.as_str()
    } else {
        item.name.as_str()
    };
    writeln!(
        w,
        "  {:<12} {:>8} {unit}  (cumulative {})  {name}",
        item.id.as_str(),
        fmt_quantity(item.quantity),
        fmt_quantity(item.cumulative)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use burnrate_core::model::ItemId;

    fn risked(id: &str, quantity: f64, cumulative: f64) -> RiskedItem {
        RiskedItem {
            id: ItemId::new(id),
            name: String::new(),
            quantity,
            cumulative,
        }
    }

    fn sample() -> RiskOutput {
        RiskOutput {
            release: ReleaseId::new("r1"),
            quantity: TrackedQuantity::Points,
            risk_factor: 0.2,
            buckets: RiskBuckets {
                low: vec![risked("a", 20.0, 20.0)],
                medium: vec![risked("b", 12.0, 32.0), risked("c", 8.0, 40.0)],
                high: Vec::new(),
                lower_threshold: 28.8,
                upper_threshold: 43.2,
            },
        }
    }

    #[test]
    fn text_lists_items_in_bucket_order() {
        let mut buf = Vec::new();
        render_text(&sample(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "low\ta\t20.00\t20.00",
                "medium\tb\t12.00\t32.00",
                "medium\tc\t8.00\t40.00",
            ]
        );
    }

    #[test]
    fn pretty_shows_band_and_empty_buckets() {
        let mut buf = Vec::new();
        render_pretty(&sample(), &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("28.80 .. 43.20 pts"));
        assert!(out.contains("high (0)"));
        assert!(out.contains("(none)"));
    }

    #[test]
    fn json_flattens_buckets() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["low"][0]["id"], "a");
        assert_eq!(value["medium"].as_array().unwrap().len(), 2);
        assert_eq!(value["risk_factor"], 0.2);
    }
}
