//! `burnrate velocity`: recency-weighted burn rate of a release.


use burnrate_core::model::{ReleaseId, TrackedQuantity};
use burnrate_core::source::ProjectSettings;
use clap::Args;
use serde::Serialize;

use super::{CommandContext, release_id};
use crate::output::{fmt_quantity, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct VelocityArgs {
    /// Release to measure.
    pub release: String,

    /// Quantity to measure (`points` or `estimated_days`).
    #[arg(short, long)]
    pub quantity: Option<TrackedQuantity>,
}

#[derive(Debug, Serialize)]
pub struct VelocityOutput {
    pub release: ReleaseId,
    pub quantity: TrackedQuantity,
    pub velocity: f64,
    pub prediction_span: u32,
}

pub fn run_velocity(args: &VelocityArgs, ctx: &CommandContext) -> anyhow::Result<()> {
    let forecaster = ctx.open()?;
    let release = release_id(&args.release);
    let quantity = ctx.quantity(args.quantity);

    let velocity = forecaster
        .predicted_velocity(&release, quantity)
        .map_err(|e| ctx.fail(e))?;
    let output = VelocityOutput {
        release,
        quantity,
        velocity,
        prediction_span: forecaster.source().prediction_span().days(),
    };

    render_mode(
        ctx.output,
        &output,
        |o, w| writeln!(w, "{}", fmt_quantity(o.velocity)),
        |o, w| {
            pretty_section(w, &format!("Velocity: {} ({})", o.release, o.quantity))?;
            pretty_kv(
                w,
                "Velocity",
                format!("{} {}/day", fmt_quantity(o.velocity), o.quantity.unit()),
            )?;
            pretty_kv(w, "Span", format!("{} working days", o.prediction_span))
        },
    )
}
