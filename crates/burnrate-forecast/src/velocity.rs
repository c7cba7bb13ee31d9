//! Recency-weighted velocity over the last working days.

use burnrate_core::calendar::WorkingCalendar;
use burnrate_core::model::{NormalizedBurndownHistory, PredictionSpan};
use chrono::NaiveDate;

/// Weighted average daily burn over the last `span` working days.
///
/// Starting at `today` (or the working day before it when today is not a
/// working day), each step pairs a day with the previous working day and
/// takes `series[previous] - series[day]` as that day's burn. The most recent
/// step weighs `span`, the one before `span - 1`, down to 1. Stepping stops
/// early when the previous working day falls before the series start.
///
/// Returns `0.0` when no step fits in the series.
#[must_use]
pub fn weighted_velocity(
    series: &NormalizedBurndownHistory,
    today: NaiveDate,
    span: PredictionSpan,
    calendar: &(impl WorkingCalendar + ?Sized),
) -> f64 {
    let mut current = if calendar.is_working_day(today) {
        Some(today)
    } else {
        calendar.previous_working_day(today)
    };

    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;

    for weight in (1..=span.days()).rev() {
        let Some(day) = current else { break };
        let Some(prev) = calendar.previous_working_day(day) else {
            break;
        };
        let (Some(prev_value), Some(day_value)) = (series.value_on(prev), series.value_on(day))
        else {
            break;
        };

        let weight = f64::from(weight);
        weighted_sum += (prev_value - day_value) * weight;
        weight_sum += weight;
        current = Some(prev);
    }

    if weight_sum > 0.0 {
        weighted_sum / weight_sum
    } else {
        0.0
    }
}
