use burnrate_core::calendar::{WeekdayCalendar, WorkingCalendar};
use burnrate_core::model::PredictionSpan;
use burnrate_forecast::history::normalize_series;
use burnrate_forecast::velocity::weighted_velocity;
use chrono::{Days, NaiveDate};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// Sparse samples (every third working day) over `days` calendar days.
fn synthetic_points(start: NaiveDate, days: u64, cal: &WeekdayCalendar) -> Vec<(NaiveDate, f64)> {
    let mut points = Vec::new();
    let mut remaining = days as f64 * 3.0;
    for (i, day) in start.iter_days().take(days as usize).enumerate() {
        if cal.is_working_day(day) {
            remaining -= 2.5;
            if i % 3 == 0 {
                points.push((day, remaining));
            }
        }
    }
    points
}

fn bench_normalize(c: &mut Criterion) {
    let cal = WeekdayCalendar::default();
    let start = NaiveDate::from_ymd_opt(2025, 1, 6).expect("valid date");
    let mut group = c.benchmark_group("forecast.normalize");

    for days in [30_u64, 180, 730] {
        let today = start
            .checked_add_days(Days::new(days))
            .expect("in range");
        let points = synthetic_points(start, days, &cal);
        group.throughput(Throughput::Elements(days));

        group.bench_with_input(BenchmarkId::from_parameter(days), &points, |b, points| {
            b.iter(|| black_box(normalize_series(start, today, points, 10.0, &cal)));
        });
    }
    group.finish();
}

fn bench_velocity(c: &mut Criterion) {
    let cal = WeekdayCalendar::default();
    let start = NaiveDate::from_ymd_opt(2025, 1, 6).expect("valid date");
    let today = start.checked_add_days(Days::new(365)).expect("in range");
    let points = synthetic_points(start, 365, &cal);
    let series = normalize_series(start, today, &points, 10.0, &cal).expect("series");

    let mut group = c.benchmark_group("forecast.velocity");
    for span in [PredictionSpan::Days3, PredictionSpan::Days14] {
        group.bench_with_input(
            BenchmarkId::from_parameter(span.days()),
            &span,
            |b, span| b.iter(|| black_box(weighted_velocity(&series, today, *span, &cal))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_velocity);
criterion_main!(benches);
