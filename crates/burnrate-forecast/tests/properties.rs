use burnrate_core::calendar::{WeekdayCalendar, WorkingCalendar};
use burnrate_core::model::{
    BacklogItem, ItemId, ItemKind, ItemStatus, NormalizedBurndownHistory, PredictionSpan,
    TrackedQuantity,
};
use burnrate_forecast::history::normalize_series;
use burnrate_forecast::predict::{CompletionForecast, completion_date};
use burnrate_forecast::risk::classify;
use burnrate_forecast::velocity::weighted_velocity;
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

fn base() -> NaiveDate {
    // A Monday.
    NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date")
}

fn plus(day: NaiveDate, n: u64) -> NaiveDate {
    day.checked_add_days(Days::new(n)).expect("in range")
}

fn arb_span() -> impl Strategy<Value = PredictionSpan> {
    prop_oneof![
        Just(PredictionSpan::Days3),
        Just(PredictionSpan::Days5),
        Just(PredictionSpan::Days7),
        Just(PredictionSpan::Days10),
        Just(PredictionSpan::Days14),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn interpolation_between_two_samples(
        offset in 0u64..7,
        gap in 2u64..15,
        v1 in 0.0f64..500.0,
        v2 in 0.0f64..500.0,
    ) {
        let cal = WeekdayCalendar::default();
        let mut d1 = plus(base(), offset);
        if !cal.is_working_day(d1) {
            d1 = cal.next_working_day(d1).expect("working day");
        }
        let mut d2 = plus(d1, gap);
        if !cal.is_working_day(d2) {
            d2 = cal.next_working_day(d2).expect("working day");
        }
        let today = plus(d2, 1);

        let series = normalize_series(d1, today, &[(d1, v1), (d2, v2)], v2, &cal)
            .expect("series");
        prop_assert_eq!(series.start(), d1);

        let span = (d2 - d1).num_days() as f64;
        let mut prev = v1;
        for (day, value) in series.iter().filter(|(d, _)| *d > d1 && *d < d2) {
            if cal.is_working_day(day) {
                let elapsed = (day - d1).num_days() as f64;
                let expected = v1 + (v2 - v1) * elapsed / span;
                prop_assert!((value - expected).abs() < 1e-9, "{day}: {value} vs {expected}");
            } else {
                prop_assert_eq!(value.to_bits(), prev.to_bits());
            }
            prev = value;
        }
        prop_assert_eq!(series.value_on(d2), Some(v2));
    }

    #[test]
    fn normalized_length_spans_start_to_today(
        start_offset in 0u64..30,
        sample_offsets in proptest::collection::btree_set(0u64..60, 0..10),
        days_after in 0u64..30,
        current in 0.0f64..100.0,
    ) {
        let cal = WeekdayCalendar::default();
        let start = plus(base(), start_offset);
        let today = plus(start, days_after);
        let points: Vec<(NaiveDate, f64)> = sample_offsets
            .iter()
            .map(|o| (plus(base(), *o), 100.0 - *o as f64))
            .filter(|(d, _)| *d < today)
            .collect();

        let series = normalize_series(start, today, &points, current, &cal).expect("series");
        prop_assert_eq!(series.end(), today);
        prop_assert!(series.start() >= start);
        let expected = usize::try_from((today - series.start()).num_days() + 1).expect("len");
        prop_assert_eq!(series.len(), expected);
        prop_assert_eq!(series.last_value().to_bits(), current.to_bits());
    }

    #[test]
    fn constant_working_day_burn_is_the_velocity(
        span in arb_span(),
        k in 0.25f64..20.0,
        working_days in 1u32..40,
    ) {
        let cal = WeekdayCalendar::default();
        // Build backwards from a Friday so every working day burns `k`.
        let today = plus(base(), 4);
        let mut start = today;
        for _ in 0..working_days {
            start = cal.previous_working_day(start).expect("working day");
        }

        let mut values = Vec::new();
        let mut value = 1_000.0;
        for day in start.iter_days().take_while(|d| *d <= today) {
            if day > start && cal.is_working_day(day) {
                value -= k;
            }
            values.push(value);
        }
        let series = NormalizedBurndownHistory::new(start, values).expect("series");

        let velocity = weighted_velocity(&series, today, span, &cal);
        prop_assert!((velocity - k).abs() < 1e-9 * k.max(1.0), "{velocity} vs {k}");
    }

    #[test]
    fn risk_buckets_partition_in_priority_order(
        points in proptest::collection::vec(0.0f64..20.0, 0..30),
        days in 0u32..30,
        velocity in 0.0f64..10.0,
        risk_factor in -0.5f64..1.5,
    ) {
        let items: Vec<BacklogItem> = points
            .iter()
            .enumerate()
            .map(|(i, p)| BacklogItem {
                id: ItemId::new(format!("i{i}")),
                name: String::new(),
                kind: ItemKind::Backlog,
                points: *p,
                estimated_days: 0.0,
                status: ItemStatus::NotDone,
                previous: None,
                releases: Vec::new(),
            })
            .collect();

        let buckets = classify(&items, TrackedQuantity::Points, days, velocity, risk_factor);
        prop_assert_eq!(buckets.len(), items.len());
        prop_assert!(buckets.lower_threshold <= buckets.upper_threshold);

        let order: Vec<&ItemId> = buckets
            .low
            .iter()
            .chain(&buckets.medium)
            .chain(&buckets.high)
            .map(|i| &i.id)
            .collect();
        let expected: Vec<&ItemId> = items.iter().map(|i| &i.id).collect();
        prop_assert_eq!(order, expected);
    }

    #[test]
    fn completion_moves_with_the_sign_of_excess(
        deadline_offset in 0u64..60,
        excess in -200.0f64..200.0,
        velocity in 0.5f64..20.0,
    ) {
        let cal = WeekdayCalendar::default();
        let deadline = plus(base(), deadline_offset);
        match completion_date(deadline, excess, velocity, &cal) {
            CompletionForecast::On(date) if excess > f64::EPSILON => {
                prop_assert!(date > deadline);
                prop_assert!(cal.is_working_day(date));
            }
            CompletionForecast::On(date) => prop_assert!(date <= deadline),
            CompletionForecast::Never => prop_assert!(false, "positive velocity always completes"),
        }
    }
}
