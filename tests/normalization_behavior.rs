//! Behavior tests for cleaning and comparison scaling.

use marketbrief_core::{
    clean, compare, rebase, DataPoint, ExclusionReason, GapPolicy, ScaleMode, SourceKind,
    TimeSeries, DEFAULT_BASELINE,
};
use marketbrief_tests::{daily, metadata, normalized};
use time::macros::date;

#[test]
fn when_group_is_rebased_first_value_hits_baseline_and_ratios_survive() {
    // Given: two series in very different units
    let gdp = normalized(
        "GDP",
        SourceKind::RemoteIndicator,
        daily(date!(2024 - 01 - 01), &[27_000.0, 27_540.0, 28_080.0]),
    );
    let rate = normalized(
        "FEDFUNDS",
        SourceKind::RemoteIndicator,
        daily(date!(2024 - 01 - 01), &[5.0, 5.25, 4.5]),
    );

    // When: the group is rebased to the default baseline
    let set = rebase(&[gdp.clone(), rate.clone()], DEFAULT_BASELINE).expect("valid baseline");

    // Then: each member starts at the baseline and keeps its ratios to the first value
    assert_eq!(set.members.len(), 2);
    for (original, scaled) in [gdp, rate].iter().zip(&set.members) {
        let raw: Vec<f64> = original.values().map(|(_, v)| v).collect();
        let out: Vec<f64> = scaled.values().map(|(_, v)| v).collect();
        assert!((out[0] - DEFAULT_BASELINE).abs() < 1e-9);
        for (r, o) in raw.iter().zip(&out) {
            assert!((o / out[0] - r / raw[0]).abs() < 1e-9);
        }
    }
}

#[test]
fn when_series_has_fewer_than_two_values_it_is_excluded_and_reported() {
    // Given: one usable series and one with a single value
    let usable = normalized(
        "^GSPC",
        SourceKind::RemoteMarket,
        daily(date!(2024 - 04 - 01), &[5_000.0, 5_050.0]),
    );
    let lonely = normalized("^N225", SourceKind::RemoteMarket, daily(date!(2024 - 04 - 01), &[39_000.0]));

    // When: the group is compared
    let set = compare(&[usable, lonely], ScaleMode::Rebase(DEFAULT_BASELINE));

    // Then: the single-value series is listed as excluded with the reason
    assert_eq!(set.member_ids().len(), 1);
    assert_eq!(set.excluded.len(), 1);
    assert_eq!(set.excluded[0].id.as_str(), "^N225");
    assert_eq!(set.excluded[0].reason, ExclusionReason::TooFewPoints { valued: 1 });
}

#[test]
fn when_baseline_is_zero_rebase_is_refused() {
    // Given / When / Then: a zero baseline cannot preserve ratios
    assert!(rebase(&[], 0.0).is_err());
    assert!(rebase(&[], f64::NAN).is_err());
}

#[test]
fn when_points_arrive_unordered_cleaning_sorts_and_keeps_last_duplicate() {
    // Given: a series delivered out of order with a repeated date and a gap
    let series = TimeSeries::new(
        metadata("UNRATE", SourceKind::RemoteIndicator),
        vec![
            DataPoint::new(date!(2024 - 03 - 01), Some(3.9)),
            DataPoint::new(date!(2024 - 01 - 01), Some(3.7)),
            DataPoint::new(date!(2024 - 02 - 01), None),
            DataPoint::new(date!(2024 - 01 - 01), Some(3.8)),
        ],
    )
    .expect("series");

    // When: it is cleaned with each gap policy
    let dropped = clean(&series, GapPolicy::Drop);
    let preserved = clean(&series, GapPolicy::Preserve);

    // Then: dates ascend, the later duplicate wins and gaps follow the policy
    let values: Vec<_> = dropped.points.iter().map(|p| (p.date, p.value)).collect();
    assert_eq!(
        values,
        [(date!(2024 - 01 - 01), Some(3.8)), (date!(2024 - 03 - 01), Some(3.9))]
    );
    assert_eq!(preserved.points.len(), 3);
    assert!(preserved.gaps_preserved);
}

#[test]
fn when_other_scales_are_requested_values_map_onto_them() {
    // Given: a simple rising series
    let series = normalized("^DJI", SourceKind::RemoteMarket, daily(date!(2024 - 04 - 01), &[50.0, 75.0, 100.0]));

    // When: it is scaled min-max and as percent change
    let min_max = compare(std::slice::from_ref(&series), ScaleMode::MinMax);
    let percent = compare(std::slice::from_ref(&series), ScaleMode::PercentChange);

    // Then: min-max spans 0..1 and percent change starts at zero
    let unit: Vec<f64> = min_max.members[0].values().map(|(_, v)| v).collect();
    assert_eq!(unit, [0.0, 0.5, 1.0]);
    let change: Vec<f64> = percent.members[0].values().map(|(_, v)| v).collect();
    assert_eq!(change, [0.0, 50.0, 100.0]);
}
