//! Cross-cutting behavioural checks over generated series, exercised
//! against every filter kind.

use crate::common::types::{Sample, Timestamp};
use crate::filter::{Filter, FilterConfig, FilterKind, SampleFrame, SeriesFilter};
use crate::tests::generators::{
    generate_series, CloudProfileGenerator, NormalWalkGenerator, RandomWalkGenerator,
};
use test_case::test_case;

fn build(kind: FilterKind, threshold: f64, max_interval: Timestamp) -> SeriesFilter {
    SeriesFilter::new(FilterConfig::new(kind, threshold, max_interval).unwrap()).unwrap()
}

fn walk_series(seed: u64) -> Vec<Sample> {
    let generator = RandomWalkGenerator::new(Some(seed), 50.0, 1.0).unwrap();
    generate_series(generator, 1_000, 10, 400)
}

fn run(filter: &mut SeriesFilter, inputs: &[Sample]) -> Vec<Sample> {
    let mut emitted = Vec::new();
    for sample in inputs {
        emitted.extend(filter.filter_point(sample.timestamp, sample.value).unwrap());
    }
    emitted
}

#[test_case(FilterKind::Deadband)]
#[test_case(FilterKind::Hysteresis)]
#[test_case(FilterKind::Sdt)]
fn test_emitted_timestamps_strictly_increase(kind: FilterKind) {
    let inputs = walk_series(7);
    let mut filter = build(kind, 5.0, 50);
    let mut emitted = run(&mut filter, &inputs);
    emitted.extend(filter.flush());

    assert!(!emitted.is_empty());
    for pair in emitted.windows(2) {
        assert!(
            pair[1].timestamp > pair[0].timestamp,
            "{kind}: emission at {} not after {}",
            pair[1].timestamp,
            pair[0].timestamp
        );
    }
}

#[test_case(FilterKind::Deadband)]
#[test_case(FilterKind::Hysteresis)]
fn test_emitted_points_are_input_points(kind: FilterKind) {
    let inputs = walk_series(11);
    let mut filter = build(kind, 5.0, 50);
    let mut emitted = run(&mut filter, &inputs);
    emitted.extend(filter.flush());

    for point in &emitted {
        assert!(
            inputs.contains(point),
            "{kind}: emitted {point} is not an input point"
        );
    }
}

#[test_case(FilterKind::Deadband)]
#[test_case(FilterKind::Hysteresis)]
#[test_case(FilterKind::Sdt)]
fn test_max_interval_bound(kind: FilterKind) {
    // A huge threshold forces timeout-only emissions; the output gap must
    // still never exceed max_interval plus one inter-sample spacing.
    let generator = NormalWalkGenerator::new(Some(3), 0.0, 0.5).unwrap();
    let inputs = generate_series(generator, 1_000, 10, 400);
    let mut filter = build(kind, 1e6, 50);
    let emitted = run(&mut filter, &inputs);

    assert!(emitted.len() > 2);
    for pair in emitted.windows(2) {
        let gap = pair[1].timestamp - pair[0].timestamp;
        assert!(gap <= 60, "{kind}: output gap {gap} exceeds bound");
    }
}

#[test_case(FilterKind::Deadband)]
#[test_case(FilterKind::Hysteresis)]
#[test_case(FilterKind::Sdt)]
fn test_flush_is_idempotent(kind: FilterKind) {
    let inputs = walk_series(19);
    let mut filter = build(kind, 5.0, 50);
    run(&mut filter, &inputs);

    filter.flush();
    assert_eq!(filter.flush(), None);
    assert_eq!(filter.flush(), None);
}

#[test_case(FilterKind::Deadband)]
#[test_case(FilterKind::Hysteresis)]
#[test_case(FilterKind::Sdt)]
fn test_batch_equals_serial(kind: FilterKind) {
    let inputs = walk_series(13);
    let mut batched = build(kind, 2.0, 80);
    let mut serial = build(kind, 2.0, 80);

    let from_batch = batched.filter_samples(&inputs).unwrap();
    let from_serial = run(&mut serial, &inputs);
    assert_eq!(from_batch, from_serial);
}

#[test_case(FilterKind::Deadband)]
#[test_case(FilterKind::Hysteresis)]
#[test_case(FilterKind::Sdt)]
fn test_frame_preserves_column_names(kind: FilterKind) {
    let inputs = walk_series(17);
    let frame = SampleFrame::with_data(
        "_time",
        "_value",
        inputs.iter().map(|s| s.timestamp).collect(),
        inputs.iter().map(|s| s.value).collect(),
    );

    let mut framed = build(kind, 2.0, 80);
    let mut serial = build(kind, 2.0, 80);

    let out = framed.filter_frame(&frame).unwrap();
    assert_eq!(out.time_column, "_time");
    assert_eq!(out.value_column, "_value");
    assert_eq!(out.samples().collect::<Vec<_>>(), run(&mut serial, &inputs));
}

#[test]
fn test_cloud_profile_round() {
    // An attenuated irradiance profile keeps all invariants at once:
    // strictly increasing verbatim emissions within the gap bound.
    let generator = CloudProfileGenerator::new(Some(5), 600).unwrap();
    let inputs = generate_series(generator, 0, 5, 600);
    let mut filter = build(FilterKind::Hysteresis, 0.2, 100);
    let mut emitted = run(&mut filter, &inputs);
    emitted.extend(filter.flush());

    assert!(!emitted.is_empty());
    for pair in emitted.windows(2) {
        assert!(pair[1].timestamp > pair[0].timestamp);
        assert!(pair[1].timestamp - pair[0].timestamp <= 105);
    }
    for point in &emitted {
        assert!(inputs.contains(point));
    }
}

#[test]
fn test_sdt_reconstruction_error() {
    // Linear reconstruction between emitted points stays within a small
    // multiple of the compression deviation for every suppressed sample.
    let deviation = 10.0;
    let inputs = vec![
        Sample::new(100, 20.0),
        Sample::new(110, 10.0),
        Sample::new(120, 20.0),
        Sample::new(140, 40.0),
        Sample::new(150, 30.0),
        Sample::new(160, 45.0),
        Sample::new(180, 5.0),
    ];
    let mut filter = build(FilterKind::Sdt, deviation, 100);
    let mut emitted = run(&mut filter, &inputs);
    emitted.extend(filter.flush());

    for pair in emitted.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let slope = (end.value - start.value) / (end.timestamp - start.timestamp) as f64;
        for sample in inputs
            .iter()
            .filter(|s| s.timestamp > start.timestamp && s.timestamp < end.timestamp)
        {
            let reconstructed =
                start.value + slope * (sample.timestamp - start.timestamp) as f64;
            let error = (sample.value - reconstructed).abs();
            assert!(
                error <= 2.0 * deviation,
                "sample {sample} deviates {error} from reconstruction"
            );
        }
    }
}
