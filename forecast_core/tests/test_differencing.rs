use forecast_core::observer::{NoopObserver, RecordingObserver};
use forecast_core::synthetic::{random_walk, white_noise};
use forecast_core::{
    make_stationary, AdfTest, Differencer, DifferencingConfig, ForecastError, PipelineEvent,
    TimeSeries,
};
use forecast_core::series::{parse_timestamp, Frequency};

#[test]
fn test_random_walk_needs_one_difference() {
    let series = random_walk(400, 50.0, 1.0, 5).unwrap();
    let outcome = make_stationary(&series, 2, 0.01).unwrap();

    assert_eq!(outcome.order, 1);
    assert!(outcome.stationary);
    assert_eq!(outcome.series.len(), series.len() - outcome.order);
    assert_eq!(outcome.series.timestamps(), &series.timestamps()[1..]);
}

#[test]
fn test_stationary_input_is_returned_unchanged() {
    let series = white_noise(300, 10.0, 1.0, 8).unwrap();
    let outcome = make_stationary(&series, 2, 0.5).unwrap();

    assert_eq!(outcome.order, 0);
    assert_eq!(outcome.series, series);
}

#[test]
fn test_order_never_exceeds_max_diff() {
    let series = random_walk(300, 10.0, 1.0, 12).unwrap();
    let differencer = Differencer::with_tester(
        AdfTest::default(),
        DifferencingConfig {
            max_diff: 0,
            alpha: 1e-9,
        },
    );
    let observer = RecordingObserver::new();
    let outcome = differencer.make_stationary(&series, &observer).unwrap();

    assert_eq!(outcome.order, 0);
    assert!(!outcome.stationary);
    assert!(observer
        .events()
        .iter()
        .any(|e| matches!(e, PipelineEvent::NonStationary { order: 0, .. })));
}

#[test]
fn test_missing_values_are_dropped_first() {
    let mut values: Vec<f64> = random_walk(200, 10.0, 1.0, 4).unwrap().values().to_vec();
    values[50] = f64::NAN;
    values[51] = f64::NAN;
    let series = TimeSeries::from_values(
        "gappy",
        parse_timestamp("2023-01-02").unwrap(),
        Frequency::BusinessDay,
        values,
    )
    .unwrap();

    let outcome = make_stationary(&series, 2, 0.05).unwrap();
    assert_eq!(outcome.series.len(), 198 - outcome.order);
    assert!(!outcome.series.has_missing());
}

#[test]
fn test_constant_series_propagates_error() {
    let series = TimeSeries::from_values(
        "flat",
        parse_timestamp("2023-01-02").unwrap(),
        Frequency::daily(),
        vec![7.0; 60],
    )
    .unwrap();
    let result = Differencer::new(DifferencingConfig::default()).make_stationary(&series, &NoopObserver);
    assert!(matches!(result, Err(ForecastError::ConstantSeries { .. })));
}
