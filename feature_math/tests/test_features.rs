use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use feature_math::{
    create_lag_features, create_rolling_features, DataFrame, FeatureError, RollingStat,
    DATE_COLUMN,
};
use forecast_core::{Frequency, TimeSeries};
use rstest::rstest;
use polars::prelude::TakeRandomUtf8;

fn series(values: Vec<f64>) -> TimeSeries {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    TimeSeries::from_values("y", start, Frequency::daily(), values).unwrap()
}

fn column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().into_iter().collect()
}

#[test]
fn test_lag_features_columns_and_values() {
    let s = series(vec![10.0, 11.0, 12.0, 13.0, 14.0]);
    let df = create_lag_features(&s, &[1, 2, 3]).unwrap();

    assert_eq!(
        df.get_column_names(),
        vec![DATE_COLUMN, "y", "lag_1", "lag_2", "lag_3"]
    );
    assert_eq!(df.height(), 5);
    assert_eq!(
        column(&df, "lag_2"),
        vec![None, None, Some(10.0), Some(11.0), Some(12.0)]
    );

    let complete = df.drop_nulls::<String>(None).unwrap();
    assert_eq!(complete.height(), 2);
    assert_eq!(column(&complete, "lag_3"), vec![Some(10.0), Some(11.0)]);

    let dates = complete.column(DATE_COLUMN).unwrap().utf8().unwrap();
    assert_eq!(dates.get(0), Some("2024-01-04"));
}

#[test]
fn test_rolling_features_default_stats() {
    let s = series(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let df = create_rolling_features(&s, &[2, 3], &[]).unwrap();

    assert_eq!(
        df.get_column_names(),
        vec![DATE_COLUMN, "y", "roll_2_mean", "roll_2_std", "roll_3_mean", "roll_3_std"]
    );

    let mean_3 = column(&df, "roll_3_mean");
    assert_eq!(&mean_3[..2], &[None, None]);
    assert_relative_eq!(mean_3[5].unwrap(), 5.0);

    let std_2 = column(&df, "roll_2_std");
    assert_relative_eq!(std_2[1].unwrap(), 0.5f64.sqrt(), epsilon = 1e-12);
}

#[rstest]
#[case(RollingStat::Min, 3.0)]
#[case(RollingStat::Max, 9.0)]
#[case(RollingStat::Mean, 6.0)]
fn test_rolling_statistic(#[case] stat: RollingStat, #[case] expected: f64) {
    let s = series(vec![0.0, 9.0, 3.0, 6.0]);
    let df = create_rolling_features(&s, &[3], &[stat]).unwrap();
    let values = column(&df, &format!("roll_3_{}", stat));

    assert_relative_eq!(values[3].unwrap(), expected);
}

#[test]
fn test_head_of_complete_rows() {
    let s = series((0..20).map(f64::from).collect());
    let df = create_rolling_features(&s, &[5], &[RollingStat::Max]).unwrap();

    let head = df.drop_nulls::<String>(None).unwrap().head(Some(3));
    assert_eq!(head.height(), 3);
    assert_eq!(
        column(&head, "roll_5_max"),
        vec![Some(4.0), Some(5.0), Some(6.0)]
    );
}

#[test]
fn test_window_zero_is_rejected() {
    let s = series(vec![1.0, 2.0]);
    assert!(matches!(
        create_rolling_features(&s, &[0], &[RollingStat::Mean]),
        Err(FeatureError::InvalidInput(_))
    ));
}

#[test]
fn test_window_longer_than_series_is_all_null() {
    let s = series(vec![1.0, 2.0, 3.0]);
    let df = create_rolling_features(&s, &[10], &[RollingStat::Max]).unwrap();

    assert_eq!(df.column("roll_10_max").unwrap().null_count(), 3);
    assert_eq!(df.drop_nulls::<String>(None).unwrap().height(), 0);
}
