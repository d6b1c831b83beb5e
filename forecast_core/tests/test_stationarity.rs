use approx::assert_relative_eq;
use forecast_core::stationarity::mackinnon_critical_values;
use forecast_core::synthetic::{random_walk, white_noise};
use forecast_core::{AdfTest, Autolag, ForecastError, TimeSeries, UnitRootTest};
use forecast_core::series::{parse_timestamp, Frequency};
use rstest::rstest;

fn daily(values: Vec<f64>) -> TimeSeries {
    TimeSeries::from_values(
        "x",
        parse_timestamp("2023-01-02").unwrap(),
        Frequency::daily(),
        values,
    )
    .unwrap()
}

#[test]
fn test_white_noise_rejects_unit_root() {
    let series = white_noise(500, 0.0, 1.0, 17).unwrap();
    let result = AdfTest::default().test(&series).unwrap();

    assert!(result.p_value < 0.01, "p-value {}", result.p_value);
    assert!(result.test_statistic < result.critical_values["1%"]);
    assert!(result.information_criterion.is_some());
}

#[test]
fn test_random_walk_keeps_unit_root() {
    let series = random_walk(500, 100.0, 1.0, 23).unwrap();
    let result = AdfTest::default().test(&series).unwrap();

    assert!(result.p_value > 0.01, "p-value {}", result.p_value);
    assert!(!result.rejects_unit_root(0.01));
}

#[rstest]
#[case(Autolag::Aic)]
#[case(Autolag::Bic)]
#[case(Autolag::TStat)]
#[case(Autolag::Fixed)]
fn test_every_lag_criterion_produces_valid_result(#[case] autolag: Autolag) {
    let series = white_noise(200, 5.0, 2.0, 3).unwrap();
    let result = AdfTest::new(autolag).test(&series).unwrap();

    // default max lag for 200 points is ceil(12 * 2^0.25) = 15
    assert!(result.used_lag <= 15);
    assert!((0.0..=1.0).contains(&result.p_value));
    assert_eq!(result.n_obs, 200 - 1 - result.used_lag);
    assert_eq!(result.information_criterion.is_none(), autolag == Autolag::Fixed);
}

#[test]
fn test_fixed_lag_uses_max_lag() {
    let series = white_noise(120, 0.0, 1.0, 9).unwrap();
    let result = AdfTest::new(Autolag::Fixed)
        .with_max_lag(3)
        .test(&series)
        .unwrap();
    assert_eq!(result.used_lag, 3);
    assert_eq!(result.n_obs, 120 - 1 - 3);
}

#[test]
fn test_constant_series_fails_fast() {
    let result = AdfTest::default().test(&daily(vec![42.0; 100]));
    assert!(matches!(result, Err(ForecastError::ConstantSeries { len: 100, .. })));
}

#[test]
fn test_short_series_is_insufficient() {
    let result = AdfTest::default().test(&daily(vec![1.0, 3.0, 2.0]));
    assert!(result.unwrap_err().is_insufficient_data());
}

#[test]
fn test_oversized_max_lag_is_insufficient() {
    let series = white_noise(20, 0.0, 1.0, 1).unwrap();
    let result = AdfTest::default().with_max_lag(50).test(&series);
    assert!(result.unwrap_err().is_insufficient_data());
}

#[test]
fn test_critical_values_approach_asymptotic_limits() {
    let values = mackinnon_critical_values(1_000_000);
    assert_relative_eq!(values["1%"], -3.43035, epsilon = 1e-4);
    assert_relative_eq!(values["5%"], -2.86154, epsilon = 1e-4);
    assert_relative_eq!(values["10%"], -2.56677, epsilon = 1e-4);

    let small = mackinnon_critical_values(50);
    assert!(small["1%"] < values["1%"]);
}

/// AR(2) sample with the statistics statsmodels' `adfuller` algorithm gives for it (constant only)
const ADF_REFERENCE: [f64; 100] = [
    10.0, 10.3, 9.8094, 10.1452, 9.8978, 9.6634, 9.7706, 9.5163,
    9.56, 9.3399, 9.8444, 9.9655, 9.7203, 9.5047, 9.7443, 9.8234,
    9.4542, 9.8826, 9.5057, 9.452, 9.7404, 9.7508, 9.7433, 10.0951,
    9.9132, 9.6592, 9.7544, 9.9422, 10.1132, 10.0342, 9.8074, 9.9995,
    10.1044, 9.7629, 9.7644, 10.1476, 9.8713, 10.0853, 9.6302, 9.5978,
    9.5073, 9.5445, 9.6621, 10.0745, 9.5751, 9.3829, 9.7199, 9.8979,
    9.9464, 10.2005, 10.0781, 10.4286, 9.9437, 10.3922, 10.4268, 10.051,
    10.4523, 10.0455, 10.3915, 9.9391, 9.7776, 10.0958, 9.8933, 9.9153,
    9.5575, 10.0473, 10.0047, 9.9006, 9.9597, 10.2125, 10.1952, 9.9612,
    10.071, 10.0925, 9.717, 10.0163, 10.1899, 9.9793, 9.9411, 10.1419,
    10.0724, 9.7678, 9.5241, 9.8785, 9.6067, 9.6984, 9.8693, 9.5659,
    9.6489, 9.4585, 9.6424, 9.3856, 9.7679, 10.0698, 10.0988, 9.8354,
    9.8782, 9.8161, 9.7843, 9.7722,
];

#[rstest]
#[case(Autolag::Aic, -3.133963010752868, 0.02413975270723917, 2, 97, -15.98058662403227)]
#[case(Autolag::Bic, -5.95701794054349, 2.0816206774965096e-07, 0, 99, -8.112115280754299)]
#[case(Autolag::TStat, -2.9906567763807512, 0.03577620039747581, 8, 91, 1.6656197068001755)]
fn test_matches_reference_adfuller(
    #[case] autolag: Autolag,
    #[case] statistic: f64,
    #[case] p_value: f64,
    #[case] used_lag: usize,
    #[case] n_obs: usize,
    #[case] ic_best: f64,
) {
    let result = AdfTest::new(autolag).test(&daily(ADF_REFERENCE.to_vec())).unwrap();

    assert_eq!(result.used_lag, used_lag);
    assert_eq!(result.n_obs, n_obs);
    assert_relative_eq!(result.test_statistic, statistic, epsilon = 1e-6);
    assert_relative_eq!(result.p_value, p_value, epsilon = 1e-6);
    assert_relative_eq!(result.information_criterion.unwrap(), ic_best, epsilon = 1e-6);
}
