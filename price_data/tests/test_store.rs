use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use price_data::yahoo::parse_chart;
use price_data::{
    load_price_data, load_prices, save_prices, CsvProvider, DataError, PriceBar, PriceProvider,
    PriceTable,
};
use rstest::rstest;
use tempfile::tempdir;

const FIXTURE: &str = include_str!("fixtures/spy_chart.json");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_table() -> PriceTable {
    let bars = parse_chart(FIXTURE).unwrap();
    PriceTable::from_bars(&bars).unwrap()
}

#[test]
fn test_fixture_parses_into_unique_ascending_rows() {
    let table = sample_table();

    // duplicate day collapses and the null close is skipped
    assert_eq!(table.len(), 4);
    assert_eq!(
        table.dates().unwrap(),
        vec![date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 4), date(2024, 1, 5)]
    );
    assert_eq!(
        table.column_values("Adj Close").unwrap(),
        vec![466.99, 463.18, 461.69, 462.32]
    );
}

#[test]
fn test_csv_round_trip_preserves_columns_and_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("raw").join("spy.csv");
    let mut table = sample_table();

    save_prices(&mut table, &path).unwrap();
    let loaded = load_prices(&path).unwrap();

    assert_eq!(loaded.column_names(), table.column_names());
    assert_eq!(loaded.dates().unwrap(), table.dates().unwrap());
    assert_eq!(loaded.to_bars().unwrap(), table.to_bars().unwrap());
}

#[test]
fn test_save_overwrites_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prices.csv");
    let mut table = sample_table();
    save_prices(&mut table, &path).unwrap();

    let mut shorter = table.head(2);
    save_prices(&mut shorter, &path).unwrap();

    assert_eq!(load_prices(&path).unwrap().len(), 2);
}

#[rstest]
#[case(date(2024, 1, 1), date(2024, 2, 1), 4)]
#[case(date(2024, 1, 3), date(2024, 1, 5), 2)]
#[case(date(2024, 1, 5), date(2024, 1, 6), 1)]
fn test_csv_provider_filters_range(
    #[case] start: NaiveDate,
    #[case] end: NaiveDate,
    #[case] expected: usize,
) {
    let dir = tempdir().unwrap();
    let provider = CsvProvider::new(dir.path());
    let mut table = sample_table();
    save_prices(&mut table, provider.path_for("SPY")).unwrap();

    let fetched = provider.fetch("SPY", start, end).unwrap();
    assert_eq!(fetched.len(), expected);
}

#[test]
fn test_csv_provider_reports_empty_range() {
    let dir = tempdir().unwrap();
    let provider = CsvProvider::new(dir.path());
    let mut table = sample_table();
    save_prices(&mut table, provider.path_for("spy")).unwrap();

    let result = provider.fetch("SPY", date(2023, 1, 1), date(2023, 6, 1));
    assert!(matches!(result, Err(DataError::Empty { .. })));
}

#[test]
fn test_load_price_data_saves_when_asked() {
    let source = tempdir().unwrap();
    let provider = CsvProvider::new(source.path());
    let mut table = sample_table();
    save_prices(&mut table, provider.path_for("SPY")).unwrap();

    let out = tempdir().unwrap();
    let target = out.path().join("nested").join("spy.csv");
    let loaded =
        load_price_data(&provider, "SPY", date(2024, 1, 1), date(2024, 2, 1), Some(target.as_path()))
            .unwrap();

    assert!(target.exists());
    assert_eq!(load_prices(&target).unwrap().len(), loaded.len());
}

#[test]
fn test_series_extraction_from_loaded_table() {
    let bars = vec![
        PriceBar {
            date: date(2024, 3, 1),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            adj_close: 1.4,
            volume: 10.0,
        },
        PriceBar {
            date: date(2024, 3, 4),
            open: 1.5,
            high: 2.5,
            low: 1.0,
            close: 2.0,
            adj_close: 1.9,
            volume: 12.0,
        },
    ];
    let table = PriceTable::from_bars(&bars).unwrap();
    let series = table.series("close").unwrap();

    assert_eq!(series.name(), "Close");
    assert_eq!(series.values(), &[1.5, 2.0]);
}
