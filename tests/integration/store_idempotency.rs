//! Idempotent typed writes and append-only raw writes against a real database file

use coinglass_ingest::store::Store;
use coinglass_ingest::{LiquidationEntry, LongShortRatioEntry, OhlcBar, RatioCategory, Record, Table};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;

fn fresh_store() -> Store {
    let store = Store::open_in_memory().unwrap();
    store.ensure_schema().unwrap();
    store
}

fn row(table: Table, symbol: &str, time: i64, value: f64, category: RatioCategory) -> Record {
    let bar = OhlcBar {
        symbol: symbol.to_string(),
        time,
        open: value,
        high: value,
        low: value,
        close: value,
    };
    match table {
        Table::OpenInterest => Record::OpenInterest(bar),
        Table::FundingRate => Record::FundingRate(bar),
        Table::LongShortRatio => Record::LongShortRatio(LongShortRatioEntry {
            symbol: symbol.to_string(),
            exchange: "Binance".to_string(),
            time,
            long_percent: value,
            short_percent: 100.0 - value,
            long_short_ratio: 1.0,
            category,
        }),
        Table::Liquidations | Table::RawApiData => Record::Liquidation(LiquidationEntry {
            symbol: symbol.to_string(),
            time,
            long_liquidation_usd: value,
            short_liquidation_usd: value,
        }),
    }
}

fn typed_table() -> impl Strategy<Value = Table> {
    prop_oneof![
        Just(Table::OpenInterest),
        Just(Table::FundingRate),
        Just(Table::LongShortRatio),
        Just(Table::Liquidations),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_replaying_a_batch_inserts_nothing(
        table in typed_table(),
        keys in prop::collection::vec((0usize..3, 0i64..40, any::<bool>()), 1..60),
    ) {
        let symbols = ["BTC", "ETH", "SOL"];
        let rows: Vec<Record> = keys
            .iter()
            .map(|(s, t, top)| {
                let category = if *top { RatioCategory::Top } else { RatioCategory::Global };
                row(table, symbols[*s], *t, *t as f64, category)
            })
            .collect();

        let distinct: HashSet<_> = keys
            .iter()
            .map(|(s, t, top)| (*s, *t, table == Table::LongShortRatio && *top))
            .collect();

        let mut store = fresh_store();
        let first = store.upsert_typed(table, &rows).unwrap();
        let second = store.upsert_typed(table, &rows).unwrap();

        prop_assert_eq!(first, distinct.len());
        prop_assert_eq!(second, 0);
        prop_assert_eq!(store.count_rows(table.name()).unwrap() as usize, distinct.len());
    }
}

#[test]
fn test_first_write_wins_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coinglass_data.db");

    {
        let mut store = Store::open(&path).unwrap();
        store.ensure_schema().unwrap();
        let inserted = store
            .upsert_typed(
                Table::Liquidations,
                &[row(Table::Liquidations, "BTC", 1, 10.0, RatioCategory::Top)],
            )
            .unwrap();
        assert_eq!(inserted, 1);
    }

    let mut reopened = Store::open(&path).unwrap();
    reopened.ensure_schema().unwrap();
    let inserted = reopened
        .upsert_typed(
            Table::Liquidations,
            &[
                row(Table::Liquidations, "BTC", 1, 99.0, RatioCategory::Top),
                row(Table::Liquidations, "BTC", 2, 20.0, RatioCategory::Top),
            ],
        )
        .unwrap();
    assert_eq!(inserted, 1);

    let rows = reopened.select_rows("liquidations", None).unwrap();
    let rendered: Vec<Vec<String>> = rows.rendered().collect();
    assert_eq!(rendered.len(), 2);
    let long_col = rows
        .columns
        .iter()
        .position(|c| c == "long_liquidation_usd")
        .unwrap();
    assert_eq!(rendered[0][long_col], "10");
}

#[test]
fn test_ratio_categories_do_not_collide() {
    let mut store = fresh_store();
    let rows = [
        row(Table::LongShortRatio, "BTC", 1, 60.0, RatioCategory::Top),
        row(Table::LongShortRatio, "BTC", 1, 55.0, RatioCategory::Global),
    ];
    assert_eq!(store.upsert_typed(Table::LongShortRatio, &rows).unwrap(), 2);
}

#[test]
fn test_raw_log_appends_every_call() {
    let mut store = fresh_store();
    let payload = [json!({"symbol": "BTC"}), json!({"symbol": "ETH"})];

    assert_eq!(store.append_raw("futures_supported_coins", "{}", &payload).unwrap(), 2);
    assert_eq!(store.append_raw("futures_supported_coins", "{}", &payload).unwrap(), 2);
    assert_eq!(store.count_rows("raw_api_data").unwrap(), 4);

    let rows = store.select_rows("raw_api_data", Some(1)).unwrap();
    let rendered: Vec<Vec<String>> = rows.rendered().collect();
    let data_col = rows.columns.iter().position(|c| c == "data").unwrap();
    assert_eq!(rendered[0][data_col], r#"{"symbol":"BTC"}"#);
}

#[test]
fn test_empty_batches_are_noops() {
    let mut store = fresh_store();
    assert_eq!(store.upsert_typed(Table::FundingRate, &[]).unwrap(), 0);
    assert_eq!(store.append_raw("futures_supported_coins", "{}", &[]).unwrap(), 0);
    assert_eq!(store.count_rows("raw_api_data").unwrap(), 0);
}
