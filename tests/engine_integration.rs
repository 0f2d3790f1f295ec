//! End-to-end runs of the built-in queries through the engine

use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tripagg::config::EngineConfig;
use tripagg::engine::{Engine, EngineError, LineSource, QueryOutput};
use tripagg::query::loader::parse_queries;
use tripagg::query::{GroupKey, QueryRegistry};
use tripagg::record::ParserKind;

fn engine(chunk_size: usize, workers: usize) -> Engine {
    Engine::new(
        EngineConfig::default()
            .with_chunk_size(chunk_size)
            .with_workers(workers)
            .with_progress(false),
    )
    .unwrap()
}

async fn run(query: &str, lines: &[&str], chunk_size: usize, workers: usize) -> QueryOutput {
    let spec = QueryRegistry::with_builtins().get(query).unwrap();
    let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    engine(chunk_size, workers)
        .run(spec, LineSource::from_lines("test", lines))
        .await
        .unwrap()
}

fn csv(output: &QueryOutput) -> Vec<String> {
    let mut rows = vec![output.table.columns.join(",")];
    for row in &output.table.rows {
        let cells: Vec<String> = row.cells.iter().map(|c| c.render()).collect();
        rows.push(cells.join(","));
    }
    rows
}

#[tokio::test]
async fn test_payment_scenario() {
    let output = run(
        "payment",
        &[
            r#"{"trip_distance":6,"payment_type":1,"fare_amount":10,"tip_amount":2}"#,
            r#"{"trip_distance":3,"payment_type":1,"fare_amount":5,"tip_amount":1}"#,
            r#"{"trip_distance":8,"payment_type":2,"fare_amount":20,"tip_amount":4}"#,
        ],
        2,
        2,
    )
    .await;
    assert_eq!(
        csv(&output),
        vec![
            "payment_type,num_trips,avg_fare,total_tip",
            "1,1,10.00,2.00",
            "2,1,20.00,4.00",
        ]
    );
}

#[tokio::test]
async fn test_count_scenario() {
    let output = run("query1", &[r#"{"a":1}"#, "", r#"{"a":2}"#], 1, 3).await;
    assert_eq!(output.table.row(&GroupKey::All).unwrap(), vec!["2", "0.00"]);
    assert_eq!(output.stats.lines.blank, 1);
}

#[tokio::test]
async fn test_daily_scenario() {
    let output = run(
        "daily",
        &[
            r#"{"tpep_pickup_datetime":"2024-01-05 08:00:00","passenger_count":1,"trip_distance":2.0,"fare_amount":10.0,"tip_amount":1.0}"#,
            r#"{"tpep_pickup_datetime":"2024-01-05 17:30:00","passenger_count":3,"trip_distance":4.0,"fare_amount":20.0,"tip_amount":3.0}"#,
            r#"{"tpep_pickup_datetime":"2023-12-31 23:59:00","passenger_count":2,"trip_distance":1.0,"fare_amount":7.0,"tip_amount":0.0}"#,
        ],
        10,
        4,
    )
    .await;
    assert_eq!(output.table.rows.len(), 1);
    assert_eq!(
        output.table.row(&GroupKey::Text("2024-01-05".to_string())).unwrap(),
        vec!["2024-01-05", "2", "2.00", "3.00", "15.00", "4.00"]
    );
}

#[tokio::test]
async fn test_vendor_scenario_keeps_six_places() {
    let output = run(
        "vendor",
        &[
            r#"{"VendorID":1,"store_and_fwd_flag":"Y","tpep_pickup_datetime":"2024-01-02 10:00:00","passenger_count":1}"#,
            r#"{"VendorID":1,"store_and_fwd_flag":"Y","tpep_pickup_datetime":"2024-01-03 10:00:00","passenger_count":1}"#,
            r#"{"VendorID":1,"store_and_fwd_flag":"Y","tpep_pickup_datetime":"2024-01-04 10:00:00","passenger_count":2}"#,
            r#"{"VendorID":2,"store_and_fwd_flag":"N","tpep_pickup_datetime":"2024-01-04 10:00:00","passenger_count":5}"#,
        ],
        1,
        2,
    )
    .await;
    assert_eq!(csv(&output), vec!["VendorID,trips,avg_passengers", "1,3,1.333333"]);
}

#[tokio::test]
async fn test_missing_group_key_uses_default() {
    let output = run(
        "payment",
        &[r#"{"trip_distance":9,"fare_amount":4}"#],
        5,
        1,
    )
    .await;
    assert_eq!(output.table.row(&GroupKey::Int(-1)).unwrap()[1], "1");
}

#[tokio::test]
async fn test_same_file_twice_is_identical() {
    let mut file = NamedTempFile::new().unwrap();
    for i in 0..2_000 {
        writeln!(
            file,
            r#"{{"tpep_pickup_datetime":"2024-01-{:02} 08:00:00","passenger_count":{},"trip_distance":{}.1,"fare_amount":{}.37,"tip_amount":0.{}}}"#,
            i % 28 + 1,
            i % 4,
            i % 13,
            i % 50,
            i % 9
        )
        .unwrap();
    }

    let spec = QueryRegistry::with_builtins().get("daily").unwrap();
    let first = engine(97, 4)
        .run(Arc::clone(&spec), LineSource::open(file.path()).unwrap())
        .await
        .unwrap();
    let second = engine(97, 8)
        .run(Arc::clone(&spec), LineSource::open(file.path()).unwrap())
        .await
        .unwrap();

    assert_eq!(first.table.rows.len(), 28);
    assert_eq!(first.table, second.table);
}

#[tokio::test]
async fn test_fast_parser_matches_strict_on_clean_input() {
    let lines: Vec<String> = (0..300)
        .map(|i| {
            format!(
                r#"{{"trip_distance":{},"payment_type":{},"fare_amount":{}.5,"tip_amount":1.0}}"#,
                i % 11,
                i % 4 + 1,
                i % 30
            )
        })
        .collect();
    let spec = QueryRegistry::with_builtins().get("payment").unwrap();

    let strict = engine(32, 4)
        .run(Arc::clone(&spec), LineSource::from_lines("t", lines.clone()))
        .await
        .unwrap();
    let fast = Engine::new(
        EngineConfig::default()
            .with_chunk_size(32)
            .with_workers(4)
            .with_parser(ParserKind::Fast)
            .with_progress(false),
    )
    .unwrap()
    .run(spec, LineSource::from_lines("t", lines))
    .await
    .unwrap();

    assert_eq!(strict.table, fast.table);
}

#[tokio::test]
async fn test_custom_query_from_yaml() {
    let specs = parse_queries(
        r#"
queries:
  - name: long_by_vendor
    filter:
      - op: greater_than
        field: trip_distance
        value: 10
    group_by:
      kind: integer
      field: VendorID
    sums:
      - field: fare_amount
    columns:
      - kind: key
        header: VendorID
      - kind: count
        header: trips
      - kind: total
        header: fares
        sum: fare_amount
"#,
    )
    .unwrap();
    let mut registry = QueryRegistry::with_builtins();
    registry.register_all(specs).unwrap();

    let lines = vec![
        r#"{"VendorID":2,"trip_distance":12,"fare_amount":40}"#.to_string(),
        r#"{"VendorID":2,"trip_distance":15,"fare_amount":50}"#.to_string(),
        r#"{"VendorID":1,"trip_distance":3,"fare_amount":9}"#.to_string(),
    ];
    let output = engine(2, 2)
        .run(
            registry.get("long_by_vendor").unwrap(),
            LineSource::from_lines("t", lines),
        )
        .await
        .unwrap();
    assert_eq!(csv(&output), vec!["VendorID,trips,fares", "2,2,90.00"]);
}

#[tokio::test]
async fn test_missing_input_file() {
    let err = LineSource::open(std::path::Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, EngineError::SourceOpen { .. }));
}
