//! The built-in trip queries

use super::{AggregationSpec, Column, GroupBy, Predicate, SumField};
use crate::record::CoercionTable;

const PICKUP: &str = "tpep_pickup_datetime";
const JANUARY_2024: &str = "2024-01";

/// Old positional names, still accepted on the command line
pub const ALIASES: &[(&str, &str)] = &[
    ("query1", "count"),
    ("query2", "payment"),
    ("query3", "vendor"),
    ("query4", "daily"),
];

pub fn all() -> Vec<AggregationSpec> {
    vec![count(), payment(), vendor(), daily()]
}

/// Total number of non-blank lines
pub fn count() -> AggregationSpec {
    AggregationSpec {
        name: "count".to_string(),
        description: "Total number of trips".to_string(),
        filter: vec![],
        group_by: GroupBy::All,
        sums: vec![],
        columns: vec![
            count_col("total_trips"),
            Column::ScaledCount {
                header: "approx_millions".to_string(),
                divisor: 1_000_000.0,
                precision: 2,
            },
        ],
        coercion: CoercionTable::trip_records(),
    }
}

/// Long trips (over 5 miles) by payment type
pub fn payment() -> AggregationSpec {
    AggregationSpec {
        name: "payment".to_string(),
        description: "Trips over 5 miles by payment type: count, average fare, total tip"
            .to_string(),
        filter: vec![Predicate::GreaterThan {
            field: "trip_distance".to_string(),
            value: 5.0,
            default: 0.0,
        }],
        group_by: GroupBy::Integer {
            field: "payment_type".to_string(),
            default: -1,
        },
        sums: vec![SumField::new("fare_amount"), SumField::new("tip_amount")],
        columns: vec![
            key_col("payment_type"),
            count_col("num_trips"),
            average_col("avg_fare", "fare_amount", 2),
            total_col("total_tip", "tip_amount"),
        ],
        coercion: CoercionTable::trip_records(),
    }
}

/// Store-and-forward trips in January 2024 by vendor
pub fn vendor() -> AggregationSpec {
    AggregationSpec {
        name: "vendor".to_string(),
        description: "Store-and-forward trips in January 2024 by vendor: count, average passengers"
            .to_string(),
        filter: vec![
            Predicate::Equals {
                field: "store_and_fwd_flag".to_string(),
                value: "Y".to_string(),
            },
            Predicate::Prefix {
                field: PICKUP.to_string(),
                prefix: JANUARY_2024.to_string(),
            },
        ],
        group_by: GroupBy::Integer {
            field: "VendorID".to_string(),
            default: -1,
        },
        sums: vec![SumField::new("passenger_count")],
        columns: vec![
            key_col("VendorID"),
            count_col("trips"),
            average_col("avg_passengers", "passenger_count", 6),
        ],
        coercion: CoercionTable::trip_records(),
    }
}

/// Daily rollup for January 2024
pub fn daily() -> AggregationSpec {
    AggregationSpec {
        name: "daily".to_string(),
        description: "January 2024 daily rollup: trips, average passengers/distance/fare, total tip"
            .to_string(),
        filter: vec![Predicate::Prefix {
            field: PICKUP.to_string(),
            prefix: JANUARY_2024.to_string(),
        }],
        group_by: GroupBy::Text {
            field: PICKUP.to_string(),
            chars: Some(10),
            default: String::new(),
        },
        sums: vec![
            SumField::new("passenger_count"),
            SumField::new("trip_distance"),
            SumField::new("fare_amount"),
            SumField::new("tip_amount"),
        ],
        columns: vec![
            key_col("trip_date"),
            count_col("total_trips"),
            average_col("avg_passengers", "passenger_count", 2),
            average_col("avg_distance", "trip_distance", 2),
            average_col("avg_fare", "fare_amount", 2),
            total_col("total_tip", "tip_amount"),
        ],
        coercion: CoercionTable::trip_records(),
    }
}

fn key_col(header: &str) -> Column {
    Column::Key {
        header: header.to_string(),
    }
}

fn count_col(header: &str) -> Column {
    Column::Count {
        header: header.to_string(),
    }
}

fn average_col(header: &str, sum: &str, precision: usize) -> Column {
    Column::Average {
        header: header.to_string(),
        sum: sum.to_string(),
        precision,
    }
}

fn total_col(header: &str, sum: &str) -> Column {
    Column::Total {
        header: header.to_string(),
        sum: sum.to_string(),
        precision: 2,
    }
}
