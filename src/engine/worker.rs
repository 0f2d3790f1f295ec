//! Chunk worker: one chunk in, one partial aggregate out

use super::batch::Chunk;
use crate::query::{Aggregate, AggregationSpec, GroupKey};
use crate::record::ParserKind;

/// Aggregate one chunk
///
/// Pure and self-contained: owns its chunk, touches nothing shared, and
/// never fails. Lines whose fields cannot be read as the query needs are dropped
/// and counted in `stats.skipped`.
pub fn process_chunk(chunk: Chunk, spec: &AggregationSpec, parser: ParserKind) -> Aggregate {
    let mut partial = Aggregate::new();
    let needs_record = spec.needs_record();

    for line in &chunk.lines {
        partial.stats.lines += 1;
        if line.trim().is_empty() {
            partial.stats.blank += 1;
            continue;
        }

        if !needs_record {
            partial.stats.matched += 1;
            partial.record(GroupKey::All, &[]);
            continue;
        }

        let record = parser.parse(line, &spec.coercion);
        match spec.evaluate(&record) {
            Ok(Some((key, values))) => {
                partial.stats.matched += 1;
                partial.record(key, &values);
            }
            Ok(None) => partial.stats.filtered += 1,
            Err(_) => partial.stats.skipped += 1,
        }
    }

    partial
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::builtin;

    fn chunk(lines: &[&str]) -> Chunk {
        Chunk {
            seq: 0,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_count_ignores_blank_lines() {
        let partial = process_chunk(
            chunk(&[r#"{"a":1}"#, "   ", r#"{"a":2}"#, ""]),
            &builtin::count(),
            ParserKind::Strict,
        );
        assert_eq!(partial.get(&GroupKey::All).unwrap().count, 2);
        assert_eq!(partial.stats.blank, 2);
        assert_eq!(partial.stats.lines, 4);
    }

    #[test]
    fn test_payment_filters_and_groups() {
        let partial = process_chunk(
            chunk(&[
                r#"{"trip_distance":6,"payment_type":1,"fare_amount":10,"tip_amount":2}"#,
                r#"{"trip_distance":3,"payment_type":1,"fare_amount":5,"tip_amount":1}"#,
                r#"{"trip_distance":8,"payment_type":2,"fare_amount":20,"tip_amount":4}"#,
            ]),
            &builtin::payment(),
            ParserKind::Strict,
        );
        assert_eq!(partial.len(), 2);
        let one = partial.get(&GroupKey::Int(1)).unwrap();
        assert_eq!(one.count, 1);
        assert_eq!(one.sums, vec![10.0, 2.0]);
        assert_eq!(partial.stats.filtered, 1);
    }

    #[test]
    fn test_unreadable_lines_are_skipped_not_fatal() {
        let partial = process_chunk(
            chunk(&[
                r#"{"trip_distance":"far","payment_type":1}"#,
                r#"{"trip_distance":9,"payment_type":"card"}"#,
                r#"{"trip_distance":9,"payment_type":1,"fare_amount":3}"#,
            ]),
            &builtin::payment(),
            ParserKind::Strict,
        );
        assert_eq!(partial.stats.skipped, 2);
        assert_eq!(partial.stats.matched, 1);
        assert_eq!(partial.get(&GroupKey::Int(1)).unwrap().sums, vec![3.0, 0.0]);
    }

    #[test]
    fn test_vendor_requires_string_flag_and_january() {
        let partial = process_chunk(
            chunk(&[
                r#"{"VendorID":2,"store_and_fwd_flag":"Y","tpep_pickup_datetime":"2024-01-09 11:00:00","passenger_count":3}"#,
                r#"{"VendorID":2,"store_and_fwd_flag":"N","tpep_pickup_datetime":"2024-01-09 11:00:00","passenger_count":1}"#,
                r#"{"VendorID":2,"store_and_fwd_flag":"Y","tpep_pickup_datetime":"2024-02-01 00:00:00","passenger_count":1}"#,
            ]),
            &builtin::vendor(),
            ParserKind::Strict,
        );
        let acc = partial.get(&GroupKey::Int(2)).unwrap();
        assert_eq!(acc.count, 1);
        assert_eq!(acc.sums, vec![3.0]);
        assert_eq!(partial.stats.filtered, 2);
    }

    #[test]
    fn test_fast_parser_gives_same_groups_on_clean_data() {
        let lines = [
            r#"{"tpep_pickup_datetime":"2024-01-05 08:00:00","passenger_count":1,"trip_distance":2.5,"fare_amount":12.0,"tip_amount":1.0}"#,
            r#"{"tpep_pickup_datetime":"2024-01-05 09:00:00","passenger_count":3,"trip_distance":1.5,"fare_amount":8.0,"tip_amount":0.5}"#,
        ];
        let strict = process_chunk(chunk(&lines), &builtin::daily(), ParserKind::Strict);
        let fast = process_chunk(chunk(&lines), &builtin::daily(), ParserKind::Fast);
        assert_eq!(strict, fast);
    }
}
