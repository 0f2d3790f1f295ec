//! Split-based fast path
//!
//! Strips the outer braces, splits on `,`, then splits each part on its first
//! `:`. Much cheaper than the scanner, but any string value containing `,` or
//! `:` is cut apart, so it is only safe on data known to be free of them.
//! Typing comes entirely from the caller's [`CoercionTable`].

use super::{CoercionTable, Record};
use tracing::trace;

/// Parse one line with the split-based fast path
///
/// # Examples
///
/// ```
/// use tripagg::record::{parse_line_fast, CoercionTable, Scalar};
///
/// let table = CoercionTable::trip_records();
/// let record = parse_line_fast(r#"{"VendorID": 2, "store_and_fwd_flag": "N"}"#, &table);
/// assert_eq!(record.get("VendorID"), Some(&Scalar::Int(2)));
/// assert_eq!(record.get("store_and_fwd_flag"), Some(&Scalar::Str("N".into())));
/// ```
pub fn parse_line_fast(line: &str, table: &CoercionTable) -> Record {
    let body = line.trim().trim_matches(|c: char| c == '{' || c == '}');
    let mut record = Record::new();

    for part in body.split(',') {
        let Some((raw_key, raw_value)) = part.split_once(':') else {
            trace!("fast parser skipping part without ':': {:?}", part);
            continue;
        };
        let key = raw_key.trim().trim_matches('"');
        let value = raw_value.trim().trim_matches('"');
        record.insert(key, table.coerce_raw(key, value));
    }

    record
}
