//! Record model and reserved fields.
//!
//! A record is one stored document: a JSON object carrying the user columns
//! of its collection plus two reserved fields the store owns outright:
//!
//! - `_id` — opaque identity assigned at write time (UUIDv4, simple hex).
//! - `InsertedDateTime` — record-creation timestamp, stamped as wall-clock
//!   UTC plus the deployment-wide offset, stored as RFC 3339 with
//!   millisecond precision. Never user-supplied, never updated.
//!
//! Timestamps are normalized to `DateTime<Utc>` before any comparison, so
//! window bounds are well-defined regardless of the caller's input format.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Reserved field holding the store-assigned opaque identity.
pub const FIELD_ID: &str = "_id";

/// Reserved field holding the record-creation timestamp.
pub const FIELD_INSERTED_AT: &str = "InsertedDateTime";

/// One stored document: field name to JSON value, in insertion order.
pub type Record = Map<String, Value>;

/// Returns true for the two field names the store reserves for itself.
pub fn is_reserved_field(name: &str) -> bool {
    name == FIELD_ID || name == FIELD_INSERTED_AT
}

/// Generate a fresh opaque record identity.
pub fn new_record_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Canonical on-disk form of a timestamp: RFC 3339 UTC with millisecond
/// precision (for example, `2024-06-01T12:00:00.000Z`).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a caller- or store-supplied timestamp into `DateTime<Utc>`.
///
/// Accepted forms, tried in order:
/// - RFC 3339 with any offset (normalized to UTC),
/// - naive date-times `YYYY-MM-DDTHH:MM:SS[.fff]` or with a space separator
///   (assumed UTC),
/// - bare dates `YYYY-MM-DD` (midnight UTC).
///
/// Returns `None` for anything else.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

/// Read and parse a record's `InsertedDateTime`, if present and well-formed.
pub fn inserted_at(record: &Record) -> Option<DateTime<Utc>> {
    match record.get(FIELD_INSERTED_AT) {
        Some(Value::String(s)) => parse_timestamp(s),
        _ => None,
    }
}

/// Build the placeholder record written at provisioning time.
///
/// Carries only the reserved fields; its sole purpose is to force physical
/// existence of a collection in stores that would otherwise materialize it
/// lazily on first write.
pub fn placeholder_record(stamped_at: DateTime<Utc>) -> Record {
    let mut record = Record::new();
    record.insert(FIELD_ID.to_string(), Value::String(new_record_id()));
    record.insert(
        FIELD_INSERTED_AT.to_string(),
        Value::String(format_timestamp(stamped_at)),
    );
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn reserved_fields_are_recognized() {
        assert!(is_reserved_field("_id"));
        assert!(is_reserved_field("InsertedDateTime"));
        assert!(!is_reserved_field("SID"));
    }

    #[test]
    fn record_ids_are_unique_hex() {
        let a = new_record_id();
        let b = new_record_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn format_then_parse_roundtrips_to_millis() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 45).unwrap();
        let s = format_timestamp(at);
        assert_eq!(s, "2024-06-01T12:30:45.000Z");
        assert_eq!(parse_timestamp(&s), Some(at));
    }

    #[test]
    fn parse_accepts_offset_and_normalizes_to_utc() {
        let parsed = parse_timestamp("2024-06-01T07:00:00+05:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 1, 2, 0, 0).unwrap());
    }

    #[test]
    fn parse_accepts_naive_and_date_only_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-06-01T12:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01 12:00:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-06-01"),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_timestamp("not a time"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn placeholder_carries_only_reserved_fields() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let rec = placeholder_record(at);
        assert_eq!(rec.len(), 2);
        assert!(rec.contains_key(FIELD_ID));
        assert_eq!(inserted_at(&rec), Some(at));
    }
}
