//! Round signal model
//!
//! A round is a time-boxed instance of one test, published by a teacher-side
//! authority through a single mutable signal value. The core only ever reads
//! rounds; it never writes them. This module defines the validated [`Round`]
//! record, the raw signal value as it arrives from the outside, and the
//! expiry predicate.

use serde::{Deserialize, Serialize};

/// A validated round as adopted by the synchronizer
///
/// Identity is `id`: two signal deliveries with the same `id` describe the
/// same round even if the other fields differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    /// Opaque round token assigned by the publishing authority
    pub id: String,
    /// Reference into the content bank
    pub test_id: String,
    /// Round start in epoch milliseconds
    pub start_time: i64,
    /// Round duration in seconds
    pub duration: u64,
}

impl Round {
    /// Returns the end of the round in epoch milliseconds
    pub fn end_time(&self) -> i64 {
        self.start_time + (self.duration as i64) * 1000
    }

    /// Whether the round has expired at `now_ms`
    ///
    /// A round is expired strictly after its end time; at exactly the end
    /// time it is still live.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.end_time()
    }
}

/// The raw "current round" signal value before validation
///
/// The publishing surface is not trusted to always write well-formed rounds:
/// ids may be missing or numeric, and partially-written values do occur. A
/// raw value with no usable `id` or `testId` is treated exactly like an
/// absent signal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRound {
    /// Round token; may be a JSON string or number
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// Content reference; may be a JSON string or number
    #[serde(default)]
    pub test_id: Option<serde_json::Value>,
    /// Round start in epoch milliseconds
    #[serde(default)]
    pub start_time: i64,
    /// Round duration in seconds
    #[serde(default)]
    pub duration: u64,
}

/// Stringifies a scalar token, rejecting anything non-scalar or empty
fn token(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl RawRound {
    /// Validates the raw signal into a [`Round`]
    ///
    /// Returns `None` for a malformed round (missing `id` or `testId`),
    /// which callers treat identically to "no round".
    pub fn normalize(self) -> Option<Round> {
        Some(Round {
            id: token(self.id)?,
            test_id: token(self.test_id)?,
            start_time: self.start_time,
            duration: self.duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawRound {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_normalize_complete_signal() {
        let round = raw(r#"{"id":"r1","testId":"t1","startTime":1000,"duration":10}"#)
            .normalize()
            .unwrap();
        assert_eq!(round.id, "r1");
        assert_eq!(round.test_id, "t1");
        assert_eq!(round.start_time, 1000);
        assert_eq!(round.duration, 10);
    }

    #[test]
    fn test_normalize_numeric_id() {
        let round = raw(r#"{"id":7,"testId":"t1","startTime":0,"duration":5}"#)
            .normalize()
            .unwrap();
        assert_eq!(round.id, "7");
    }

    #[test]
    fn test_malformed_round_is_no_round() {
        assert!(raw(r#"{"testId":"t1","startTime":0,"duration":5}"#)
            .normalize()
            .is_none());
        assert!(raw(r#"{"id":"r1","startTime":0,"duration":5}"#)
            .normalize()
            .is_none());
        assert!(raw(r#"{"id":"","testId":"t1"}"#).normalize().is_none());
        assert!(raw(r#"{"id":null,"testId":"t1"}"#).normalize().is_none());
    }

    #[test]
    fn test_expiry_is_strict() {
        let round = Round {
            id: "r1".to_owned(),
            test_id: "t1".to_owned(),
            start_time: 1_000,
            duration: 10,
        };
        assert_eq!(round.end_time(), 11_000);
        assert!(!round.is_expired(11_000));
        assert!(round.is_expired(11_001));
        assert!(!round.is_expired(5_000));
    }
}
