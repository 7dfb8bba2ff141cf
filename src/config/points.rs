//! Best-effort extraction of polling targets from agent configuration.

use serde_yaml::Value;

use crate::config::document::scalar_to_string;

/// A target address plus its polling-interval multiplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingPoint {
    pub address: String,
    pub multiplier: i64,
}

/// Multiplier applied when a record does not configure one.
pub const DEFAULT_POLLING_MULTIPLIER: i64 = 1;

/// Convert loosely-typed records into [`PollingPoint`]s.
///
/// Input order is preserved. Records that are not mappings, or that have
/// no `address`, are skipped rather than rejected; agents tolerate
/// partially broken target lists.
pub fn polling_points(records: &[Value]) -> Vec<PollingPoint> {
    let mut results = Vec::new();

    for record in records {
        if !record.is_mapping() {
            continue;
        }
        let Some(address) = record.get("address").and_then(scalar_to_string) else {
            continue;
        };
        let multiplier = record
            .get("multiplier")
            .and_then(Value::as_i64)
            .unwrap_or(DEFAULT_POLLING_MULTIPLIER);
        results.push(PollingPoint {
            address,
            multiplier,
        });
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(yaml: &str) -> Vec<Value> {
        serde_yaml::from_str(yaml).expect("parse records")
    }

    #[test]
    fn test_malformed_entries_dropped_order_preserved() {
        let data = records(
            r#"
- address: 1.2.3.4
- foo: bar
- address: x
  multiplier: 5
"#,
        );

        let points = polling_points(&data);
        assert_eq!(
            points,
            vec![
                PollingPoint {
                    address: "1.2.3.4".to_string(),
                    multiplier: 1,
                },
                PollingPoint {
                    address: "x".to_string(),
                    multiplier: 5,
                },
            ]
        );
    }

    #[test]
    fn test_non_mapping_entries_skipped() {
        let data = records("- plain-string\n- 42\n- address: 10.0.0.1\n");
        let points = polling_points(&data);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].address, "10.0.0.1");
    }

    #[test]
    fn test_numeric_address_coerced_to_string() {
        let data = records("- address: 17\n");
        let points = polling_points(&data);
        assert_eq!(points[0].address, "17");
    }

    #[test]
    fn test_non_integer_multiplier_uses_default() {
        let data = records("- address: host1\n  multiplier: soon\n");
        let points = polling_points(&data);
        assert_eq!(points[0].multiplier, DEFAULT_POLLING_MULTIPLIER);
    }

    #[test]
    fn test_empty_input() {
        assert!(polling_points(&[]).is_empty());
    }
}
