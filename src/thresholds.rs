//! ==============================================================================
//! thresholds.rs - operational threshold evaluator
//! ==============================================================================
//!
//! purpose:
//!     pure rule table mapping current sensor values to warning strings.
//!     the state store calls this on every accepted reading, so warnings
//!     always describe the sensors they are served alongside.
//!
//! the table is order-sensitive: warnings are appended in declaration order.
//! a channel missing from the reading triggers nothing. the dashboard applies
//! its own display thresholds on top; these are the backend's only rules.
//!
//! ==============================================================================

use std::collections::BTreeMap;

struct Rule {
    channel: &'static str,
    out_of_range: fn(f64) -> bool,
    warning: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        channel: "temperature",
        out_of_range: |v| v > 30.0,
        warning: "High temperature detected",
    },
    Rule {
        channel: "ph",
        out_of_range: |v| !(5.5..=7.5).contains(&v),
        warning: "pH level out of range",
    },
];

/// evaluate the rule table against a set of channel values.
/// deterministic, no state, no side effects.
pub fn evaluate(sensors: &BTreeMap<String, f64>) -> Vec<String> {
    RULES
        .iter()
        .filter(|rule| {
            sensors
                .get(rule.channel)
                .is_some_and(|v| (rule.out_of_range)(*v))
        })
        .map(|rule| rule.warning.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensors(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn high_temperature_only() {
        let warnings = evaluate(&sensors(&[("temperature", 35.0), ("ph", 6.0)]));
        assert_eq!(warnings, vec!["High temperature detected"]);
    }

    #[test]
    fn ph_out_of_range_only() {
        let warnings = evaluate(&sensors(&[("temperature", 25.0), ("ph", 8.0)]));
        assert_eq!(warnings, vec!["pH level out of range"]);

        let low = evaluate(&sensors(&[("temperature", 25.0), ("ph", 5.4)]));
        assert_eq!(low, vec!["pH level out of range"]);
    }

    #[test]
    fn both_warnings_in_table_order() {
        let warnings = evaluate(&sensors(&[("temperature", 31.0), ("ph", 4.0)]));
        assert_eq!(
            warnings,
            vec!["High temperature detected", "pH level out of range"]
        );
    }

    #[test]
    fn in_range_yields_nothing() {
        let warnings = evaluate(&sensors(&[
            ("temperature", 25.0),
            ("ph", 6.0),
            ("humidity", 45.0),
            ("turbidity", 0.8),
        ]));
        assert!(warnings.is_empty());
    }

    #[test]
    fn boundary_values_are_in_range() {
        // 30.0 and the 5.5/7.5 endpoints are still acceptable
        let warnings = evaluate(&sensors(&[("temperature", 30.0), ("ph", 5.5)]));
        assert!(warnings.is_empty());
        let warnings = evaluate(&sensors(&[("ph", 7.5)]));
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_channels_trigger_nothing() {
        let warnings = evaluate(&sensors(&[("humidity", 99.0)]));
        assert!(warnings.is_empty());
    }
}
