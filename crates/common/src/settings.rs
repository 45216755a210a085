//! Cleanup retention values and their validation

use serde_json::Value;

/// Retention used when nothing valid is stored (24 hours)
pub const DEFAULT_CLEANUP_AFTER_MINUTES: u32 = 1440;

/// Upper bound of the retention setting (one year)
pub const MAX_CLEANUP_AFTER_MINUTES: u32 = 525_600;

/// Read an integer the way a lenient form field would be read.
///
/// Accepts JSON integers, floats (truncated toward zero) and strings holding
/// an integer. Anything else yields `None`.
pub fn parse_minutes(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Check a retention value against `[0, MAX_CLEANUP_AFTER_MINUTES]`
pub fn validate_minutes(minutes: i64) -> Option<u32> {
    u32::try_from(minutes)
        .ok()
        .filter(|m| *m <= MAX_CLEANUP_AFTER_MINUTES)
}

/// Human-readable retention for log output
pub fn describe_retention(minutes: u32) -> String {
    if minutes == 0 {
        return "disabled".to_string();
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{} hours {} minutes", hours, mins)
    } else {
        format!("{} minutes", mins)
    }
}
