use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH_DAYS: i64 = 30;
const YEAR_DAYS: i64 = 365;

pub const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// How an elapsed duration is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeStyle {
    /// Largest unit only: `3mo`, `5h`, `45s`.
    Compact,
    /// Days, hours and minutes when non-zero, seconds always: `1d 5m 3s`.
    Composite,
}

/// Compact age of `since` relative to `now`. Timestamps in the future
/// (clock skew between the cluster and us) render as `0s`.
pub fn format_age(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_age_with(AgeStyle::Compact, since, now)
}

pub fn format_age_with(style: AgeStyle, since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - since).num_seconds().max(0);
    match style {
        AgeStyle::Compact => compact_duration(secs),
        AgeStyle::Composite => composite_duration(secs),
    }
}

/// Same as [`format_age`] measured against the current time.
pub fn age_since(since: DateTime<Utc>) -> String {
    format_age(since, Utc::now())
}

/// Age of an optional API timestamp, `"Unknown"` when the object has none.
pub fn age_of(ts: Option<&Time>, style: AgeStyle, now: DateTime<Utc>) -> String {
    match ts {
        Some(t) => format_age_with(style, t.0, now),
        None => "Unknown".to_string(),
    }
}

fn compact_duration(secs: i64) -> String {
    let days = secs / DAY;
    if days >= YEAR_DAYS {
        format!("{}y", days / YEAR_DAYS)
    } else if days >= MONTH_DAYS {
        format!("{}mo", days / MONTH_DAYS)
    } else if days > 0 {
        format!("{}d", days)
    } else if secs >= HOUR {
        format!("{}h", secs / HOUR)
    } else if secs >= MINUTE {
        format!("{}m", secs / MINUTE)
    } else {
        format!("{}s", secs)
    }
}

fn composite_duration(secs: i64) -> String {
    let days = secs / DAY;
    let hours = (secs % DAY) / HOUR;
    let minutes = (secs % HOUR) / MINUTE;
    let seconds = secs % MINUTE;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d ", days));
    }
    if hours > 0 {
        out.push_str(&format!("{}h ", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m ", minutes));
    }
    out.push_str(&format!("{}s", seconds));
    out
}

pub fn human_bytes(b: i64) -> String {
    if b == 0 {
        return "0 B".to_string();
    }
    const UNIT: i64 = 1024;
    if b < UNIT {
        return format!("{} B", b);
    }
    let suffixes = ["KB", "MB", "GB", "TB"];
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = b / UNIT;
    while n >= UNIT && exp < suffixes.len() - 1 {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}", b as f64 / div as f64, suffixes[exp])
}

/// Converts a memory quantity such as `16318044Ki` or `2Gi` to bytes.
/// Decimal exponents and fractional values are not handled. Values that would
/// overflow `i64` give `None`.
pub fn quantity_bytes(q: &str) -> Option<i64> {
    const SUFFIXES: [(&str, i64); 8] = [
        ("Ki", 1 << 10),
        ("Mi", 1 << 20),
        ("Gi", 1 << 30),
        ("Ti", 1 << 40),
        ("k", 1_000),
        ("M", 1_000_000),
        ("G", 1_000_000_000),
        ("T", 1_000_000_000_000),
    ];

    for (suffix, mult) in SUFFIXES {
        if let Some(num) = q.strip_suffix(suffix) {
            return num.parse::<i64>().ok().and_then(|n| n.checked_mul(mult));
        }
    }
    q.parse::<i64>().ok()
}

/// Drops the kubectl last-applied annotation; `None` if nothing else remains.
pub fn filter_annotations(
    annotations: Option<BTreeMap<String, String>>,
) -> Option<BTreeMap<String, String>> {
    let mut annotations = annotations?;
    annotations.remove(LAST_APPLIED_ANNOTATION);
    if annotations.is_empty() {
        None
    } else {
        Some(annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_compact_picks_largest_unit() {
        let now = now();
        assert_eq!(format_age(now - Duration::seconds(45), now), "45s");
        assert_eq!(format_age(now - Duration::minutes(12), now), "12m");
        assert_eq!(format_age(now - Duration::hours(5), now), "5h");
        assert_eq!(format_age(now - Duration::days(29), now), "29d");
        assert_eq!(format_age(now - Duration::days(90), now), "3mo");
        assert_eq!(format_age(now - Duration::days(400), now), "1y");
    }

    #[test]
    fn test_future_timestamp_clamps_to_zero() {
        let now = now();
        assert_eq!(format_age(now + Duration::minutes(3), now), "0s");
        assert_eq!(
            format_age_with(AgeStyle::Composite, now + Duration::days(1), now),
            "0s"
        );
    }

    #[test]
    fn test_composite_skips_zero_units() {
        let now = now();
        let since = now - (Duration::days(1) + Duration::minutes(5) + Duration::seconds(3));
        assert_eq!(format_age_with(AgeStyle::Composite, since, now), "1d 5m 3s");

        let since = now - (Duration::hours(2) + Duration::seconds(7));
        assert_eq!(format_age_with(AgeStyle::Composite, since, now), "2h 7s");
    }

    #[test]
    fn test_age_of_missing_timestamp() {
        assert_eq!(age_of(None, AgeStyle::Compact, now()), "Unknown");
        let ts = Time(now() - Duration::hours(3));
        assert_eq!(age_of(Some(&ts), AgeStyle::Compact, now()), "3h");
    }

    #[test]
    fn test_quantity_bytes() {
        assert_eq!(quantity_bytes("2Gi"), Some(2 * 1024 * 1024 * 1024));
        assert_eq!(quantity_bytes("1500"), Some(1500));
        assert_eq!(quantity_bytes("3M"), Some(3_000_000));
        assert_eq!(quantity_bytes("lots"), None);
        assert_eq!(quantity_bytes("99999999Ti"), None);
        assert_eq!(quantity_bytes("9223372036854775807"), Some(i64::MAX));
        assert_eq!(human_bytes(quantity_bytes("16318044Ki").unwrap()), "15.6 GB");
    }

    #[test]
    fn test_filter_annotations() {
        let mut a = BTreeMap::new();
        a.insert(LAST_APPLIED_ANNOTATION.to_string(), "{}".to_string());
        assert_eq!(filter_annotations(Some(a.clone())), None);

        a.insert("team".to_string(), "infra".to_string());
        let kept = filter_annotations(Some(a)).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept["team"], "infra");
        assert_eq!(filter_annotations(None), None);
    }
}
