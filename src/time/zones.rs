//! Timezone identifiers offered to the user.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Zones presented by `tzalarm zones`, before validation against the tz database.
///
/// `IST` is an abbreviation rather than a database name and is filtered out
/// by [`supported_zones`]; India is covered by `Asia/Kolkata`.
const CURATED_ZONES: &[&str] = &[
    "UTC",
    "America/New_York",
    "America/Chicago",
    "America/Denver",
    "America/Los_Angeles",
    "America/Toronto",
    "America/Vancouver",
    "America/Mexico_City",
    "America/Sao_Paulo",
    "America/Buenos_Aires",
    "Europe/London",
    "Europe/Paris",
    "Europe/Berlin",
    "Europe/Rome",
    "Europe/Madrid",
    "Europe/Amsterdam",
    "Europe/Stockholm",
    "Europe/Moscow",
    "Asia/Tokyo",
    "Asia/Shanghai",
    "Asia/Hong_Kong",
    "Asia/Singapore",
    "Asia/Seoul",
    "IST",
    "Asia/Kolkata",
    "Asia/Dubai",
    "Asia/Jakarta",
    "Asia/Bangkok",
    "Australia/Sydney",
    "Australia/Melbourne",
    "Australia/Perth",
    "Pacific/Auckland",
    "Pacific/Honolulu",
    "Africa/Cairo",
    "Africa/Johannesburg",
    "Africa/Lagos",
];

/// Look up an IANA zone identifier.
pub fn parse_zone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// The curated zones that exist in the tz database, sorted by name.
pub fn supported_zones() -> Vec<Tz> {
    let mut zones: Vec<Tz> = CURATED_ZONES.iter().filter_map(|name| parse_zone(name)).collect();
    zones.sort_by_key(|tz| tz.name());
    zones.dedup();
    zones
}

/// Human label such as `New York (-05:00)`, using the offset in effect at `now`.
pub fn zone_label(zone: Tz, now: DateTime<Utc>) -> String {
    let offset = now.with_timezone(&zone).format("%:z");
    let city = zone
        .name()
        .rsplit('/')
        .next()
        .unwrap_or(zone.name())
        .replace('_', " ");
    format!("{city} ({offset})")
}

/// Best-effort detection of the system timezone.
///
/// Checks `TZ`, then the `/etc/localtime` link target, then falls back to UTC.
pub fn detect_local_zone() -> Tz {
    if let Ok(value) = std::env::var("TZ")
        && let Some(zone) = parse_zone(value.trim_start_matches(':'))
    {
        return zone;
    }

    if let Ok(target) = std::fs::read_link("/etc/localtime") {
        let target = target.to_string_lossy();
        if let Some((_, name)) = target.split_once("zoneinfo/")
            && let Some(zone) = parse_zone(name)
        {
            return zone;
        }
    }

    Tz::UTC
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_supported_zones_are_valid_and_sorted() {
        let zones = supported_zones();
        assert!(zones.contains(&Tz::UTC));
        assert!(zones.contains(&Tz::Asia__Tokyo));
        assert!(!zones.iter().any(|tz| tz.name() == "IST"));

        let names: Vec<&str> = zones.iter().map(|tz| tz.name()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_parse_zone() {
        assert_eq!(parse_zone(" Europe/Paris "), Some(Tz::Europe__Paris));
        assert_eq!(parse_zone("Mars/Olympus_Mons"), None);
        assert_eq!(parse_zone(""), None);
    }

    #[test]
    fn test_zone_label_uses_city_and_current_offset() {
        let winter = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap();

        assert_eq!(zone_label(Tz::America__New_York, winter), "New York (-05:00)");
        assert_eq!(zone_label(Tz::America__New_York, summer), "New York (-04:00)");
        assert_eq!(zone_label(Tz::UTC, winter), "UTC (+00:00)");
    }
}
