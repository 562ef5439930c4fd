//! Conversion of a local date and time from one timezone into another.
//!
//! The conversion is pure: the naive date/time is pinned to an absolute
//! instant in the source zone and that instant is re-expressed in the
//! destination zone. Local times that do not exist (spring-forward gaps) or
//! exist twice (fall-back overlaps) are rejected rather than shifted.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::zones::parse_zone;

/// Why a conversion could not be performed.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// A field is empty or names an unknown zone.
    InvalidInput(String),
    /// The date/time does not denote exactly one instant in the source zone.
    InvalidDateTime(String),
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionError::InvalidInput(reason) => write!(f, "Invalid input: {reason}"),
            ConversionError::InvalidDateTime(reason) => {
                write!(f, "Invalid date or time: {reason}")
            }
        }
    }
}

impl std::error::Error for ConversionError {}

/// Result of a conversion: the same instant seen from both zones.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedTime {
    pub source: DateTime<Tz>,
    pub destination: DateTime<Tz>,
}

impl ConvertedTime {
    /// The absolute instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.destination.with_timezone(&Utc)
    }

    pub fn destination_zone(&self) -> Tz {
        self.destination.timezone()
    }

    /// Clock time in the destination zone, `HH:MM:SS`.
    pub fn clock(&self) -> String {
        self.destination.format("%H:%M:%S").to_string()
    }

    /// Full calendar date in the destination zone, e.g. `Wednesday, January 15, 2025`.
    pub fn calendar_date(&self) -> String {
        self.destination.format("%A, %B %-d, %Y").to_string()
    }

    /// Zone abbreviation and offset, e.g. `EST (-05:00)`.
    pub fn zone_name(&self) -> String {
        self.destination.format("%Z (%:z)").to_string()
    }
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, ConversionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::InvalidInput(format!("{field} is empty")));
    }
    Ok(trimmed)
}

fn zone(value: &str, field: &str) -> Result<Tz, ConversionError> {
    let name = required(value, field)?;
    parse_zone(name)
        .ok_or_else(|| ConversionError::InvalidInput(format!("unknown {field} '{name}'")))
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// Interpret `date`/`time` in `source_zone` and express the instant in `dest_zone`.
///
/// `date` is `YYYY-MM-DD`, `time` is `HH:MM` or `HH:MM:SS`, zones are IANA
/// identifiers.
pub fn convert(
    date: &str,
    time: &str,
    source_zone: &str,
    dest_zone: &str,
) -> Result<ConvertedTime, ConversionError> {
    let date = required(date, "date")?;
    let time = required(time, "time")?;
    let source_tz = zone(source_zone, "source zone")?;
    let dest_tz = zone(dest_zone, "destination zone")?;

    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        ConversionError::InvalidDateTime(format!("'{date}' is not a YYYY-MM-DD date"))
    })?;
    let clock = parse_time(time).ok_or_else(|| {
        ConversionError::InvalidDateTime(format!("'{time}' is not a HH:MM or HH:MM:SS time"))
    })?;
    let naive = NaiveDateTime::new(day, clock);

    let source = match source_tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(_, _) => {
            return Err(ConversionError::InvalidDateTime(format!(
                "{naive} occurs twice in {} (clocks fall back)",
                source_tz.name()
            )));
        }
        LocalResult::None => {
            return Err(ConversionError::InvalidDateTime(format!(
                "{naive} does not exist in {} (clocks spring forward)",
                source_tz.name()
            )));
        }
    };

    Ok(ConvertedTime {
        destination: source.with_timezone(&dest_tz),
        source,
    })
}
