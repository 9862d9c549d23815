//! Resolve date and date-time property values into points in time.
//!
//! The layout of a value is decided in this order:
//!
//! 1. a trailing `Z` makes it an absolute UTC date-time,
//! 2. a `TZID` parameter makes it wall-clock time in that zone (unknown zones fall back to UTC),
//! 3. an 8 character value is a date in the default zone, whatever `VALUE` says,
//! 4. otherwise `VALUE=DATE` selects the date layout and anything else the date-time layout,
//!    read in the default zone.

use chrono::{DateTime, MappedLocalTime, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};

use super::{Tz, lookup_tzid};
use crate::parser::Params;

pub const DATE_LAYOUT: &str = "%Y%m%d";
pub const DATETIME_LAYOUT_UTC: &str = "%Y%m%dT%H%M%SZ";
pub const DATETIME_LAYOUT_LOCAL: &str = "%Y%m%dT%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalDateTimeError {
    #[error("invalid date-time {value:?}: {source}")]
    ParseError {
        value: String,
        source: chrono::ParseError,
    },
    #[error("local time {0} does not exist in {1}")]
    LocalTimeGap(NaiveDateTime, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Date,
    DateTime,
}

/// Resolve `value` using its `params`; `default_tz` applies to values without zone information.
pub fn resolve_datetime(
    value: &str,
    params: &Params,
    default_tz: Tz,
) -> Result<DateTime<Tz>, CalDateTimeError> {
    if value.ends_with('Z') {
        let naive = parse_naive_datetime(value, DATETIME_LAYOUT_UTC)?;
        return Ok(Tz::UTC.from_utc_datetime(&naive));
    }

    if let Some(tzid) = params.get_tzid() {
        let tz = match lookup_tzid(tzid) {
            Some(tz) => Tz::Olson(tz),
            None => {
                tracing::warn!(tzid, "Unknown TZID, falling back to UTC");
                Tz::UTC
            }
        };
        let layout = if value.len() == 8 {
            Layout::Date
        } else {
            Layout::DateTime
        };
        return parse_in(value, layout, tz);
    }

    if value.len() == 8 {
        return parse_in(value, Layout::Date, default_tz);
    }

    let layout = match params.get_value_type() {
        Some("DATE") => Layout::Date,
        _ => Layout::DateTime,
    };
    parse_in(value, layout, default_tz)
}

fn parse_naive_datetime(value: &str, layout: &str) -> Result<NaiveDateTime, CalDateTimeError> {
    NaiveDateTime::parse_from_str(value, layout).map_err(|source| CalDateTimeError::ParseError {
        value: value.to_owned(),
        source,
    })
}

fn parse_in(value: &str, layout: Layout, tz: Tz) -> Result<DateTime<Tz>, CalDateTimeError> {
    let naive = match layout {
        Layout::Date => NaiveDate::parse_from_str(value, DATE_LAYOUT)
            .map_err(|source| CalDateTimeError::ParseError {
                value: value.to_owned(),
                source,
            })?
            .and_time(chrono::NaiveTime::MIN),
        Layout::DateTime => parse_naive_datetime(value, DATETIME_LAYOUT_LOCAL)?,
    };
    localize(naive, tz)
}

/// Attach `tz` to a wall-clock time.
///
/// Ambiguous times take the earlier instant, times inside a DST gap are moved one hour later.
fn localize(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Tz>, CalDateTimeError> {
    match tz.from_local_datetime(&naive) {
        MappedLocalTime::Single(dt) | MappedLocalTime::Ambiguous(dt, _) => Ok(dt),
        MappedLocalTime::None => tz
            .from_local_datetime(&(naive + TimeDelta::hours(1)))
            .earliest()
            .ok_or_else(|| CalDateTimeError::LocalTimeGap(naive, tz.name())),
    }
}
