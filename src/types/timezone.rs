use chrono::{FixedOffset, Local, MappedLocalTime, NaiveDate, NaiveDateTime, TimeZone};
use derive_more::{Display, From};
use std::str::FromStr;

/// Time zone of a resolved date value.
///
/// `Local` is the zone of the host running the parser, `Olson` any zone of the IANA database
/// (including UTC).
#[derive(Debug, Clone, Copy, From, PartialEq, Eq)]
pub enum Tz {
    Local,
    Olson(chrono_tz::Tz),
}

impl Tz {
    pub const UTC: Self = Self::Olson(chrono_tz::UTC);

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "Local",
            Self::Olson(tz) => tz.name(),
        }
    }
}

impl Default for Tz {
    fn default() -> Self {
        Self::Local
    }
}

/// Look up a TZID parameter value.
///
/// Tries the IANA database first and then the names used by Microsoft products.
pub fn lookup_tzid(tzid: &str) -> Option<chrono_tz::Tz> {
    chrono_tz::Tz::from_str(tzid)
        .ok()
        .or_else(|| get_proprietary_tzid(tzid))
}

/// Map a proprietary (mostly Windows) zone name to its IANA zone.
pub fn get_proprietary_tzid(tzid: &str) -> Option<chrono_tz::Tz> {
    PROPRIETARY_TZIDS.get(tzid).copied()
}

static PROPRIETARY_TZIDS: phf::Map<&'static str, chrono_tz::Tz> = phf::phf_map! {
    "W. Europe Standard Time" => chrono_tz::Europe::Berlin,
    "Romance Standard Time" => chrono_tz::Europe::Paris,
    "Central Europe Standard Time" => chrono_tz::Europe::Budapest,
    "Central European Standard Time" => chrono_tz::Europe::Warsaw,
    "GMT Standard Time" => chrono_tz::Europe::London,
    "Greenwich Standard Time" => chrono_tz::Atlantic::Reykjavik,
    "GTB Standard Time" => chrono_tz::Europe::Bucharest,
    "E. Europe Standard Time" => chrono_tz::Europe::Chisinau,
    "Russian Standard Time" => chrono_tz::Europe::Moscow,
    "Turkey Standard Time" => chrono_tz::Europe::Istanbul,
    "Israel Standard Time" => chrono_tz::Asia::Jerusalem,
    "South Africa Standard Time" => chrono_tz::Africa::Johannesburg,
    "Arabian Standard Time" => chrono_tz::Asia::Dubai,
    "India Standard Time" => chrono_tz::Asia::Kolkata,
    "China Standard Time" => chrono_tz::Asia::Shanghai,
    "Singapore Standard Time" => chrono_tz::Asia::Singapore,
    "Korea Standard Time" => chrono_tz::Asia::Seoul,
    "Tokyo Standard Time" => chrono_tz::Asia::Tokyo,
    "AUS Eastern Standard Time" => chrono_tz::Australia::Sydney,
    "New Zealand Standard Time" => chrono_tz::Pacific::Auckland,
    "Hawaiian Standard Time" => chrono_tz::Pacific::Honolulu,
    "Alaskan Standard Time" => chrono_tz::America::Anchorage,
    "Pacific Standard Time" => chrono_tz::America::Los_Angeles,
    "US Mountain Standard Time" => chrono_tz::America::Phoenix,
    "Mountain Standard Time" => chrono_tz::America::Denver,
    "Central Standard Time" => chrono_tz::America::Chicago,
    "Eastern Standard Time" => chrono_tz::America::New_York,
    "Atlantic Standard Time" => chrono_tz::America::Halifax,
    "E. South America Standard Time" => chrono_tz::America::Sao_Paulo,
    "UTC" => chrono_tz::UTC,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CalTimezoneOffset {
    Local(FixedOffset),
    Olson(chrono_tz::TzOffset),
}

impl chrono::Offset for CalTimezoneOffset {
    fn fix(&self) -> FixedOffset {
        match self {
            Self::Local(offset) => *offset,
            Self::Olson(olson) => olson.fix(),
        }
    }
}

impl TimeZone for Tz {
    type Offset = CalTimezoneOffset;

    fn from_offset(offset: &Self::Offset) -> Self {
        match offset {
            CalTimezoneOffset::Local(_) => Self::Local,
            CalTimezoneOffset::Olson(offset) => Self::Olson(chrono_tz::Tz::from_offset(offset)),
        }
    }

    #[cfg(not(tarpaulin_include))] // Only used by deprecated chrono::Date type
    fn offset_from_local_date(&self, local: &NaiveDate) -> MappedLocalTime<Self::Offset> {
        match self {
            Self::Local => Local
                .offset_from_local_date(local)
                .map(CalTimezoneOffset::Local),
            Self::Olson(tz) => tz
                .offset_from_local_date(local)
                .map(CalTimezoneOffset::Olson),
        }
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> MappedLocalTime<Self::Offset> {
        match self {
            Self::Local => Local
                .offset_from_local_datetime(local)
                .map(CalTimezoneOffset::Local),
            Self::Olson(tz) => tz
                .offset_from_local_datetime(local)
                .map(CalTimezoneOffset::Olson),
        }
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> Self::Offset {
        match self {
            Self::Local => CalTimezoneOffset::Local(Local.offset_from_utc_datetime(utc)),
            Self::Olson(tz) => CalTimezoneOffset::Olson(tz.offset_from_utc_datetime(utc)),
        }
    }

    #[cfg(not(tarpaulin_include))] // Only used by deprecated chrono::Date type
    fn offset_from_utc_date(&self, utc: &NaiveDate) -> Self::Offset {
        match self {
            Self::Local => CalTimezoneOffset::Local(Local.offset_from_utc_date(utc)),
            Self::Olson(tz) => CalTimezoneOffset::Olson(tz.offset_from_utc_date(utc)),
        }
    }
}
