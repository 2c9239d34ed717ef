//! Settings shared by every report render.

use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;

use crate::model::CompanyProfile;

pub const DEFAULT_LOGO_PATH: &str = "technorth.jpeg";
pub const DEFAULT_UTC_OFFSET: &str = "-06:00";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid UTC offset '{0}', expected [+|-]HH:MM")]
    InvalidUtcOffset(String),
}

/// Everything about a report that does not come from the sales data.
#[derive(Clone, Debug)]
pub struct ReportSettings {
    pub company: CompanyProfile,
    /// Logo image; when no file exists here the company name is printed instead.
    pub logo_path: PathBuf,
    /// Extra directory searched for the font family before the default locations.
    pub font_directory: Option<PathBuf>,
    /// Offset used to print sale and generation dates.
    pub utc_offset: FixedOffset,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            company: CompanyProfile::default(),
            logo_path: PathBuf::from(DEFAULT_LOGO_PATH),
            font_directory: None,
            utc_offset: default_utc_offset(),
        }
    }
}

fn default_utc_offset() -> FixedOffset {
    FixedOffset::west_opt(6 * 3600).unwrap_or_else(|| Utc.fix())
}

impl ReportSettings {
    pub fn with_logo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = path.into();
        self
    }

    pub fn with_font_directory(mut self, directory: impl Into<Option<PathBuf>>) -> Self {
        self.font_directory = directory.into();
        self
    }

    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }
}

/// Parses offsets such as `-06:00`, `+05:30`, `+0530` or `Z`.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = || ConfigError::InvalidUtcOffset(value.to_owned());
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "00"),
    };
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return Err(invalid());
    }

    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::{parse_utc_offset, ConfigError, ReportSettings, DEFAULT_UTC_OFFSET};

    #[test]
    fn default_offset_is_central_mexico() {
        let settings = ReportSettings::default();
        assert_eq!(settings.utc_offset.local_minus_utc(), -6 * 3600);
        assert_eq!(
            parse_utc_offset(DEFAULT_UTC_OFFSET).unwrap(),
            settings.utc_offset
        );
        assert_eq!(settings.logo_path.to_str(), Some("technorth.jpeg"));
    }

    #[test]
    fn parses_common_offset_spellings() {
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_utc_offset("-0700").unwrap().local_minus_utc(), -25_200);
        assert_eq!(parse_utc_offset("+2").unwrap().local_minus_utc(), 7_200);
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn rejects_malformed_offsets() {
        for value in ["", "06:00", "+6:75", "+25:00", "-ab:cd", "+123:00"] {
            assert_eq!(
                parse_utc_offset(value),
                Err(ConfigError::InvalidUtcOffset(value.to_owned())),
                "{value}"
            );
        }
    }
}
