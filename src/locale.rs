//! Date rendering following the es-MX numeric convention (`d/m/yyyy`).

use chrono::{DateTime, Datelike, FixedOffset, Utc};

/// Formats an instant as `day/month/year` in the given offset, without zero padding.
pub fn format_date(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = instant.with_timezone(&offset);
    format!("{}/{}/{}", local.day(), local.month(), local.year())
}
