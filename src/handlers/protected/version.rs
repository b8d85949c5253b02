use axum::extract::State;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BUILD: &str = "20250108";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
pub struct SystemVersion {
    pub version: String,
    pub build: String,
    pub timezone: String,
    pub date: String,
}

/// Wall-clock time in `zone`; an unrecognized zone name falls back to UTC
pub fn clock_in(zone: &str, now: DateTime<Utc>) -> String {
    match zone.parse::<Tz>() {
        Ok(tz) => now.with_timezone(&tz).format(DATE_FORMAT).to_string(),
        Err(_) => {
            tracing::warn!(zone, "unknown time zone, reporting UTC");
            now.format(DATE_FORMAT).to_string()
        }
    }
}

/// GET /api/v1/version - Service version and the dialer's clock
pub async fn version(State(state): State<AppState>) -> ApiResult<SystemVersion> {
    let timezone = state.config.database.timezone.clone();
    let version = SystemVersion {
        version: VERSION.to_string(),
        build: BUILD.to_string(),
        date: clock_in(&timezone, Utc::now()),
        timezone,
    };

    Ok(ApiResponse::with_message("Version information retrieved", version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn clock_follows_configured_zone_and_dst() {
        let winter = Utc.with_ymd_and_hms(2025, 1, 8, 17, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2025, 7, 8, 17, 0, 0).unwrap();
        assert_eq!(clock_in("America/New_York", winter), "2025-01-08 12:00:00");
        assert_eq!(clock_in("America/New_York", summer), "2025-07-08 13:00:00");
        assert_eq!(clock_in("Asia/Kolkata", winter), "2025-01-08 22:30:00");
    }

    #[test]
    fn unknown_zone_reports_utc() {
        let now = Utc.with_ymd_and_hms(2025, 1, 8, 17, 0, 0).unwrap();
        assert_eq!(clock_in("Mars/Olympus", now), "2025-01-08 17:00:00");
    }
}
