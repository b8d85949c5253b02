use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::database::{decimal_to_f64, DbInt};

/// `recording_log` row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recording {
    pub recording_id: DbInt,
    pub channel: Option<String>,
    pub server_ip: Option<String>,
    pub extension: Option<String>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub length_in_sec: Option<DbInt>,
    pub filename: Option<String>,
    pub location: Option<String>,
    pub lead_id: Option<DbInt>,
    pub user: Option<String>,
    pub vicidial_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DidLog {
    pub uniqueid: Option<String>,
    pub server_ip: Option<String>,
    pub channel: Option<String>,
    pub caller_id_number: Option<String>,
    pub caller_id_name: Option<String>,
    pub extension: Option<String>,
    pub call_date: Option<NaiveDateTime>,
    pub did_id: Option<String>,
    pub did_route: Option<String>,
}

/// Outbound call history row; `length` is `length_in_sec`
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CallLog {
    pub uniqueid: String,
    pub lead_id: Option<DbInt>,
    pub list_id: Option<DbInt>,
    pub campaign_id: Option<String>,
    pub call_date: Option<NaiveDateTime>,
    pub start_epoch: Option<DbInt>,
    pub end_epoch: Option<DbInt>,
    pub length: Option<DbInt>,
    pub status: Option<String>,
    pub phone_code: Option<String>,
    pub phone_number: Option<String>,
    pub user: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AgentStat {
    pub user: Option<String>,
    pub event_time: Option<NaiveDateTime>,
    pub campaign_id: Option<String>,
    pub pause_epoch: Option<DbInt>,
    pub pause_sec: Option<DbInt>,
    pub wait_epoch: Option<DbInt>,
    pub wait_sec: Option<DbInt>,
    pub talk_epoch: Option<DbInt>,
    pub talk_sec: Option<DbInt>,
    pub dispo_epoch: Option<DbInt>,
    pub dispo_sec: Option<DbInt>,
    pub status: Option<String>,
    pub calls: Option<DbInt>,
}

#[derive(Debug, FromRow)]
pub struct StatusStatRow {
    pub status: Option<String>,
    pub count: i64,
    pub avg_length: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusStat {
    pub status: String,
    pub count: i64,
    pub avg_length: f64,
}

impl From<StatusStatRow> for StatusStat {
    fn from(row: StatusStatRow) -> Self {
        Self {
            status: row.status.unwrap_or_default(),
            count: row.count,
            avg_length: decimal_to_f64(row.avg_length),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DispoStat {
    pub status: Option<String>,
    pub user: Option<String>,
    pub count: i64,
}

/// Call detail from either the outbound or the inbound (closer) log
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CallInfo {
    pub uniqueid: String,
    pub lead_id: Option<DbInt>,
    pub list_id: Option<DbInt>,
    pub campaign_id: Option<String>,
    pub call_date: Option<NaiveDateTime>,
    pub start_epoch: Option<DbInt>,
    pub end_epoch: Option<DbInt>,
    pub length_in_sec: Option<DbInt>,
    pub status: Option<String>,
    pub phone_number: Option<String>,
    pub user: Option<String>,
    pub comments: Option<String>,
    #[sqlx(default)]
    pub processed: Option<String>,
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_seconds: Option<Decimal>,
    pub user_group: Option<String>,
    pub term_reason: Option<String>,
}

/// Lead with its call history rolled up across every campaign
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CrossCampaignLead {
    pub lead_id: DbInt,
    pub list_id: Option<DbInt>,
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub status: Option<String>,
    pub called_count: Option<DbInt>,
    pub total_calls: i64,
    pub campaigns_called: i64,
    pub last_call_date: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_stat_flattens_decimal_average() {
        let stat = StatusStat::from(StatusStatRow {
            status: Some("SALE".into()),
            count: 4,
            avg_length: Some(Decimal::from_str("93.2500").unwrap()),
        });
        assert_eq!(stat.avg_length, 93.25);

        let empty = StatusStat::from(StatusStatRow {
            status: None,
            count: 0,
            avg_length: None,
        });
        assert_eq!(empty.status, "");
        assert_eq!(empty.avg_length, 0.0);
    }
}
