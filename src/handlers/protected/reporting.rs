use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{parse_id, ApiJson, ApiQuery};
use crate::app::AppState;
use crate::database::models::reporting::{
    AgentStat, CallLog, DidLog, DispoStat, Recording, StatusStat, StatusStatRow,
};
use crate::database::QueryBuilder;
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct RecordingQuery {
    pub lead_id: Option<String>,
    pub user: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/v1/recordings/lookup
pub async fn recordings(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<RecordingQuery>,
) -> ApiResult<Vec<Recording>> {
    let mut sql = QueryBuilder::new(
        "SELECT recording_id, channel, server_ip, extension, start_time,
            end_time, length_in_sec, filename, location, lead_id, user, vicidial_id
        FROM recording_log",
    );
    if let Some(lead_id) = q.lead_id.as_deref().filter(|v| !v.is_empty()) {
        sql = sql.filter("lead_id = ?", parse_id(lead_id, "Invalid lead ID")?);
    }
    let sql = sql
        .filter_opt("user = ?", q.user.as_deref())
        .filter_opt("start_time >= ?", q.start_date.as_deref())
        .filter_opt("start_time <= ?", q.end_date.as_deref())
        .order_by("start_time DESC")
        .limit(100)
        .build();

    let recordings = sql
        .query_as::<Recording>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to search recordings")?;

    Ok(ApiResponse::with_message("Recordings retrieved", recordings))
}

#[derive(Debug, Default, Deserialize)]
pub struct DidLogQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub did_pattern: Option<String>,
}

/// GET /api/v1/did-logs/export
pub async fn did_logs(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<DidLogQuery>,
) -> ApiResult<Vec<DidLog>> {
    let sql = QueryBuilder::new(
        "SELECT uniqueid, server_ip, channel, caller_id_number, caller_id_name,
            extension, call_date, did_id, did_route
        FROM vicidial_did_log",
    )
    .filter_opt("call_date >= ?", q.start_date.as_deref())
    .filter_opt("call_date <= ?", q.end_date.as_deref())
    .contains("did_id", q.did_pattern.as_deref())
    .order_by("call_date DESC")
    .limit(1000)
    .build();

    let logs = sql
        .query_as::<DidLog>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to export DID logs")?;

    Ok(ApiResponse::with_message("DID logs exported", logs))
}

/// GET /api/v1/phone-logs/:phone - Last 50 outbound calls to a number
pub async fn phone_logs(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> ApiResult<Vec<CallLog>> {
    let logs = sqlx::query_as::<_, CallLog>(
        "SELECT uniqueid, lead_id, list_id, campaign_id, call_date, start_epoch,
            end_epoch, length_in_sec AS length, status, phone_code, phone_number, user, comments
        FROM vicidial_log
        WHERE phone_number = ?
        ORDER BY call_date DESC
        LIMIT 50",
    )
    .bind(&phone)
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve phone logs")?;

    Ok(ApiResponse::with_message("Phone number history retrieved", logs))
}

#[derive(Debug, Default, Deserialize)]
pub struct AgentStatsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user: Option<String>,
    pub campaign_id: Option<String>,
}

/// GET /api/v1/agent-stats/export
pub async fn agent_stats(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<AgentStatsQuery>,
) -> ApiResult<Vec<AgentStat>> {
    let sql = QueryBuilder::new(
        "SELECT user, event_time, campaign_id, pause_epoch, pause_sec,
            wait_epoch, wait_sec, talk_epoch, talk_sec, dispo_epoch, dispo_sec,
            status, calls
        FROM vicidial_agent_log",
    )
    .filter_opt("event_time >= ?", q.start_date.as_deref())
    .filter_opt("event_time <= ?", q.end_date.as_deref())
    .filter_opt("user = ?", q.user.as_deref())
    .filter_opt("campaign_id = ?", q.campaign_id.as_deref())
    .order_by("event_time DESC")
    .limit(1000)
    .build();

    let stats = sql
        .query_as::<AgentStat>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to export agent stats")?;

    Ok(ApiResponse::with_message("Agent statistics exported", stats))
}

#[derive(Debug, Default, Deserialize)]
pub struct CallStatsQuery {
    pub campaign_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl CallStatsQuery {
    fn apply(&self, sql: QueryBuilder) -> QueryBuilder {
        sql.filter_opt("campaign_id = ?", self.campaign_id.as_deref())
            .filter_opt("call_date >= ?", self.start_date.as_deref())
            .filter_opt("call_date <= ?", self.end_date.as_deref())
    }
}

/// GET /api/v1/call-stats/status - Call count and average length per status
pub async fn status_stats(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<CallStatsQuery>,
) -> ApiResult<Vec<StatusStat>> {
    let sql = q
        .apply(QueryBuilder::new(
            "SELECT status, COUNT(*) AS count, AVG(length_in_sec) AS avg_length FROM vicidial_log",
        ))
        .group_by("status")
        .order_by("count DESC")
        .build();

    let rows = sql
        .query_as::<StatusStatRow>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve status stats")?;

    let stats = rows.into_iter().map(StatusStat::from).collect();
    Ok(ApiResponse::with_message("Status statistics retrieved", stats))
}

/// GET /api/v1/call-stats/dispo - Call count per status and agent
pub async fn dispo_stats(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<CallStatsQuery>,
) -> ApiResult<Vec<DispoStat>> {
    let sql = q
        .apply(QueryBuilder::new(
            "SELECT status, user, COUNT(*) AS count FROM vicidial_log",
        ))
        .group_by("status, user")
        .order_by("count DESC")
        .limit(500)
        .build();

    let stats = sql
        .query_as::<DispoStat>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve dispo report")?;

    Ok(ApiResponse::with_message("Disposition report retrieved", stats))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BlindMonitorRequest {
    pub user: String,
    pub extension: String,
    pub server_ip: String,
}

/// POST /api/v1/monitor/blind - Resolve the channel an agent is on.
///
/// Nothing is originated here; the caller bridges the returned channel
/// through the Asterisk manager.
pub async fn blind_monitor(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BlindMonitorRequest>,
) -> ApiResult<Value> {
    let channel = sqlx::query_scalar::<_, Option<String>>(
        "SELECT channel FROM vicidial_live_agents WHERE user = ? AND server_ip = ?",
    )
    .bind(&req.user)
    .bind(&req.server_ip)
    .fetch_optional(&state.pool)
    .await
    .or_internal("Failed to get agent info")?
    .ok_or_else(|| ApiError::not_found("Agent not found or not in call"))?;

    Ok(ApiResponse::with_message(
        "Monitor request processed",
        json!({
            "user": req.user,
            "channel": channel.unwrap_or_default(),
            "extension": req.extension,
            "message": "Blind monitor initiated - use Asterisk manager to complete connection",
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_stats_filters_bind_in_order() {
        let q = CallStatsQuery {
            campaign_id: Some("SALES".into()),
            start_date: None,
            end_date: Some("2024-12-31 23:59:59".into()),
        };
        let sql = q
            .apply(QueryBuilder::new("SELECT status, user, COUNT(*) AS count FROM vicidial_log"))
            .group_by("status, user")
            .order_by("count DESC")
            .limit(500)
            .build();
        assert_eq!(
            sql.query,
            "SELECT status, user, COUNT(*) AS count FROM vicidial_log WHERE campaign_id = ? AND call_date <= ? GROUP BY status, user ORDER BY count DESC LIMIT 500"
        );
        assert_eq!(sql.params.len(), 2);
    }
}
