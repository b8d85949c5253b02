use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{parse_limit, ApiQuery};
use crate::app::AppState;
use crate::database::models::sip::{CarrierLog, LiveSipChannel, SipEvent};
use crate::database::QueryBuilder;
use crate::error::ResultExt;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct CarrierLogQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub lead_id: Option<String>,
    pub server_ip: Option<String>,
    pub dialstatus: Option<String>,
    pub sip_hangup_cause: Option<String>,
    pub limit: Option<String>,
}

/// GET /api/v1/sip/carrier-log
pub async fn carrier_log(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<CarrierLogQuery>,
) -> ApiResult<Value> {
    let limit = parse_limit(q.limit.as_deref(), 100)?;

    let sql = QueryBuilder::new(
        "SELECT uniqueid, call_date, server_ip, lead_id, hangup_cause,
                dialstatus, channel, dial_time, answered_time,
                sip_hangup_cause, sip_hangup_reason, caller_code
         FROM vicidial_carrier_log",
    )
    .filter_opt("call_date >= ?", q.start_date.as_deref())
    .filter_opt("call_date <= ?", q.end_date.as_deref())
    .filter_opt("lead_id = ?", q.lead_id.as_deref())
    .filter_opt("server_ip = ?", q.server_ip.as_deref())
    .filter_opt("dialstatus = ?", q.dialstatus.as_deref())
    .filter_opt("sip_hangup_cause = ?", q.sip_hangup_cause.as_deref())
    .order_by("call_date DESC")
    .limit(limit)
    .build();

    let logs = sql
        .query_as::<CarrierLog>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve carrier logs")?;

    Ok(ApiResponse::with_message(
        "SIP/Carrier logs retrieved successfully",
        json!({ "count": logs.len(), "logs": logs }),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct SipEventQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sip_call_id: Option<String>,
    pub sip_event: Option<String>,
    pub limit: Option<String>,
}

/// GET /api/v1/sip/event-log
pub async fn event_log(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<SipEventQuery>,
) -> ApiResult<Value> {
    let limit = parse_limit(q.limit.as_deref(), 100)?;

    let sql = QueryBuilder::new(
        "SELECT sip_event_id, sip_call_id, sip_event, event_date,
                server_ip, caller_id_number, caller_id_name, extension
         FROM vicidial_sip_event_log",
    )
    .filter_opt("event_date >= ?", q.start_date.as_deref())
    .filter_opt("event_date <= ?", q.end_date.as_deref())
    .filter_opt("sip_call_id = ?", q.sip_call_id.as_deref())
    .filter_opt("sip_event = ?", q.sip_event.as_deref())
    .order_by("event_date DESC")
    .limit(limit)
    .build();

    let logs = sql
        .query_as::<SipEvent>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve SIP event logs")?;

    Ok(ApiResponse::with_message(
        "SIP event logs retrieved successfully",
        json!({ "count": logs.len(), "logs": logs }),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct LiveChannelQuery {
    pub server_ip: Option<String>,
    pub channel_group: Option<String>,
}

/// GET /api/v1/sip/live-channels
pub async fn live_channels(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<LiveChannelQuery>,
) -> ApiResult<Value> {
    let sql = QueryBuilder::new(
        "SELECT channel, server_ip, channel_group, extension, context,
                caller_id_number, caller_id_name, application, app_data
         FROM live_sip_channels",
    )
    .filter_opt("server_ip = ?", q.server_ip.as_deref())
    .filter_opt("channel_group = ?", q.channel_group.as_deref())
    .build();

    let channels = sql
        .query_as::<LiveSipChannel>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve live SIP channels")?;

    Ok(ApiResponse::with_message(
        "Live SIP channels retrieved successfully",
        json!({ "count": channels.len(), "channels": channels }),
    ))
}
