use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{or_default, parse_id, ApiJson};
use crate::app::AppState;
use crate::database::is_no_rows;
use crate::database::models::reporting::{CallInfo, CrossCampaignLead};
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GroupAliasRequest {
    pub group_alias_id: String,
    pub group_alias_name: String,
    pub caller_id_group: String,
    pub active: String,
}

/// POST /api/v1/group-aliases
pub async fn add_group_alias(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GroupAliasRequest>,
) -> ApiResult<Value> {
    if req.group_alias_id.is_empty() {
        return Err(ApiError::bad_request("Group alias ID is required"));
    }
    let active = or_default(Some(req.active), "Y");

    sqlx::query(
        "INSERT INTO vicidial_group_aliases (group_alias_id, group_alias_name, caller_id_group, active)
        VALUES (?, ?, ?, ?)",
    )
    .bind(&req.group_alias_id)
    .bind(&req.group_alias_name)
    .bind(&req.caller_id_group)
    .bind(&active)
    .execute(&state.pool)
    .await
    .or_internal("Failed to add group alias")?;

    Ok(ApiResponse::with_message(
        "Group alias added successfully",
        json!({ "group_alias_id": req.group_alias_id }),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogEntryRequest {
    pub status: String,
    pub comments: String,
    pub user_group: String,
}

/// PUT /api/v1/log-entries/:entry_id - Amend an outbound call log row by uniqueid
pub async fn update_log_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    ApiJson(req): ApiJson<LogEntryRequest>,
) -> ApiResult<()> {
    let result = sqlx::query("UPDATE vicidial_log SET status = ?, comments = ?, user_group = ? WHERE uniqueid = ?")
        .bind(&req.status)
        .bind(&req.comments)
        .bind(&req.user_group)
        .bind(&entry_id)
        .execute(&state.pool)
        .await
        .or_internal("Failed to update log entry")?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Log entry not found"));
    }

    Ok(ApiResponse::message_only("Log entry updated successfully"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CidGroupEntryRequest {
    pub caller_id_number: String,
    pub caller_id_name: String,
    pub active: String,
}

/// PUT /api/v1/cid-groups/:entry_id
pub async fn update_cid_group_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    ApiJson(req): ApiJson<CidGroupEntryRequest>,
) -> ApiResult<()> {
    let entry_id = parse_id(&entry_id, "Invalid CID group entry ID")?;

    sqlx::query(
        "UPDATE vicidial_inbound_group_cid SET caller_id_number = ?, caller_id_name = ?, active = ?
        WHERE cid_id = ?",
    )
    .bind(&req.caller_id_number)
    .bind(&req.caller_id_name)
    .bind(&req.active)
    .bind(entry_id)
    .execute(&state.pool)
    .await
    .or_internal("Failed to update CID group entry")?;

    Ok(ApiResponse::message_only("CID group entry updated successfully"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AltUrlRequest {
    pub url: String,
    pub url_type: String,
    pub url_rank: i64,
    pub active: String,
}

/// PUT /api/v1/alt-urls/:url_id
pub async fn update_alt_url(
    State(state): State<AppState>,
    Path(url_id): Path<String>,
    ApiJson(req): ApiJson<AltUrlRequest>,
) -> ApiResult<()> {
    let url_id = parse_id(&url_id, "Invalid URL ID")?;

    sqlx::query("UPDATE vicidial_url_multi SET url = ?, url_type = ?, url_rank = ?, active = ? WHERE url_id = ?")
        .bind(&req.url)
        .bind(&req.url_type)
        .bind(req.url_rank)
        .bind(&req.active)
        .bind(url_id)
        .execute(&state.pool)
        .await
        .or_internal("Failed to update alternate URL")?;

    Ok(ApiResponse::message_only("Alternate URL updated successfully"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PresetRequest {
    pub preset_name: String,
    pub preset_value: String,
    pub menu_id: String,
}

/// PUT /api/v1/presets/:preset_id - Set the default of a list custom field.
///
/// `preset_id` is the custom field id and `preset_name` must match its name.
pub async fn update_preset(
    State(state): State<AppState>,
    Path(preset_id): Path<String>,
    ApiJson(req): ApiJson<PresetRequest>,
) -> ApiResult<()> {
    let field_id = parse_id(&preset_id, "Invalid preset ID")?;

    sqlx::query("UPDATE vicidial_lists_fields SET field_default = ? WHERE field_id = ? AND field_name = ?")
        .bind(&req.preset_value)
        .bind(field_id)
        .bind(&req.preset_name)
        .execute(&state.pool)
        .await
        .or_internal("Failed to update preset")?;

    Ok(ApiResponse::message_only("Preset updated successfully"))
}

/// GET /api/v1/calls/:call_id/info - Outbound log first, then the inbound closer log
pub async fn call_info(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> ApiResult<CallInfo> {
    let outbound = sqlx::query_as::<_, CallInfo>(
        "SELECT uniqueid, lead_id, list_id, campaign_id, call_date,
            start_epoch, end_epoch, length_in_sec, status, phone_number,
            user, comments, processed, user_group, term_reason
        FROM vicidial_log WHERE uniqueid = ?",
    )
    .bind(&call_id)
    .fetch_one(&state.pool)
    .await;

    let info = match outbound {
        Ok(info) => info,
        Err(e) if is_no_rows(&e) => sqlx::query_as::<_, CallInfo>(
            "SELECT closecallid AS uniqueid, lead_id, list_id, campaign_id, call_date,
                start_epoch, end_epoch, length_in_sec, status, phone_number,
                user, comments, queue_seconds, user_group, term_reason
            FROM vicidial_closer_log WHERE closecallid = ?",
        )
        .bind(&call_id)
        .fetch_optional(&state.pool)
        .await
        .or_internal("Failed to retrieve call info")?
        .ok_or_else(|| ApiError::not_found("Call ID not found"))?,
        Err(e) => return Err(ApiError::internal("Failed to retrieve call info", e)),
    };

    Ok(ApiResponse::with_message("Call information retrieved", info))
}

/// GET /api/v1/ccc/lead-info/:lead_id - Lead with call totals across campaigns
pub async fn ccc_lead_info(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> ApiResult<CrossCampaignLead> {
    let lead_id = parse_id(&lead_id, "Invalid lead ID")?;

    let info = sqlx::query_as::<_, CrossCampaignLead>(
        "SELECT l.lead_id, l.list_id, l.phone_number, l.first_name, l.last_name,
            l.status, l.called_count,
            COUNT(DISTINCT vl.uniqueid) AS total_calls,
            COUNT(DISTINCT vl.campaign_id) AS campaigns_called,
            MAX(vl.call_date) AS last_call_date
        FROM vicidial_list l
        LEFT JOIN vicidial_log vl ON l.lead_id = vl.lead_id
        WHERE l.lead_id = ?
        GROUP BY l.lead_id, l.list_id, l.phone_number, l.first_name, l.last_name, l.status, l.called_count",
    )
    .bind(lead_id)
    .fetch_optional(&state.pool)
    .await
    .or_internal("Failed to retrieve CCC lead info")?
    .ok_or_else(|| ApiError::not_found("Lead not found"))?;

    Ok(ApiResponse::with_message("CCC lead information retrieved", info))
}
