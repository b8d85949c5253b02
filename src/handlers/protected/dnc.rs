//! Do-not-call and filter-phone-group membership.

use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{or_default, ApiJson, ApiQuery};
use crate::app::AppState;
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};

/// Campaign id that makes a DNC entry apply system-wide
pub const GLOBAL_DNC_CAMPAIGN: &str = "---ALL---";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DncRequest {
    pub phone_number: String,
    pub campaign_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DncDeleteQuery {
    pub campaign_id: Option<String>,
}

/// POST /api/v1/dnc
pub async fn add(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<DncRequest>,
) -> ApiResult<Value> {
    if req.phone_number.is_empty() {
        return Err(ApiError::bad_request("Phone number is required"));
    }
    let campaign_id = or_default(Some(req.campaign_id), GLOBAL_DNC_CAMPAIGN);

    let result = sqlx::query(
        "INSERT IGNORE INTO vicidial_dnc (phone_number, campaign_id, entry_date) VALUES (?, ?, NOW())",
    )
    .bind(&req.phone_number)
    .bind(&campaign_id)
    .execute(&state.pool)
    .await
    .or_internal("Failed to add DNC entry")?;

    if result.rows_affected() == 0 {
        return Ok(ApiResponse::message_only("Phone number already in DNC list"));
    }

    Ok(ApiResponse::with_message(
        "Phone number added to DNC list",
        json!({ "phone_number": req.phone_number, "campaign_id": campaign_id }),
    ))
}

/// DELETE /api/v1/dnc/:phone - Remove from one campaign, or everywhere when no campaign is given
pub async fn delete(
    State(state): State<AppState>,
    Path(phone): Path<String>,
    ApiQuery(q): ApiQuery<DncDeleteQuery>,
) -> ApiResult<Value> {
    if phone.is_empty() {
        return Err(ApiError::bad_request("Phone number is required"));
    }

    let query = match q.campaign_id.filter(|c| !c.is_empty()) {
        Some(campaign_id) => sqlx::query("DELETE FROM vicidial_dnc WHERE phone_number = ? AND campaign_id = ?")
            .bind(phone)
            .bind(campaign_id),
        None => sqlx::query("DELETE FROM vicidial_dnc WHERE phone_number = ?").bind(phone),
    };

    let result = query
        .execute(&state.pool)
        .await
        .or_internal("Failed to delete DNC entry")?;

    Ok(ApiResponse::with_message(
        "DNC entry deleted",
        json!({ "rows_deleted": result.rows_affected() }),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FpgRequest {
    pub phone_number: String,
    pub filter_phone_group_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FpgDeleteQuery {
    pub filter_phone_group_id: Option<String>,
}

/// POST /api/v1/fpg
pub async fn add_fpg(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<FpgRequest>,
) -> ApiResult<Value> {
    if req.phone_number.is_empty() || req.filter_phone_group_id.is_empty() {
        return Err(ApiError::bad_request(
            "Phone number and filter group ID are required",
        ));
    }

    let result = sqlx::query(
        "INSERT IGNORE INTO vicidial_filter_phone_groups (phone_number, filter_phone_group_id, entry_date)
        VALUES (?, ?, NOW())",
    )
    .bind(&req.phone_number)
    .bind(&req.filter_phone_group_id)
    .execute(&state.pool)
    .await
    .or_internal("Failed to add filter group entry")?;

    if result.rows_affected() == 0 {
        return Ok(ApiResponse::message_only("Phone number already in filter group"));
    }

    Ok(ApiResponse::with_message(
        "Phone number added to filter group",
        json!({
            "phone_number": req.phone_number,
            "filter_phone_group_id": req.filter_phone_group_id,
        }),
    ))
}

/// DELETE /api/v1/fpg/:phone
pub async fn delete_fpg(
    State(state): State<AppState>,
    Path(phone): Path<String>,
    ApiQuery(q): ApiQuery<FpgDeleteQuery>,
) -> ApiResult<Value> {
    if phone.is_empty() {
        return Err(ApiError::bad_request("Phone number is required"));
    }

    let query = match q.filter_phone_group_id.filter(|g| !g.is_empty()) {
        Some(group_id) => sqlx::query(
            "DELETE FROM vicidial_filter_phone_groups WHERE phone_number = ? AND filter_phone_group_id = ?",
        )
        .bind(phone)
        .bind(group_id),
        None => sqlx::query("DELETE FROM vicidial_filter_phone_groups WHERE phone_number = ?").bind(phone),
    };

    let result = query
        .execute(&state.pool)
        .await
        .or_internal("Failed to delete filter group entry")?;

    Ok(ApiResponse::with_message(
        "Filter group entry deleted",
        json!({ "rows_deleted": result.rows_affected() }),
    ))
}
