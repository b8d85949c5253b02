use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{or_default, parse_id, ApiJson};
use crate::app::AppState;
use crate::database::models::phone::{DidInput, PhoneAliasInput, PhoneInput};
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/v1/phones - Register a phone extension
pub async fn add(
    State(state): State<AppState>,
    ApiJson(mut phone): ApiJson<PhoneInput>,
) -> ApiResult<Value> {
    if phone.extension.is_empty() {
        return Err(ApiError::bad_request("Extension is required"));
    }
    phone.active = or_default(Some(phone.active), "Y");

    sqlx::query(
        "INSERT INTO phones (extension, dialplan_number, voicemail_ext, phone_ip,
            computer_ip, server_ip, login, pass, status, active,
            phone_type, fullname, company, outbound_cid)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&phone.extension)
    .bind(&phone.dialplan_number)
    .bind(&phone.voicemail_ext)
    .bind(&phone.phone_ip)
    .bind(&phone.computer_ip)
    .bind(&phone.server_ip)
    .bind(&phone.login)
    .bind(&phone.pass)
    .bind(&phone.status)
    .bind(&phone.active)
    .bind(&phone.phone_type)
    .bind(&phone.fullname)
    .bind(&phone.company)
    .bind(&phone.outbound_cid)
    .execute(&state.pool)
    .await
    .or_internal("Failed to add phone")?;

    tracing::info!(extension = %phone.extension, "phone added");
    Ok(ApiResponse::with_message(
        "Phone added successfully",
        json!({ "extension": phone.extension }),
    ))
}

/// PUT /api/v1/phones/:phone_id - Update a phone by extension
pub async fn update(
    State(state): State<AppState>,
    Path(extension): Path<String>,
    ApiJson(phone): ApiJson<PhoneInput>,
) -> ApiResult<Value> {
    sqlx::query(
        "UPDATE phones SET
            dialplan_number = ?, voicemail_ext = ?, phone_ip = ?,
            computer_ip = ?, server_ip = ?, status = ?, active = ?,
            phone_type = ?, fullname = ?, company = ?, outbound_cid = ?
        WHERE extension = ?",
    )
    .bind(&phone.dialplan_number)
    .bind(&phone.voicemail_ext)
    .bind(&phone.phone_ip)
    .bind(&phone.computer_ip)
    .bind(&phone.server_ip)
    .bind(&phone.status)
    .bind(&phone.active)
    .bind(&phone.phone_type)
    .bind(&phone.fullname)
    .bind(&phone.company)
    .bind(&phone.outbound_cid)
    .bind(&extension)
    .execute(&state.pool)
    .await
    .or_internal("Failed to update phone")?;

    Ok(ApiResponse::with_message(
        "Phone updated successfully",
        json!({ "extension": extension }),
    ))
}

/// POST /api/v1/phone-aliases
pub async fn add_alias(
    State(state): State<AppState>,
    ApiJson(alias): ApiJson<PhoneAliasInput>,
) -> ApiResult<Value> {
    sqlx::query("INSERT INTO phone_aliases (alias_id, alias_name, logins_list, active) VALUES (?, ?, ?, ?)")
        .bind(&alias.alias_id)
        .bind(&alias.alias_name)
        .bind(&alias.extension)
        .bind(&alias.active)
        .execute(&state.pool)
        .await
        .or_internal("Failed to add phone alias")?;

    Ok(ApiResponse::with_message(
        "Phone alias added successfully",
        json!({ "alias_id": alias.alias_id }),
    ))
}

/// PUT /api/v1/phone-aliases/:alias_id
pub async fn update_alias(
    State(state): State<AppState>,
    Path(alias_id): Path<String>,
    ApiJson(alias): ApiJson<PhoneAliasInput>,
) -> ApiResult<Value> {
    sqlx::query("UPDATE phone_aliases SET alias_name = ?, logins_list = ?, active = ? WHERE alias_id = ?")
        .bind(&alias.alias_name)
        .bind(&alias.extension)
        .bind(&alias.active)
        .bind(&alias_id)
        .execute(&state.pool)
        .await
        .or_internal("Failed to update phone alias")?;

    Ok(ApiResponse::with_message(
        "Phone alias updated successfully",
        json!({ "alias_id": alias_id }),
    ))
}

/// POST /api/v1/dids - Add an inbound DID route
pub async fn add_did(
    State(state): State<AppState>,
    ApiJson(mut did): ApiJson<DidInput>,
) -> ApiResult<Value> {
    if did.did_pattern.is_empty() {
        return Err(ApiError::bad_request("DID pattern is required"));
    }
    did.active = or_default(Some(did.active), "Y");

    let result = sqlx::query(
        "INSERT INTO vicidial_inbound_dids (did_pattern, did_description, did_route,
            record_call, extension, exten, voicemail_ext,
            filter_inbound_group, group_id, user, active)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&did.did_pattern)
    .bind(&did.did_description)
    .bind(&did.did_route)
    .bind(&did.record_call)
    .bind(&did.extension)
    .bind(&did.exten)
    .bind(&did.voicemail_ext)
    .bind(&did.filter_inbound_group)
    .bind(&did.group)
    .bind(&did.user)
    .bind(&did.active)
    .execute(&state.pool)
    .await
    .or_internal("Failed to add DID")?;

    let did_id = result.last_insert_id() as i64;
    tracing::info!(did_id, pattern = %did.did_pattern, "DID added");

    Ok(ApiResponse::with_message("DID added successfully", json!({ "did_id": did_id })))
}

/// PUT /api/v1/dids/:did_id
pub async fn update_did(
    State(state): State<AppState>,
    Path(did_id): Path<String>,
    ApiJson(did): ApiJson<DidInput>,
) -> ApiResult<Value> {
    let did_id = parse_id(&did_id, "Invalid DID ID")?;

    sqlx::query(
        "UPDATE vicidial_inbound_dids SET
            did_pattern = ?, did_description = ?, did_route = ?,
            record_call = ?, extension = ?, exten = ?, voicemail_ext = ?,
            filter_inbound_group = ?, group_id = ?, user = ?, active = ?
        WHERE did_id = ?",
    )
    .bind(&did.did_pattern)
    .bind(&did.did_description)
    .bind(&did.did_route)
    .bind(&did.record_call)
    .bind(&did.extension)
    .bind(&did.exten)
    .bind(&did.voicemail_ext)
    .bind(&did.filter_inbound_group)
    .bind(&did.group)
    .bind(&did.user)
    .bind(&did.active)
    .bind(did_id)
    .execute(&state.pool)
    .await
    .or_internal("Failed to update DID")?;

    Ok(ApiResponse::with_message("DID updated successfully", json!({ "did_id": did_id })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CopyDidRequest {
    pub new_did_pattern: String,
}

/// POST /api/v1/dids/:did_id/copy - Clone a DID under a new pattern
pub async fn copy_did(
    State(state): State<AppState>,
    Path(did_id): Path<String>,
    ApiJson(req): ApiJson<CopyDidRequest>,
) -> ApiResult<Value> {
    let source_id = parse_id(&did_id, "Invalid DID ID")?;
    if req.new_did_pattern.is_empty() {
        return Err(ApiError::bad_request("New DID pattern is required"));
    }

    let result = sqlx::query(
        "INSERT INTO vicidial_inbound_dids (did_pattern, did_description, did_route,
            record_call, extension, exten, voicemail_ext,
            filter_inbound_group, group_id, user, active)
        SELECT ?, did_description, did_route, record_call, extension, exten, voicemail_ext,
            filter_inbound_group, group_id, user, active
        FROM vicidial_inbound_dids WHERE did_id = ?",
    )
    .bind(&req.new_did_pattern)
    .bind(source_id)
    .execute(&state.pool)
    .await
    .or_internal("Failed to copy DID")?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("DID not found"));
    }

    let new_did_id = result.last_insert_id() as i64;
    Ok(ApiResponse::with_message(
        "DID copied successfully",
        json!({ "new_did_id": new_did_id }),
    ))
}
