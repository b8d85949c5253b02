use axum::{
    extract::{Path, State},
    Extension,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{parse_id, ApiJson, ApiQuery};
use crate::app::AppState;
use crate::database::models::lead::{Callback, Lead, LeadField, LeadInput, LeadStatusRow, LeadSummary};
use crate::database::{QueryBuilder, UpdateBuilder};
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult, CallerLabel};

/// POST /api/v1/leads - Insert a lead into `vicidial_list`
pub async fn add(
    State(state): State<AppState>,
    ApiJson(mut lead): ApiJson<LeadInput>,
) -> ApiResult<LeadInput> {
    if lead.phone_number.is_empty() || lead.list_id == 0 {
        return Err(ApiError::bad_request("Phone number and list ID are required"));
    }

    if lead.status.is_empty() {
        lead.status = "NEW".to_string();
    }
    if lead.country_code.is_empty() {
        lead.country_code = "1".to_string();
    }

    let result = sqlx::query(
        "INSERT INTO vicidial_list (
            list_id, phone_number, first_name, last_name, middle_initial,
            address1, address2, address3, city, state, province, postal_code,
            country_code, gender, date_of_birth, alt_phone, email, security,
            comments, status, entry_date, modify_date, `rank`, owner
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW(), ?, ?)",
    )
    .bind(lead.list_id)
    .bind(&lead.phone_number)
    .bind(&lead.first_name)
    .bind(&lead.last_name)
    .bind(&lead.middle_initial)
    .bind(&lead.address1)
    .bind(&lead.address2)
    .bind(&lead.address3)
    .bind(&lead.city)
    .bind(&lead.state)
    .bind(&lead.province)
    .bind(&lead.postal_code)
    .bind(&lead.country_code)
    .bind(&lead.gender)
    .bind(lead.date_of_birth())
    .bind(&lead.alt_phone)
    .bind(&lead.email)
    .bind(&lead.security)
    .bind(&lead.comments)
    .bind(&lead.status)
    .bind(lead.rank)
    .bind(&lead.owner)
    .execute(&state.pool)
    .await
    .or_internal("Failed to add lead")?;

    lead.lead_id = result.last_insert_id() as i64;
    tracing::info!(lead_id = lead.lead_id, list_id = lead.list_id, "lead added");

    Ok(ApiResponse::with_message("Lead added successfully", lead))
}

/// PUT /api/v1/leads/:lead_id - Overwrite the editable lead columns
pub async fn update(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
    ApiJson(lead): ApiJson<LeadInput>,
) -> ApiResult<Value> {
    let lead_id = parse_id(&lead_id, "Invalid lead ID")?;

    sqlx::query(
        "UPDATE vicidial_list SET
            first_name = ?, last_name = ?, middle_initial = ?,
            address1 = ?, address2 = ?, address3 = ?,
            city = ?, state = ?, province = ?, postal_code = ?,
            country_code = ?, gender = ?, date_of_birth = ?,
            alt_phone = ?, email = ?, security = ?, comments = ?,
            status = ?, modify_date = NOW(), owner = ?
        WHERE lead_id = ?",
    )
    .bind(&lead.first_name)
    .bind(&lead.last_name)
    .bind(&lead.middle_initial)
    .bind(&lead.address1)
    .bind(&lead.address2)
    .bind(&lead.address3)
    .bind(&lead.city)
    .bind(&lead.state)
    .bind(&lead.province)
    .bind(&lead.postal_code)
    .bind(&lead.country_code)
    .bind(&lead.gender)
    .bind(lead.date_of_birth())
    .bind(&lead.alt_phone)
    .bind(&lead.email)
    .bind(&lead.security)
    .bind(&lead.comments)
    .bind(&lead.status)
    .bind(&lead.owner)
    .bind(lead_id)
    .execute(&state.pool)
    .await
    .or_internal("Failed to update lead")?;

    Ok(ApiResponse::with_message("Lead updated successfully", json!({ "lead_id": lead_id })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BatchUpdateRequest {
    pub lead_ids: Vec<i64>,
    pub status: String,
    pub owner: String,
}

/// PUT /api/v1/leads/batch - Set status and/or owner on many leads at once
pub async fn batch_update(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BatchUpdateRequest>,
) -> ApiResult<Value> {
    if req.lead_ids.is_empty() {
        return Err(ApiError::bad_request("No lead IDs provided"));
    }

    let sql = UpdateBuilder::new("vicidial_list")
        .set_raw("modify_date = NOW()")
        .set_opt("status", Some(req.status.as_str()))
        .set_opt("owner", Some(req.owner.as_str()))
        .filter_in("lead_id", &req.lead_ids)
        .build();

    let result = sql
        .query()
        .execute(&state.pool)
        .await
        .or_internal("Failed to update leads")?;

    Ok(ApiResponse::with_message(
        "Leads updated successfully",
        json!({ "updated_count": result.rows_affected() }),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub list_id: Option<String>,
    pub status: Option<String>,
}

/// GET /api/v1/leads/search - Substring search on contact fields
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<SearchQuery>,
) -> ApiResult<Vec<LeadSummary>> {
    let sql = QueryBuilder::new(
        "SELECT lead_id, list_id, phone_number, first_name, last_name, email, status, entry_date FROM vicidial_list",
    )
    .contains("phone_number", q.phone_number.as_deref())
    .contains("first_name", q.first_name.as_deref())
    .contains("last_name", q.last_name.as_deref())
    .contains("email", q.email.as_deref())
    .filter_opt("list_id = ?", q.list_id.as_deref())
    .filter_opt("status = ?", q.status.as_deref())
    .limit(100)
    .build();

    let leads = sql
        .query_as::<LeadSummary>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to search leads")?;

    Ok(ApiResponse::with_message("Leads retrieved successfully", leads))
}

/// GET /api/v1/leads/:lead_id/info
pub async fn info(State(state): State<AppState>, Path(lead_id): Path<String>) -> ApiResult<Lead> {
    let lead_id = parse_id(&lead_id, "Invalid lead ID")?;

    let sql = format!("{} WHERE lead_id = ?", Lead::SELECT);
    let lead = sqlx::query_as::<_, Lead>(&sql)
        .bind(lead_id)
        .fetch_optional(&state.pool)
        .await
        .or_internal("Failed to retrieve lead")?
        .ok_or_else(|| ApiError::not_found("Lead not found"))?;

    Ok(ApiResponse::with_message("Lead information retrieved", lead))
}

#[derive(Debug, Default, Deserialize)]
pub struct FieldQuery {
    pub field: Option<String>,
}

/// GET /api/v1/leads/:lead_id/field-info?field= - One allow-listed column
pub async fn field_info(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
    ApiQuery(q): ApiQuery<FieldQuery>,
) -> ApiResult<Value> {
    let token = q.field.unwrap_or_default();
    if token.is_empty() {
        return Err(ApiError::bad_request("Field parameter is required"));
    }
    let field = LeadField::parse(&token).ok_or_else(|| ApiError::bad_request("Invalid field name"))?;
    let lead_id = parse_id(&lead_id, "Invalid lead ID")?;

    let value: Option<Option<String>> = sqlx::query_scalar(field.select_sql())
        .bind(lead_id)
        .fetch_optional(&state.pool)
        .await
        .or_internal("Failed to retrieve field")?;

    let value = value.ok_or_else(|| ApiError::not_found("Lead not found"))?;
    let mut data = serde_json::Map::new();
    data.insert(field.name().to_string(), Value::String(value.unwrap_or_default()));

    Ok(ApiResponse::with_message("Field retrieved", Value::Object(data)))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusSearchQuery {
    pub status: Option<String>,
    pub list_id: Option<String>,
}

/// GET /api/v1/leads/status-search?status=&list_id=
pub async fn status_search(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<StatusSearchQuery>,
) -> ApiResult<Vec<LeadStatusRow>> {
    let status = q.status.unwrap_or_default();
    if status.is_empty() {
        return Err(ApiError::bad_request("Status parameter is required"));
    }

    let sql = QueryBuilder::new(
        "SELECT lead_id, list_id, phone_number, first_name, last_name, status FROM vicidial_list",
    )
    .filter("status = ?", status)
    .filter_opt("list_id = ?", q.list_id.as_deref())
    .limit(100)
    .build();

    let leads = sql
        .query_as::<LeadStatusRow>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to search leads")?;

    Ok(ApiResponse::with_message("Leads retrieved", leads))
}

/// GET /api/v1/leads/:lead_id/callback-info - Ten most recent callbacks
pub async fn callback_info(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> ApiResult<Vec<Callback>> {
    let lead_id = parse_id(&lead_id, "Invalid lead ID")?;

    let callbacks = sqlx::query_as::<_, Callback>(
        "SELECT callback_id, lead_id, list_id, campaign_id, status,
                entry_time, callback_time, user, recipient, comments
         FROM vicidial_callbacks WHERE lead_id = ?
         ORDER BY callback_time DESC LIMIT 10",
    )
    .bind(lead_id)
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve callbacks")?;

    Ok(ApiResponse::with_message("Callbacks retrieved", callbacks))
}

/// POST /api/v1/leads/:lead_id/dearchive - Move a lead back from the archive table.
///
/// Copy and delete happen in one transaction; a lead that is no longer in the
/// archive answers 404, so a repeated call can never restore twice.
pub async fn dearchive(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> ApiResult<Value> {
    let lead_id = parse_id(&lead_id, "Invalid lead ID")?;

    let archived: Option<i64> = sqlx::query_scalar(
        "SELECT CAST(lead_id AS SIGNED) FROM vicidial_list_archive WHERE lead_id = ?",
    )
    .bind(lead_id)
    .fetch_optional(&state.pool)
    .await
    .or_internal("Failed to look up archived lead")?;

    if archived.is_none() {
        return Err(ApiError::not_found("Archived lead not found"));
    }

    let mut tx = state
        .pool
        .begin()
        .await
        .or_internal("Failed to start transaction")?;

    sqlx::query("INSERT INTO vicidial_list SELECT * FROM vicidial_list_archive WHERE lead_id = ?")
        .bind(lead_id)
        .execute(&mut *tx)
        .await
        .or_internal("Failed to restore lead")?;

    sqlx::query("DELETE FROM vicidial_list_archive WHERE lead_id = ?")
        .bind(lead_id)
        .execute(&mut *tx)
        .await
        .or_internal("Failed to remove from archive")?;

    tx.commit().await.or_internal("Failed to commit restore")?;
    tracing::info!(lead_id, "lead restored from archive");

    Ok(ApiResponse::with_message("Lead restored successfully", json!({ "lead_id": lead_id })))
}

#[derive(Debug, Default, Deserialize)]
pub struct PhoneCheckQuery {
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PhoneCheck {
    pub phone_number: String,
    pub exists: bool,
    pub count: i64,
    /// Advisory caller label, not an authenticated identity
    pub checked_by: String,
}

/// GET /api/v1/phone/check?phone_number=
pub async fn phone_check(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerLabel>,
    ApiQuery(q): ApiQuery<PhoneCheckQuery>,
) -> ApiResult<PhoneCheck> {
    let phone_number = q.phone_number.unwrap_or_default();
    if phone_number.is_empty() {
        return Err(ApiError::bad_request("Phone number is required"));
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vicidial_list WHERE phone_number = ?")
        .bind(&phone_number)
        .fetch_one(&state.pool)
        .await
        .or_internal("Failed to check phone number")?;

    Ok(ApiResponse::with_message(
        "Phone check complete",
        PhoneCheck {
            phone_number,
            exists: count > 0,
            count,
            checked_by: caller.0,
        },
    ))
}
