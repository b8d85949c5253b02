use axum::extract::{Path, State};
use serde_json::{json, Value};

use crate::api::{or_default, parse_id, ApiJson};
use crate::app::AppState;
use crate::database::models::list::{CustomField, CustomFieldInput, List, ListInput};
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/v1/lists
pub async fn add(
    State(state): State<AppState>,
    ApiJson(mut list): ApiJson<ListInput>,
) -> ApiResult<ListInput> {
    if list.list_name.is_empty() {
        return Err(ApiError::bad_request("List name is required"));
    }
    list.active = or_default(Some(list.active), "Y");

    let result = sqlx::query(
        "INSERT INTO vicidial_lists (list_name, campaign_id, active, list_description, script, web_form)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&list.list_name)
    .bind(&list.campaign_id)
    .bind(&list.active)
    .bind(&list.list_description)
    .bind(&list.script)
    .bind(&list.web_form)
    .execute(&state.pool)
    .await
    .or_internal("Failed to create list")?;

    list.list_id = result.last_insert_id() as i64;
    Ok(ApiResponse::with_message("List created successfully", list))
}

/// PUT /api/v1/lists/:list_id
pub async fn update(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    ApiJson(list): ApiJson<ListInput>,
) -> ApiResult<Value> {
    let list_id = parse_id(&list_id, "Invalid list ID")?;

    sqlx::query(
        "UPDATE vicidial_lists SET
            list_name = ?, campaign_id = ?, active = ?,
            list_description = ?, script = ?, web_form = ?
         WHERE list_id = ?",
    )
    .bind(&list.list_name)
    .bind(&list.campaign_id)
    .bind(&list.active)
    .bind(&list.list_description)
    .bind(&list.script)
    .bind(&list.web_form)
    .bind(list_id)
    .execute(&state.pool)
    .await
    .or_internal("Failed to update list")?;

    Ok(ApiResponse::with_message("List updated successfully", json!({ "list_id": list_id })))
}

/// GET /api/v1/lists/:list_id/info - List row plus its lead count
pub async fn info(State(state): State<AppState>, Path(list_id): Path<String>) -> ApiResult<Value> {
    let list_id = parse_id(&list_id, "Invalid list ID")?;

    let list = sqlx::query_as::<_, List>(
        "SELECT list_id, list_name, campaign_id, active, list_description, script, web_form
         FROM vicidial_lists WHERE list_id = ?",
    )
    .bind(list_id)
    .fetch_optional(&state.pool)
    .await
    .or_internal("Failed to retrieve list")?
    .ok_or_else(|| ApiError::not_found("List not found"))?;

    let lead_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vicidial_list WHERE list_id = ?")
        .bind(list_id)
        .fetch_one(&state.pool)
        .await
        .or_internal("Failed to count leads")?;

    Ok(ApiResponse::with_message(
        "List retrieved",
        json!({ "list": list, "lead_count": lead_count }),
    ))
}

/// GET /api/v1/lists/:list_id/custom-fields
pub async fn custom_fields(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> ApiResult<Vec<CustomField>> {
    let list_id = parse_id(&list_id, "Invalid list ID")?;

    let fields = sqlx::query_as::<_, CustomField>(
        "SELECT field_id, field_label, field_name, field_type, field_options,
                field_size, field_max, field_default, field_required
         FROM vicidial_lists_fields WHERE list_id = ? ORDER BY field_rank",
    )
    .bind(list_id)
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve fields")?;

    Ok(ApiResponse::with_message("Custom fields retrieved", fields))
}

/// POST /api/v1/lists/:list_id/custom-fields
pub async fn add_custom_field(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    ApiJson(field): ApiJson<CustomFieldInput>,
) -> ApiResult<Value> {
    let list_id = parse_id(&list_id, "Invalid list ID")?;

    let result = sqlx::query(
        "INSERT INTO vicidial_lists_fields (list_id, field_label, field_name, field_type, field_options,
            field_size, field_max, field_default, field_required)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(list_id)
    .bind(&field.field_label)
    .bind(&field.field_name)
    .bind(&field.field_type)
    .bind(&field.field_options)
    .bind(field.field_size)
    .bind(field.field_max)
    .bind(&field.field_default)
    .bind(&field.field_required)
    .execute(&state.pool)
    .await
    .or_internal("Failed to add field")?;

    Ok(ApiResponse::with_message(
        "Field added successfully",
        json!({ "field_id": result.last_insert_id() }),
    ))
}

/// PUT /api/v1/lists/:list_id/custom-fields - Update by `field_id` in the body
pub async fn update_custom_field(
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    ApiJson(field): ApiJson<CustomFieldInput>,
) -> ApiResult<()> {
    let list_id = parse_id(&list_id, "Invalid list ID")?;

    sqlx::query(
        "UPDATE vicidial_lists_fields SET
            field_label = ?, field_type = ?, field_options = ?,
            field_size = ?, field_max = ?, field_default = ?, field_required = ?
         WHERE field_id = ? AND list_id = ?",
    )
    .bind(&field.field_label)
    .bind(&field.field_type)
    .bind(&field.field_options)
    .bind(field.field_size)
    .bind(field.field_max)
    .bind(&field.field_default)
    .bind(&field.field_required)
    .bind(field.field_id)
    .bind(list_id)
    .execute(&state.pool)
    .await
    .or_internal("Failed to update field")?;

    Ok(ApiResponse::message_only("Field updated successfully"))
}
