use axum::extract::State;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use super::dial_plan::caller_code_sql;
use super::send::TEST_CALL_OWNER;
use crate::api::{parse_limit, ApiQuery};
use crate::app::AppState;
use crate::database::{DbInt, QueryBuilder};
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub caller_code: Option<String>,
}

#[derive(Debug, FromRow)]
struct ManagerRow {
    man_id: DbInt,
    entry_date: Option<NaiveDateTime>,
    status: Option<String>,
    response: Option<String>,
    action: Option<String>,
    cmd_line_b: Option<String>,
    cmd_line_c: Option<String>,
    cmd_line_d: Option<String>,
}

#[derive(Debug, FromRow)]
struct DialLogRow {
    call_date: Option<NaiveDateTime>,
    extension: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TestCallStatus {
    pub caller_code: String,
    pub manager_id: i64,
    pub entry_date: Option<NaiveDateTime>,
    pub status: String,
    pub response: String,
    pub action: String,
    pub channel: String,
    pub context: String,
    pub extension: String,
    pub call_date: Option<NaiveDateTime>,
}

/// Strip the `Key: ` label the manager queue stores in each command line
pub fn command_value(line: Option<&str>, label: &str) -> String {
    let line = line.unwrap_or("");
    line.strip_prefix(label).unwrap_or(line).to_string()
}

/// GET /api/v1/test-call/status - Latest origination state for a caller code
pub async fn status(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<StatusQuery>,
) -> ApiResult<TestCallStatus> {
    let caller_code = q
        .caller_code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::bad_request("caller_code is required"))?;

    let manager = sqlx::query_as::<_, ManagerRow>(
        "SELECT man_id, entry_date, status, response, action, cmd_line_b, cmd_line_c, cmd_line_d
        FROM vicidial_manager
        WHERE callerid LIKE ?
        ORDER BY entry_date DESC
        LIMIT 1",
    )
    .bind(format!("%{}%", caller_code))
    .fetch_optional(&state.pool)
    .await
    .or_internal("Failed to retrieve call status")?
    .ok_or_else(|| ApiError::not_found("Test call not found"))?;

    // Dial log rows are written best effort at send time and may be missing
    let dial = match sqlx::query_as::<_, DialLogRow>(
        "SELECT call_date, extension FROM vicidial_dial_log
        WHERE caller_code = ?
        ORDER BY call_date DESC
        LIMIT 1",
    )
    .bind(&caller_code)
    .fetch_optional(&state.pool)
    .await
    {
        Ok(row) => row,
        Err(e) => {
            tracing::warn!(caller_code = %caller_code, "dial log lookup failed: {}", e);
            None
        }
    };

    let (call_date, extension) = match dial {
        Some(d) => (d.call_date, d.extension.unwrap_or_default()),
        None => (None, command_value(manager.cmd_line_b.as_deref(), "Exten: ")),
    };

    let status = TestCallStatus {
        caller_code,
        manager_id: manager.man_id.get(),
        entry_date: manager.entry_date,
        status: manager.status.unwrap_or_default(),
        response: manager.response.unwrap_or_default(),
        action: manager.action.unwrap_or_default(),
        channel: command_value(manager.cmd_line_d.as_deref(), "Channel: "),
        context: command_value(manager.cmd_line_c.as_deref(), "Context: "),
        extension,
        call_date,
    };

    Ok(ApiResponse::with_message("Test call status retrieved", status))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub phone_login: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TestCallEntry {
    pub caller_code: String,
    pub lead_id: DbInt,
    pub phone_number: Option<String>,
    pub call_date: Option<NaiveDateTime>,
    pub extension: Option<String>,
    pub channel: Option<String>,
    pub server_ip: Option<String>,
    pub status: Option<String>,
    pub response: Option<String>,
}

/// Listing query. Test-call leads are the anchor: they commit together with
/// the Originate row, while the dial and caller id logs are best effort.
fn list_sql() -> String {
    format!(
        "SELECT tc.caller_code, tc.lead_id, tc.phone_number,
            COALESCE(dl.call_date, tc.entry_date) AS call_date,
            dl.extension, dl.channel,
            COALESCE(dl.server_ip, vm.server_ip) AS server_ip,
            vm.status, vm.response
        FROM (
            SELECT lead_id, phone_number, entry_date, owner, {} AS caller_code
            FROM vicidial_list
        ) tc
        LEFT JOIN vicidial_manager vm ON vm.callerid = tc.caller_code AND vm.action = 'Originate'
        LEFT JOIN vicidial_dial_log dl ON dl.caller_code = tc.caller_code",
        caller_code_sql("entry_date", "lead_id")
    )
}

/// GET /api/v1/test-call/list - Recent test calls, newest first
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> ApiResult<Value> {
    let limit = parse_limit(q.limit.as_deref(), 50)?;

    let sql = QueryBuilder::new(list_sql()).filter("tc.owner = ?", TEST_CALL_OWNER);
    let sql = match q.phone_login.as_deref().filter(|p| !p.is_empty()) {
        Some(login) => sql.filter("tc.caller_code LIKE ?", format!("%{}", login)),
        None => sql,
    }
    .order_by("tc.entry_date DESC, tc.lead_id DESC")
    .limit(limit)
    .build();

    let calls = sql
        .query_as::<TestCallEntry>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve test calls")?;

    Ok(ApiResponse::with_message(
        "Test calls retrieved",
        json!({ "count": calls.len(), "calls": calls }),
    ))
}
