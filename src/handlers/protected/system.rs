//! Read-only catalogues of dialer configuration plus the server refresh hook.

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{ApiJson, ApiQuery};
use crate::app::AppState;
use crate::database::models::system::{
    CallMenu, InboundGroup, InboundGroupStatus, MusicOnHold, SettingsContainer, Sound, UserGroupStatus,
    Voicemail,
};
use crate::database::QueryBuilder;
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/v1/system/sounds
pub async fn sounds(State(state): State<AppState>) -> ApiResult<Vec<Sound>> {
    let sounds = sqlx::query_as::<_, Sound>(
        "SELECT audio_filename, audio_name, user, active FROM vicidial_audio_store ORDER BY audio_name",
    )
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve sounds")?;

    Ok(ApiResponse::with_message("Sound files retrieved", sounds))
}

/// GET /api/v1/system/moh
pub async fn music_on_hold(State(state): State<AppState>) -> ApiResult<Vec<MusicOnHold>> {
    let moh = sqlx::query_as::<_, MusicOnHold>(
        "SELECT moh_id, moh_name, moh_format, random FROM vicidial_music_on_hold ORDER BY moh_name",
    )
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve MOH")?;

    Ok(ApiResponse::with_message("Music on hold files retrieved", moh))
}

/// GET /api/v1/system/voicemail
pub async fn voicemail(State(state): State<AppState>) -> ApiResult<Vec<Voicemail>> {
    let boxes = sqlx::query_as::<_, Voicemail>(
        "SELECT voicemail_id, fullname, email, active FROM vicidial_voicemail ORDER BY voicemail_id",
    )
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve voicemail")?;

    Ok(ApiResponse::with_message("Voicemail boxes retrieved", boxes))
}

#[derive(Debug, Default, Deserialize)]
pub struct IngroupQuery {
    pub active: Option<String>,
}

/// GET /api/v1/ingroups
pub async fn ingroups(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<IngroupQuery>,
) -> ApiResult<Vec<InboundGroup>> {
    let sql = QueryBuilder::new(
        "SELECT group_id, group_name, group_color, active, web_form FROM vicidial_inbound_groups",
    )
    .filter_opt("active = ?", q.active.as_deref())
    .order_by("group_name")
    .build();

    let groups = sql
        .query_as::<InboundGroup>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve inbound groups")?;

    Ok(ApiResponse::with_message("Inbound groups retrieved", groups))
}

/// GET /api/v1/ingroups/status - Agents and waiting calls per active inbound group
pub async fn ingroup_status(State(state): State<AppState>) -> ApiResult<Vec<InboundGroupStatus>> {
    let statuses = sqlx::query_as::<_, InboundGroupStatus>(
        "SELECT ig.group_id, ig.group_name,
            COUNT(DISTINCT iga.user) AS agents_logged_in,
            COUNT(DISTINCT CASE WHEN la.status = 'READY' THEN la.user END) AS agents_ready,
            COUNT(DISTINCT vic.uniqueid) AS calls_waiting
        FROM vicidial_inbound_groups ig
        LEFT JOIN vicidial_inbound_group_agents iga ON ig.group_id = iga.group_id
        LEFT JOIN vicidial_live_agents la ON iga.user = la.user
        LEFT JOIN vicidial_auto_calls vic ON ig.group_id = vic.campaign_id AND vic.status = 'LIVE'
        WHERE ig.active = 'Y'
        GROUP BY ig.group_id, ig.group_name
        ORDER BY ig.group_name",
    )
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve ingroup status")?;

    Ok(ApiResponse::with_message("Inbound group status retrieved", statuses))
}

/// GET /api/v1/callmenus
pub async fn call_menus(State(state): State<AppState>) -> ApiResult<Vec<CallMenu>> {
    let menus = sqlx::query_as::<_, CallMenu>(
        "SELECT menu_id, menu_name, menu_prompt, menu_timeout, menu_timeout_prompt, active
        FROM vicidial_call_menu
        ORDER BY menu_name",
    )
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve call menus")?;

    Ok(ApiResponse::with_message("Call menus retrieved", menus))
}

/// GET /api/v1/containers
pub async fn containers(State(state): State<AppState>) -> ApiResult<Vec<SettingsContainer>> {
    let containers = sqlx::query_as::<_, SettingsContainer>(
        "SELECT container_id, container_name, container_notes, container_type, user_group
        FROM vicidial_settings_containers
        ORDER BY container_name",
    )
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve containers")?;

    Ok(ApiResponse::with_message("Containers retrieved", containers))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RefreshRequest {
    pub server_ip: String,
}

/// POST /api/v1/system/refresh - Flag a dialer server to reload its configuration
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<Value> {
    if req.server_ip.is_empty() {
        return Err(ApiError::bad_request("server_ip is required"));
    }

    sqlx::query(
        "INSERT INTO vicidial_server_refresh (server_ip, last_refresh, db_time)
        VALUES (?, NOW(), NOW())
        ON DUPLICATE KEY UPDATE last_refresh = NOW(), db_time = NOW()",
    )
    .bind(&req.server_ip)
    .execute(&state.pool)
    .await
    .or_internal("Failed to trigger refresh")?;

    tracing::info!(server_ip = %req.server_ip, "server refresh requested");
    Ok(ApiResponse::with_message(
        "Server refresh triggered",
        json!({ "server_ip": req.server_ip, "status": "refresh_requested" }),
    ))
}

/// GET /api/v1/user-groups/status
pub async fn user_group_status(State(state): State<AppState>) -> ApiResult<Vec<UserGroupStatus>> {
    let statuses = sqlx::query_as::<_, UserGroupStatus>(
        "SELECT ug.user_group, ug.group_name,
            COUNT(DISTINCT u.user) AS total_users,
            COUNT(DISTINCT la.user) AS logged_in_users
        FROM vicidial_user_groups ug
        LEFT JOIN vicidial_users u ON ug.user_group = u.user_group
        LEFT JOIN vicidial_live_agents la ON u.user = la.user
        GROUP BY ug.user_group, ug.group_name
        ORDER BY ug.group_name",
    )
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve user group status")?;

    Ok(ApiResponse::with_message("User group status retrieved", statuses))
}
