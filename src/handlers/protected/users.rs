use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{or_default, ApiJson, ApiQuery};
use crate::app::AppState;
use crate::database::models::user::{
    AgentStatus, CampaignAssignment, IngroupAssignment, LiveAgent, UserDetails, UserInput,
};
use crate::database::QueryBuilder;
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/v1/users
pub async fn add(State(state): State<AppState>, ApiJson(user): ApiJson<UserInput>) -> ApiResult<Value> {
    if user.user.is_empty() || user.pass.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }
    let active = or_default(Some(user.active), "Y");

    sqlx::query(
        "INSERT INTO vicidial_users (user, pass, full_name, user_level, user_group, phone_login, phone_pass, active, email)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.user)
    .bind(&user.pass)
    .bind(&user.full_name)
    .bind(user.user_level)
    .bind(&user.user_group)
    .bind(&user.phone_login)
    .bind(&user.phone_pass)
    .bind(&active)
    .bind(&user.email)
    .execute(&state.pool)
    .await
    .or_internal("Failed to create user")?;

    tracing::info!(user = %user.user, "user created");
    Ok(ApiResponse::with_message("User created successfully", json!({ "user": user.user })))
}

/// PUT /api/v1/users/:user_id
pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(user): ApiJson<UserInput>,
) -> ApiResult<Value> {
    sqlx::query(
        "UPDATE vicidial_users SET
            full_name = ?, user_level = ?, user_group = ?,
            phone_login = ?, phone_pass = ?, active = ?, email = ?
         WHERE user = ?",
    )
    .bind(&user.full_name)
    .bind(user.user_level)
    .bind(&user.user_group)
    .bind(&user.phone_login)
    .bind(&user.phone_pass)
    .bind(&user.active)
    .bind(&user.email)
    .bind(&user_id)
    .execute(&state.pool)
    .await
    .or_internal("Failed to update user")?;

    Ok(ApiResponse::with_message("User updated successfully", json!({ "user": user_id })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CopyUserRequest {
    pub new_user: String,
    pub new_pass: String,
}

/// POST /api/v1/users/:user_id/copy - Clone settings of an existing user
pub async fn copy(
    State(state): State<AppState>,
    Path(source_user): Path<String>,
    ApiJson(req): ApiJson<CopyUserRequest>,
) -> ApiResult<Value> {
    if req.new_user.is_empty() || req.new_pass.is_empty() {
        return Err(ApiError::bad_request("New username and password are required"));
    }

    let result = sqlx::query(
        "INSERT INTO vicidial_users (user, pass, full_name, user_level, user_group, phone_login, phone_pass, active, email)
         SELECT ?, ?, full_name, user_level, user_group, phone_login, phone_pass, active, email
         FROM vicidial_users WHERE user = ?",
    )
    .bind(&req.new_user)
    .bind(&req.new_pass)
    .bind(&source_user)
    .execute(&state.pool)
    .await
    .or_internal("Failed to copy user")?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(ApiResponse::with_message("User copied successfully", json!({ "new_user": req.new_user })))
}

/// GET /api/v1/users/:user_id/details
pub async fn details(State(state): State<AppState>, Path(user_id): Path<String>) -> ApiResult<UserDetails> {
    let user = sqlx::query_as::<_, UserDetails>(
        "SELECT user, full_name, user_level, user_group, phone_login, active, email,
                custom_one, custom_two, custom_three, custom_four, custom_five
         FROM vicidial_users WHERE user = ?",
    )
    .bind(&user_id)
    .fetch_optional(&state.pool)
    .await
    .or_internal("Failed to retrieve user")?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::with_message("User details retrieved", user))
}

/// GET /api/v1/users/logged-in
pub async fn logged_in(State(state): State<AppState>) -> ApiResult<Vec<LiveAgent>> {
    let agents = sqlx::query_as::<_, LiveAgent>(
        "SELECT user, server_ip, extension, status, campaign_id, last_update_time
         FROM vicidial_live_agents
         ORDER BY last_update_time DESC",
    )
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve agents")?;

    Ok(ApiResponse::with_message("Logged-in agents retrieved", agents))
}

#[derive(Debug, Default, Deserialize)]
pub struct AgentStatusQuery {
    pub campaign_id: Option<String>,
    pub user_group: Option<String>,
}

/// GET /api/v1/agents/status?campaign_id=&user_group=
pub async fn agent_status(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<AgentStatusQuery>,
) -> ApiResult<Vec<AgentStatus>> {
    let sql = QueryBuilder::new(
        "SELECT user, status, server_ip, extension, campaign_id, last_call_time, pause_code, calls_today
         FROM vicidial_live_agents",
    )
    .filter_opt("campaign_id = ?", q.campaign_id.as_deref())
    .filter_opt(
        "user IN (SELECT user FROM vicidial_users WHERE user_group = ?)",
        q.user_group.as_deref(),
    )
    .build();

    let agents = sql
        .query_as::<AgentStatus>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve status")?;

    Ok(ApiResponse::with_message("Agent status retrieved", agents))
}

/// GET /api/v1/agents/:agent_id/ingroup-info
pub async fn ingroup_info(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> ApiResult<Vec<IngroupAssignment>> {
    let ingroups = sqlx::query_as::<_, IngroupAssignment>(
        "SELECT group_id, user, group_rank, group_web_vars
         FROM vicidial_inbound_group_agents
         WHERE user = ?
         ORDER BY group_rank",
    )
    .bind(&agent_id)
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve ingroups")?;

    Ok(ApiResponse::with_message("Agent ingroups retrieved", ingroups))
}

/// GET /api/v1/agents/:agent_id/campaigns
pub async fn campaigns(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> ApiResult<Vec<CampaignAssignment>> {
    let campaigns = sqlx::query_as::<_, CampaignAssignment>(
        "SELECT campaign_id, campaign_rank
         FROM vicidial_campaign_agents
         WHERE user = ?
         ORDER BY campaign_rank",
    )
    .bind(&agent_id)
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve campaigns")?;

    Ok(ApiResponse::with_message("Agent campaigns retrieved", campaigns))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RemoteAgentUpdate {
    pub remote_agent_id: String,
    pub status: String,
    pub server_ip: String,
}

/// PUT /api/v1/remote-agents/:agent_id
pub async fn update_remote_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    ApiJson(req): ApiJson<RemoteAgentUpdate>,
) -> ApiResult<()> {
    sqlx::query(
        "UPDATE vicidial_remote_agents SET status = ?, server_ip = ?
         WHERE user = ? AND remote_agent_id = ?",
    )
    .bind(&req.status)
    .bind(&req.server_ip)
    .bind(&agent_id)
    .bind(&req.remote_agent_id)
    .execute(&state.pool)
    .await
    .or_internal("Failed to update remote agent")?;

    Ok(ApiResponse::message_only("Remote agent updated successfully"))
}
