use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::DbInt;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserInput {
    pub user: String,
    pub pass: String,
    pub full_name: String,
    pub user_level: i64,
    pub user_group: String,
    pub phone_login: String,
    pub phone_pass: String,
    pub active: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserDetails {
    pub user: String,
    pub full_name: Option<String>,
    pub user_level: Option<DbInt>,
    pub user_group: Option<String>,
    pub phone_login: Option<String>,
    pub active: Option<String>,
    pub email: Option<String>,
    pub custom_one: Option<String>,
    pub custom_two: Option<String>,
    pub custom_three: Option<String>,
    pub custom_four: Option<String>,
    pub custom_five: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LiveAgent {
    pub user: Option<String>,
    pub server_ip: Option<String>,
    pub extension: Option<String>,
    pub status: Option<String>,
    pub campaign_id: Option<String>,
    pub last_update_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AgentStatus {
    pub user: Option<String>,
    pub status: Option<String>,
    pub server_ip: Option<String>,
    pub extension: Option<String>,
    pub campaign_id: Option<String>,
    pub last_call_time: Option<NaiveDateTime>,
    pub pause_code: Option<String>,
    pub calls_today: Option<DbInt>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct IngroupAssignment {
    pub group_id: Option<String>,
    pub user: Option<String>,
    pub group_rank: Option<DbInt>,
    pub group_web_vars: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CampaignAssignment {
    pub campaign_id: Option<String>,
    pub campaign_rank: Option<DbInt>,
}
