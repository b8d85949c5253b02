use serde::Serialize;
use sqlx::FromRow;

use crate::database::DbInt;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Sound {
    pub audio_filename: String,
    pub audio_name: Option<String>,
    pub user: Option<String>,
    pub active: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MusicOnHold {
    pub moh_id: String,
    pub moh_name: Option<String>,
    pub moh_format: Option<String>,
    pub random: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Voicemail {
    pub voicemail_id: String,
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub active: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InboundGroup {
    pub group_id: String,
    pub group_name: Option<String>,
    pub group_color: Option<String>,
    pub active: Option<String>,
    pub web_form: Option<String>,
}

/// Live staffing of one active inbound group
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InboundGroupStatus {
    pub group_id: String,
    pub group_name: Option<String>,
    pub agents_logged_in: i64,
    pub agents_ready: i64,
    pub calls_waiting: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CallMenu {
    pub menu_id: String,
    pub menu_name: Option<String>,
    pub menu_prompt: Option<String>,
    pub menu_timeout: Option<DbInt>,
    pub menu_timeout_prompt: Option<String>,
    pub active: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SettingsContainer {
    pub container_id: String,
    pub container_name: Option<String>,
    pub container_notes: Option<String>,
    pub container_type: Option<String>,
    pub user_group: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserGroupStatus {
    pub user_group: String,
    pub group_name: Option<String>,
    pub total_users: i64,
    pub logged_in_users: i64,
}
