use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::DbInt;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct List {
    pub list_id: DbInt,
    pub list_name: Option<String>,
    pub campaign_id: Option<String>,
    pub active: Option<String>,
    pub list_description: Option<String>,
    pub script: Option<String>,
    pub web_form: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListInput {
    pub list_id: i64,
    pub list_name: String,
    pub campaign_id: String,
    pub active: String,
    pub list_description: String,
    pub script: String,
    pub web_form: String,
}

/// Definition of a per-list custom lead attribute
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomField {
    pub field_id: DbInt,
    pub field_label: Option<String>,
    pub field_name: Option<String>,
    pub field_type: Option<String>,
    pub field_options: Option<String>,
    pub field_size: Option<DbInt>,
    pub field_max: Option<DbInt>,
    pub field_default: Option<String>,
    pub field_required: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomFieldInput {
    pub field_id: i64,
    pub field_label: String,
    pub field_name: String,
    pub field_type: String,
    pub field_options: String,
    pub field_size: i64,
    pub field_max: i64,
    pub field_default: String,
    pub field_required: String,
}

/// List nested under a campaign, with its lead count
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CampaignList {
    pub list_id: DbInt,
    pub list_name: Option<String>,
    pub active: Option<String>,
    pub list_description: Option<String>,
    pub lead_count: i64,
}
