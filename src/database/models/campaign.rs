use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::models::list::CampaignList;
use crate::database::DbInt;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CampaignSummary {
    pub campaign_id: String,
    pub campaign_name: Option<String>,
    pub active: Option<String>,
    pub dial_status: Option<String>,
    pub dial_method: Option<String>,
    pub auto_dial_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CampaignWithLists {
    pub campaign_id: String,
    pub campaign_name: Option<String>,
    pub active: Option<String>,
    pub dial_status: Option<String>,
    pub dial_method: Option<String>,
    pub auto_dial_level: Option<String>,
    pub lead_order: Option<String>,
    pub local_call_time: Option<String>,
    #[sqlx(skip)]
    pub lists: Vec<CampaignList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CampaignInput {
    pub campaign_name: String,
    pub active: String,
    pub dial_status: String,
    pub lead_order: String,
    pub dial_method: String,
    pub auto_dial_level: String,
    pub local_call_time: String,
    pub dial_prefix: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HopperEntry {
    pub hopper_id: DbInt,
    pub lead_id: DbInt,
    pub campaign_id: Option<String>,
    pub status: Option<String>,
    pub user: Option<String>,
    pub list_id: Option<DbInt>,
    pub priority: Option<DbInt>,
    pub phone_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}
