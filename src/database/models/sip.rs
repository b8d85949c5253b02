use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::database::DbInt;

/// `vicidial_carrier_log` row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CarrierLog {
    pub uniqueid: String,
    pub call_date: Option<NaiveDateTime>,
    pub server_ip: Option<String>,
    pub lead_id: Option<DbInt>,
    pub hangup_cause: Option<DbInt>,
    pub dialstatus: Option<String>,
    pub channel: Option<String>,
    pub dial_time: Option<DbInt>,
    pub answered_time: Option<DbInt>,
    pub sip_hangup_cause: Option<DbInt>,
    pub sip_hangup_reason: Option<String>,
    pub caller_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SipEvent {
    pub sip_event_id: DbInt,
    pub sip_call_id: Option<String>,
    pub sip_event: Option<String>,
    pub event_date: Option<NaiveDateTime>,
    pub server_ip: Option<String>,
    pub caller_id_number: Option<String>,
    pub caller_id_name: Option<String>,
    pub extension: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LiveSipChannel {
    pub channel: Option<String>,
    pub server_ip: Option<String>,
    pub channel_group: Option<String>,
    pub extension: Option<String>,
    pub context: Option<String>,
    pub caller_id_number: Option<String>,
    pub caller_id_name: Option<String>,
    pub application: Option<String>,
    pub app_data: Option<String>,
}
