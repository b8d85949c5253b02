//! Pure derivation of the origination command for a test call.
//!
//! Everything here is computed from already-loaded campaign, server and list
//! rows so the rules can be exercised without a database.

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use crate::database::DbInt;

const DEFAULT_OUT_PREFIX: &str = "9";
const DEFAULT_TIMEOUT_SECS: i64 = 60;
const MIN_CAMPAIGN_TIMEOUT_SECS: i64 = 4;
const DEFAULT_VDAD_EXTEN: &str = "8368";
const DEFAULT_CONTEXT: &str = "default";
const DEFAULT_ASTERISK_VERSION: &str = "11";
const ROUTING_PREFIX_MIN_MAJOR: u32 = 12;
const CALLER_CODE_PREFIX: &str = "V";
const CALLER_CODE_DATE_FORMAT: &str = "%m%d%H";
const CALLER_CODE_ID_DIGITS: usize = 10;

/// Dial settings of the campaign the test call runs under
#[derive(Debug, Clone, Default, FromRow)]
pub struct CampaignDialSettings {
    pub campaign_name: Option<String>,
    pub dial_prefix: Option<String>,
    pub campaign_cid: Option<String>,
    pub dial_timeout: Option<DbInt>,
    pub omit_phone_code: Option<String>,
    pub campaign_vdad_exten: Option<String>,
    pub manual_dial_list_id: Option<DbInt>,
    #[sqlx(default)]
    pub ext_context: Option<String>,
    pub active: Option<String>,
    pub user_group: Option<String>,
}

/// Routing metadata of the dialer server that will originate the call
#[derive(Debug, Clone, Default, FromRow)]
pub struct ServerRouting {
    pub server_ip: String,
    #[sqlx(default)]
    pub ext_context: Option<String>,
    #[sqlx(default)]
    pub answer_transfer_agent: Option<String>,
    pub asterisk_version: Option<String>,
    pub routing_prefix: Option<String>,
    pub server_id: Option<String>,
}

/// Caller-controlled parts of the request
#[derive(Debug, Clone, Default)]
pub struct DialTarget<'a> {
    pub phone_code: &'a str,
    pub phone_number: &'a str,
    pub vdad_exten: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialPlan {
    pub caller_code: String,
    pub out_prefix: String,
    pub timeout_ms: i64,
    pub extension: String,
    pub dial_string: String,
    pub context: String,
    pub channel: String,
    /// Outbound caller id number (campaign CID or list override)
    pub outbound_cid: String,
    /// Full `Callerid:` value sent to the originate command
    pub caller_id: String,
    pub server_id: String,
}

impl DialPlan {
    pub fn build(
        campaign: &CampaignDialSettings,
        server: &ServerRouting,
        list_cid_override: Option<&str>,
        target: &DialTarget<'_>,
        lead_id: i64,
        now: NaiveDateTime,
    ) -> Self {
        let out_prefix = out_prefix(campaign.dial_prefix.as_deref());
        let dial_string = dial_string(
            &out_prefix,
            target.phone_code,
            target.phone_number,
            campaign.omit_phone_code.as_deref(),
        );
        let context = context(campaign.ext_context.as_deref(), server.ext_context.as_deref());
        let caller_code = caller_code(now, lead_id);
        let outbound_cid = outbound_cid(campaign.campaign_cid.as_deref(), list_cid_override);
        let server_id = non_blank(server.server_id.as_deref())
            .unwrap_or(server.server_ip.as_str())
            .to_string();

        Self {
            timeout_ms: timeout_ms(campaign.dial_timeout.map(DbInt::get)),
            extension: extension(campaign, server, target.vdad_exten),
            channel: format!("Local/{}@{}", dial_string, context),
            caller_id: caller_id(&caller_code, &outbound_cid),
            caller_code,
            out_prefix,
            dial_string,
            context,
            outbound_cid,
            server_id,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A prefix containing the `x` placeholder means "dial as-is"
pub fn out_prefix(dial_prefix: Option<&str>) -> String {
    match dial_prefix.unwrap_or("") {
        p if p.contains('x') => String::new(),
        "" => DEFAULT_OUT_PREFIX.to_string(),
        p => p.to_string(),
    }
}

/// Campaign timeouts of 4s or less fall back to 60s
pub fn timeout_ms(dial_timeout: Option<i64>) -> i64 {
    let secs = match dial_timeout {
        Some(t) if t > MIN_CAMPAIGN_TIMEOUT_SECS => t,
        _ => DEFAULT_TIMEOUT_SECS,
    };
    secs * 1000
}

/// Routing extension: request > campaign > server > built-in default, with
/// the server routing prefix prepended on Asterisk 12 and later.
pub fn extension(campaign: &CampaignDialSettings, server: &ServerRouting, requested: Option<&str>) -> String {
    let exten = non_blank(requested)
        .or_else(|| non_blank(campaign.campaign_vdad_exten.as_deref()))
        .or_else(|| non_blank(server.answer_transfer_agent.as_deref()))
        .unwrap_or(DEFAULT_VDAD_EXTEN);

    let version = non_blank(server.asterisk_version.as_deref()).unwrap_or(DEFAULT_ASTERISK_VERSION);
    let routing_prefix = server.routing_prefix.as_deref().unwrap_or("");

    if major_version(version) >= ROUTING_PREFIX_MIN_MAJOR && !routing_prefix.is_empty() {
        format!("{}{}", routing_prefix, exten)
    } else {
        exten.to_string()
    }
}

fn major_version(version: &str) -> u32 {
    version
        .split('.')
        .next()
        .and_then(|major| major.trim().parse().ok())
        .unwrap_or(0)
}

pub fn dial_string(out_prefix: &str, phone_code: &str, phone_number: &str, omit_phone_code: Option<&str>) -> String {
    let omit = omit_phone_code
        .map(|v| v.eq_ignore_ascii_case("Y"))
        .unwrap_or(false);
    if omit {
        format!("{}{}", out_prefix, phone_number)
    } else {
        format!("{}{}{}", out_prefix, phone_code, phone_number)
    }
}

/// Server context wins over the campaign's, then `default`
pub fn context(campaign_context: Option<&str>, server_context: Option<&str>) -> String {
    non_blank(server_context)
        .or_else(|| non_blank(campaign_context))
        .unwrap_or(DEFAULT_CONTEXT)
        .to_string()
}

/// `V` + MMDDHH + last 10 digits of the zero-padded lead id
pub fn caller_code(now: NaiveDateTime, lead_id: i64) -> String {
    let padded = format!("{:0width$}", lead_id, width = CALLER_CODE_ID_DIGITS);
    let tail = &padded[padded.len() - CALLER_CODE_ID_DIGITS..];
    format!("{}{}{}", CALLER_CODE_PREFIX, now.format(CALLER_CODE_DATE_FORMAT), tail)
}

/// SQL expression computing `caller_code` from a lead's id and entry date columns
pub fn caller_code_sql(entry_date: &str, lead_id: &str) -> String {
    format!(
        "CONCAT('{prefix}', DATE_FORMAT({date}, '{fmt}'), RIGHT(LPAD({id}, {n}, '0'), {n}))",
        prefix = CALLER_CODE_PREFIX,
        date = entry_date,
        fmt = CALLER_CODE_DATE_FORMAT,
        id = lead_id,
        n = CALLER_CODE_ID_DIGITS,
    )
}

/// List override replaces the campaign CID only when it looks like a number
pub fn outbound_cid(campaign_cid: Option<&str>, list_override: Option<&str>) -> String {
    match list_override {
        Some(cid) if cid.len() > 6 => cid.to_string(),
        _ => campaign_cid.unwrap_or("").to_string(),
    }
}

pub fn caller_id(caller_code: &str, outbound_cid: &str) -> String {
    if outbound_cid.len() > 6 {
        format!("\"{}\" <{}>", caller_code, outbound_cid)
    } else {
        caller_code.to_string()
    }
}
