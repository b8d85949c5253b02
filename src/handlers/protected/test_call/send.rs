use axum::extract::State;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use super::dial_plan::{CampaignDialSettings, DialPlan, DialTarget, ServerRouting};
use crate::api::{or_default, ApiJson};
use crate::app::AppState;
use crate::database::{is_unknown_column, DbInt};
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};

const MIN_PHONE_DIGITS: usize = 6;
const SQL_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `owner` stamped on every test-call lead; the listing selects on it
pub const TEST_CALL_OWNER: &str = "Test Outbound Call";

const CAMPAIGN_SQL: &str = "SELECT campaign_name, dial_prefix, campaign_cid, dial_timeout,
        omit_phone_code, campaign_vdad_exten, manual_dial_list_id,
        ext_context, active, user_group
    FROM vicidial_campaigns WHERE campaign_id = ?";

// Installs predating per-campaign contexts
const CAMPAIGN_SQL_LEGACY: &str = "SELECT campaign_name, dial_prefix, campaign_cid, dial_timeout,
        omit_phone_code, campaign_vdad_exten, manual_dial_list_id,
        active, user_group
    FROM vicidial_campaigns WHERE campaign_id = ?";

const SERVER_COLUMNS: &str =
    "server_ip, ext_context, answer_transfer_agent, asterisk_version, routing_prefix, server_id";
const SERVER_COLUMNS_LEGACY: &str = "server_ip, asterisk_version, routing_prefix, server_id";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendTestCallRequest {
    pub campaign_id: String,
    pub phone_number: String,
    pub phone_code: String,
    pub user: String,
    /// Overrides the campaign's routing extension
    pub vdad_exten: String,
    /// Originate from this server instead of the first active one
    pub server_ip: String,
}

impl SendTestCallRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.campaign_id.is_empty() {
            return Err(ApiError::bad_request("campaign_id is required"));
        }
        if self.phone_number.is_empty() {
            return Err(ApiError::bad_request("phone_number is required"));
        }
        if self.phone_number.len() < MIN_PHONE_DIGITS {
            return Err(ApiError::bad_request(
                "phone_number too small, must be at least 6 digits",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TestCallPlaced {
    pub caller_code: String,
    pub manager_id: i64,
    pub lead_id: i64,
    pub campaign_id: String,
    pub campaign_name: String,
    pub phone_number: String,
    pub phone_code: String,
    pub server_ip: String,
    pub server_id: String,
    pub channel: String,
    pub extension: String,
    pub dial_string: String,
    pub caller_id: String,
    pub call_date: String,
}

/// POST /api/v1/test-call/send - Queue an Originate for a throwaway lead
pub async fn send(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SendTestCallRequest>,
) -> ApiResult<TestCallPlaced> {
    req.validate()?;

    let phone_code = or_default(Some(req.phone_code.clone()), "1");
    let user = or_default(Some(req.user.clone()), "API");
    let pool = &state.pool;

    let campaign = load_campaign(pool, &req.campaign_id)
        .await
        .or_internal("Failed to retrieve campaign")?
        .ok_or_else(|| ApiError::not_found("Campaign not found"))?;

    let server = load_server(pool, req.server_ip.trim())
        .await
        .or_internal("Failed to retrieve server")?
        .ok_or_else(|| ApiError::not_found("No eligible server found"))?;

    let list_id = campaign.manual_dial_list_id.map(DbInt::get).unwrap_or(0);
    let mut warnings = Vec::new();

    let list_cid_override = match sqlx::query_scalar::<_, Option<String>>(
        "SELECT campaign_cid_override FROM vicidial_lists WHERE list_id = ?",
    )
    .bind(list_id)
    .fetch_optional(pool)
    .await
    {
        Ok(cid) => cid.flatten(),
        Err(e) => {
            record_failure(&mut warnings, "list caller id override lookup failed", e);
            None
        }
    };

    // Session clock so every written date agrees with NOW() in other rows
    let now: NaiveDateTime = sqlx::query_scalar("SELECT NOW()")
        .fetch_one(pool)
        .await
        .or_internal("Failed to read database clock")?;
    let call_date = now.format(SQL_DATE_FORMAT).to_string();

    let mut tx = pool.begin().await.or_internal("Failed to create test lead")?;

    let lead = sqlx::query(
        "INSERT INTO vicidial_list SET
            phone_code = ?, phone_number = ?, list_id = ?, status = 'CTCALL',
            user = 'VDAD', called_since_last_reset = 'Y', entry_date = ?,
            last_local_call_time = ?, called_count = '1', first_name = 'Test',
            last_name = 'Call', address1 = 'Test Call', address2 = '2', address3 = '3',
            city = 'Springfield', state = 'IL', vendor_lead_code = '999999',
            comments = ?, `rank` = '99', owner = ?",
    )
    .bind(&phone_code)
    .bind(&req.phone_number)
    .bind(list_id)
    .bind(now)
    .bind(now)
    .bind(format!("{} test call placed {}", req.campaign_id, call_date))
    .bind(TEST_CALL_OWNER)
    .execute(&mut *tx)
    .await
    .or_internal("Failed to create test lead")?;
    let lead_id = lead.last_insert_id() as i64;

    let target = DialTarget {
        phone_code: &phone_code,
        phone_number: &req.phone_number,
        vdad_exten: Some(req.vdad_exten.as_str()),
    };
    let plan = DialPlan::build(&campaign, &server, list_cid_override.as_deref(), &target, lead_id, now);

    let manager = sqlx::query(
        "INSERT INTO vicidial_manager
            (uniqueid, entry_date, status, response, server_ip, channel, action,
             callerid, cmd_line_b, cmd_line_c, cmd_line_d, cmd_line_e, cmd_line_f,
             cmd_line_g, cmd_line_k)
        VALUES ('', ?, 'NEW', 'N', ?, '', 'Originate', ?, ?, ?, ?, 'Priority: 1', ?, ?, ?)",
    )
    .bind(now)
    .bind(&server.server_ip)
    .bind(&plan.caller_code)
    .bind(format!("Exten: {}", plan.extension))
    .bind(format!("Context: {}", plan.context))
    .bind(format!("Channel: {}", plan.channel))
    .bind(format!("Callerid: {}", plan.caller_id))
    .bind(format!("Timeout: {}", plan.timeout_ms))
    .bind(format!(
        "VDACnote: {}|{}|{}|{}|OUT|MAIN|99",
        req.campaign_id, lead_id, phone_code, req.phone_number
    ))
    .execute(&mut *tx)
    .await
    .or_internal("Failed to queue test call")?;
    let manager_id = manager.last_insert_id() as i64;

    tx.commit().await.or_internal("Failed to queue test call")?;

    tracing::info!(
        caller_code = %plan.caller_code,
        campaign_id = %req.campaign_id,
        server_ip = %server.server_ip,
        lead_id,
        manager_id,
        "test call queued"
    );

    write_audit_rows(pool, &req, &user, &phone_code, &server, &plan, lead_id, now, &mut warnings).await;

    let placed = TestCallPlaced {
        caller_code: plan.caller_code,
        manager_id,
        lead_id,
        campaign_id: req.campaign_id,
        campaign_name: campaign.campaign_name.unwrap_or_default(),
        phone_number: req.phone_number,
        phone_code,
        server_ip: server.server_ip,
        server_id: plan.server_id,
        channel: plan.channel,
        extension: plan.extension,
        dial_string: plan.dial_string,
        caller_id: plan.caller_id,
        call_date,
    };

    Ok(ApiResponse::with_message("Test call placed successfully", placed).with_warnings(warnings))
}

async fn load_campaign(pool: &MySqlPool, campaign_id: &str) -> Result<Option<CampaignDialSettings>, sqlx::Error> {
    let result = sqlx::query_as::<_, CampaignDialSettings>(CAMPAIGN_SQL)
        .bind(campaign_id)
        .fetch_optional(pool)
        .await;

    match result {
        Err(e) if is_unknown_column(&e) => {
            tracing::debug!("campaign ext_context unavailable, retrying without it: {}", e);
            sqlx::query_as::<_, CampaignDialSettings>(CAMPAIGN_SQL_LEGACY)
                .bind(campaign_id)
                .fetch_optional(pool)
                .await
        }
        other => other,
    }
}

async fn load_server(pool: &MySqlPool, server_ip: &str) -> Result<Option<ServerRouting>, sqlx::Error> {
    let fetch = |columns: &str| {
        let (condition, bind_ip) = if server_ip.is_empty() {
            ("active = 'Y'", None)
        } else {
            ("server_ip = ?", Some(server_ip.to_string()))
        };
        let sql = format!("SELECT {} FROM servers WHERE {} LIMIT 1", columns, condition);
        async move {
            let mut query = sqlx::query_as::<_, ServerRouting>(&sql);
            if let Some(ip) = bind_ip {
                query = query.bind(ip);
            }
            query.fetch_optional(pool).await
        }
    };

    match fetch(SERVER_COLUMNS).await {
        Err(e) if is_unknown_column(&e) => {
            tracing::debug!("server routing columns unavailable, retrying without them: {}", e);
            fetch(SERVER_COLUMNS_LEGACY).await
        }
        other => other,
    }
}

#[allow(clippy::too_many_arguments)]
async fn write_audit_rows(
    pool: &MySqlPool,
    req: &SendTestCallRequest,
    user: &str,
    phone_code: &str,
    server: &ServerRouting,
    plan: &DialPlan,
    lead_id: i64,
    now: NaiveDateTime,
    warnings: &mut Vec<String>,
) {
    if let Err(e) = sqlx::query(
        "INSERT INTO vicidial_auto_calls
            (server_ip, campaign_id, status, lead_id, callerid, phone_code,
             phone_number, call_time, call_type, alt_dial, queue_priority)
        VALUES (?, ?, 'SENT', ?, ?, ?, ?, ?, 'OUT', 'MAIN', '99')",
    )
    .bind(&server.server_ip)
    .bind(&req.campaign_id)
    .bind(lead_id)
    .bind(&plan.caller_code)
    .bind(phone_code)
    .bind(&req.phone_number)
    .bind(now)
    .execute(pool)
    .await
    {
        record_failure(warnings, "failed to write auto call record", e);
    }

    if let Err(e) = sqlx::query(
        "INSERT INTO vicidial_dial_log SET
            caller_code = ?, lead_id = ?, server_ip = ?, call_date = ?, extension = ?,
            channel = ?, timeout = ?, outbound_cid = ?, context = ?",
    )
    .bind(&plan.caller_code)
    .bind(lead_id)
    .bind(&server.server_ip)
    .bind(now)
    .bind(&plan.extension)
    .bind(&plan.channel)
    .bind(plan.timeout_ms)
    .bind(&plan.caller_id)
    .bind(&plan.context)
    .execute(pool)
    .await
    {
        record_failure(warnings, "failed to write dial log", e);
    }

    if let Err(e) = sqlx::query(
        "INSERT INTO vicidial_dial_cid_log SET
            caller_code = ?, call_date = ?, call_type = 'MANUAL', call_alt = 'MAIN',
            outbound_cid = ?, outbound_cid_type = 'CAMPAIGN_TEST'",
    )
    .bind(&plan.caller_code)
    .bind(now)
    .bind(&plan.outbound_cid)
    .execute(pool)
    .await
    {
        record_failure(warnings, "failed to write caller id log", e);
    }

    if let Err(e) = sqlx::query(
        "INSERT INTO vicidial_user_dial_log SET
            caller_code = ?, user = ?, call_date = ?, call_type = 'M',
            notes = 'API test call CAMPAIGN_TEST'",
    )
    .bind(&plan.caller_code)
    .bind(user)
    .bind(now)
    .execute(pool)
    .await
    {
        record_failure(warnings, "failed to write user dial log", e);
    }

    if let Err(e) = sqlx::query(
        "INSERT INTO user_call_log
            (user, call_date, call_type, server_ip, phone_number, number_dialed,
             lead_id, callerid, group_alias_id, preset_name)
        VALUES (?, ?, 'API', ?, ?, ?, ?, ?, '', '')",
    )
    .bind(user)
    .bind(now)
    .bind(&server.server_ip)
    .bind(&req.phone_number)
    .bind(&plan.dial_string)
    .bind(lead_id)
    .bind(&plan.outbound_cid)
    .execute(pool)
    .await
    {
        record_failure(warnings, "failed to write user call log", e);
    }
}

fn record_failure(warnings: &mut Vec<String>, warning: &str, err: sqlx::Error) {
    tracing::warn!("test call: {}: {}", warning, err);
    warnings.push(warning.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(campaign_id: &str, phone_number: &str) -> SendTestCallRequest {
        SendTestCallRequest {
            campaign_id: campaign_id.into(),
            phone_number: phone_number.into(),
            ..Default::default()
        }
    }

    #[test]
    fn validation_order() {
        assert_eq!(
            request("", "").validate().unwrap_err().error(),
            "campaign_id is required"
        );
        assert_eq!(
            request("TESTCAMP", "").validate().unwrap_err().error(),
            "phone_number is required"
        );
        assert_eq!(
            request("TESTCAMP", "12345").validate().unwrap_err().error(),
            "phone_number too small, must be at least 6 digits"
        );
        assert!(request("TESTCAMP", "123456").validate().is_ok());
    }

    #[test]
    fn record_failure_keeps_warning_text() {
        let mut warnings = Vec::new();
        record_failure(&mut warnings, "failed to write dial log", sqlx::Error::RowNotFound);
        assert_eq!(warnings, vec!["failed to write dial log".to_string()]);
    }
}
