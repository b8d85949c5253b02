use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{ApiJson, ApiQuery};
use crate::app::AppState;
use crate::database::models::campaign::{CampaignInput, CampaignSummary, CampaignWithLists, HopperEntry};
use crate::database::models::list::CampaignList;
use crate::database::QueryBuilder;
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};

/// PUT /api/v1/campaigns/:campaign_id
pub async fn update(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    ApiJson(campaign): ApiJson<CampaignInput>,
) -> ApiResult<Value> {
    sqlx::query(
        "UPDATE vicidial_campaigns SET
            campaign_name = ?, active = ?, dial_status = ?,
            lead_order = ?, dial_method = ?, auto_dial_level = ?,
            local_call_time = ?, dial_prefix = ?
         WHERE campaign_id = ?",
    )
    .bind(&campaign.campaign_name)
    .bind(&campaign.active)
    .bind(&campaign.dial_status)
    .bind(&campaign.lead_order)
    .bind(&campaign.dial_method)
    .bind(&campaign.auto_dial_level)
    .bind(&campaign.local_call_time)
    .bind(&campaign.dial_prefix)
    .bind(&campaign_id)
    .execute(&state.pool)
    .await
    .or_internal("Failed to update campaign")?;

    Ok(ApiResponse::with_message(
        "Campaign updated successfully",
        json!({ "campaign_id": campaign_id }),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct CampaignsQuery {
    pub active: Option<String>,
    pub campaign_id: Option<String>,
}

/// GET /api/v1/campaigns?active=
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<CampaignsQuery>,
) -> ApiResult<Vec<CampaignSummary>> {
    let sql = QueryBuilder::new(
        "SELECT campaign_id, campaign_name, active, dial_status, dial_method, auto_dial_level FROM vicidial_campaigns",
    )
    .filter_opt("active = ?", q.active.as_deref())
    .order_by("campaign_name")
    .build();

    let campaigns = sql
        .query_as::<CampaignSummary>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve campaigns")?;

    Ok(ApiResponse::with_message("Campaigns retrieved", campaigns))
}

#[derive(Debug, Serialize)]
pub struct CampaignsWithLists {
    pub count: usize,
    pub campaigns: Vec<CampaignWithLists>,
}

/// GET /api/v1/campaigns/with-lists?active=&campaign_id=
///
/// One follow-up query per campaign. A campaign whose list query fails is
/// left out and named in `warnings`; the rest of the response still succeeds.
pub async fn with_lists(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<CampaignsQuery>,
) -> ApiResult<CampaignsWithLists> {
    let sql = QueryBuilder::new(
        "SELECT campaign_id, campaign_name, active, dial_status, dial_method,
                auto_dial_level, lead_order, local_call_time
         FROM vicidial_campaigns",
    )
    .filter_opt("active = ?", q.active.as_deref())
    .filter_opt("campaign_id = ?", q.campaign_id.as_deref())
    .order_by("campaign_name")
    .build();

    let rows = sql
        .query_as::<CampaignWithLists>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve campaigns")?;

    let mut campaigns = Vec::with_capacity(rows.len());
    let mut warnings = Vec::new();

    for mut campaign in rows {
        let lists = sqlx::query_as::<_, CampaignList>(
            "SELECT l.list_id, l.list_name, l.active, l.list_description,
                    COUNT(vl.lead_id) AS lead_count
             FROM vicidial_lists l
             LEFT JOIN vicidial_list vl ON l.list_id = vl.list_id
             WHERE l.campaign_id = ?
             GROUP BY l.list_id, l.list_name, l.active, l.list_description
             ORDER BY l.list_name",
        )
        .bind(&campaign.campaign_id)
        .fetch_all(&state.pool)
        .await;

        match lists {
            Ok(lists) => {
                campaign.lists = lists;
                campaigns.push(campaign);
            }
            Err(e) => {
                tracing::warn!(campaign_id = %campaign.campaign_id, "list lookup failed: {}", e);
                warnings.push(format!(
                    "campaign {} omitted: failed to retrieve its lists",
                    campaign.campaign_id
                ));
            }
        }
    }

    Ok(ApiResponse::with_message(
        "Campaigns with lists retrieved successfully",
        CampaignsWithLists {
            count: campaigns.len(),
            campaigns,
        },
    )
    .with_warnings(warnings))
}

/// GET /api/v1/campaigns/:campaign_id/hopper
pub async fn hopper(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> ApiResult<Vec<HopperEntry>> {
    let entries = sqlx::query_as::<_, HopperEntry>(
        "SELECT h.hopper_id, h.lead_id, h.campaign_id, h.status, h.user,
                h.list_id, h.priority, l.phone_number, l.first_name, l.last_name
         FROM vicidial_hopper h
         LEFT JOIN vicidial_list l ON h.lead_id = l.lead_id
         WHERE h.campaign_id = ?
         ORDER BY h.priority DESC, h.hopper_id
         LIMIT 100",
    )
    .bind(&campaign_id)
    .fetch_all(&state.pool)
    .await
    .or_internal("Failed to retrieve hopper")?;

    Ok(ApiResponse::with_message("Hopper entries retrieved", entries))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HopperBulkRequest {
    pub lead_ids: Vec<i64>,
    pub priority: i64,
    pub source: String,
}

/// POST /api/v1/campaigns/:campaign_id/hopper/bulk
///
/// All-or-nothing: one insert-or-ignore per lead inside a single
/// transaction. Leads already queued or missing from `vicidial_list` add
/// nothing, so `inserted <= requested`.
pub async fn hopper_bulk(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    ApiJson(req): ApiJson<HopperBulkRequest>,
) -> ApiResult<Value> {
    if req.lead_ids.is_empty() {
        return Err(ApiError::bad_request("No lead IDs provided"));
    }
    let source = if req.source.is_empty() { "API" } else { req.source.as_str() };

    let mut tx = state
        .pool
        .begin()
        .await
        .or_internal("Failed to start transaction")?;

    let mut inserted: u64 = 0;
    for &lead_id in &req.lead_ids {
        let result = sqlx::query(
            "INSERT IGNORE INTO vicidial_hopper (lead_id, campaign_id, status, priority, source, list_id)
             SELECT lead_id, ?, 'READY', ?, ?, list_id FROM vicidial_list WHERE lead_id = ?",
        )
        .bind(&campaign_id)
        .bind(req.priority)
        .bind(source)
        .bind(lead_id)
        .execute(&mut *tx)
        .await
        .or_internal("Failed to insert lead")?;

        inserted += result.rows_affected();
    }

    tx.commit().await.or_internal("Failed to commit hopper insert")?;
    tracing::info!(%campaign_id, requested = req.lead_ids.len(), inserted, "hopper bulk insert");

    Ok(ApiResponse::with_message(
        "Leads inserted to hopper",
        json!({ "requested": req.lead_ids.len(), "inserted": inserted }),
    ))
}
