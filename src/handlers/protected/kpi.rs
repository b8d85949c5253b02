//! Disposition KPIs over `vicidial_log`.
//!
//! SQL does the per-status grouping; groups and percentages are assembled in
//! memory from exactly the rows returned, so each group's percentages always
//! sum to 100 for whatever date window was applied.

use axum::extract::State;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::api::ApiQuery;
use crate::app::AppState;
use crate::database::{decimal_to_f64, DbInt, QueryBuilder};
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    List,
    Campaign,
    Both,
}

impl GroupBy {
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw.unwrap_or("") {
            "" | "campaign" => Ok(Self::Campaign),
            "list" => Ok(Self::List),
            "both" => Ok(Self::Both),
            _ => Err(ApiError::bad_request(
                "Invalid group_by parameter. Use 'list', 'campaign', or 'both'",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispositionStats {
    pub status: String,
    pub count: i64,
    pub percentage: f64,
    pub avg_talk_time: f64,
    pub total_talk_time: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispositionGroup<H> {
    #[serde(flatten)]
    pub header: H,
    pub total_calls: i64,
    pub dispositions: Vec<DispositionStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ListHeader {
    pub list_id: i64,
    pub list_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CampaignHeader {
    pub campaign_id: String,
    pub campaign_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CampaignListHeader {
    pub campaign_id: String,
    pub campaign_name: String,
    pub list_id: i64,
    pub list_name: String,
}

/// Group per-status rows by header, keeping first-seen order, and fill in
/// each disposition's share of its group's total.
pub fn aggregate<H>(rows: impl IntoIterator<Item = (H, DispositionStats)>) -> Vec<DispositionGroup<H>>
where
    H: Eq + Hash + Clone,
{
    let mut groups: Vec<DispositionGroup<H>> = Vec::new();
    let mut index: HashMap<H, usize> = HashMap::new();

    for (header, stats) in rows {
        let slot = *index.entry(header.clone()).or_insert_with(|| {
            groups.push(DispositionGroup {
                header,
                total_calls: 0,
                dispositions: Vec::new(),
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.total_calls += stats.count;
        group.dispositions.push(stats);
    }

    for group in &mut groups {
        let total = group.total_calls;
        for d in &mut group.dispositions {
            d.percentage = if total > 0 {
                d.count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
        }
    }

    groups
}

#[derive(Debug, FromRow)]
struct StatusAggregate {
    status: Option<String>,
    count: i64,
    avg_talk_time: Option<Decimal>,
    total_talk_time: Option<Decimal>,
}

impl StatusAggregate {
    fn into_stats(self) -> DispositionStats {
        DispositionStats {
            status: self.status.unwrap_or_default(),
            count: self.count,
            percentage: 0.0,
            avg_talk_time: decimal_to_f64(self.avg_talk_time),
            total_talk_time: decimal_to_f64(self.total_talk_time) as i64,
        }
    }
}

#[derive(Debug, FromRow)]
struct ListRow {
    list_id: DbInt,
    list_name: Option<String>,
    #[sqlx(flatten)]
    stats: StatusAggregate,
}

#[derive(Debug, FromRow)]
struct CampaignRow {
    campaign_id: String,
    campaign_name: Option<String>,
    #[sqlx(flatten)]
    stats: StatusAggregate,
}

#[derive(Debug, FromRow)]
struct CampaignListRow {
    campaign_id: String,
    campaign_name: Option<String>,
    list_id: DbInt,
    list_name: Option<String>,
    #[sqlx(flatten)]
    stats: StatusAggregate,
}

const AGGREGATES: &str = "log.status, COUNT(*) AS count, \
    AVG(log.length_in_sec) AS avg_talk_time, SUM(log.length_in_sec) AS total_talk_time";

#[derive(Debug, Default, Deserialize)]
pub struct KpiQuery {
    pub list_id: Option<String>,
    pub campaign_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub group_by: Option<String>,
}

/// GET /api/v1/kpi/dispositions?group_by=list|campaign|both
pub async fn dispositions(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<KpiQuery>,
) -> ApiResult<Value> {
    match GroupBy::parse(q.group_by.as_deref())? {
        GroupBy::List => by_list(&state, &q).await,
        GroupBy::Campaign => by_campaign(&state, &q).await,
        GroupBy::Both => by_campaign_and_list(&state, &q).await,
    }
}

fn with_window(builder: QueryBuilder, q: &KpiQuery) -> QueryBuilder {
    builder
        .filter_opt("log.campaign_id = ?", q.campaign_id.as_deref())
        .filter_opt("log.call_date >= ?", q.start_date.as_deref())
        .filter_opt("log.call_date <= ?", q.end_date.as_deref())
}

async fn by_list(state: &AppState, q: &KpiQuery) -> ApiResult<Value> {
    let builder = QueryBuilder::new(format!(
        "SELECT vl.list_id, vl.list_name, {} FROM vicidial_log log
         INNER JOIN vicidial_lists vl ON log.list_id = vl.list_id",
        AGGREGATES
    ))
    .filter_opt("log.list_id = ?", q.list_id.as_deref());

    let sql = with_window(builder, q)
        .group_by("vl.list_id, vl.list_name, log.status")
        .order_by("vl.list_id, count DESC")
        .build();

    let rows = sql
        .query_as::<ListRow>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve KPI data")?;

    let lists = aggregate(rows.into_iter().map(|r| {
        (
            ListHeader {
                list_id: r.list_id.get(),
                list_name: r.list_name.unwrap_or_default(),
            },
            r.stats.into_stats(),
        )
    }));

    Ok(ApiResponse::with_message(
        "KPI dispositions by list retrieved successfully",
        json!({ "count": lists.len(), "lists": lists }),
    ))
}

async fn by_campaign(state: &AppState, q: &KpiQuery) -> ApiResult<Value> {
    let builder = QueryBuilder::new(format!(
        "SELECT log.campaign_id, vc.campaign_name, {} FROM vicidial_log log
         INNER JOIN vicidial_campaigns vc ON log.campaign_id = vc.campaign_id",
        AGGREGATES
    ));

    let sql = with_window(builder, q)
        .group_by("log.campaign_id, vc.campaign_name, log.status")
        .order_by("log.campaign_id, count DESC")
        .build();

    let rows = sql
        .query_as::<CampaignRow>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve KPI data")?;

    let campaigns = aggregate(rows.into_iter().map(|r| {
        (
            CampaignHeader {
                campaign_id: r.campaign_id,
                campaign_name: r.campaign_name.unwrap_or_default(),
            },
            r.stats.into_stats(),
        )
    }));

    Ok(ApiResponse::with_message(
        "KPI dispositions by campaign retrieved successfully",
        json!({ "count": campaigns.len(), "campaigns": campaigns }),
    ))
}

async fn by_campaign_and_list(state: &AppState, q: &KpiQuery) -> ApiResult<Value> {
    let builder = QueryBuilder::new(format!(
        "SELECT log.campaign_id, vc.campaign_name, log.list_id, vl.list_name, {} FROM vicidial_log log
         INNER JOIN vicidial_campaigns vc ON log.campaign_id = vc.campaign_id
         INNER JOIN vicidial_lists vl ON log.list_id = vl.list_id",
        AGGREGATES
    ));

    let sql = with_window(builder, q)
        .group_by("log.campaign_id, vc.campaign_name, log.list_id, vl.list_name, log.status")
        .order_by("log.campaign_id, log.list_id, count DESC")
        .build();

    let rows = sql
        .query_as::<CampaignListRow>()
        .fetch_all(&state.pool)
        .await
        .or_internal("Failed to retrieve KPI data")?;

    let results = aggregate(rows.into_iter().map(|r| {
        (
            CampaignListHeader {
                campaign_id: r.campaign_id,
                campaign_name: r.campaign_name.unwrap_or_default(),
                list_id: r.list_id.get(),
                list_name: r.list_name.unwrap_or_default(),
            },
            r.stats.into_stats(),
        )
    }));

    Ok(ApiResponse::with_message(
        "KPI dispositions by campaign and list retrieved successfully",
        json!({ "count": results.len(), "results": results }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(status: &str, count: i64, total_talk: i64) -> DispositionStats {
        DispositionStats {
            status: status.to_string(),
            count,
            percentage: 0.0,
            avg_talk_time: total_talk as f64 / count as f64,
            total_talk_time: total_talk,
        }
    }

    fn camp(id: &str) -> CampaignHeader {
        CampaignHeader {
            campaign_id: id.to_string(),
            campaign_name: format!("{} name", id),
        }
    }

    #[test]
    fn single_campaign_three_sales_one_ni() {
        let groups = aggregate(vec![(camp("TESTCAMP"), stat("SALE", 3, 300)), (camp("TESTCAMP"), stat("NI", 1, 20))]);

        assert_eq!(groups.len(), 1);
        let g = &groups[0];
        assert_eq!(g.total_calls, 4);
        assert_eq!(g.dispositions[0].status, "SALE");
        assert_eq!(g.dispositions[0].count, 3);
        assert!((g.dispositions[0].percentage - 75.0).abs() < 1e-9);
        assert!((g.dispositions[1].percentage - 25.0).abs() < 1e-9);
    }

    #[test]
    fn percentages_sum_to_one_hundred_per_group() {
        let groups = aggregate(vec![
            (camp("A"), stat("SALE", 7, 0)),
            (camp("A"), stat("NI", 2, 0)),
            (camp("A"), stat("DROP", 1, 0)),
            (camp("B"), stat("NA", 3, 0)),
            (camp("B"), stat("B", 3, 0)),
            (camp("B"), stat("DNC", 3, 0)),
        ]);

        assert_eq!(groups.len(), 2);
        for g in &groups {
            let sum: f64 = g.dispositions.iter().map(|d| d.percentage).sum();
            assert!((sum - 100.0).abs() < 1e-9, "group {:?} sums to {}", g.header, sum);
        }
    }

    #[test]
    fn groups_keep_sql_order() {
        let groups = aggregate(vec![
            (camp("B"), stat("SALE", 1, 0)),
            (camp("A"), stat("SALE", 1, 0)),
            (camp("B"), stat("NI", 1, 0)),
        ]);
        let ids: Vec<_> = groups.iter().map(|g| g.header.campaign_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(groups[0].dispositions.len(), 2);
    }

    #[test]
    fn group_header_is_flattened_in_json() {
        let groups = aggregate(vec![(
            ListHeader {
                list_id: 101,
                list_name: "Spring".into(),
            },
            stat("SALE", 2, 10),
        )]);
        let v = serde_json::to_value(&groups[0]).unwrap();
        assert_eq!(v["list_id"], 101);
        assert_eq!(v["total_calls"], 2);
        assert_eq!(v["dispositions"][0]["percentage"], 100.0);
    }

    #[test]
    fn group_by_defaults_to_campaign() {
        assert_eq!(GroupBy::parse(None).unwrap(), GroupBy::Campaign);
        assert_eq!(GroupBy::parse(Some("both")).unwrap(), GroupBy::Both);
        let err = GroupBy::parse(Some("user")).unwrap_err();
        assert_eq!(
            err.error(),
            "Invalid group_by parameter. Use 'list', 'campaign', or 'both'"
        );
    }
}
