use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use sqlx::MySqlPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::AppConfig;
use crate::error::{ApiError, InternalErrorDetail};
use crate::handlers::{protected, public};
use crate::middleware::{api_key_middleware, request_logger};

/// Shared by every handler: the dialer pool and the effective configuration
#[derive(Clone)]
pub struct AppState {
    pub pool: MySqlPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: MySqlPool, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}

/// Full router: `/health` in the clear, everything else under `/api/v1`
/// behind the API key gate.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/version", get(protected::version::version))
        .merge(lead_routes())
        .merge(list_routes())
        .merge(user_routes())
        .merge(campaign_routes())
        .merge(sip_routes())
        .merge(test_call_routes())
        .merge(phone_routes())
        .merge(dnc_routes())
        .merge(reporting_routes())
        .merge(system_routes())
        .merge(advanced_routes())
        // Route layer so unmatched paths fall through to the 404 envelope
        .route_layer(middleware::from_fn_with_state(state.clone(), api_key_middleware));

    let body_limit = state.config.api.max_request_size_bytes;

    Router::new()
        .route("/health", get(public::health))
        .nest("/api/v1", api)
        .fallback(not_found)
        .layer(middleware::map_response(method_not_allowed_envelope))
        .layer(middleware::map_response_with_state(state.clone(), expose_error_details))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(request_logger())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

fn lead_routes() -> Router<AppState> {
    use protected::leads;

    Router::new()
        .route("/leads", post(leads::add))
        .route("/leads/batch", put(leads::batch_update))
        .route("/leads/search", get(leads::search))
        .route("/leads/status-search", get(leads::status_search))
        .route("/leads/:lead_id", put(leads::update))
        .route("/leads/:lead_id/info", get(leads::info))
        .route("/leads/:lead_id/field-info", get(leads::field_info))
        .route("/leads/:lead_id/callback-info", get(leads::callback_info))
        .route("/leads/:lead_id/dearchive", post(leads::dearchive))
        .route("/phone/check", get(leads::phone_check))
}

fn list_routes() -> Router<AppState> {
    use protected::lists;

    Router::new()
        .route("/lists", post(lists::add))
        .route("/lists/:list_id", put(lists::update))
        .route("/lists/:list_id/info", get(lists::info))
        .route(
            "/lists/:list_id/custom-fields",
            get(lists::custom_fields)
                .post(lists::add_custom_field)
                .put(lists::update_custom_field),
        )
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/users", post(users::add))
        .route("/users/logged-in", get(users::logged_in))
        .route("/users/:user_id", put(users::update))
        .route("/users/:user_id/copy", post(users::copy))
        .route("/users/:user_id/details", get(users::details))
        .route("/agents/status", get(users::agent_status))
        .route("/agents/:agent_id/ingroup-info", get(users::ingroup_info))
        .route("/agents/:agent_id/campaigns", get(users::campaigns))
        .route("/remote-agents/:agent_id", put(users::update_remote_agent))
}

fn campaign_routes() -> Router<AppState> {
    use protected::{campaigns, kpi};

    Router::new()
        .route("/campaigns", get(campaigns::list))
        .route("/campaigns/with-lists", get(campaigns::with_lists))
        .route("/campaigns/:campaign_id", put(campaigns::update))
        .route("/campaigns/:campaign_id/hopper", get(campaigns::hopper))
        .route("/campaigns/:campaign_id/hopper/bulk", post(campaigns::hopper_bulk))
        .route("/kpi/dispositions", get(kpi::dispositions))
}

fn sip_routes() -> Router<AppState> {
    use protected::sip;

    Router::new()
        .route("/sip/carrier-log", get(sip::carrier_log))
        .route("/sip/event-log", get(sip::event_log))
        .route("/sip/live-channels", get(sip::live_channels))
}

fn test_call_routes() -> Router<AppState> {
    use protected::test_call;

    Router::new()
        .route("/test-call/send", post(test_call::send))
        .route("/test-call/status", get(test_call::status))
        .route("/test-call/list", get(test_call::list))
}

fn phone_routes() -> Router<AppState> {
    use protected::phones;

    Router::new()
        .route("/phones", post(phones::add))
        .route("/phones/:phone_id", put(phones::update))
        .route("/phone-aliases", post(phones::add_alias))
        .route("/phone-aliases/:alias_id", put(phones::update_alias))
        .route("/dids", post(phones::add_did))
        .route("/dids/:did_id", put(phones::update_did))
        .route("/dids/:did_id/copy", post(phones::copy_did))
}

fn dnc_routes() -> Router<AppState> {
    use protected::dnc;

    Router::new()
        .route("/dnc", post(dnc::add))
        .route("/dnc/:phone", delete(dnc::delete))
        .route("/fpg", post(dnc::add_fpg))
        .route("/fpg/:phone", delete(dnc::delete_fpg))
}

fn reporting_routes() -> Router<AppState> {
    use protected::reporting;

    Router::new()
        .route("/recordings/lookup", get(reporting::recordings))
        .route("/did-logs/export", get(reporting::did_logs))
        .route("/phone-logs/:phone", get(reporting::phone_logs))
        .route("/agent-stats/export", get(reporting::agent_stats))
        .route("/call-stats/status", get(reporting::status_stats))
        .route("/call-stats/dispo", get(reporting::dispo_stats))
        .route("/monitor/blind", post(reporting::blind_monitor))
}

fn system_routes() -> Router<AppState> {
    use protected::system;

    Router::new()
        .route("/system/sounds", get(system::sounds))
        .route("/system/moh", get(system::music_on_hold))
        .route("/system/voicemail", get(system::voicemail))
        .route("/system/refresh", post(system::refresh))
        .route("/ingroups", get(system::ingroups))
        .route("/ingroups/status", get(system::ingroup_status))
        .route("/callmenus", get(system::call_menus))
        .route("/containers", get(system::containers))
        .route("/user-groups/status", get(system::user_group_status))
}

fn advanced_routes() -> Router<AppState> {
    use protected::advanced;

    Router::new()
        .route("/group-aliases", post(advanced::add_group_alias))
        .route("/log-entries/:entry_id", put(advanced::update_log_entry))
        .route("/cid-groups/:entry_id", put(advanced::update_cid_group_entry))
        .route("/alt-urls/:url_id", put(advanced::update_alt_url))
        .route("/presets/:preset_id", put(advanced::update_preset))
        .route("/calls/:call_id/info", get(advanced::call_info))
        .route("/ccc/lead-info/:lead_id", get(advanced::ccc_lead_info))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Endpoint not found")
}

/// Swap a 500 body for one naming the underlying cause when the deployment allows it
async fn expose_error_details(State(state): State<AppState>, response: Response) -> Response {
    if !state.config.api.expose_error_details {
        return response;
    }
    match response.extensions().get::<InternalErrorDetail>().cloned() {
        Some(detail) => detail.into_response(),
        None => response,
    }
}

/// The router answers an unbound method with a bare 405; give it the envelope
async fn method_not_allowed_envelope(response: Response) -> Response {
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        let (parts, _) = response.into_parts();
        let mut enveloped = ApiError::MethodNotAllowed.into_response();
        if let Some(allow) = parts.headers.get(axum::http::header::ALLOW) {
            enveloped
                .headers_mut()
                .insert(axum::http::header::ALLOW, allow.clone());
        }
        return enveloped;
    }
    response
}
