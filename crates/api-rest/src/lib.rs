//! # API REST
//!
//! REST API implementation for the patient tracker.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! All data operations go through the `pttrack-core` services. Client errors from the core
//! (validation, unknown references, unsupported roster parameters) map to `400`, missing
//! records to `404`, and everything else to `500`.

#![warn(rust_2018_idioms)]

pub mod dto;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use pttrack_core::models::{
    ActionItem, ClinicDate, Followup, FollowupRequest, Patient, Provider, Referral,
    ReferralStatus, Workup,
};
use pttrack_core::repositories::action_items::ActionItemService;
use pttrack_core::repositories::encounters::EncounterService;
use pttrack_core::repositories::patients::{PatientChart, PatientService};
use pttrack_core::repositories::providers::ProviderService;
use pttrack_core::repositories::referrals::ReferralService;
use pttrack_core::repositories::roster::RosterService;
use pttrack_core::{
    utc_offset_from_env_value, ActionItemId, ClinicContext, ClinicError, CoreConfig,
    FollowupRequestId, LookupId, PatientId, ProviderId, ReferralId, DEFAULT_PATIENT_DATA_DIR,
};
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use dto::*;

type ApiError = (StatusCode, String);

/// Application state for the REST API server
///
/// Holds one instance of each core service; all of them share the same store and clock.
#[derive(Clone, Debug)]
pub struct AppState {
    patients: PatientService,
    providers: ProviderService,
    action_items: ActionItemService,
    encounters: EncounterService,
    referrals: ReferralService,
    roster: RosterService,
}

impl AppState {
    pub fn new(ctx: ClinicContext) -> Self {
        Self {
            patients: PatientService::new(ctx.clone()),
            providers: ProviderService::new(ctx.clone()),
            action_items: ActionItemService::new(ctx.clone()),
            encounters: EncounterService::new(ctx.clone()),
            referrals: ReferralService::new(ctx.clone()),
            roster: RosterService::new(ctx),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        create_patient,
        patient_chart,
        toggle_active,
        create_provider,
        create_action_item,
        mark_action_item_done,
        clear_action_item_done,
        create_clinic_date,
        create_workup,
        create_followup,
        create_referral,
        set_referral_status,
        create_followup_request,
        record_contact,
        mark_followup_request_done,
        clear_followup_request_done,
    ),
    components(schemas(
        HealthRes,
        ListPatientsRes,
        PatientSummaryRes,
        LatestWorkupRes,
        ClinicDayRes,
        HistoryRes,
        HistoryEntryRes,
        ActiveStatusRes,
        CreatePatientReq,
        CreateProviderReq,
        ResolveReq,
        CreateActionItemReq,
        CreateClinicDateReq,
        CreateWorkupReq,
        CreateFollowupReq,
        CreateReferralReq,
        ReferralStatusReq,
        CreateFollowupRequestReq,
        RecordContactReq,
        ContactRes,
    ))
)]
struct ApiDoc;

/// Resolve core configuration from the environment.
///
/// # Environment Variables
/// - `PATIENT_DATA_DIR`: directory holding `clinic.json` (default: `patient_data`)
/// - `PTTRACK_REFERENCE_DATA`: optional YAML file replacing the embedded reference tables
/// - `PTTRACK_UTC_OFFSET`: clinic offset from UTC in whole hours (default: 0)
///
/// # Errors
/// Returns an error if the offset is malformed or the reference data file does not exist.
pub fn core_config_from_env() -> anyhow::Result<CoreConfig> {
    let patient_data_dir =
        std::env::var("PATIENT_DATA_DIR").unwrap_or_else(|_| DEFAULT_PATIENT_DATA_DIR.into());
    let reference_data = std::env::var("PTTRACK_REFERENCE_DATA")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    let utc_offset = utc_offset_from_env_value(std::env::var("PTTRACK_UTC_OFFSET").ok())?;

    Ok(CoreConfig::new(
        PathBuf::from(patient_data_dir),
        reference_data,
        utc_offset,
    )?)
}

/// Build the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/:id", get(patient_chart))
        .route("/patients/:id/active", post(toggle_active))
        .route("/patients/:id/action-items", post(create_action_item))
        .route("/patients/:id/workups", post(create_workup))
        .route("/patients/:id/followups", post(create_followup))
        .route("/patients/:id/referrals", post(create_referral))
        .route("/providers", post(create_provider))
        .route(
            "/action-items/:id/done",
            post(mark_action_item_done).delete(clear_action_item_done),
        )
        .route("/clinic-dates", post(create_clinic_date))
        .route("/referrals/:id/status", put(set_referral_status))
        .route(
            "/referrals/:id/followup-requests",
            post(create_followup_request),
        )
        .route("/followup-requests/:id/contacts", post(record_contact))
        .route(
            "/followup-requests/:id/done",
            post(mark_followup_request_done).delete(clear_followup_request_done),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a core error to a status code and message.
///
/// Client errors carry the core's message; server errors are logged and hidden.
fn api_error(operation: &str, err: ClinicError) -> ApiError {
    match err {
        ClinicError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        ref e if e.is_client_error() => (StatusCode::BAD_REQUEST, err.to_string()),
        _ => {
            tracing::error!("{} error: {:?}", operation, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Patient tracker REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    params(ListPatientsQuery),
    responses(
        (status = 200, description = "Filtered, sorted patient roster", body = ListPatientsRes),
        (status = 400, description = "Unsupported sort or filter"),
        (status = 500, description = "Internal server error")
    )
)]
/// List patients as a roster
///
/// # Arguments
/// * `sort` - `last_name` (default) or `latest_workup`
/// * `filter` - one of `unsigned_workup`, `active`, `ai_active`, `ai_inactive`
///
/// # Errors
/// Returns `400 Bad Request` for any other sort or filter value.
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<ListPatientsQuery>,
) -> Result<Json<ListPatientsRes>, ApiError> {
    let rows = state
        .roster
        .query(query.sort.as_deref(), query.filter.as_deref())
        .map_err(|e| api_error("List patients", e))?;

    Ok(Json(ListPatientsRes {
        patients: rows.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient admitted"),
        (status = 400, description = "Invalid intake form"),
        (status = 500, description = "Internal server error")
    )
)]
/// Admit a new patient
///
/// # Errors
/// Returns `400 Bad Request` if a field fails validation (for example a ZIP code that is
/// not exactly five digits) or names an unknown lookup entry.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<CreatePatientReq>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let patient = state
        .patients
        .admit(req.into())
        .map_err(|e| api_error("Admit patient", e))?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = u64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient chart"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Read a patient's chart
#[axum::debug_handler]
async fn patient_chart(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<PatientChart>, ApiError> {
    state
        .patients
        .chart(PatientId(id))
        .map(Json)
        .map_err(|e| api_error("Patient chart", e))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/active",
    params(("id" = u64, Path, description = "Patient id")),
    responses(
        (status = 200, description = "New value of the active flag", body = ActiveStatusRes),
        (status = 404, description = "Patient not found")
    )
)]
/// Flip a patient's active flag
#[axum::debug_handler]
async fn toggle_active(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ActiveStatusRes>, ApiError> {
    let needs_workup = state
        .patients
        .toggle_active(PatientId(id))
        .map_err(|e| api_error("Toggle active", e))?;
    Ok(Json(ActiveStatusRes { id, needs_workup }))
}

#[utoipa::path(
    post,
    path = "/providers",
    request_body = CreateProviderReq,
    responses(
        (status = 201, description = "Provider registered"),
        (status = 400, description = "Invalid registration")
    )
)]
#[axum::debug_handler]
async fn create_provider(
    State(state): State<AppState>,
    Json(req): Json<CreateProviderReq>,
) -> Result<(StatusCode, Json<Provider>), ApiError> {
    let provider = state
        .providers
        .register(req.into())
        .map_err(|e| api_error("Register provider", e))?;
    Ok((StatusCode::CREATED, Json(provider)))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/action-items",
    params(("id" = u64, Path, description = "Patient id")),
    request_body = CreateActionItemReq,
    responses(
        (status = 201, description = "Action item added"),
        (status = 400, description = "Unknown instruction"),
        (status = 404, description = "Patient or provider not found")
    )
)]
#[axum::debug_handler]
async fn create_action_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<CreateActionItemReq>,
) -> Result<(StatusCode, Json<ActionItem>), ApiError> {
    let provider = ProviderId(req.provider_id);
    let item = state
        .action_items
        .add(provider, PatientId(id), req.into())
        .map_err(|e| api_error("Add action item", e))?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    post,
    path = "/action-items/{id}/done",
    params(("id" = u64, Path, description = "Action item id")),
    request_body = ResolveReq,
    responses(
        (status = 200, description = "Action item marked done"),
        (status = 404, description = "Action item or provider not found")
    )
)]
/// Mark an action item done
///
/// Marking an item that is already done overwrites the previous resolution.
#[axum::debug_handler]
async fn mark_action_item_done(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ResolveReq>,
) -> Result<Json<ActionItem>, ApiError> {
    state
        .action_items
        .mark_done(ActionItemId(id), ProviderId(req.provider_id))
        .map(Json)
        .map_err(|e| api_error("Mark action item done", e))
}

#[utoipa::path(
    delete,
    path = "/action-items/{id}/done",
    params(("id" = u64, Path, description = "Action item id")),
    responses(
        (status = 200, description = "Action item reopened"),
        (status = 404, description = "Action item not found")
    )
)]
#[axum::debug_handler]
async fn clear_action_item_done(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ActionItem>, ApiError> {
    state
        .action_items
        .clear_done(ActionItemId(id))
        .map(Json)
        .map_err(|e| api_error("Clear action item", e))
}

#[utoipa::path(
    post,
    path = "/clinic-dates",
    request_body = CreateClinicDateReq,
    responses(
        (status = 201, description = "Clinic date scheduled"),
        (status = 400, description = "Unknown clinic type")
    )
)]
#[axum::debug_handler]
async fn create_clinic_date(
    State(state): State<AppState>,
    Json(req): Json<CreateClinicDateReq>,
) -> Result<(StatusCode, Json<ClinicDate>), ApiError> {
    let clinic_date = state
        .encounters
        .add_clinic_date(LookupId(req.clinic_type), req.clinic_date, req.gcal_id)
        .map_err(|e| api_error("Add clinic date", e))?;
    Ok((StatusCode::CREATED, Json(clinic_date)))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/workups",
    params(("id" = u64, Path, description = "Patient id")),
    request_body = CreateWorkupReq,
    responses(
        (status = 201, description = "Workup recorded"),
        (status = 400, description = "Missing chief complaint or diagnosis"),
        (status = 404, description = "Patient, provider or clinic date not found")
    )
)]
#[axum::debug_handler]
async fn create_workup(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<CreateWorkupReq>,
) -> Result<(StatusCode, Json<Workup>), ApiError> {
    let provider = ProviderId(req.provider_id);
    let workup = state
        .encounters
        .add_workup(provider, PatientId(id), req.into())
        .map_err(|e| api_error("Add workup", e))?;
    Ok((StatusCode::CREATED, Json(workup)))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/followups",
    params(("id" = u64, Path, description = "Patient id")),
    request_body = CreateFollowupReq,
    responses(
        (status = 201, description = "Followup recorded"),
        (status = 404, description = "Patient or provider not found")
    )
)]
#[axum::debug_handler]
async fn create_followup(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<CreateFollowupReq>,
) -> Result<(StatusCode, Json<Followup>), ApiError> {
    let followup = state
        .encounters
        .add_followup(ProviderId(req.provider_id), PatientId(id), req.text)
        .map_err(|e| api_error("Add followup", e))?;
    Ok((StatusCode::CREATED, Json(followup)))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/referrals",
    params(("id" = u64, Path, description = "Patient id")),
    request_body = CreateReferralReq,
    responses(
        (status = 201, description = "Referral created"),
        (status = 400, description = "No or unknown locations"),
        (status = 404, description = "Patient or provider not found")
    )
)]
#[axum::debug_handler]
async fn create_referral(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<CreateReferralReq>,
) -> Result<(StatusCode, Json<Referral>), ApiError> {
    let provider = ProviderId(req.provider_id);
    let referral = state
        .referrals
        .add_referral(provider, PatientId(id), req.into())
        .map_err(|e| api_error("Add referral", e))?;
    Ok((StatusCode::CREATED, Json(referral)))
}

#[utoipa::path(
    put,
    path = "/referrals/{id}/status",
    params(("id" = u64, Path, description = "Referral id")),
    request_body = ReferralStatusReq,
    responses(
        (status = 200, description = "Referral status updated"),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Referral not found")
    )
)]
/// Set a referral's status
///
/// The status is never derived from contact attempts; it is whatever the clinic last set.
#[axum::debug_handler]
async fn set_referral_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ReferralStatusReq>,
) -> Result<Json<Referral>, ApiError> {
    let status: ReferralStatus = req
        .status
        .parse()
        .map_err(|e| api_error("Set referral status", e))?;
    state
        .referrals
        .set_status(ReferralId(id), status)
        .map(Json)
        .map_err(|e| api_error("Set referral status", e))
}

#[utoipa::path(
    post,
    path = "/referrals/{id}/followup-requests",
    params(("id" = u64, Path, description = "Referral id")),
    request_body = CreateFollowupRequestReq,
    responses(
        (status = 201, description = "Followup request opened"),
        (status = 404, description = "Referral or provider not found")
    )
)]
#[axum::debug_handler]
async fn create_followup_request(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<CreateFollowupRequestReq>,
) -> Result<(StatusCode, Json<FollowupRequest>), ApiError> {
    let provider = ProviderId(req.provider_id);
    let request = state
        .referrals
        .add_followup_request(provider, ReferralId(id), req.into())
        .map_err(|e| api_error("Add followup request", e))?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    post,
    path = "/followup-requests/{id}/contacts",
    params(("id" = u64, Path, description = "Followup request id")),
    request_body = RecordContactReq,
    responses(
        (status = 201, description = "Contact attempt recorded", body = ContactRes),
        (status = 400, description = "Invalid answer or location outside the referral"),
        (status = 404, description = "Followup request or provider not found")
    )
)]
/// Record one attempt to contact a patient
///
/// Recording an attempt never resolves the followup request.
#[axum::debug_handler]
async fn record_contact(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<RecordContactReq>,
) -> Result<(StatusCode, Json<ContactRes>), ApiError> {
    let provider = ProviderId(req.provider_id);
    let new = req
        .into_new()
        .map_err(|e| api_error("Record contact", e))?;
    let entry = state
        .referrals
        .record_contact(provider, FollowupRequestId(id), new)
        .map_err(|e| api_error("Record contact", e))?;

    Ok((
        StatusCode::CREATED,
        Json(ContactRes {
            id: entry.contact.id.get(),
            followup_request: id,
            outcome: entry.outcome.as_str().to_string(),
            summary: entry.summary,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/followup-requests/{id}/done",
    params(("id" = u64, Path, description = "Followup request id")),
    request_body = ResolveReq,
    responses(
        (status = 200, description = "Followup request resolved"),
        (status = 404, description = "Followup request or provider not found")
    )
)]
#[axum::debug_handler]
async fn mark_followup_request_done(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ResolveReq>,
) -> Result<Json<FollowupRequest>, ApiError> {
    state
        .referrals
        .mark_request_done(FollowupRequestId(id), ProviderId(req.provider_id))
        .map(Json)
        .map_err(|e| api_error("Resolve followup request", e))
}

#[utoipa::path(
    delete,
    path = "/followup-requests/{id}/done",
    params(("id" = u64, Path, description = "Followup request id")),
    responses(
        (status = 200, description = "Followup request reopened"),
        (status = 404, description = "Followup request not found")
    )
)]
#[axum::debug_handler]
async fn clear_followup_request_done(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<FollowupRequest>, ApiError> {
    state
        .referrals
        .clear_request_done(FollowupRequestId(id))
        .map(Json)
        .map_err(|e| api_error("Reopen followup request", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{FixedOffset, NaiveDate};
    use http_body_util::BodyExt;
    use pttrack_core::FixedClock;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let cfg = CoreConfig::new(
            PathBuf::from("unused"),
            None,
            FixedOffset::east_opt(0).unwrap(),
        )
        .expect("config");
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let ctx = ClinicContext::in_memory(Arc::new(cfg), Arc::new(FixedClock::on(today)))
            .expect("in-memory context");
        router(AppState::new(ctx))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    fn patient_body(last_name: &str) -> Value {
        json!({
            "first_name": "Pat",
            "last_name": last_name,
            "phone": "314 555 0100",
            "gender": 2,
            "address": "4414 Lindell Blvd",
            "zip_code": "63108",
            "date_of_birth": "1990-04-02",
            "language": 1,
            "ethnicity": 2
        })
    }

    /// Register a provider and admit one patient; returns their ids.
    async fn seed(app: &Router) -> (u64, u64) {
        let (status, provider) = send(
            app,
            "POST",
            "/providers",
            Some(json!({
                "first_name": "Tess",
                "last_name": "Tester",
                "phone": "314 555 0199",
                "email": "tess@clinic.org",
                "gender": 2,
                "provider_type": 1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, patient) = send(app, "POST", "/patients", Some(patient_body("Brodeltein"))).await;
        assert_eq!(status, StatusCode::CREATED, "{patient}");

        (
            provider["id"].as_u64().unwrap(),
            patient["id"].as_u64().unwrap(),
        )
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(&app(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn roster_lists_admitted_patients() {
        let app = app();
        let (_, patient) = seed(&app).await;

        let (status, body) = send(&app, "GET", "/patients", None).await;
        assert_eq!(status, StatusCode::OK);
        let patients = body["patients"].as_array().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0]["id"], patient);
        assert_eq!(patients[0]["name"], "Brodeltein, Pat");
        assert_eq!(patients[0]["needs_workup"], false);
        assert!(patients[0]["latest_workup"].is_null());
    }

    #[tokio::test]
    async fn unsupported_roster_parameters_are_bad_requests() {
        let app = app();
        let (status, body) = send(&app, "GET", "/patients?filter=signed", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.as_str().unwrap().contains("unsupported filter"));

        let (status, _) = send(&app, "GET", "/patients?sort=age", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_zip_is_a_bad_request() {
        let app = app();
        let mut body = patient_body("Zip");
        body["zip_code"] = json!("6310");
        let (status, message) = send(&app, "POST", "/patients", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.as_str().unwrap().contains("not a valid ZIP"));
    }

    #[tokio::test]
    async fn missing_patient_is_not_found() {
        let (status, _) = send(&app(), "GET", "/patients/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn action_item_lifecycle_drives_roster_filters() {
        let app = app();
        let (provider, patient) = seed(&app).await;

        let (status, item) = send(
            &app,
            "POST",
            &format!("/patients/{patient}/action-items"),
            Some(json!({ "provider_id": provider, "due_date": "2024-03-09", "instruction": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{item}");
        let item_id = item["id"].as_u64().unwrap();

        let (_, body) = send(&app, "GET", "/patients?filter=ai_active", None).await;
        assert_eq!(body["patients"].as_array().unwrap().len(), 1);

        let (status, done) = send(
            &app,
            "POST",
            &format!("/action-items/{item_id}/done"),
            Some(json!({ "provider_id": provider })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["completion_author"], provider);

        let (_, body) = send(&app, "GET", "/patients?filter=ai_active", None).await;
        assert!(body["patients"].as_array().unwrap().is_empty());

        let (status, reopened) =
            send(&app, "DELETE", &format!("/action-items/{item_id}/done"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(reopened["completion_date"].is_null());

        let (status, chart) = send(&app, "GET", &format!("/patients/{patient}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(chart["action_items"]["active"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn toggling_active_filters_roster() {
        let app = app();
        let (_, patient) = seed(&app).await;

        let (status, body) = send(&app, "POST", &format!("/patients/{patient}/active"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["needs_workup"], true);

        let (_, body) = send(&app, "GET", "/patients?filter=active", None).await;
        assert_eq!(body["patients"][0]["needs_workup"], true);
    }

    #[tokio::test]
    async fn referral_contact_workflow() {
        let app = app();
        let (provider, patient) = seed(&app).await;

        let (status, referral) = send(
            &app,
            "POST",
            &format!("/patients/{patient}/referrals"),
            Some(json!({ "provider_id": provider, "kind": 1, "locations": [1, 2] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{referral}");
        let referral_id = referral["id"].as_u64().unwrap();
        assert_eq!(referral["status"], "pending");

        let (status, request) = send(
            &app,
            "POST",
            &format!("/referrals/{referral_id}/followup-requests"),
            Some(json!({
                "provider_id": provider,
                "contact_instructions": "Call after work",
                "due_date": "2024-03-12"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{request}");
        let request_id = request["id"].as_u64().unwrap();

        let (status, contact) = send(
            &app,
            "POST",
            &format!("/followup-requests/{request_id}/contacts"),
            Some(json!({
                "provider_id": provider,
                "contact_method": 1,
                "contact_status": 2,
                "has_appointment": "Yes",
                "appointment_location": [1],
                "pt_showed": "Yes"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{contact}");
        assert_eq!(contact["outcome"], "not_reached");
        assert_eq!(contact["summary"], "Did not successfully contact patient.");

        let (status, _) = send(
            &app,
            "POST",
            &format!("/followup-requests/{request_id}/contacts"),
            Some(json!({
                "provider_id": provider,
                "contact_method": 1,
                "contact_status": 1,
                "has_appointment": "maybe"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/referrals/{referral_id}/status"),
            Some(json!({ "status": "unsuccessful" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "unsuccessful");

        let (status, resolved) = send(
            &app,
            "POST",
            &format!("/followup-requests/{request_id}/done"),
            Some(json!({ "provider_id": provider })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resolved["completion_author"], provider);

        let (_, chart) = send(&app, "GET", &format!("/patients/{patient}"), None).await;
        let requests = &chart["referrals"][0]["followup_requests"];
        assert_eq!(requests[0]["state"], "resolved");
        assert_eq!(requests[0]["contacts"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn workup_appears_in_roster_summary() {
        let app = app();
        let (provider, patient) = seed(&app).await;

        let (status, day) = send(
            &app,
            "POST",
            "/clinic-dates",
            Some(json!({ "clinic_type": 1, "clinic_date": "2024-03-09", "gcal_id": "abc" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, workup) = send(
            &app,
            "POST",
            &format!("/patients/{patient}/workups"),
            Some(json!({
                "provider_id": provider,
                "clinic_day": day["id"],
                "chief_complaint": "knee pain",
                "diagnosis": "sprain"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{workup}");

        let (status, _) = send(
            &app,
            "POST",
            &format!("/patients/{patient}/followups"),
            Some(json!({ "provider_id": provider, "text": "Brace fitted" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = send(
            &app,
            "GET",
            "/patients?sort=latest_workup&filter=unsigned_workup",
            None,
        )
        .await;
        let latest = &body["patients"][0]["latest_workup"];
        assert_eq!(latest["chief_complaint"], "knee pain");
        assert_eq!(latest["clinic_day"]["clinic_date"], "2024-03-09");
        assert_eq!(latest["clinic_day"]["clinic_type"], "Basic Care Clinic");
    }
}
