mod cli;

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{MethodRouter, get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::core::{
    Bounds, Calculation, CalculatorForm, CalculatorKind, Calculator, ChartUpdate, GstDirection,
    LiveClamp, ValidatedInputs, clamp_input_if_out_of_range, format_indian_compact,
    slider_amount, slider_position, snap_slider_pos, validate_number_input,
};
use crate::store::{KvStore, Notes, PreferenceSnapshot, Preferences, Theme};

pub use cli::{Cli, Command, run_cli};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

/// Shared server state: the persisted preference and notes store.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<KvStore>>,
}

impl AppState {
    pub fn new(store: KvStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Runs `f` against the store on the blocking pool, since store writes
    /// hit the filesystem while holding the lock.
    async fn with_store<F>(&self, f: F) -> Response
    where
        F: FnOnce(&mut KvStore) -> Response + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let task = tokio::task::spawn_blocking(move || {
            let mut guard = store.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut *guard)
        });
        match task.await {
            Ok(response) => response,
            Err(err) => {
                error!(%err, "store task failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Storage task failed")
            }
        }
    }
}

/// A field value that may arrive as a JSON number or as raw text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    fn into_text(self) -> String {
        match self {
            RawValue::Number(n) => n.to_string(),
            RawValue::Text(s) => s,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatorPayload {
    amount: Option<RawValue>,
    rate: Option<RawValue>,
    #[serde(alias = "tenure", alias = "years")]
    period: Option<RawValue>,
    direction: Option<GstDirection>,
}

#[derive(Debug, Serialize)]
struct SummaryLine {
    label: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    calculator: CalculatorKind,
    inputs: ValidatedInputs,
    result: Option<Calculation>,
    chart: Option<ChartUpdate>,
    summary: Vec<SummaryLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SliderQuery {
    calculator: CalculatorKind,
    pos: Option<f64>,
    amount: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SliderResponse {
    calculator: CalculatorKind,
    position: u32,
    amount: f64,
    compact: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum FieldName {
    Amount,
    Rate,
    #[serde(alias = "tenure", alias = "years")]
    Period,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClampQuery {
    calculator: CalculatorKind,
    field: FieldName,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClampResponse {
    bounds: Bounds,
    live: LiveClamp,
    validated: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalcPayload {
    expressions: Vec<String>,
    #[serde(default)]
    ans: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalcLine {
    expression: String,
    value: Option<f64>,
    error: Option<String>,
    history: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalcResponse {
    results: Vec<CalcLine>,
    last_answer: f64,
}

#[derive(Debug, Deserialize)]
struct NotesPayload {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotesResponse {
    text: String,
    saved: bool,
    storage_available: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PreferencesQuery {
    os_prefers_dark: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PreferencesPayload {
    theme: Option<Theme>,
    sliders_enabled: Option<bool>,
    os_prefers_dark: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PreferencesResponse {
    saved: bool,
    #[serde(flatten)]
    preferences: PreferenceSnapshot,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/health", get(health_handler))
        .route("/api/sip", calculator_route(CalculatorKind::Sip))
        .route("/api/lumpsum", calculator_route(CalculatorKind::Lumpsum))
        .route("/api/gst", calculator_route(CalculatorKind::Gst))
        .route("/api/emi", calculator_route(CalculatorKind::Emi))
        .route("/api/slider", get(slider_handler))
        .route("/api/clamp", get(clamp_handler))
        .route("/api/calc", post(calc_handler))
        .route(
            "/api/notes",
            get(notes_get_handler)
                .put(notes_put_handler)
                .delete(notes_delete_handler),
        )
        .route(
            "/api/preferences",
            get(preferences_get_handler).put(preferences_put_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_http_server(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;
    info!("smartfin HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, router(state)).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn calculator_route(kind: CalculatorKind) -> MethodRouter<AppState> {
    get(
        move |query: Result<Query<CalculatorPayload>, QueryRejection>| async move {
            match query {
                Ok(Query(payload)) => calculate_handler_impl(kind, payload),
                Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
            }
        },
    )
    .post(
        move |body: Result<Json<CalculatorPayload>, JsonRejection>| async move {
            match body {
                Ok(Json(payload)) => calculate_handler_impl(kind, payload),
                Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
            }
        },
    )
}

fn calculate_handler_impl(kind: CalculatorKind, payload: CalculatorPayload) -> Response {
    let form = match form_from_payload(kind, payload) {
        Ok(form) => form,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    json_response(StatusCode::OK, build_calculate_response(&form))
}

fn form_from_payload(
    kind: CalculatorKind,
    payload: CalculatorPayload,
) -> Result<CalculatorForm, String> {
    let mut form = CalculatorForm::with_defaults(kind);

    if let Some(v) = payload.amount {
        form.amount = v.into_text();
    }
    if let Some(v) = payload.rate {
        form.rate = v.into_text();
    }
    match (kind.period_field(), payload.period) {
        (Some(_), Some(v)) => form.period = v.into_text(),
        (None, Some(_)) => return Err("period does not apply to the gst calculator".to_string()),
        _ => {}
    }
    match (kind, payload.direction) {
        (CalculatorKind::Gst, Some(direction)) => form.direction = direction,
        (_, Some(_)) => return Err("direction only applies to the gst calculator".to_string()),
        _ => {}
    }

    Ok(form)
}

fn build_calculate_response(form: &CalculatorForm) -> CalculateResponse {
    let inputs = form.validate();
    let result = crate::core::calculate(form.kind, inputs);
    let chart = result.as_ref().map(Calculation::chart_update);
    let summary = result
        .as_ref()
        .map(|calc| {
            calc.summary()
                .into_iter()
                .map(|(label, value)| SummaryLine { label, value })
                .collect()
        })
        .unwrap_or_default();

    CalculateResponse {
        calculator: form.kind,
        inputs,
        result,
        chart,
        summary,
    }
}

async fn slider_handler(query: Result<Query<SliderQuery>, QueryRejection>) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    let (position, amount) = match (query.pos, query.amount) {
        (Some(pos), None) => {
            let position = snap_slider_pos(pos);
            (position, slider_amount(query.calculator, position))
        }
        (None, Some(amount)) => {
            let amount = query.calculator.amount_field().bounds.clamp(amount);
            (slider_position(query.calculator, amount), amount)
        }
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "exactly one of pos or amount is required",
            );
        }
    };

    json_response(
        StatusCode::OK,
        SliderResponse {
            calculator: query.calculator,
            position,
            amount,
            compact: format_indian_compact(amount, true),
        },
    )
}

pub(crate) fn field_bounds(kind: CalculatorKind, field: FieldName) -> Result<Bounds, String> {
    match field {
        FieldName::Amount => Ok(kind.amount_field().bounds),
        FieldName::Rate => Ok(kind.rate_field().bounds),
        FieldName::Period => kind
            .period_field()
            .map(|f| f.bounds)
            .ok_or_else(|| "the gst calculator has no period field".to_string()),
    }
}

async fn clamp_handler(query: Result<Query<ClampQuery>, QueryRejection>) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };
    let bounds = match field_bounds(query.calculator, query.field) {
        Ok(bounds) => bounds,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    json_response(
        StatusCode::OK,
        ClampResponse {
            bounds,
            live: clamp_input_if_out_of_range(&query.value, bounds),
            validated: validate_number_input(&query.value, bounds),
        },
    )
}

async fn calc_handler(body: Result<Json<CalcPayload>, JsonRejection>) -> Response {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    let mut calculator = Calculator::with_answer(payload.ans.unwrap_or(0.0));
    let results = payload
        .expressions
        .into_iter()
        .map(|expression| {
            let (value, error) = match calculator.evaluate(&expression) {
                Ok(value) => (value, None),
                Err(e) => (None, Some(e.to_string())),
            };
            CalcLine {
                expression,
                value,
                error,
                history: calculator.history().to_string(),
            }
        })
        .collect();

    json_response(
        StatusCode::OK,
        CalcResponse {
            results,
            last_answer: calculator.last_answer(),
        },
    )
}

async fn notes_get_handler(State(state): State<AppState>) -> Response {
    state
        .with_store(|store| {
            let available = store.is_available();
            let text = Notes::new(store).load();
            json_response(
                StatusCode::OK,
                NotesResponse {
                    text,
                    saved: available,
                    storage_available: available,
                },
            )
        })
        .await
}

async fn notes_put_handler(
    State(state): State<AppState>,
    body: Result<Json<NotesPayload>, JsonRejection>,
) -> Response {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    state
        .with_store(move |store| {
            let available = store.is_available();
            let mut notes = Notes::new(store);
            let saved = notes.save(&payload.text);
            json_response(
                StatusCode::OK,
                NotesResponse {
                    text: notes.load(),
                    saved,
                    storage_available: available,
                },
            )
        })
        .await
}

async fn notes_delete_handler(State(state): State<AppState>) -> Response {
    state
        .with_store(|store| {
            let available = store.is_available();
            let saved = Notes::new(store).clear();
            json_response(
                StatusCode::OK,
                NotesResponse {
                    text: String::new(),
                    saved,
                    storage_available: available,
                },
            )
        })
        .await
}

async fn preferences_get_handler(
    State(state): State<AppState>,
    query: Result<Query<PreferencesQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    state
        .with_store(move |store| {
            json_response(
                StatusCode::OK,
                Preferences::new(store).snapshot(query.os_prefers_dark),
            )
        })
        .await
}

async fn preferences_put_handler(
    State(state): State<AppState>,
    body: Result<Json<PreferencesPayload>, JsonRejection>,
) -> Response {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    state
        .with_store(move |store| {
            let mut prefs = Preferences::new(store);
            let mut saved = true;
            if let Some(theme) = payload.theme {
                saved &= prefs.set_theme(theme);
            }
            if let Some(enabled) = payload.sliders_enabled {
                saved &= prefs.set_sliders_enabled(enabled);
            }
            json_response(
                StatusCode::OK,
                PreferencesResponse {
                    saved,
                    preferences: prefs.snapshot(payload.os_prefers_dark),
                },
            )
        })
        .await
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
