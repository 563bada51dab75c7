//! In-process stand-in for the portal backend, for HTTP-level tests.
//!
//! Serves the same routes and envelopes as the real API on an ephemeral
//! localhost port, records every request, and lets a test inject
//! failures or per-query latency.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::api::ApiClient;
use crate::credentials::MemoryCredentialStore;
use crate::session::{Navigator, SessionStore};
use crate::views::{Prompter, ViewContext};

pub const TEST_TOKEN: &str = "test-token";
pub const DOCTOR_EMAIL: &str = "sarah.wilson@clinic.test";
pub const PATIENT_EMAIL: &str = "john.smith@example.test";
pub const PASSWORD: &str = "correct-horse";

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct BackendState {
    pub requests: Vec<RecordedRequest>,
    pub patients: HashMap<String, Value>,
    /// (patient id, segment) → items, in insertion order.
    pub items: HashMap<(String, String), Vec<Value>>,
    /// Next non-login request fails with this status and error text.
    pub fail_next: Option<(u16, Option<String>)>,
    /// Artificial latency for specific search terms.
    pub search_delays: HashMap<String, Duration>,
    /// When false, vitals POST answers `{}` instead of echoing.
    pub echo_vitals: bool,
    /// Canned status and body for the next login, bypassing the
    /// credential check.
    pub login_answer: Option<(u16, Value)>,
    next_id: u64,
}

type Shared = Arc<Mutex<BackendState>>;

pub struct MockBackend {
    pub base_url: String,
    pub state: Shared,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState {
            echo_vitals: true,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/login", post(login))
            .route("/api/patients/search", get(search))
            .route("/api/patients/:id", get(get_patient).put(update_patient))
            .route("/api/patients/:id/:segment", get(list_items).post(create_item))
            .route("/api/patients/:id/:segment/:item_id", delete(delete_item))
            .layer(middleware::from_fn_with_state(state.clone(), record_and_guard))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Duration::from_secs(5)).unwrap()
    }

    pub fn authed_client(&self) -> ApiClient {
        let client = self.client();
        client.set_token(Some(TEST_TOKEN)).unwrap();
        client
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn fail_next(&self, status: u16, message: Option<&str>) {
        self.state.lock().unwrap().fail_next = Some((status, message.map(str::to_string)));
    }

    pub fn delay_search(&self, term: &str, delay: Duration) {
        self.state
            .lock()
            .unwrap()
            .search_delays
            .insert(term.to_string(), delay);
    }

    pub fn answer_login(&self, status: u16, body: Value) {
        self.state.lock().unwrap().login_answer = Some((status, body));
    }

    pub fn set_echo_vitals(&self, echo: bool) {
        self.state.lock().unwrap().echo_vitals = echo;
    }

    pub fn seed_patient(&self, id: &str, first: &str, last: &str) {
        self.state.lock().unwrap().patients.insert(
            id.to_string(),
            json!({
                "_id": id,
                "firstName": first,
                "lastName": last,
                "age": 42,
                "gender": "Male",
                "bloodGroup": "O+",
                "primaryContact": "555-0100",
                "emergencyContact": "555-0199",
                "treatmentInfo": {
                    "currentDiagnosis": "Hypertension",
                    "lastUpdated": "2024-12-01T09:00:00Z"
                }
            }),
        );
    }

    /// Insert an item directly; returns its id.
    pub fn seed_item(&self, patient_id: &str, segment: &str, mut item: Value) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("{segment}-{}", state.next_id);
        if segment != "vitals" {
            item["_id"] = json!(id);
        }
        state
            .items
            .entry((patient_id.to_string(), segment.to_string()))
            .or_default()
            .push(item);
        id
    }
}

// ═══════════════════════════════════════════════════════════
// View fixtures
// ═══════════════════════════════════════════════════════════

/// Answers confirmations from a script (default: yes) and records
/// every alert and question.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<bool>>,
    pub alerts: Mutex<Vec<String>>,
    pub questions: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answer(&self, yes: bool) {
        self.answers.lock().unwrap().push_back(yes);
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn last_alert(&self) -> Option<String> {
        self.alerts.lock().unwrap().last().cloned()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, message: &str) -> bool {
        self.questions.lock().unwrap().push(message.to_string());
        self.answers.lock().unwrap().pop_front().unwrap_or(true)
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn redirect(&self, _url: &str) {}
}

/// A signed-in view context against `backend`, plus its prompter.
pub fn view_context(backend: &MockBackend) -> (ViewContext, Arc<ScriptedPrompter>) {
    let session = SessionStore::restore(
        backend.authed_client(),
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(NullNavigator),
        "https://portal.test/",
    );
    let prompter = Arc::new(ScriptedPrompter::default());
    (ViewContext::new(Arc::new(session), prompter.clone()), prompter)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn item_field(segment: &str) -> Option<&'static str> {
    match segment {
        "prescriptions" => Some("prescription"),
        "histories" => Some("history"),
        "allergies" => Some("allergy"),
        "vitals" => Some("vital"),
        _ => None,
    }
}

async fn record_and_guard(State(state): State<Shared>, req: Request, next: Next) -> Response {
    let authorization = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let path = req.uri().path().to_string();

    let forced = {
        let mut s = state.lock().unwrap();
        s.requests.push(RecordedRequest {
            method: req.method().to_string(),
            path: path.clone(),
            query: req.uri().query().map(str::to_string),
            authorization: authorization.clone(),
        });
        if path == "/api/login" {
            None
        } else {
            s.fail_next.take()
        }
    };

    if path != "/api/login" && authorization.as_deref() != Some(&format!("Bearer {TEST_TOKEN}")) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    if let Some((status, message)) = forced {
        let status = StatusCode::from_u16(status).unwrap();
        return match message {
            Some(m) => error(status, &m),
            None => status.into_response(),
        };
    }
    next.run(req).await
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let canned = state.lock().unwrap().login_answer.take();
    if let Some((status, canned)) = canned {
        return (StatusCode::from_u16(status).unwrap(), Json(canned)).into_response();
    }
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if password != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    let user = match email {
        DOCTOR_EMAIL => json!({
            "id": "d1",
            "name": "Dr. Sarah Wilson",
            "email": DOCTOR_EMAIL,
            "role": "doctor",
            "specialty": "Cardiology",
            "qualifications": ["MD"],
            "experience": 12
        }),
        PATIENT_EMAIL => json!({
            "id": "p1",
            "name": "John Smith",
            "email": PATIENT_EMAIL,
            "role": "patient",
            "age": 42,
            "bloodGroup": "O+",
            "primaryContact": "555-0100",
            "emergencyContact": "555-0199"
        }),
        _ => return error(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    };
    Json(json!({ "user": user, "token": TEST_TOKEN })).into_response()
}

async fn search(State(state): State<Shared>, Query(params): Query<HashMap<String, String>>) -> Response {
    let term = params.get("query").cloned().unwrap_or_default();
    let delay = state.lock().unwrap().search_delays.get(&term).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let needle = term.to_lowercase();
    let state = state.lock().unwrap();
    let mut patients: Vec<&Value> = state
        .patients
        .values()
        .filter(|p| {
            let name = format!(
                "{} {} {}",
                p["_id"].as_str().unwrap_or_default(),
                p["firstName"].as_str().unwrap_or_default(),
                p["lastName"].as_str().unwrap_or_default()
            );
            name.to_lowercase().contains(&needle)
        })
        .collect();
    patients.sort_by_key(|p| p["_id"].as_str().unwrap_or_default().to_string());
    Json(json!({ "patients": patients })).into_response()
}

async fn get_patient(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    match state.lock().unwrap().patients.get(&id) {
        Some(p) => Json(json!({ "patient": p })).into_response(),
        None => error(StatusCode::NOT_FOUND, "Patient not found"),
    }
}

async fn update_patient(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    let Some(patient) = state.patients.get_mut(&id) else {
        return error(StatusCode::NOT_FOUND, "Patient not found");
    };
    if let Some(fields) = body.as_object() {
        for (key, value) in fields {
            if key == "currentDiagnosis" {
                patient["treatmentInfo"] = json!({
                    "currentDiagnosis": value,
                    "lastUpdated": "2024-12-06T10:30:00Z"
                });
            } else {
                patient[key.as_str()] = value.clone();
            }
        }
    }
    Json(json!({ "patient": patient })).into_response()
}

async fn list_items(
    State(state): State<Shared>,
    Path((id, segment)): Path<(String, String)>,
) -> Response {
    let state = state.lock().unwrap();
    if !state.patients.contains_key(&id) {
        return error(StatusCode::NOT_FOUND, "Patient not found");
    }
    let items = state
        .items
        .get(&(id, segment.clone()))
        .cloned()
        .unwrap_or_default();
    let mut body = serde_json::Map::new();
    body.insert(segment, Value::Array(items));
    Json(Value::Object(body)).into_response()
}

async fn create_item(
    State(state): State<Shared>,
    Path((id, segment)): Path<(String, String)>,
    Json(mut body): Json<Value>,
) -> Response {
    let Some(field) = item_field(&segment) else {
        return error(StatusCode::NOT_FOUND, "Unknown collection");
    };
    let mut state = state.lock().unwrap();
    if !state.patients.contains_key(&id) {
        return error(StatusCode::NOT_FOUND, "Patient not found");
    }
    state.next_id += 1;
    if segment == "vitals" {
        body["date"] = json!(format!("2024-12-{:02}T08:00:00Z", state.next_id % 28 + 1));
    } else {
        body["_id"] = json!(uuid::Uuid::new_v4().to_string());
    }
    state
        .items
        .entry((id, segment.clone()))
        .or_default()
        .push(body.clone());

    if segment == "vitals" && !state.echo_vitals {
        return (StatusCode::CREATED, Json(json!({}))).into_response();
    }
    let mut envelope = serde_json::Map::new();
    envelope.insert(field.to_string(), body);
    (StatusCode::CREATED, Json(Value::Object(envelope))).into_response()
}

async fn delete_item(
    State(state): State<Shared>,
    Path((id, segment, item_id)): Path<(String, String, String)>,
) -> Response {
    let mut state = state.lock().unwrap();
    let Some(items) = state.items.get_mut(&(id, segment)) else {
        return error(StatusCode::NOT_FOUND, "Item not found");
    };
    let before = items.len();
    items.retain(|item| item["_id"].as_str() != Some(item_id.as_str()));
    if items.len() == before {
        return error(StatusCode::NOT_FOUND, "Item not found");
    }
    Json(json!({ "message": "Deleted" })).into_response()
}
