//! Fake Airline Manager web client for integration testing.
//!
//! Serves the login, fuel, CO2 and chat endpoints from an axum router on
//! `127.0.0.1:0`. Page bodies and statuses are controllable from test
//! code; chat posts are recorded with the headers they arrived with.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const EMAIL: &str = "pilot@example.com";
pub const PASSWORD: &str = "hunter2";
/// Logs in successfully but never receives a session cookie.
pub const COOKIELESS_EMAIL: &str = "nocookie@example.com";
const SESSION_ID: &str = "sess-42";

/// A chat message as the server received it.
#[derive(Debug, Clone)]
pub struct ChatPost {
    pub form: HashMap<String, String>,
    pub headers: HeaderMap,
}

/// Controllable state behind the fake endpoints.
pub struct FakeSite {
    pub fuel: Mutex<(StatusCode, String)>,
    pub co2: Mutex<(StatusCode, String)>,
    pub chat_status: Mutex<StatusCode>,
    pub chat_posts: Mutex<Vec<ChatPost>>,
    pub login_forms: Mutex<Vec<HashMap<String, String>>>,
    pub login_content_types: Mutex<Vec<String>>,
    pub expired: Mutex<bool>,
}

impl FakeSite {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fuel: Mutex::new((StatusCode::OK, String::new())),
            co2: Mutex::new((StatusCode::OK, String::new())),
            chat_status: Mutex::new(StatusCode::OK),
            chat_posts: Mutex::new(Vec::new()),
            login_forms: Mutex::new(Vec::new()),
            login_content_types: Mutex::new(Vec::new()),
            expired: Mutex::new(false),
        })
    }

    pub fn set_fuel(&self, status: StatusCode, body: impl Into<String>) {
        *self.fuel.lock().unwrap() = (status, body.into());
    }

    pub fn set_co2(&self, status: StatusCode, body: impl Into<String>) {
        *self.co2.lock().unwrap() = (status, body.into());
    }

    /// Stop honouring previously issued session cookies.
    pub fn expire_sessions(&self) {
        *self.expired.lock().unwrap() = true;
    }

    pub fn chat_posts(&self) -> Vec<ChatPost> {
        self.chat_posts.lock().unwrap().clone()
    }

    /// Bind to an ephemeral port and serve in the background.
    /// Returns the base URL, e.g. `http://127.0.0.1:54321`.
    pub async fn spawn(self: &Arc<Self>) -> String {
        let app = Router::new()
            .route("/weblogin/login.php", post(login))
            .route("/fuel.php", get(fuel_page))
            .route("/co2.php", get(co2_page))
            .route("/alliance_chat.php", post(chat))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

pub fn fuel_body(countdown: u64, prices: &str) -> String {
    format!(
        "<div id=\"fuelTimer\"></div><script>\n\
         $('#fuelTimer').countdown({{until: {countdown}, compact: true}});\n\
         fuel_startFuelChart([{prices}], ['08:00','08:30','09:00']);\n</script>"
    )
}

pub fn co2_body(prices: &str) -> String {
    format!("<script>co2_startCo2Chart([{prices}], ['08:00','08:30','09:00']);</script>")
}

fn has_session(site: &FakeSite, headers: &HeaderMap) -> bool {
    if *site.expired.lock().unwrap() {
        return false;
    }
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains(&format!("PHPSESSID={SESSION_ID}")))
        .unwrap_or(false)
}

async fn login(
    State(site): State<Arc<FakeSite>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    site.login_content_types.lock().unwrap().push(content_type);
    site.login_forms.lock().unwrap().push(form.clone());

    let email = form.get("lEmail").map(String::as_str);
    let password = form.get("lPass").map(String::as_str);
    match (email, password) {
        (Some(EMAIL), Some(PASSWORD)) => (
            [(header::SET_COOKIE, format!("PHPSESSID={SESSION_ID}; path=/"))],
            "ok",
        )
            .into_response(),
        (Some(COOKIELESS_EMAIL), _) => "ok".into_response(),
        _ => (StatusCode::UNAUTHORIZED, "Invalid email or password").into_response(),
    }
}

async fn fuel_page(State(site): State<Arc<FakeSite>>, headers: HeaderMap) -> Response {
    if !has_session(&site, &headers) {
        return Redirect::to("/weblogin/login.php").into_response();
    }
    let (status, body) = site.fuel.lock().unwrap().clone();
    (status, body).into_response()
}

async fn co2_page(State(site): State<Arc<FakeSite>>, headers: HeaderMap) -> Response {
    if !has_session(&site, &headers) {
        return Redirect::to("/weblogin/login.php").into_response();
    }
    let (status, body) = site.co2.lock().unwrap().clone();
    (status, body).into_response()
}

async fn chat(
    State(site): State<Arc<FakeSite>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if query.get("mode").map(String::as_str) != Some("do") || !has_session(&site, &headers) {
        return (StatusCode::FORBIDDEN, "Not allowed").into_response();
    }
    let status = *site.chat_status.lock().unwrap();
    site.chat_posts.lock().unwrap().push(ChatPost { form, headers });
    (status, "").into_response()
}
