use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use argon2::Params;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum_extra::extract::cookie::Cookie;
use labsite::{AppConfig, AppState, Error, Renderer, TallyStore, build_router};
use tower::ServiceExt;

struct Page {
    status: StatusCode,
    location: Option<String>,
    set_cookies: Vec<String>,
    body: String,
}

/// Minimal browser: keeps cookies between requests, never follows redirects.
struct Client {
    app: Router,
    cookies: BTreeMap<String, String>,
}

fn test_state() -> AppState {
    let config = AppConfig::new()
        .with_secure_cookies(false)
        .with_hash_params(Params::new(Params::MIN_M_COST, 1, 1, None).unwrap());
    AppState::new(config).unwrap()
}

fn test_app() -> Router {
    build_router(test_state())
}

impl Client {
    fn new() -> Self {
        Self::with_app(test_app())
    }

    fn with_app(app: Router) -> Self {
        Self {
            app,
            cookies: BTreeMap::new(),
        }
    }

    async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> Page {
        let mut builder = builder;
        if !self.cookies.is_empty() {
            let header = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(COOKIE, header);
        }
        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let mut set_cookies = Vec::new();
        for value in response.headers().get_all(SET_COOKIE) {
            let raw = value.to_str().unwrap().to_string();
            let cookie = Cookie::parse(raw.clone()).unwrap();
            if cookie.value().is_empty() {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
            set_cookies.push(raw);
        }

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        Page {
            status,
            location,
            set_cookies,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    async fn get(&mut self, uri: &str) -> Page {
        self.send(Request::builder().method("GET").uri(uri), Body::empty())
            .await
    }

    async fn post_form(&mut self, uri: &str, form: &str) -> Page {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(form.to_string()),
        )
        .await
    }

    async fn login(&mut self, login: &str, password: &str) -> Page {
        self.post_form("/login", &format!("login={login}&password={password}"))
            .await
    }
}

fn count_of(page: &Page) -> u64 {
    let start = page.body.find("<span id=\"count\">").unwrap() + "<span id=\"count\">".len();
    let end = start + page.body[start..].find('<').unwrap();
    page.body[start..end].parse().unwrap()
}

// ── Pages ──────────────────────────────────────────────────────────

#[tokio::test]
async fn every_page_responds() {
    let mut client = Client::new();
    for path in [
        "/",
        "/posts",
        "/about",
        "/url-params",
        "/headers",
        "/cookies",
        "/form_params",
        "/phone_validation",
        "/counter",
        "/login",
    ] {
        let page = client.get(path).await;
        assert_eq!(page.status, StatusCode::OK, "{path}");
        assert!(page.body.contains("<html"), "{path}");
    }
}

#[tokio::test]
async fn index_links_to_posts() {
    let page = Client::new().get("/").await;
    assert!(page.body.contains("Lab assignment"));
    assert!(page.body.contains("/posts"));
}

#[tokio::test]
async fn posts_list_and_detail() {
    let mut client = Client::new();
    let list = client.get("/posts").await;
    assert!(list.body.contains("Latest posts"));
    assert_eq!(list.body.matches(".jpg").count(), 5);

    for index in 0..5 {
        let page = client.get(&format!("/posts/{index}")).await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("Author"));
        assert!(page.body.contains(".jpg"));
        assert!(page.body.contains("Comments"));
    }
}

#[tokio::test]
async fn missing_posts_are_not_found() {
    let mut client = Client::new();
    for path in ["/posts/5", "/posts/100", "/posts/-1", "/posts/abc", "/nowhere"] {
        let page = client.get(path).await;
        assert_eq!(page.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(page.body, "404 Not Found");
    }
}

#[tokio::test]
async fn url_params_are_listed() {
    let page = Client::new().get("/url-params?name=John&age=30").await;
    for needle in ["name", "John", "age", "30"] {
        assert!(page.body.contains(needle), "{needle}");
    }
}

#[tokio::test]
async fn url_params_are_escaped() {
    let page = Client::new().get("/url-params?x=%3Cb%3E").await;
    assert!(page.body.contains("&lt;b&gt;"));
}

#[tokio::test]
async fn request_headers_are_listed() {
    let mut client = Client::new();
    let page = client
        .send(
            Request::builder()
                .uri("/headers")
                .header("Custom-Header", "Value123"),
            Body::empty(),
        )
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("custom-header"));
    assert!(page.body.contains("Value123"));
}

#[tokio::test]
async fn demo_cookie_can_be_set_and_deleted() {
    let mut client = Client::new();
    assert!(client.get("/cookies").await.body.contains("Cookie is not set."));

    let set = client.post_form("/cookies", "action=set").await;
    assert_eq!(set.status, StatusCode::SEE_OTHER);
    assert_eq!(set.location.as_deref(), Some("/cookies"));
    assert!(set.set_cookies.iter().any(|c| c.contains("Max-Age=86400")));
    assert_eq!(client.cookies.get("my_cookie").map(String::as_str), Some("cookie_value"));
    assert!(client.get("/cookies").await.body.contains("Cookie is set."));

    let delete = client.post_form("/cookies", "action=delete").await;
    assert_eq!(delete.status, StatusCode::SEE_OTHER);
    assert!(!client.cookies.contains_key("my_cookie"));
    assert!(client.get("/cookies").await.body.contains("Cookie is not set."));
}

#[tokio::test]
async fn unknown_cookie_action_renders_page() {
    let page = Client::new().post_form("/cookies", "action=other").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Cookie is not set."));
}

#[tokio::test]
async fn form_params_are_echoed() {
    let mut client = Client::new();
    assert!(client.get("/form_params").await.body.contains("Form parameters"));
    let page = client
        .post_form("/form_params", "field1=value1&field2=value2")
        .await;
    for needle in ["field1", "value1", "field2", "value2"] {
        assert!(page.body.contains(needle), "{needle}");
    }
}

#[tokio::test]
async fn phone_validation_formats_and_rejects() {
    let mut client = Client::new();
    assert!(client.get("/phone_validation").await.body.contains("<form"));

    let ok = client
        .post_form("/phone_validation", "phone=%2B7+%28123%29+456-78-90")
        .await;
    assert!(ok.body.contains("8-123-456-78-90"));
    assert!(!ok.body.contains("is-invalid"));

    let ok = client
        .post_form("/phone_validation", "phone=8%28999%29123-45-67")
        .await;
    assert!(ok.body.contains("8-999-123-45-67"));
    assert!(!ok.body.contains("invalid characters"));

    let bad = client.post_form("/phone_validation", "phone=abc%21").await;
    assert!(bad.body.contains("Invalid input. The phone number contains invalid characters."));
    assert!(bad.body.contains("is-invalid"));

    let ten = client.post_form("/phone_validation", "phone=9123456789").await;
    assert!(ten.body.contains("8-912-345-67-89"));

    let short = client.post_form("/phone_validation", "phone=12345").await;
    assert!(short.body.contains("Invalid input. Wrong number of digits."));
}

// ── Login ──────────────────────────────────────────────────────────

#[tokio::test]
async fn valid_login_redirects_home_with_notice() {
    let mut client = Client::new();
    let page = client.login("user", "qwerty").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert_eq!(page.location.as_deref(), Some("/"));
    assert!(client.cookies.contains_key("session"));
    assert!(!client.cookies.contains_key("remember_token"));

    let home = client.get("/").await;
    assert!(home.body.contains("You have logged in successfully."));
    assert!(home.body.contains("Ivan Petrov"));
    assert!(home.body.contains("href=\"/logout\""));

    // Notices are shown once.
    let again = client.get("/").await;
    assert!(!again.body.contains("You have logged in successfully."));
}

#[tokio::test]
async fn both_seed_accounts_can_log_in() {
    for (login, password, name) in [("user", "qwerty", "Ivan Petrov"), ("admin", "admin123", "Maria Sokolova")] {
        let mut client = Client::new();
        assert_eq!(client.login(login, password).await.location.as_deref(), Some("/"));
        assert!(client.get("/secret").await.body.contains(name));
    }
}

#[tokio::test]
async fn invalid_login_stays_on_login_page() {
    let mut client = Client::new();
    for _ in 0..2 {
        let page = client.login("user", "wrongpass").await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("Invalid login or password."));
        assert!(page.body.contains("name=\"password\""));
        assert!(page.body.contains("value=\"user\""));

        let secret = client.get("/secret").await;
        assert_eq!(secret.status, StatusCode::SEE_OTHER);
    }
    // No lockout after failures.
    assert_eq!(client.login("user", "qwerty").await.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn unknown_login_is_rejected() {
    let page = Client::new().login("ghost", "qwerty").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Invalid login or password."));
}

#[tokio::test]
async fn protected_page_redirects_then_succeeds_after_login() {
    let mut client = Client::new();
    let denied = client.get("/secret").await;
    assert_eq!(denied.status, StatusCode::SEE_OTHER);
    assert_eq!(denied.location.as_deref(), Some("/login?next=%2Fsecret"));

    let login_page = client.get("/login?next=%2Fsecret").await;
    assert!(login_page.body.contains("Please log in to access this page."));
    assert!(login_page.body.contains("action=\"/login?next=%2Fsecret\""));

    let login = client
        .post_form("/login?next=%2Fsecret", "login=user&password=qwerty")
        .await;
    assert_eq!(login.location.as_deref(), Some("/secret"));

    let secret = client.get("/secret").await;
    assert_eq!(secret.status, StatusCode::OK);
    assert!(secret.body.contains("Secret page"));
}

#[tokio::test]
async fn guard_preserves_query_in_next() {
    let denied = Client::new().get("/secret?tab=2").await;
    assert_eq!(
        denied.location.as_deref(),
        Some("/login?next=%2Fsecret%3Ftab%3D2")
    );
}

#[tokio::test]
async fn foreign_next_is_ignored() {
    let mut client = Client::new();
    let page = client
        .post_form(
            "/login?next=https%3A%2F%2Fevil.example",
            "login=user&password=qwerty",
        )
        .await;
    assert_eq!(page.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn tampered_session_cookie_is_anonymous() {
    let mut client = Client::new();
    client.cookies.insert("session".into(), "forged".into());
    assert_eq!(client.get("/secret").await.status, StatusCode::SEE_OTHER);
}

// ── Logout and remember-me ─────────────────────────────────────────

#[tokio::test]
async fn logout_unbinds_identity() {
    let mut client = Client::new();
    client.login("user", "qwerty").await;

    let logout = client.get("/logout").await;
    assert_eq!(logout.status, StatusCode::SEE_OTHER);
    assert_eq!(logout.location.as_deref(), Some("/"));
    assert!(client.get("/").await.body.contains("You have logged out."));
    assert_eq!(client.get("/secret").await.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_requires_login() {
    let page = Client::new().get("/logout").await;
    assert_eq!(page.location.as_deref(), Some("/login?next=%2Flogout"));
}

#[tokio::test]
async fn remember_token_survives_session_loss() {
    let mut client = Client::new();
    client
        .post_form("/login", "login=user&password=qwerty&remember=on")
        .await;
    assert!(client.cookies.contains_key("remember_token"));

    client.cookies.remove("session");
    let secret = client.get("/secret").await;
    assert_eq!(secret.status, StatusCode::OK);
    assert!(client.cookies.contains_key("session"));
}

#[tokio::test]
async fn without_remember_session_loss_logs_out() {
    let mut client = Client::new();
    client.login("user", "qwerty").await;
    client.cookies.remove("session");
    assert_eq!(client.get("/secret").await.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_revokes_remember_token() {
    let mut client = Client::new();
    client
        .post_form("/login", "login=user&password=qwerty&remember=on")
        .await;
    client.get("/logout").await;
    assert!(!client.cookies.contains_key("remember_token"));

    client.cookies.remove("session");
    assert_eq!(client.get("/secret").await.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_with_remember_token_stays_logged_out() {
    let mut client = Client::new();
    client
        .post_form("/login", "login=user&password=qwerty&remember=on")
        .await;
    assert_eq!(client.get("/logout").await.status, StatusCode::SEE_OTHER);
    assert_eq!(client.get("/secret").await.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn later_login_without_remember_drops_earlier_token() {
    let mut client = Client::new();
    client
        .post_form("/login", "login=admin&password=admin123&remember=on")
        .await;
    client.login("user", "qwerty").await;
    assert!(!client.cookies.contains_key("remember_token"));
    assert!(client.get("/secret").await.body.contains("Ivan Petrov"));

    client.cookies.remove("session");
    let page = client.get("/secret").await;
    assert_eq!(page.status, StatusCode::SEE_OTHER);
    assert!(!page.body.contains("Maria Sokolova"));
}

#[tokio::test]
async fn later_remembered_login_replaces_token() {
    let mut client = Client::new();
    client
        .post_form("/login", "login=admin&password=admin123&remember=on")
        .await;
    client
        .post_form("/login", "login=user&password=qwerty&remember=on")
        .await;

    client.cookies.remove("session");
    let page = client.get("/secret").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Ivan Petrov"));
}

// ── Counter ────────────────────────────────────────────────────────

#[tokio::test]
async fn authenticated_counter_increments() {
    let mut client = Client::new();
    client.login("user", "qwerty").await;
    assert_eq!(count_of(&client.get("/counter").await), 1);
    assert_eq!(count_of(&client.get("/counter").await), 2);
    assert_eq!(count_of(&client.get("/counter").await), 3);
}

#[tokio::test]
async fn authenticated_tally_is_shared_across_sessions() {
    let app = test_app();
    let mut first = Client::with_app(app.clone());
    let mut second = Client::with_app(app.clone());
    let mut admin = Client::with_app(app);

    first.login("user", "qwerty").await;
    second.login("user", "qwerty").await;
    admin.login("admin", "admin123").await;

    assert_eq!(count_of(&first.get("/counter").await), 1);
    assert_eq!(count_of(&second.get("/counter").await), 2);
    assert_eq!(count_of(&admin.get("/counter").await), 1);
    assert_eq!(count_of(&first.get("/counter").await), 3);
}

#[tokio::test]
async fn anonymous_counters_are_per_session() {
    let app = test_app();
    let mut first = Client::with_app(app.clone());
    let mut second = Client::with_app(app);

    let page = first.get("/counter").await;
    assert_eq!(count_of(&page), 1);
    assert!(page.set_cookies.iter().any(|c| c.starts_with("session=") && c.contains("Max-Age=604800")));
    assert_eq!(count_of(&first.get("/counter").await), 2);
    assert_eq!(count_of(&second.get("/counter").await), 1);

    first.cookies.clear();
    assert_eq!(count_of(&first.get("/counter").await), 1);
}

#[tokio::test]
async fn permanent_session_is_refreshed_on_every_response() {
    let mut client = Client::new();
    client.get("/counter").await;
    let page = client.get("/about").await;
    assert!(page.set_cookies.iter().any(|c| c.starts_with("session=") && c.contains("Max-Age=604800")));
}

#[tokio::test]
async fn anonymous_pages_set_no_session_cookie() {
    let page = Client::new().get("/about").await;
    assert!(page.set_cookies.is_empty());
}

// ── Injected services ──────────────────────────────────────────────

/// Tally that starts every login at a fixed offset.
struct OffsetTally {
    base: u64,
    calls: Arc<AtomicU64>,
}

impl TallyStore for OffsetTally {
    fn increment(&self, _key: &str) -> u64 {
        self.base + self.calls.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[tokio::test]
async fn counter_uses_injected_tally() {
    let calls = Arc::new(AtomicU64::new(0));
    let state = test_state().with_tally(OffsetTally {
        base: 40,
        calls: calls.clone(),
    });
    let mut client = Client::with_app(build_router(state));
    client.login("user", "qwerty").await;

    assert_eq!(count_of(&client.get("/counter").await), 41);
    assert_eq!(count_of(&client.get("/counter").await), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Anonymous visits stay in the session.
    let mut anonymous = Client::with_app(client.app.clone());
    assert_eq!(count_of(&anonymous.get("/counter").await), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// Renders only the view name and title.
struct ViewNameRenderer;

impl Renderer for ViewNameRenderer {
    fn render(&self, view: &str, data: &serde_json::Value) -> Result<String, Error> {
        let title = data["title"].as_str().unwrap_or_default();
        Ok(format!("{view}|{title}"))
    }
}

struct BrokenRenderer;

impl Renderer for BrokenRenderer {
    fn render(&self, view: &str, _data: &serde_json::Value) -> Result<String, Error> {
        Err(Error::Render(format!("cannot render {view}")))
    }
}

#[tokio::test]
async fn pages_use_injected_renderer() {
    let state = test_state().with_renderer(ViewNameRenderer);
    let mut client = Client::with_app(build_router(state));
    assert_eq!(client.get("/about").await.body, "about|About the author");
    assert_eq!(client.get("/counter").await.body, "counter|Visit counter");
}

#[tokio::test]
async fn renderer_failure_is_internal_error() {
    let state = test_state().with_renderer(BrokenRenderer);
    let page = Client::with_app(build_router(state)).get("/").await;
    assert_eq!(page.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(page.body, "Internal error");
}
