use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::extract::Extension;
use axum::http::{Request, Response, StatusCode, header};
use axum::routing::get;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use super::*;
use crate::application::{AllowedRoles, AuthConfig};
use crate::domain::value_object::Role;
use crate::infra::InMemoryBackend;

struct TestApp {
    router: Router,
    registry: Arc<ContextRegistry<InMemoryBackend>>,
    backend: InMemoryBackend,
}

async fn whoami(Extension(viewer): Extension<Viewer>) -> Json<Value> {
    Json(json!({
        "path": viewer.path,
        "role": viewer.role(),
        "notifications": viewer.notifications(),
    }))
}

fn app_with(settle_timeout: Duration) -> TestApp {
    let backend = InMemoryBackend::new();
    backend.seed_account("citizen@city.gov", "secret1", Some(Role::Citizen), Some("Casey"));
    backend.seed_account("admin@city.gov", "secret1", Some(Role::Admin), Some("Alex"));
    backend.seed_account("orphan@city.gov", "secret1", None, None);

    let config = Arc::new(AuthConfig::development());
    let registry = Arc::new(ContextRegistry::new(Arc::new(backend.clone()), config));

    let admin_only = guarded::<InMemoryBackend>(
        Router::new().route("/admin-dashboard", get(whoami)),
        RouteGuard::new(AllowedRoles::only(&[Role::Admin]), settle_timeout),
    );
    let any_role = guarded::<InMemoryBackend>(
        Router::new().route("/dashboard", get(whoami)),
        RouteGuard::new(AllowedRoles::all(), settle_timeout),
    );

    let router = with_client_context(
        auth_router::<InMemoryBackend>().merge(admin_only).merge(any_role),
        registry.clone(),
    );

    TestApp {
        router,
        registry,
        backend,
    }
}

fn app() -> TestApp {
    app_with(Duration::from_secs(2))
}

fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// `name=value` pair from the response's Set-Cookie header
fn client_cookie(resp: &Response<Body>) -> String {
    let set_cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .expect("no client cookie issued")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .expect("no Location header")
        .to_str()
        .unwrap()
}

async fn json_body(resp: Response<Body>) -> Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("parse JSON")
}

/// Sign in and return the client cookie
async fn signed_in(app: &TestApp, email: &str) -> String {
    let resp = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/login",
            None,
            Some(json!({"email": email, "password": "secret1"})),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    client_cookie(&resp)
}

#[tokio::test]
async fn test_first_request_issues_client_cookie() {
    let app = app();
    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/api/auth/state", None, None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = client_cookie(&resp);
    assert!(cookie.starts_with("civguard_client="));
    assert_eq!(app.registry.len(), 1);

    let json = json_body(resp).await;
    assert!(json["user"].is_null());
    assert_eq!(json["redirectPath"], "/");

    // Same cookie, same context, no new cookie
    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/api/auth/state", Some(&cookie), None))
        .await
        .unwrap();
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(app.registry.len(), 1);
}

#[tokio::test]
async fn test_login_redirects_to_role_dashboard() {
    let app = app();
    let resp = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/login",
            None,
            Some(json!({"email": "admin@city.gov", "password": "secret1"})),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin-dashboard");
    let cookie = client_cookie(&resp);

    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/admin-dashboard", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    assert_eq!(json["role"], "admin");
    assert_eq!(json["path"], "/admin-dashboard");
    assert_eq!(json["notifications"][0]["title"], "Login successful");
}

#[tokio::test]
async fn test_login_failure_renders_notification() {
    let app = app();
    let resp = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/login",
            None,
            Some(json!({"email": "admin@city.gov", "password": "nope-nope"})),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(resp).await;
    assert_eq!(json["view"], "login");
    assert_eq!(json["notifications"][0]["title"], "Login failed");
    assert_eq!(json["notifications"][0]["variant"], "destructive");
}

#[tokio::test]
async fn test_login_page_redirects_signed_in_user() {
    let app = app();
    let cookie = signed_in(&app, "citizen@city.gov").await;

    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/login", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
async fn test_guard_redirects_anonymous_to_login() {
    let app = app();
    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/dashboard", None, None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_guard_redirects_wrong_role_to_own_dashboard() {
    let app = app();
    let cookie = signed_in(&app, "citizen@city.gov").await;

    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/admin-dashboard", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
async fn test_guard_redirects_missing_profile_to_login() {
    let app = app();
    let cookie = signed_in(&app, "orphan@city.gov").await;

    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/dashboard", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/login", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = json_body(resp).await;
    let titles: Vec<&str> = json["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["title"].as_str())
        .collect();
    assert!(titles.contains(&"Profile not found"), "{titles:?}");
}

#[tokio::test]
async fn test_guard_answers_loading_while_sign_in_in_flight() {
    let app = app_with(Duration::ZERO);
    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/api/auth/state", None, None))
        .await
        .unwrap();
    let cookie = client_cookie(&resp);
    let client_id = cookie.split_once('=').unwrap().1.to_string();
    let context = app.registry.get(&client_id).unwrap();

    app.backend.pause();
    let login = tokio::spawn(app.router.clone().oneshot(request(
        "POST",
        "/login",
        Some(&cookie),
        Some(json!({"email": "citizen@city.gov", "password": "secret1"})),
    )));

    let mut rx = context.subscribe();
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| s.is_loading()))
        .await
        .expect("login never started")
        .unwrap();

    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/dashboard", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "1");
    assert_eq!(json_body(resp).await["view"], "loading");

    app.backend.resume();
    let resp = login.await.unwrap().unwrap();
    assert_eq!(location(&resp), "/dashboard");
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let app = app();
    let resp = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/register",
            None,
            Some(json!({
                "email": "new@city.gov",
                "password": "secret1",
                "confirmPassword": "secret2",
            })),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = json_body(resp).await;
    assert_eq!(json["notifications"][0]["title"], "Passwords do not match");
    assert!(!app.backend.has_account("new@city.gov"));
}

#[tokio::test]
async fn test_register_rejects_admin_role() {
    let app = app();
    let resp = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/register",
            None,
            Some(json!({
                "email": "new@city.gov",
                "password": "secret1",
                "confirmPassword": "secret1",
                "role": "admin",
            })),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(app.backend.calls().is_empty());
}

#[tokio::test]
async fn test_register_officer_lands_on_municipal_dashboard() {
    let app = app();
    let resp = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/register",
            None,
            Some(json!({
                "name": "Morgan",
                "email": "morgan@city.gov",
                "password": "secret1",
                "confirmPassword": "secret1",
                "role": "municipal",
            })),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/municipal-dashboard");
    assert!(app.backend.has_account("morgan@city.gov"));
}

#[tokio::test]
async fn test_register_page_lists_selectable_roles() {
    let app = app();
    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/register", None, None))
        .await
        .unwrap();

    let json = json_body(resp).await;
    let roles: Vec<&str> = json["roles"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["value"].as_str())
        .collect();
    assert_eq!(roles, vec!["citizen", "officer"]);
}

#[tokio::test]
async fn test_logout_redirects_home_and_clears_state() {
    let app = app();
    let cookie = signed_in(&app, "citizen@city.gov").await;

    let resp = app
        .router
        .clone()
        .oneshot(request("POST", "/logout", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = app
        .router
        .clone()
        .oneshot(request("GET", "/dashboard", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(location(&resp), "/login");
}
