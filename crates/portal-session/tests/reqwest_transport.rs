//! Runs the real blocking reqwest transport against an in-process fake portal.
//!
//! The portal keeps its server on a background tokio runtime so the blocking
//! client can be driven from the test thread.

use axum::extract::{Form, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use portal_session::{
    AuthError, AuthSession, Credentials, LoginCheck, PortalEndpoints, ReqwestTransport,
    SessionPhase, LOCK_DETAIL,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

const TOKEN: &str = "tok+123/abc=";
const ANON_COOKIE: &str = "_kevo_session=anon";
const AUTHED_COOKIE: &str = "_kevo_session=authed";

fn login_html() -> String {
    format!(
        r#"<html><body><form action="/signin" method="post">
        <input type="hidden" name="authenticity_token" value="{TOKEN}" />
        <input name="user[username]" type="text" />
        <input name="user[password]" type="password" />
        </form></body></html>"#
    )
}

const LOCKS_HTML: &str = r#"<html><body>
<ul class="lock"><li><div class="lock_unlock_container" data-lock-id="front"></div></li></ul>
</body></html>"#;

fn has_cookie(headers: &HeaderMap, cookie: &str) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split(';').any(|part| part.trim() == cookie))
}

async fn login_page() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, format!("{ANON_COOKIE}; Path=/"))],
        Html(login_html()),
    )
}

async fn sign_in(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
    let token_ok = form.get("authenticity_token").map(String::as_str) == Some(TOKEN);
    let cookie_ok = has_cookie(&headers, ANON_COOKIE);
    let password_ok = form.get("user[password]").map(String::as_str) == Some("correct horse");

    if token_ok && cookie_ok && password_ok {
        (
            [(header::SET_COOKIE, format!("{AUTHED_COOKIE}; Path=/"))],
            Redirect::to("/user/locks"),
        )
            .into_response()
    } else {
        Html(login_html()).into_response()
    }
}

async fn lock_list(headers: HeaderMap) -> Response {
    if has_cookie(&headers, AUTHED_COOKIE) {
        Html(LOCKS_HTML).into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}

async fn lock_detail(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Response {
    if !has_cookie(&headers, AUTHED_COOKIE) {
        return (StatusCode::UNAUTHORIZED, "not signed in").into_response();
    }
    let id = query.get("arguments").cloned().unwrap_or_default();
    let body = format!(r#"{{"id":"{id}","name":"Front Door","bolt_state":"Locked"}}"#);
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn spawn_portal() -> SocketAddr {
    let (tx, rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("failed to build runtime");
        runtime.block_on(async move {
            let app = Router::new()
                .route("/login", get(login_page))
                .route("/signin", post(sign_in))
                .route("/user/locks", get(lock_list))
                .route("/user/remote_locks/command/lock.json", get(lock_detail));

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind");
            tx.send(listener.local_addr().expect("no local addr"))
                .expect("failed to report addr");
            axum::serve(listener, app).await.expect("server failed");
        });
    });

    rx.recv_timeout(Duration::from_secs(10))
        .expect("portal did not start")
}

fn endpoints(addr: SocketAddr) -> PortalEndpoints {
    PortalEndpoints::new(&format!("http://{addr}")).expect("valid base url")
}

fn transport() -> ReqwestTransport {
    ReqwestTransport::with_request_timeout(Duration::from_secs(5))
}

#[test]
fn login_then_authenticated_get_carries_session_cookie() {
    let addr = spawn_portal();
    let endpoints = endpoints(addr);
    let transport = transport();

    let mut session = AuthSession::open(&transport, &endpoints).unwrap();
    let page = session
        .login(
            &Credentials::new("alice@example.com", "correct horse"),
            LoginCheck::Verify,
        )
        .unwrap();

    assert!(page.is_success());
    assert!(page.body.contains("data-lock-id=\"front\""));
    assert_eq!(session.phase(), SessionPhase::LoggedIn);

    let url = endpoints.command(LOCK_DETAIL, "front").unwrap();
    let detail = session.get(&url).unwrap();
    assert_eq!(detail.status, 200);
    assert!(detail.body.contains("\"id\":\"front\""));
}

#[test]
fn wrong_password_is_rejected_when_verifying() {
    let addr = spawn_portal();
    let transport = transport();

    let result = AuthSession::establish(
        &transport,
        &endpoints(addr),
        &Credentials::new("alice@example.com", "wrong"),
        LoginCheck::Verify,
    );

    assert!(matches!(result, Err(AuthError::LoginRejected(_))));
}

#[test]
fn fire_and_forget_login_surfaces_later_as_rejected_call() {
    let addr = spawn_portal();
    let endpoints = endpoints(addr);
    let transport = transport();

    let mut session = AuthSession::establish(
        &transport,
        &endpoints,
        &Credentials::new("alice@example.com", "wrong"),
        LoginCheck::FireAndForget,
    )
    .unwrap();

    let url = endpoints.command(LOCK_DETAIL, "front").unwrap();
    let detail = session.get(&url).unwrap();
    assert_eq!(detail.status, 401);
}

#[test]
fn sessions_do_not_share_cookies() {
    let addr = spawn_portal();
    let endpoints = endpoints(addr);
    let transport = transport();

    let _good = AuthSession::establish(
        &transport,
        &endpoints,
        &Credentials::new("alice@example.com", "correct horse"),
        LoginCheck::Verify,
    )
    .unwrap();

    let mut other = AuthSession::establish(
        &transport,
        &endpoints,
        &Credentials::new("alice@example.com", "wrong"),
        LoginCheck::FireAndForget,
    )
    .unwrap();

    let url = endpoints.command(LOCK_DETAIL, "front").unwrap();
    assert_eq!(other.get(&url).unwrap().status, 401);
}
