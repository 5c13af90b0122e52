#![allow(dead_code)]

use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::time::Duration;

pub const REGISTER: &str = "\
Action type,Provider name,Individual name,State,Effective date,End date\r
ER - Banning Order,Example Provider Pty Ltd,,VIC,2026-02-03,\r
ER - Compliance Notice,Second Example Care Pty Ltd,,NSW,2026-02-01,\r
Registration Renewal,,Jane Citizen,QLD,2026-01-15,2027-01-15\r
,,,,,\r
";

async fn register() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], REGISTER)
}

async fn chain(Path(n): Path<u32>) -> Redirect {
    if n == 0 {
        Redirect::temporary("/export.csv")
    } else {
        Redirect::temporary(&format!("/chain/{}", n - 1))
    }
}

async fn echo_user_agent(headers: HeaderMap) -> impl IntoResponse {
    let ua = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    (
        [(header::CONTENT_TYPE, "text/csv")],
        format!("Action type,Provider name\nNotice,{ua}\n"),
    )
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(3)).await;
    "Action type,Provider name\nNotice,Late\n"
}

/// Register endpoints plus the failure modes seen from the real upstream
pub fn upstream_router() -> Router {
    Router::new()
        .route("/export.csv", get(register))
        .route("/moved", get(|| async { Redirect::permanent("/export.csv") }))
        .route("/chain/:n", get(chain))
        .route("/loop", get(|| async { Redirect::temporary("/loop") }))
        .route("/no-location", get(|| async { StatusCode::FOUND }))
        .route("/to-ftp", get(|| async { Redirect::temporary("ftp://example.com/export.csv") }))
        .route(
            "/error-page",
            get(|| async { Html("<!DOCTYPE html><html><body>Service Unavailable</body></html>") }),
        )
        .route("/garbage", get(|| async { "this is not a register" }))
        .route("/ua", get(echo_user_agent))
        .route("/slow", get(slow))
}

/// Serve `app` on an ephemeral port from a background runtime.
///
/// The fetcher is blocking, so the server must not share the test's thread.
pub fn spawn_upstream(app: Router) -> SocketAddr {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("build runtime");
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind listener");
            tx.send(listener.local_addr().expect("local addr"))
                .expect("send addr");
            axum::serve(listener, app).await.expect("serve upstream");
        });
    });
    rx.recv().expect("upstream addr")
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}
