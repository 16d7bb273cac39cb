use super::*;
use axum::Json;
use axum::http::{HeaderValue, Method};
use serde_json::{Value, json};

// =============================================================================
// PURE HELPERS
// =============================================================================

#[test]
fn rewrite_strips_prefix() {
    assert_eq!(rewrite_path("/api", "/api/departments").as_deref(), Some("/departments"));
    assert_eq!(rewrite_path("/api", "/api/questionnaires/d1").as_deref(), Some("/questionnaires/d1"));
    assert_eq!(rewrite_path("/api", "/api").as_deref(), Some("/"));
}

#[test]
fn rewrite_ignores_paths_outside_prefix() {
    assert_eq!(rewrite_path("/api", "/apis/x"), None);
    assert_eq!(rewrite_path("/api", "/patient/login"), None);
    assert_eq!(rewrite_path("/api", "/x/api/y"), None);
}

#[test]
fn hop_by_hop_headers_are_detected() {
    assert!(is_hop_by_hop(&HeaderName::from_static("connection")));
    assert!(is_hop_by_hop(&HeaderName::from_static("transfer-encoding")));
    assert!(!is_hop_by_hop(&HeaderName::from_static("authorization")));
}

#[test]
fn relayable_drops_host_length_and_hop_headers() {
    let mut headers = HeaderMap::new();
    headers.insert(HOST, HeaderValue::from_static("localhost:8002"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from_static("12"));
    headers.insert("connection", HeaderValue::from_static("keep-alive"));
    headers.insert("authorization", HeaderValue::from_static("Bearer t"));

    let kept = relayable(&headers);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept.get("authorization").unwrap(), "Bearer t");
}

#[test]
fn errors_map_to_statuses() {
    assert_eq!(ProxyError::Body("too big".to_owned()).into_response().status(), StatusCode::BAD_REQUEST);
    assert_eq!(ProxyError::ClientBuild("tls".to_owned()).into_response().status(), StatusCode::BAD_GATEWAY);
}

// =============================================================================
// HTTP
// =============================================================================

async fn echo(request: Request) -> Json<Value> {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, 1024).await.unwrap();
    let header = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok()).map(ToOwned::to_owned);
    Json(json!({
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query(),
        "authorization": header("authorization"),
        "host": header("host"),
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn proxy_to(target: String, static_dir: Option<std::path::PathBuf>) -> String {
    let config = DevServerConfig { target, static_dir, ..DevServerConfig::default() };
    serve(app(&config).unwrap()).await
}

#[tokio::test]
async fn forwards_stripped_path_query_headers_and_body() {
    let upstream = serve(
        Router::new()
            .fallback(echo)
            .route("/forbidden", get(|| async { (StatusCode::FORBIDDEN, "nope") })),
    )
    .await;
    let upstream_host = upstream.trim_start_matches("http://").to_owned();
    let proxy = proxy_to(upstream, None).await;

    let client = reqwest::Client::new();
    let echoed: Value = client
        .request(Method::POST, format!("{proxy}/api/questionnaires/submit?lang=zh"))
        .header("authorization", "Bearer pt")
        .body(r#"{"q1":"yes"}"#)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["path"], "/questionnaires/submit");
    assert_eq!(echoed["query"], "lang=zh");
    assert_eq!(echoed["authorization"], "Bearer pt");
    assert_eq!(echoed["host"], upstream_host.as_str());
    assert_eq!(echoed["body"], r#"{"q1":"yes"}"#);

    let relayed = client.get(format!("{proxy}/api/forbidden")).send().await.unwrap();
    assert_eq!(relayed.status(), StatusCode::FORBIDDEN);
    assert_eq!(relayed.text().await.unwrap(), "nope");
}

#[tokio::test]
async fn bare_prefix_forwards_to_upstream_root() {
    let upstream = serve(Router::new().fallback(echo)).await;
    let proxy = proxy_to(upstream, None).await;

    for path in ["/api", "/api/"] {
        let echoed: Value = reqwest::get(format!("{proxy}{path}")).await.unwrap().json().await.unwrap();
        assert_eq!(echoed["path"], "/", "{path} should reach the upstream root");
    }
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let proxy = proxy_to("http://127.0.0.1:9".to_owned(), None).await;
    let response = reqwest::get(format!("{proxy}/api/departments")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn healthz_and_unproxied_paths() {
    let proxy = proxy_to("http://127.0.0.1:9".to_owned(), None).await;
    assert_eq!(reqwest::get(format!("{proxy}/healthz")).await.unwrap().status(), StatusCode::OK);
    assert_eq!(reqwest::get(format!("{proxy}/patient/login")).await.unwrap().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn serves_static_dir_outside_prefix() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>MediMeow</h1>").unwrap();
    let proxy = proxy_to("http://127.0.0.1:9".to_owned(), Some(dir.path().to_path_buf())).await;

    let response = reqwest::get(format!("{proxy}/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "<h1>MediMeow</h1>");
}
