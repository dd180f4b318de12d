//! Integration tests for the ecobee client against a local stub API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use chrono::{Duration, Utc};
use ecobee_client::{ClientConfig, ClientError, EcobeeClient, TokenCache, Tokens};
use ecobee_metrics::{Selection, ThermostatSource};
use tempfile::TempDir;

const THERMOSTATS_OK: &str = r#"{
    "page": {"page": 1, "totalPages": 1, "pageSize": 1, "total": 1},
    "thermostatList": [
        {
            "identifier": "t1",
            "name": "Home",
            "runtime": {"connected": true, "actualTemperature": 705}
        }
    ],
    "status": {"code": 0, "message": ""}
}"#;

const TOKENS_OK: &str = r#"{
    "access_token": "new-access",
    "token_type": "Bearer",
    "expires_in": 3599,
    "refresh_token": "new-refresh",
    "scope": "smartRead"
}"#;

#[derive(Default)]
struct Recorded {
    thermostat_reply: Option<(u16, String)>,
    token_reply: Option<(u16, String)>,
    authorizations: Vec<String>,
    bodies: Vec<serde_json::Value>,
    grants: Vec<(String, String)>,
    pin_requests: Vec<HashMap<String, String>>,
}

#[derive(Clone, Default)]
struct Stub {
    inner: Arc<Mutex<Recorded>>,
}

impl Stub {
    fn reply_thermostats(&self, status: u16, body: &str) {
        self.inner.lock().unwrap().thermostat_reply = Some((status, body.to_string()));
    }

    fn reply_tokens(&self, status: u16, body: &str) {
        self.inner.lock().unwrap().token_reply = Some((status, body.to_string()));
    }
}

fn reply(reply: Option<(u16, String)>) -> (StatusCode, String) {
    let (status, body) = reply.unwrap_or((404, String::new()));
    (StatusCode::from_u16(status).unwrap(), body)
}

async fn thermostat(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let mut recorded = stub.inner.lock().unwrap();
    if let Some(auth) = headers.get("authorization") {
        recorded.authorizations.push(auth.to_str().unwrap().to_string());
    }
    if let Some(json) = params.get("json") {
        recorded.bodies.push(serde_json::from_str(json).unwrap());
    }
    reply(recorded.thermostat_reply.clone())
}

async fn token(
    State(stub): State<Stub>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let mut recorded = stub.inner.lock().unwrap();
    recorded.grants.push((
        params.get("grant_type").cloned().unwrap_or_default(),
        params.get("code").cloned().unwrap_or_default(),
    ));
    reply(recorded.token_reply.clone())
}

async fn authorize(
    State(stub): State<Stub>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    stub.inner.lock().unwrap().pin_requests.push(params);
    (
        StatusCode::OK,
        r#"{"ecobeePin":"bv29","code":"auth-code","scope":"smartRead","expires_in":9,"interval":30}"#
            .to_string(),
    )
}

async fn serve(stub: Stub) -> String {
    let router = Router::new()
        .route("/1/thermostat", get(thermostat))
        .route("/token", post(token))
        .route("/authorize", get(authorize))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

struct Harness {
    stub: Stub,
    client: EcobeeClient,
    cache: TokenCache,
    _dir: TempDir,
}

async fn harness(cached: Option<Tokens>) -> Harness {
    let stub = Stub::default();
    let base_url = serve(stub.clone()).await;
    let dir = TempDir::new().unwrap();
    let cache_path = dir.path().join("auth.cache");
    let cache = TokenCache::new(&cache_path);
    if let Some(tokens) = cached {
        cache.store(&tokens).await.unwrap();
    }
    let client =
        EcobeeClient::new(ClientConfig::new("app-key", cache_path).with_base_url(base_url)).unwrap();
    Harness {
        stub,
        client,
        cache,
        _dir: dir,
    }
}

fn tokens(access: &str, refresh: &str, expires_in_secs: i64) -> Tokens {
    Tokens {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        expires_at: Utc::now() + Duration::seconds(expires_in_secs),
    }
}

#[tokio::test]
async fn test_fetch_sends_selection_and_bearer_token() {
    let h = harness(Some(tokens("valid-access", "r", 3600))).await;
    h.stub.reply_thermostats(200, THERMOSTATS_OK);

    let thermostats = h.client.fetch(&Selection::registered(true)).await.unwrap();

    assert_eq!(thermostats.len(), 1);
    assert_eq!(thermostats[0].identifier, "t1");
    assert_eq!(thermostats[0].runtime.actual_temperature, 705);

    let recorded = h.stub.inner.lock().unwrap();
    assert_eq!(recorded.authorizations, vec!["Bearer valid-access"]);
    let selection = &recorded.bodies[0]["selection"];
    assert_eq!(selection["selectionType"], "registered");
    assert_eq!(selection["includeSensors"], true);
    assert_eq!(selection["includeWeather"], true);
    assert!(recorded.grants.is_empty());
}

#[tokio::test]
async fn test_non_zero_status_is_api_error() {
    let h = harness(Some(tokens("valid-access", "r", 3600))).await;
    h.stub.reply_thermostats(
        500,
        r#"{"status": {"code": 14, "message": "Authentication token has expired. Refresh your tokens."}}"#,
    );

    let err = h.client.fetch(&Selection::registered(true)).await.unwrap_err();

    assert!(
        matches!(&err, ClientError::Api { code: 14, message } if message.starts_with("Authentication token has expired")),
        "{err:?}"
    );
}

#[tokio::test]
async fn test_expired_token_status_refreshes_on_next_fetch() {
    let h = harness(Some(tokens("revoked-access", "r", 3600))).await;
    h.stub.reply_tokens(200, TOKENS_OK);
    h.stub.reply_thermostats(
        500,
        r#"{"status": {"code": 14, "message": "Authentication token has expired. Refresh your tokens."}}"#,
    );

    let err = h.client.fetch(&Selection::registered(true)).await.unwrap_err();
    assert!(matches!(err, ClientError::Api { code: 14, .. }));
    assert!(h.stub.inner.lock().unwrap().grants.is_empty());

    h.stub.reply_thermostats(200, THERMOSTATS_OK);
    h.client.fetch(&Selection::registered(true)).await.unwrap();

    let recorded = h.stub.inner.lock().unwrap();
    assert_eq!(recorded.grants, vec![("refresh_token".to_string(), "r".to_string())]);
    assert_eq!(
        recorded.authorizations,
        vec!["Bearer revoked-access", "Bearer new-access"]
    );
}

#[tokio::test]
async fn test_other_api_status_keeps_token() {
    let h = harness(Some(tokens("valid-access", "r", 3600))).await;
    h.stub.reply_thermostats(
        500,
        r#"{"status": {"code": 3, "message": "Processing error."}}"#,
    );
    h.client.fetch(&Selection::registered(true)).await.unwrap_err();

    h.stub.reply_thermostats(200, THERMOSTATS_OK);
    h.client.fetch(&Selection::registered(true)).await.unwrap();

    let recorded = h.stub.inner.lock().unwrap();
    assert!(recorded.grants.is_empty());
    assert_eq!(recorded.authorizations, vec!["Bearer valid-access", "Bearer valid-access"]);
}

#[tokio::test]
async fn test_non_json_error_is_unexpected_status() {
    let h = harness(Some(tokens("valid-access", "r", 3600))).await;
    h.stub.reply_thermostats(502, "Bad Gateway");

    let err = h.client.fetch(&Selection::registered(true)).await.unwrap_err();

    assert!(matches!(err, ClientError::UnexpectedStatus { status: 502, .. }));
}

#[tokio::test]
async fn test_missing_cache_is_not_authorized() {
    let h = harness(None).await;
    h.stub.reply_thermostats(200, THERMOSTATS_OK);

    let err = h.client.fetch(&Selection::registered(true)).await.unwrap_err();

    assert!(matches!(err, ClientError::NotAuthorized { .. }));
    assert!(h.stub.inner.lock().unwrap().bodies.is_empty());
}

#[tokio::test]
async fn test_expiring_token_refreshed_before_fetch() {
    let h = harness(Some(tokens("old-access", "old-refresh", 30))).await;
    h.stub.reply_tokens(200, TOKENS_OK);
    h.stub.reply_thermostats(200, THERMOSTATS_OK);

    h.client.fetch(&Selection::registered(true)).await.unwrap();

    {
        let recorded = h.stub.inner.lock().unwrap();
        assert_eq!(
            recorded.grants,
            vec![("refresh_token".to_string(), "old-refresh".to_string())]
        );
        assert_eq!(recorded.authorizations, vec!["Bearer new-access"]);
    }
    let cached = h.cache.load().await.unwrap().unwrap();
    assert_eq!(cached.access_token, "new-access");
    assert_eq!(cached.refresh_token, "new-refresh");
}

#[tokio::test]
async fn test_concurrent_fetches_refresh_once() {
    let h = harness(Some(tokens("old-access", "old-refresh", 0))).await;
    h.stub.reply_tokens(200, TOKENS_OK);
    h.stub.reply_thermostats(200, THERMOSTATS_OK);
    let selection = Selection::registered(true);

    let (a, b) = tokio::join!(h.client.fetch(&selection), h.client.fetch(&selection));

    assert!(a.is_ok());
    assert!(b.is_ok());
    let recorded = h.stub.inner.lock().unwrap();
    assert_eq!(recorded.grants.len(), 1);
    assert_eq!(recorded.authorizations.len(), 2);
}

#[tokio::test]
async fn test_rejected_refresh_is_auth_error() {
    let h = harness(Some(tokens("old-access", "revoked", 0))).await;
    h.stub.reply_tokens(
        400,
        r#"{"error": "invalid_grant", "error_description": "The refresh token has been revoked."}"#,
    );

    let err = h.client.fetch(&Selection::registered(true)).await.unwrap_err();

    assert!(matches!(err, ClientError::Auth { .. }));
}

#[tokio::test]
async fn test_pin_flow() {
    let h = harness(None).await;

    let pin = h.client.request_pin().await.unwrap();
    assert_eq!(pin.ecobee_pin, "bv29");
    assert_eq!(pin.code, "auth-code");
    {
        let recorded = h.stub.inner.lock().unwrap();
        let params = &recorded.pin_requests[0];
        assert_eq!(params["response_type"], "ecobeePin");
        assert_eq!(params["client_id"], "app-key");
        assert_eq!(params["scope"], "smartRead");
    }

    h.stub.reply_tokens(
        401,
        r#"{"error": "authorization_pending", "error_description": "Waiting for user to authorize application."}"#,
    );
    let pending = h.client.exchange_pin(&pin.code).await.unwrap_err();
    assert!(matches!(pending, ClientError::AuthorizationPending));
    assert_eq!(h.cache.load().await.unwrap(), None);

    h.stub.reply_tokens(200, TOKENS_OK);
    let tokens = h.client.exchange_pin(&pin.code).await.unwrap();
    assert_eq!(tokens.access_token, "new-access");
    assert_eq!(h.cache.load().await.unwrap(), Some(tokens));
    assert_eq!(
        h.stub.inner.lock().unwrap().grants.last().unwrap(),
        &("ecobeePin".to_string(), "auth-code".to_string())
    );
}
