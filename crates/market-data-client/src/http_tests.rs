use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use pulse_core::{NewsProvider, PriceProvider, ProviderKind, PulseError};

use crate::{AlphaVantageClient, NewsApiClient, USER_AGENT};

const DAILY: &str = r#"{
    "Time Series (Daily)": {
        "2024-05-09": {"1. open": "166.0", "4. close": "167.50"},
        "2024-05-10": {"1. open": "167.5", "4. close": "168.00"}
    }
}"#;

const ARTICLES: &str = r#"{
    "status": "ok",
    "totalResults": 3,
    "articles": [
        {"title": "One", "description": "first", "url": "https://n.example/1"},
        {"title": "Two", "description": null, "url": "https://n.example/2"},
        {"title": "Three", "description": "third", "url": "https://n.example/3"}
    ]
}"#;

/// Query strings and headers the stub has received, in arrival order
#[derive(Clone, Default)]
struct Received(Arc<Mutex<Vec<(HashMap<String, String>, HeaderMap)>>>);

impl Received {
    fn last(&self) -> (HashMap<String, String>, HeaderMap) {
        self.0
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("stub received no request")
    }
}

/// A GET route that records each request and answers with `status` and `body`
/// after `delay`.
fn stub(path: &str, received: Received, status: StatusCode, body: &'static str, delay: Duration) -> Router {
    let handler = move |State(received): State<Received>,
                        Query(query): Query<HashMap<String, String>>,
                        headers: HeaderMap| async move {
        received.0.lock().unwrap().push((query, headers));
        tokio::time::sleep(delay).await;
        (status, body)
    };

    Router::new().route(path, get(handler)).with_state(received)
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_alpha_vantage_sends_daily_series_query() {
    let received = Received::default();
    let base = serve(stub("/query", received.clone(), StatusCode::OK, DAILY, Duration::ZERO)).await;

    let client = AlphaVantageClient::new("demo-key".to_string(), Duration::from_secs(5)).with_base_url(base);
    let points = client.daily_closes("IBM").await.unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[0].close, 168.0);
    assert_eq!(points[1].close, 167.5);

    let (query, headers) = received.last();
    assert_eq!(query["function"], "TIME_SERIES_DAILY");
    assert_eq!(query["symbol"], "IBM");
    assert_eq!(query["apikey"], "demo-key");
    assert_eq!(headers["user-agent"], USER_AGENT);
}

#[tokio::test]
async fn test_alpha_vantage_http_error_status() {
    let received = Received::default();
    let base = serve(stub(
        "/query",
        received,
        StatusCode::SERVICE_UNAVAILABLE,
        "maintenance",
        Duration::ZERO,
    ))
    .await;

    let client = AlphaVantageClient::new("demo-key".to_string(), Duration::from_secs(5)).with_base_url(base);
    let err = client.daily_closes("IBM").await.unwrap_err();

    match err {
        PulseError::PriceProvider(msg) => {
            assert!(msg.contains("503"), "{}", msg);
            assert!(msg.contains("maintenance"), "{}", msg);
        }
        other => panic!("expected PriceProvider, got {:?}", other),
    }
}

#[tokio::test]
async fn test_alpha_vantage_slow_response_is_timeout() {
    let received = Received::default();
    let base = serve(stub("/query", received, StatusCode::OK, DAILY, Duration::from_secs(3))).await;

    let client = AlphaVantageClient::new("demo-key".to_string(), Duration::from_millis(200)).with_base_url(base);
    let err = client.daily_closes("IBM").await.unwrap_err();

    assert!(matches!(
        err,
        PulseError::ProviderTimeout {
            provider: ProviderKind::Price,
            ..
        }
    ));
}

#[tokio::test]
async fn test_news_api_sends_search_query() {
    let received = Received::default();
    let base = serve(stub("/v2/everything", received.clone(), StatusCode::OK, ARTICLES, Duration::ZERO)).await;

    let client = NewsApiClient::new("news-key".to_string(), Duration::from_secs(5)).with_base_url(base);
    let articles = client.latest_news("TSLA", 2).await.unwrap();

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].title, "One");
    assert_eq!(articles[1].description, None);

    let (query, headers) = received.last();
    assert_eq!(query["q"], "TSLA");
    assert_eq!(query["language"], "en");
    assert_eq!(query["sortBy"], "publishedAt");
    assert_eq!(query["pageSize"], "2");
    assert_eq!(query["apiKey"], "news-key");
    assert_eq!(headers["user-agent"], USER_AGENT);
}

#[tokio::test]
async fn test_news_api_error_payload() {
    let received = Received::default();
    let base = serve(stub(
        "/v2/everything",
        received,
        StatusCode::BAD_REQUEST,
        r#"{"status":"error","code":"userAgentMissing","message":"Please set your User-Agent header."}"#,
        Duration::ZERO,
    ))
    .await;

    let client = NewsApiClient::new("news-key".to_string(), Duration::from_secs(5)).with_base_url(base);
    let err = client.latest_news("TSLA", 5).await.unwrap_err();

    match err {
        PulseError::NewsProvider(msg) => assert!(msg.contains("400"), "{}", msg),
        other => panic!("expected NewsProvider, got {:?}", other),
    }
}

#[tokio::test]
async fn test_news_api_slow_response_is_timeout() {
    let received = Received::default();
    let base = serve(stub("/v2/everything", received, StatusCode::OK, ARTICLES, Duration::from_secs(3))).await;

    let client = NewsApiClient::new("news-key".to_string(), Duration::from_millis(200)).with_base_url(base);
    let err = client.latest_news("TSLA", 5).await.unwrap_err();

    assert!(matches!(
        err,
        PulseError::ProviderTimeout {
            provider: ProviderKind::News,
            ..
        }
    ));
}
