use std::time::Duration;

use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use contact_scraper::web_crawler::{
    is_critical_error, FetchOptions, FetcherConfig, HttpFetcher, PageFetcher,
};

fn options(timeout_ms: u64) -> FetchOptions {
    FetchOptions {
        timeout: Duration::from_millis(timeout_ms),
        settle: Duration::ZERO,
    }
}

fn quick_config(max_attempts: u32) -> FetcherConfig {
    FetcherConfig {
        max_attempts,
        backoff_ms: 1,
        timeout_cap_ms: 30_000,
    }
}

#[tokio::test]
async fn fetch_returns_markup_and_visible_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header_exists("user-agent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h1>Acme</h1><p>Contact info@acme.com</p></body></html>")
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::with_config(true, quick_config(1)).unwrap();
    let page = fetcher.fetch(&server.uri(), &options(5_000)).await.unwrap();

    assert!(page.html.contains("<h1>Acme</h1>"));
    assert_eq!(page.text, "Acme Contact info@acme.com");
}

#[tokio::test]
async fn non_success_statuses_become_http_error_messages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::with_config(true, quick_config(1)).unwrap();
    let error = fetcher
        .fetch(&server.uri(), &options(5_000))
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "HTTP error: 403 Forbidden");
    assert!(!is_critical_error(&error.to_string()));
}

#[tokio::test]
async fn a_failed_attempt_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<body>second try team@acme.com</body>"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::with_config(true, quick_config(2)).unwrap();
    let page = fetcher.fetch(&server.uri(), &options(5_000)).await.unwrap();

    assert!(page.text.contains("second try"));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn retries_stop_at_max_attempts_and_keep_the_last_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::with_config(true, quick_config(2)).unwrap();
    let error = fetcher
        .fetch(&server.uri(), &options(5_000))
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "HTTP error: 500 Internal Server Error");
}

#[tokio::test]
async fn redirects_are_followed_only_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/end"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/end"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<body>Arrived team@final.com</body>"))
        .mount(&server)
        .await;

    let url = format!("{}/start", server.uri());

    let following = HttpFetcher::with_config(true, quick_config(1)).unwrap();
    let page = following.fetch(&url, &options(5_000)).await.unwrap();
    assert!(page.text.contains("Arrived"));

    let pinned = HttpFetcher::with_config(false, quick_config(1)).unwrap();
    let error = pinned.fetch(&url, &options(5_000)).await.unwrap_err();
    assert_eq!(error.to_string(), "HTTP error: 302 Found");
}

#[tokio::test]
async fn slow_responses_hit_the_navigation_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<body>late</body>")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::with_config(true, quick_config(1)).unwrap();
    let result = fetcher.fetch(&server.uri(), &options(50)).await;

    assert!(result.is_err());
}
