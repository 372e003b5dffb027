//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the HTTP
//! fetcher and the full crawl cycle end-to-end.

use gewinn_crawler::config::{parse_config, CrawlerConfig, UserAgentConfig};
use gewinn_crawler::crawler::{run_crawl, Fetcher, HttpFetcher};
use gewinn_crawler::storage::{PostingStore, RunStatus, SqliteStorage};
use gewinn_crawler::FetchError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_fetcher() -> HttpFetcher {
    let crawler = CrawlerConfig {
        request_delay_ms: 0,
        ..CrawlerConfig::default()
    };
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
    };
    HttpFetcher::new(&crawler, &user_agent).expect("client builds")
}

fn redirect_to(location: &str) -> ResponseTemplate {
    ResponseTemplate::new(302).insert_header("Location", location)
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_resolve_redirect_target_follows_chain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("HEAD"))
        .and(path("/go/42"))
        .respond_with(redirect_to("/hop"))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/hop"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/ziel"))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/ziel"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let target = test_fetcher()
        .resolve_redirect_target(&format!("{}/go/42", base_url))
        .await
        .unwrap();
    assert_eq!(target, format!("{}/ziel", base_url));
}

#[tokio::test]
async fn test_resolve_redirect_target_ignores_final_status() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("HEAD"))
        .and(path("/go/1"))
        .respond_with(redirect_to("/kein-head"))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/kein-head"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&mock_server)
        .await;

    let target = test_fetcher()
        .resolve_redirect_target(&format!("{}/go/1", base_url))
        .await
        .unwrap();
    assert_eq!(target, format!("{}/kein-head", base_url));
}

#[tokio::test]
async fn test_redirect_loop_is_transport_error() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("HEAD"))
        .and(path("/schleife"))
        .respond_with(redirect_to("/schleife"))
        .mount(&mock_server)
        .await;

    let result = test_fetcher()
        .resolve_redirect_target(&format!("{}/schleife", base_url))
        .await;
    assert!(matches!(result, Err(FetchError::Transport { .. })));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    // Nothing listens on the discard port
    let result = test_fetcher().fetch("http://127.0.0.1:9/").await;
    assert!(matches!(result, Err(FetchError::Transport { .. })));
}

#[tokio::test]
async fn test_fetch_reports_http_status() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/weg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = test_fetcher().fetch(&format!("{}/weg", base_url)).await;
    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_fetch_decodes_mislabelled_latin1() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let mut body = b"<html><body><a href=\"/2\">N".to_vec();
    body.push(0xE4);
    body.extend_from_slice(b"chste Seite</a></body></html>");

    Mock::given(method("GET"))
        .and(path("/liste"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let page = test_fetcher()
        .fetch(&format!("{}/liste", base_url))
        .await
        .unwrap();
    assert!(page.body.contains("Nächste Seite"));
    assert_eq!(page.final_url, format!("{}/liste", base_url));
}

/// Builds a configuration crawling the mock server
fn site_config(base_url: &str, db_path: &str) -> String {
    format!(
        r#"
[crawler]
workers = 2
request-delay-ms = 50
connect-timeout-secs = 5
request-timeout-secs = 10

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0"
contact-url = "https://example.com/contact"

[output]
database-path = "{db_path}"

[[site]]
name = "mock"
host = "127.0.0.1"
entry-points = ["{base_url}/gewinnspiele/"]
listing-pattern = "^/gewinnspiele"

[[site.detail-links]]
selector = "a.post"

[[site.next-page]]
selector = "a.next"

[[site.dates]]
kind = "keyword"

[[site.dates]]
kind = "document"

[[site.action-links]]
text = ["zum gewinnspiel", "jetzt mitmachen"]
"#
    )
}

async fn mount_mock_site(mock_server: &MockServer) {
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/gewinnspiele/"))
        .respond_with(html_page(
            r#"<article><a class="post" href="/gewinnspiel/auto">Ein Auto</a></article>
               <a class="next" href="/gewinnspiele/seite/2">Weiter</a>"#,
        ))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gewinnspiele/seite/2"))
        .respond_with(html_page(
            r#"<article><a class="post" href="/gewinnspiel/reise/">Eine Reise</a></article>"#,
        ))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gewinnspiel/auto"))
        .respond_with(html_page(
            r#"<p>Veröffentlicht am 1.1.2024</p>
               <p><strong>Einsendeschluss:</strong> 31.12.2099</p>
               <a href="/go/auto">Zum Gewinnspiel</a>"#,
        ))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gewinnspiel/reise/"))
        .respond_with(html_page(
            r##"<dl><dt>Einsendeschluß</dt><dd>1.3.21</dd></dl>
                <a href="#" data-url="/go/reise">Jetzt mitmachen</a>"##,
        ))
        .mount(mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/go/auto"))
        .respond_with(redirect_to("/partner/auto"))
        .mount(mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/go/reise"))
        .respond_with(redirect_to(&format!("{}/partner/reise/", base_url)))
        .mount(mock_server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_into_sqlite() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_mock_site(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gewinne.db");
    let config = parse_config(&site_config(&base_url, db_path.to_str().unwrap())).unwrap();

    let summary = run_crawl(&config, "test-hash", &[]).await.unwrap();
    assert_eq!(summary.created, 2);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed_listings, 0);

    let storage = SqliteStorage::new(&db_path).unwrap();

    let auto = storage
        .find_by_external_url(&format!("{}/partner/auto", base_url))
        .unwrap()
        .expect("auto posting stored");
    assert_eq!(auto.status, "Aktiv");
    assert_eq!(auto.description, "");
    assert_eq!(
        auto.expires_at.map(|dt| dt.to_string()),
        Some("2099-12-31 00:00:00".to_string())
    );

    let reise = storage
        .find_by_external_url(&format!("{}/partner/reise", base_url))
        .unwrap()
        .expect("reise posting stored under its canonical URL");
    assert_eq!(reise.status, "Ende");

    let run = storage.latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");
    assert_eq!(run.summary, summary);
}

#[tokio::test]
async fn test_repeated_crawl_is_idempotent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_mock_site(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gewinne.db");
    let config = parse_config(&site_config(&base_url, db_path.to_str().unwrap())).unwrap();

    let first = run_crawl(&config, "h", &[]).await.unwrap();
    let second = run_crawl(&config, "h", &[]).await.unwrap();

    assert_eq!(first.created, 2);
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 0);
    assert_eq!(second.skipped, 2);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_postings().unwrap(), 2);
}

#[tokio::test]
async fn test_crawl_with_unreachable_listing_still_completes() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gewinne.db");
    let config = parse_config(&site_config(&base_url, db_path.to_str().unwrap())).unwrap();

    let summary = run_crawl(&config, "h", &[]).await.unwrap();
    assert_eq!(summary.created, 0);
    assert_eq!(summary.failed_listings, 1);
}
