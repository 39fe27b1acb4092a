//! Integration tests for the crawler
//!
//! These tests use wiremock to serve synthetic category listings and
//! articles, and check the files written to a temporary output directory.

use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use url::Url;
use wikicat::config::Config;
use wikicat::crawler::{Coordinator, FetchResult, Fetcher};
use wikicat::storage::FsStorage;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCESS_DENIED: &str = "<html><body>Error: ERR_ACCESS_DENIED</body></html>";

/// Creates a test configuration writing into `output_dir` without pauses
fn create_test_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.output.output_dir = output_dir.to_string_lossy().into_owned();
    config.crawler.url_sleep = 0;
    config.crawler.retry_pause_ms = 10;
    config.crawler.request_timeout = 5;
    config
}

/// Builds a category listing from subcategory and page names
fn listing(subcategories: &[&str], pages: &[&str]) -> String {
    let mut lines = vec!["<html><body>".to_string()];

    if !subcategories.is_empty() {
        lines.push("<h2>Subcategories</h2>".to_string());
        for name in subcategories {
            lines.push(format!(
                r#"<a href="/wiki/Category:{}">{}</a>"#,
                name, name
            ));
        }
    }

    lines.push("<h2>Pages in category</h2>".to_string());
    for name in pages {
        lines.push(format!(r#"<li><a href="/wiki/{}">{}</a></li>"#, name, name));
    }
    lines.push("<h2>Media in category</h2>".to_string());
    lines.push("</body></html>".to_string());

    lines.join("\n")
}

async fn mount_page(server: &MockServer, page_path: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

async fn run(config: Config, root: &str) -> Coordinator {
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    coordinator.run(root).await.expect("Crawl failed");
    coordinator
}

fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name))
        .unwrap_or_else(|e| panic!("Missing output file {}: {}", name, e))
}

#[tokio::test]
async fn test_end_to_end_listing() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/wiki/Category:Root",
        listing(&["Baz"], &["Qux"]),
        1,
    )
    .await;
    mount_page(&server, "/wiki/Category:Baz", listing(&[], &[]), 1).await;
    mount_page(&server, "/wiki/Qux", "<p>Qux article</p>".to_string(), 1).await;

    let root = format!("{}/wiki/Category:Root", server.uri());
    let coordinator = run(create_test_config(out.path()), &root).await;

    assert!(read(out.path(), "Category:Root.html").contains("Subcategories"));
    assert!(read(out.path(), "Category:Baz.html").contains("Pages in category"));
    assert_eq!(read(out.path(), "Qux.html"), "<p>Qux article</p>\n");

    let stats = &coordinator.context().stats;
    assert_eq!(stats.categories_processed, 2);
    assert_eq!(stats.pages_downloaded, 1);
    assert_eq!(stats.fetch_failures, 0);
}

#[tokio::test]
async fn test_cyclic_categories_fetched_once() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    // Root -> A -> {Root, B}, B -> A; both Root and A list Qux
    mount_page(&server, "/wiki/Category:Root", listing(&["A"], &["Qux"]), 1).await;
    mount_page(
        &server,
        "/wiki/Category:A",
        listing(&["Root", "B"], &["Qux", "Quux"]),
        1,
    )
    .await;
    mount_page(&server, "/wiki/Category:B", listing(&["A"], &[]), 1).await;
    mount_page(&server, "/wiki/Qux", "qux".to_string(), 1).await;
    mount_page(&server, "/wiki/Quux", "quux".to_string(), 1).await;

    let root = format!("{}/wiki/Category:Root", server.uri());
    let coordinator = run(create_test_config(out.path()), &root).await;

    let context = coordinator.context();
    assert_eq!(context.stats.categories_processed, 3);
    assert_eq!(context.stats.pages_downloaded, 2);
    assert_eq!(context.visited.len(), 5);
    assert!(context.stats.duplicates_skipped >= 3);
}

#[tokio::test]
async fn test_existing_files_are_not_refetched() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    // Root listing is already on disk; only its new child must be fetched
    std::fs::write(
        out.path().join("Category:Root.html"),
        listing(&[], &["Qux"]),
    )
    .unwrap();

    mount_page(&server, "/wiki/Category:Root", listing(&[], &["Qux"]), 0).await;
    mount_page(&server, "/wiki/Qux", "qux".to_string(), 1).await;

    let root = format!("{}/wiki/Category:Root", server.uri());

    let first = run(create_test_config(out.path()), &root).await;
    assert_eq!(first.context().stats.cache_hits, 1);
    assert_eq!(read(out.path(), "Qux.html"), "qux\n");

    // Second run: everything is served from disk
    let second = run(create_test_config(out.path()), &root).await;
    assert_eq!(second.context().stats.cache_hits, 2);
    assert_eq!(second.context().stats.requests_made, 0);
}

#[tokio::test]
async fn test_pagination_continuation_followed() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    // Registered first so it wins over the plain path match below
    Mock::given(method("GET"))
        .and(path("/wiki/Category:Root"))
        .and(query_param("from", "M"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&[], &["Mango"])))
        .expect(1)
        .mount(&server)
        .await;

    let first_page = [
        "<html><body>",
        r#"<a href="/wiki/Category:Root?from=A">next 200</a> (top of page)"#,
        "<h2>Pages in category</h2>",
        "<table>",
        r#"<li><a href="/wiki/Apple">Apple</a></li>"#,
        r#"</table>(<a href="/wiki/Category:Root?from=M" title="Category:Root">next 200</a>)"#,
        "<h2>Media in category</h2>",
        "</body></html>",
    ]
    .join("\n");
    mount_page(&server, "/wiki/Category:Root", first_page, 1).await;
    mount_page(&server, "/wiki/Apple", "apple".to_string(), 1).await;
    mount_page(&server, "/wiki/Mango", "mango".to_string(), 1).await;

    let root = format!("{}/wiki/Category:Root", server.uri());
    let coordinator = run(create_test_config(out.path()), &root).await;

    assert!(out.path().join("Category:Root.html").is_file());
    assert!(out.path().join("Category:Root?from=M.html").is_file());
    assert_eq!(read(out.path(), "Apple.html"), "apple\n");
    assert_eq!(read(out.path(), "Mango.html"), "mango\n");
    assert_eq!(coordinator.context().stats.categories_processed, 2);
}

#[tokio::test]
async fn test_mirrored_subdirectories() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/wiki/Category:Root", listing(&["Baz"], &["Qux"]), 1).await;
    mount_page(&server, "/wiki/Category:Baz", listing(&["Deep"], &["Inner"]), 1).await;
    mount_page(&server, "/wiki/Category:Deep", listing(&[], &[]), 1).await;
    mount_page(&server, "/wiki/Qux", "qux".to_string(), 1).await;
    mount_page(&server, "/wiki/Inner", "inner".to_string(), 1).await;

    let mut config = create_test_config(out.path());
    config.output.make_subdirs = true;

    let root = format!("{}/wiki/Category:Root", server.uri());
    run(config, &root).await;

    let baz = out.path().join("Category:Baz");
    assert!(out.path().join("Category:Root.html").is_file());
    assert!(out.path().join("Qux.html").is_file());
    assert!(baz.join("Category:Baz.html").is_file());
    assert!(baz.join("Inner.html").is_file());
    assert!(baz
        .join("Category:Deep")
        .join("Category:Deep.html")
        .is_file());
}

#[tokio::test]
async fn test_skip_flags() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/wiki/Category:Root", listing(&["Baz"], &["Qux"]), 1).await;
    mount_page(&server, "/wiki/Category:Baz", listing(&[], &[]), 0).await;
    mount_page(&server, "/wiki/Qux", "qux".to_string(), 0).await;

    let mut config = create_test_config(out.path());
    config.crawler.skip_subcats = true;
    config.crawler.skip_pages = true;

    let root = format!("{}/wiki/Category:Root", server.uri());
    let coordinator = run(config, &root).await;

    assert!(out.path().join("Category:Root.html").is_file());
    assert_eq!(coordinator.context().stats.total_documents(), 1);
}

#[tokio::test]
async fn test_max_depth_bounds_descent() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/wiki/Category:Root", listing(&["Baz"], &[]), 1).await;
    mount_page(&server, "/wiki/Category:Baz", listing(&["Deep"], &[]), 1).await;
    mount_page(&server, "/wiki/Category:Deep", listing(&[], &[]), 0).await;

    let mut config = create_test_config(out.path());
    config.crawler.max_depth = Some(1);

    let root = format!("{}/wiki/Category:Root", server.uri());
    let coordinator = run(config, &root).await;

    assert_eq!(coordinator.context().stats.categories_processed, 2);
    assert_eq!(coordinator.context().stats.depth_skipped, 1);
    assert!(!out.path().join("Category:Deep.html").exists());
}

#[tokio::test]
async fn test_retry_after_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Qux"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ACCESS_DENIED))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "/wiki/Qux", "<p>clean</p>".to_string(), 1).await;

    let out = TempDir::new().unwrap();
    let mut config = create_test_config(out.path());
    config.crawler.max_retries = 3;
    config.crawler.retry_pause_ms = 100;

    let fetcher = Fetcher::from_config(&config).unwrap();
    let storage = FsStorage::new(out.path()).unwrap();
    let url = Url::parse(&format!("{}/wiki/Qux", server.uri())).unwrap();

    let started = Instant::now();
    let result = fetcher.fetch(&url, &storage, Path::new("Qux.html")).await;

    assert!(started.elapsed() >= Duration::from_millis(200));
    match result {
        FetchResult::Fetched { body, attempts, .. } => {
            assert_eq!(body, "<p>clean</p>");
            assert_eq!(attempts, 3);
        }
        other => panic!("Expected a clean fetch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_clean_retry_body_is_persisted() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/wiki/Category:Root"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ACCESS_DENIED))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_page(&server, "/wiki/Category:Root", listing(&[], &["Qux"]), 1).await;
    mount_page(&server, "/wiki/Qux", "qux".to_string(), 1).await;

    let root = format!("{}/wiki/Category:Root", server.uri());
    let coordinator = run(create_test_config(out.path()), &root).await;

    let saved = read(out.path(), "Category:Root.html");
    assert!(!saved.contains("ERR_ACCESS_DENIED"));
    assert!(saved.contains("Qux"));
    assert_eq!(coordinator.context().stats.requests_made, 4);
}

#[tokio::test]
async fn test_exhausted_retries_return_last_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Qux"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ACCESS_DENIED))
        .expect(3)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let mut config = create_test_config(out.path());
    config.crawler.max_retries = 2;

    let fetcher = Fetcher::from_config(&config).unwrap();
    let storage = FsStorage::new(out.path()).unwrap();
    let url = Url::parse(&format!("{}/wiki/Qux", server.uri())).unwrap();

    let result = fetcher.fetch(&url, &storage, Path::new("Qux.html")).await;

    assert!(result.ok());
    assert_eq!(result.attempts(), 3);
    assert!(matches!(result, FetchResult::RateLimited { .. }));
    assert!(result.body().contains("ERR_ACCESS_DENIED"));
}

#[tokio::test]
async fn test_http_429_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/Qux"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/wiki/Qux", "qux".to_string(), 1).await;

    let out = TempDir::new().unwrap();
    let config = create_test_config(out.path());
    let fetcher = Fetcher::from_config(&config).unwrap();
    let url = Url::parse(&format!("{}/wiki/Qux", server.uri())).unwrap();

    let result = fetcher.fetch_live(&url).await;
    assert_eq!(result.body(), "qux");
    assert_eq!(result.attempts(), 2);
}

#[tokio::test]
async fn test_failed_subcategory_prunes_only_its_subtree() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/wiki/Category:Root",
        listing(&["Gone", "Baz"], &["Qux"]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/wiki/Category:Gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/wiki/Category:Baz", listing(&[], &[]), 1).await;
    mount_page(&server, "/wiki/Qux", "qux".to_string(), 1).await;

    let root = format!("{}/wiki/Category:Root", server.uri());
    let coordinator = run(create_test_config(out.path()), &root).await;

    assert!(!out.path().join("Category:Gone.html").exists());
    assert!(out.path().join("Category:Baz.html").is_file());
    assert!(out.path().join("Qux.html").is_file());
    assert_eq!(coordinator.context().stats.fetch_failures, 1);
}

#[tokio::test]
async fn test_unreachable_root_is_not_fatal() {
    let out = TempDir::new().unwrap();

    // Nothing listens on the discard port
    let coordinator = run(
        create_test_config(out.path()),
        "http://127.0.0.1:9/wiki/Category:Root",
    )
    .await;

    assert_eq!(coordinator.context().stats.fetch_failures, 1);
    assert_eq!(coordinator.context().stats.categories_processed, 0);
    assert!(!out.path().join("Category:Root.html").exists());
}

#[tokio::test]
async fn test_persistent_429_is_not_stored() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/wiki/Category:Root"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "/wiki/Category:Root", listing(&[], &["Qux"]), 1).await;
    mount_page(&server, "/wiki/Qux", "qux".to_string(), 1).await;

    let mut config = create_test_config(out.path());
    config.crawler.max_retries = 1;
    let root = format!("{}/wiki/Category:Root", server.uri());

    let first = run(config.clone(), &root).await;
    assert_eq!(first.context().stats.fetch_failures, 1);
    assert_eq!(first.context().stats.rate_limit_exhausted, 0);
    assert!(!out.path().join("Category:Root.html").exists());

    // Nothing was cached, so the next run asks again and gets the listing
    let second = run(config, &root).await;
    assert_eq!(second.context().stats.cache_hits, 0);
    assert!(read(out.path(), "Category:Root.html").contains("Qux"));
    assert_eq!(read(out.path(), "Qux.html"), "qux\n");
}

#[tokio::test]
async fn test_categories_sharing_last_segment_both_fetched() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(
        &server,
        "/wiki/Category:Root",
        listing(&["AC/DC", "Foo/DC"], &[]),
        1,
    )
    .await;
    mount_page(&server, "/wiki/Category:AC/DC", listing(&[], &["A1"]), 1).await;
    mount_page(&server, "/wiki/Category:Foo/DC", listing(&[], &["B1"]), 1).await;
    mount_page(&server, "/wiki/A1", "a1".to_string(), 1).await;
    mount_page(&server, "/wiki/B1", "b1".to_string(), 1).await;

    let root = format!("{}/wiki/Category:Root", server.uri());
    let coordinator = run(create_test_config(out.path()), &root).await;

    assert!(read(out.path(), "Category:AC_DC.html").contains("A1"));
    assert!(read(out.path(), "Category:Foo_DC.html").contains("B1"));
    assert_eq!(read(out.path(), "B1.html"), "b1\n");
    assert_eq!(coordinator.context().stats.cache_hits, 0);
}

#[tokio::test]
async fn test_discovered_url_is_requested_verbatim() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_page(&server, "/wiki/Category:Root", listing(&[], &["Foo/"]), 1).await;
    mount_page(&server, "/wiki/Foo/", "foo slash".to_string(), 1).await;
    mount_page(&server, "/wiki/Foo", "foo".to_string(), 0).await;

    let root = format!("{}/wiki/Category:Root", server.uri());
    run(create_test_config(out.path()), &root).await;

    assert_eq!(read(out.path(), "Foo_.html"), "foo slash\n");
}
