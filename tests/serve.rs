//! End-to-end page serving tests.

use std::fs;
use std::sync::Arc;

use template_server::data::{DataMap, JsonFileSource};
use template_server::http::TemplateServer;
use template_server::routing::Broker;

mod common;

fn data(pairs: &[(&str, &str)]) -> DataMap {
    let mut map = DataMap::new();
    for (key, value) in pairs {
        map.insert((*key).to_owned(), (*value).into());
    }
    map
}

#[tokio::test]
async fn test_page_round_trip_with_broker_data() {
    let root = tempfile::tempdir().unwrap();
    common::write_file(
        root.path(),
        "hello.html",
        "<h1>{{ title }}</h1><p>fixed copy</p>",
    );

    let broker = Broker::new();
    broker.handle_data("/hello.html", data(&[("title", "Hello World")]));
    let pages = TemplateServer::new(root.path(), Some(Arc::new(broker))).unwrap();
    let (addr, shutdown) = common::spawn_server(pages).await;

    let response = reqwest::get(common::url(addr, "/hello.html")).await.unwrap();
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("<h1>Hello World</h1>"));
    assert!(body.contains("fixed copy"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_page_is_not_found() {
    let root = tempfile::tempdir().unwrap();
    let pages = TemplateServer::new(root.path(), None).unwrap();
    let (addr, shutdown) = common::spawn_server(pages).await;

    let response = reqwest::get(common::url(addr, "/absent.html")).await.unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.unwrap(), "404 not found\n");

    shutdown.trigger();
}

#[tokio::test]
async fn test_render_failure_is_internal_error() {
    let root = tempfile::tempdir().unwrap();
    common::write_file(root.path(), "page.html", "{{ title }}");

    // No side data yet, so the field reference must fail.
    let source = Arc::new(JsonFileSource::new(root.path()));
    let pages = TemplateServer::new(root.path(), Some(source)).unwrap();
    let (addr, shutdown) = common::spawn_server(pages).await;

    let response = reqwest::get(common::url(addr, "/page.html")).await.unwrap();
    assert_eq!(response.status(), 500);
    let body = response.text().await.unwrap();
    assert!(body.starts_with("500 internal error\n\t"));

    // The render failure must not evict the compiled page. Deleting the
    // source file proves the retry renders the cached compilation once
    // data exists, rather than recompiling from disk.
    common::write_file(root.path(), "page.html.data", r#"{"title": "Recovered"}"#);
    fs::remove_file(root.path().join("page.html")).unwrap();

    let retry = reqwest::get(common::url(addr, "/page.html")).await.unwrap();
    assert_eq!(retry.status(), 200);
    assert_eq!(retry.text().await.unwrap(), "Recovered");

    shutdown.trigger();
}

#[tokio::test]
async fn test_root_serves_index_template() {
    let root = tempfile::tempdir().unwrap();
    common::write_file(root.path(), "index.html", "<p>front page</p>");

    let pages = TemplateServer::new(root.path(), None).unwrap();
    let (addr, shutdown) = common::spawn_server(pages).await;

    let response = reqwest::get(common::url(addr, "/")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "<p>front page</p>");

    shutdown.trigger();
}

#[tokio::test]
async fn test_directory_data_with_file_override() {
    let root = tempfile::tempdir().unwrap();
    common::write_file(root.path(), "docs/special.html", "<h2>{{ title }}</h2>");
    common::write_file(root.path(), "docs/other.html", "<h2>{{ title }}</h2>");

    let broker = Broker::new();
    broker.handle_data("/docs/", data(&[("title", "Docs")]));
    broker.handle_data("/docs/special.html", data(&[("title", "Special")]));

    let pages = TemplateServer::new(root.path(), Some(Arc::new(broker))).unwrap();
    let (addr, shutdown) = common::spawn_server(pages).await;

    let special = reqwest::get(common::url(addr, "/docs/special.html"))
        .await
        .unwrap();
    assert_eq!(special.text().await.unwrap(), "<h2>Special</h2>");

    let other = reqwest::get(common::url(addr, "/docs/other.html"))
        .await
        .unwrap();
    assert_eq!(other.text().await.unwrap(), "<h2>Docs</h2>");

    shutdown.trigger();
}

#[tokio::test]
async fn test_pages_share_includes() {
    let include_root = tempfile::tempdir().unwrap();
    common::write_file(include_root.path(), "nav.html", "<nav>menu</nav>");

    let root = tempfile::tempdir().unwrap();
    common::write_file(
        root.path(),
        "page.html",
        "{% include \"nav.html\" %}<main>body</main>",
    );

    let pages = TemplateServer::with_includes(root.path(), include_root.path(), None).unwrap();
    let (addr, shutdown) = common::spawn_server(pages).await;

    let response = reqwest::get(common::url(addr, "/page.html")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.text().await.unwrap(),
        "<nav>menu</nav><main>body</main>"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_json_side_files_feed_pages() {
    let root = tempfile::tempdir().unwrap();
    common::write_file(root.path(), "about.html", "<p>{{ blurb }}</p>");
    common::write_file(
        root.path(),
        "about.html.data",
        r#"{"blurb": "from a side file"}"#,
    );

    let source = Arc::new(JsonFileSource::new(root.path()));
    let pages = TemplateServer::new(root.path(), Some(source)).unwrap();
    let (addr, shutdown) = common::spawn_server(pages).await;

    let response = reqwest::get(common::url(addr, "/about.html")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "<p>from a side file</p>");

    shutdown.trigger();
}

#[tokio::test]
async fn test_percent_encoded_paths_reach_their_template() {
    let root = tempfile::tempdir().unwrap();
    common::write_file(root.path(), "press kit.html", "<p>assets</p>");

    let pages = TemplateServer::new(root.path(), None).unwrap();
    let (addr, shutdown) = common::spawn_server(pages).await;

    let response = reqwest::get(common::url(addr, "/press%20kit.html"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "<p>assets</p>");

    shutdown.trigger();
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let root = tempfile::tempdir().unwrap();
    common::write_file(root.path(), "index.html", "ok");

    let pages = TemplateServer::new(root.path(), None).unwrap();
    let (addr, shutdown) = common::spawn_server(pages).await;

    let response = reqwest::get(common::url(addr, "/")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));

    // A well-formed inbound ID is echoed back unchanged.
    let id = "6f9a2830-31b4-4f2e-9f4c-9d62c42a1fd7";
    let client = reqwest::Client::new();
    let echoed = client
        .get(common::url(addr, "/"))
        .header("x-request-id", id)
        .send()
        .await
        .unwrap();
    assert_eq!(echoed.headers()["x-request-id"], id);

    shutdown.trigger();
}
