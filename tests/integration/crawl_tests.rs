//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! fetch, discover, parse and export cycle end-to-end.

use pokedex_harvest::config::Config;
use pokedex_harvest::crawler::{build_http_client, run_crawl, Coordinator, HttpFetcher};
use pokedex_harvest::output::{analyze_csv, read_records, write_records};
use pokedex_harvest::{CrawlError, FetchError, HarvestError};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEED_PATH: &str = "/conteudo/pokemon/lista01.htm";

/// Seed page with three content links and two navigational links
const SEED_HTML: &str = r#"<html><head><title>Lista 1</title></head><body>
    <a href="/index.htm">Início</a>
    <a href="lista03.htm">Lista 3</a>
    <a href="/conteudo/pokemon/lista02.htm">Lista 2</a>
    <a href="/conteudo/ataques/lista01.htm">Ataques</a>
    <a href="lista04.htm#topo">Lista 4</a>
    <a href="lista03.htm">Lista 3 (de novo)</a>
</body></html>"#;

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

fn entity_table(id: &str, name: &str, types: &str) -> String {
    format!(
        r#"<table id="p{id}">
             <tr><td rowspan="3"><img src="/imagens/{id}.gif"></td><td>Nº:</td><td>{id}</td></tr>
             <tr><td>Nome:</td><td>{name}</td></tr>
             <tr><td>Tipo:</td><td>{types}</td></tr>
             <tr><td>Espécie:</td><td>Pokémon {name}</td></tr>
           </table>"#
    )
}

async fn mount_page(server: &MockServer, page_path: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(response)
        .mount(server)
        .await;
}

fn test_fetcher(timeout: Duration) -> HttpFetcher {
    let client = build_http_client("TestBot/1.0", timeout).expect("Failed to build client");
    HttpFetcher::new(client, "windows-1252")
}

fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.crawler.seed_url = format!("{}{}", server.uri(), SEED_PATH);
    config.crawler.timeout_secs = 2;
    config
}

#[tokio::test]
async fn test_full_crawl_and_export() {
    let server = MockServer::start().await;

    mount_page(&server, SEED_PATH, html(SEED_HTML)).await;
    mount_page(
        &server,
        "/conteudo/pokemon/lista02.htm",
        html(&format!(
            "{}{}",
            entity_table("001", "Bulbasaur", "Planta/Veneno"),
            entity_table("002", "Ivysaur", "Planta/Veneno")
        )),
    )
    .await;
    mount_page(
        &server,
        "/conteudo/pokemon/lista03.htm",
        html(&entity_table("004", "Charmander", "Fogo")),
    )
    .await;
    mount_page(
        &server,
        "/conteudo/pokemon/lista04.htm",
        html(&entity_table("007", "Squirtle", "Água")),
    )
    .await;

    let report = run_crawl(&test_config(&server))
        .await
        .expect("Crawl failed");

    let names: Vec<&str> = report.records.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Bulbasaur", "Ivysaur", "Charmander", "Squirtle"]);
    assert_eq!(report.tally.pages_attempted, 3);
    assert_eq!(report.tally.pages_fetched, 3);
    assert_eq!(report.tally.pages_skipped, 0);
    assert_eq!(report.tally.records_produced, 4);

    let bulbasaur = &report.records[0];
    assert_eq!(bulbasaur.identifier(), "001");
    assert_eq!(bulbasaur.categories(), ["Planta", "Veneno"]);
    assert_eq!(
        bulbasaur.image_url(),
        Some(format!("{}/imagens/001.gif", server.uri()).as_str())
    );
    assert_eq!(bulbasaur.attribute("Espécie"), Some("Pokémon Bulbasaur"));

    // Export, read back and check the file
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("output").join("pokemons.csv");

    assert_eq!(write_records(&report.records, &csv_path), 4);

    let read_back = read_records(&csv_path).expect("Failed to read export");
    assert_eq!(read_back, report.records);

    let consistency = analyze_csv(&csv_path).expect("Failed to analyze export");
    assert_eq!(consistency.rows, 4);
    assert!(consistency.is_consistent());
}

#[tokio::test]
async fn test_failed_pages_are_skipped() {
    let server = MockServer::start().await;

    mount_page(&server, SEED_PATH, html(SEED_HTML)).await;
    mount_page(
        &server,
        "/conteudo/pokemon/lista02.htm",
        html(&entity_table("001", "Bulbasaur", "Planta")),
    )
    .await;
    mount_page(
        &server,
        "/conteudo/pokemon/lista03.htm",
        ResponseTemplate::new(500),
    )
    .await;
    mount_page(
        &server,
        "/conteudo/pokemon/lista04.htm",
        html(&entity_table("007", "Squirtle", "Água")),
    )
    .await;

    let report = run_crawl(&test_config(&server))
        .await
        .expect("Crawl failed");

    let names: Vec<&str> = report.records.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Bulbasaur", "Squirtle"]);
    assert_eq!(report.tally.pages_skipped, 1);
    assert_eq!(
        report.tally.failures[0].url,
        format!("{}/conteudo/pokemon/lista03.htm", server.uri())
    );
}

#[tokio::test]
async fn test_all_content_pages_failing() {
    let server = MockServer::start().await;

    // Only the seed is mounted: every content page answers 404.
    mount_page(&server, SEED_PATH, html(SEED_HTML)).await;

    let report = run_crawl(&test_config(&server))
        .await
        .expect("Crawl should survive page failures");

    assert!(report.records.is_empty());
    assert_eq!(report.tally.pages_attempted, 3);
    assert_eq!(report.tally.pages_fetched, 0);
    assert_eq!(report.tally.pages_skipped, 3);
}

#[tokio::test]
async fn test_seed_timeout_aborts_run() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        SEED_PATH,
        html(SEED_HTML).set_delay(Duration::from_secs(3)),
    )
    .await;

    let coordinator = Coordinator::from_config(
        test_fetcher(Duration::from_millis(300)),
        &test_config(&server),
    );
    let result = coordinator
        .run(&format!("{}{}", server.uri(), SEED_PATH))
        .await;

    match result {
        Err(CrawlError::SeedFetch(FetchError::Timeout { url })) => {
            assert!(url.ends_with(SEED_PATH));
        }
        other => panic!("Expected seed timeout, got {:?}", other.map(|r| r.records)),
    }
}

#[tokio::test]
async fn test_seed_not_found_aborts_run() {
    let server = MockServer::start().await;

    let result = run_crawl(&test_config(&server)).await;

    assert!(matches!(
        result,
        Err(HarvestError::Crawl(CrawlError::SeedFetch(FetchError::Status {
            status: 404,
            ..
        })))
    ));
}

#[tokio::test]
async fn test_latin1_pages_use_fallback_charset() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        SEED_PATH,
        html(r#"<a href="lista02.htm">Lista 2</a>"#),
    )
    .await;

    // "Nº" and "Elétrico" encoded as Latin-1, no charset declared
    let mut body = Vec::new();
    body.extend_from_slice(b"<table id=\"p025\"><tr><td>N\xBA</td><td>025</td></tr>");
    body.extend_from_slice(b"<tr><td>Nome:</td><td>Pikachu</td></tr>");
    body.extend_from_slice(b"<tr><td>Tipo:</td><td>El\xE9trico</td></tr></table>");

    mount_page(
        &server,
        "/conteudo/pokemon/lista02.htm",
        ResponseTemplate::new(200).set_body_raw(body, "text/html"),
    )
    .await;

    let report = run_crawl(&test_config(&server))
        .await
        .expect("Crawl failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].identifier(), "025");
    assert_eq!(report.records[0].categories(), ["Elétrico"]);
}

#[tokio::test]
async fn test_include_seed_parses_seed_tables() {
    let server = MockServer::start().await;

    let seed = format!(
        r#"<a href="lista02.htm">Lista 2</a>{}"#,
        entity_table("150", "Mewtwo", "Psíquico")
    );
    mount_page(&server, SEED_PATH, html(&seed)).await;
    mount_page(
        &server,
        "/conteudo/pokemon/lista02.htm",
        html(&entity_table("151", "Mew", "Psíquico")),
    )
    .await;

    let mut config = test_config(&server);
    config.crawler.include_seed = true;

    let report = run_crawl(&config).await.expect("Crawl failed");

    let names: Vec<&str> = report.records.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Mewtwo", "Mew"]);
    assert_eq!(report.tally.pages_attempted, 2);

    let seed_requests = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == SEED_PATH)
        .count();
    assert_eq!(seed_requests, 1);
}
