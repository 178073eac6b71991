//! End-to-end pipeline tests against an in-memory database
//!
//! These tests drive the full submit/run flow with a scripted scrape
//! backend. Target URLs use an IP-literal public address so URL
//! validation never needs DNS.

use async_trait::async_trait;
use geo_lens::config::Config;
use geo_lens::model::AnalysisStatus;
use geo_lens::pipeline::{Pipeline, SubmitRequest};
use geo_lens::scrape::{ScrapeBackend, ScrapeError, ScrapeResult, ScrapedPage};
use geo_lens::storage::{Datastore, SqliteStorage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

const ORIGIN: &str = "http://93.184.216.34";

enum Scripted {
    Html(String),
    Failure,
}

/// Backend that serves canned responses keyed by URL
struct ScriptedBackend {
    pages: HashMap<String, Scripted>,
    delay: Duration,
}

impl ScriptedBackend {
    fn new() -> Self {
        Self {
            pages: HashMap::new(),
            delay: Duration::ZERO,
        }
    }

    fn with_page(mut self, path: &str, html: &str) -> Self {
        self.pages.insert(
            format!("{}{}", ORIGIN, path),
            Scripted::Html(html.to_string()),
        );
        self
    }

    fn with_failure(mut self, path: &str) -> Self {
        self.pages
            .insert(format!("{}{}", ORIGIN, path), Scripted::Failure);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ScrapeBackend for ScriptedBackend {
    async fn fetch(&self, url: &Url) -> ScrapeResult {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.pages.get(url.as_str()) {
            Some(Scripted::Html(html)) => Ok(ScrapedPage {
                url: url.clone(),
                html: html.clone(),
                title: String::new(),
            }),
            Some(Scripted::Failure) => Err(ScrapeError::Status(500)),
            None => Err(ScrapeError::Request(format!("unexpected fetch: {}", url))),
        }
    }
}

/// Homepage HTML linking to the given same-origin paths
fn homepage_html(paths: &[&str]) -> String {
    let links: String = paths
        .iter()
        .map(|p| format!(r#"<a href="{}">link</a>"#, p))
        .collect();
    format!(
        "<html><head><title>Home</title>\
         <meta name=\"description\" content=\"A test site\"></head>\
         <body><main><h1>Welcome</h1><h2>About this site</h2>\
         <p>This site is a fixture. It exists so the pipeline has something
         to crawl, and its homepage text is long enough to read naturally.</p>\
         {}</main></body></html>",
        links
    )
}

fn subpage_html(name: &str) -> String {
    format!(
        "<html><head><title>{name}</title></head>\
         <body><h1>{name}</h1><p>Content for {name}.</p></body></html>"
    )
}

fn make_pipeline(config: Config) -> (Pipeline<SqliteStorage>, Arc<Mutex<SqliteStorage>>) {
    let storage = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
    (Pipeline::new(Arc::clone(&storage), config), storage)
}

async fn submit(pipeline: &Pipeline<SqliteStorage>) -> i64 {
    pipeline
        .submit(&SubmitRequest {
            url: ORIGIN.to_string(),
            scraper_type: None,
            credential: None,
            client_key: "tests".to_string(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_successful_analysis_scores_homepage_and_sublinks() {
    let (pipeline, storage) = make_pipeline(Config::default());
    let backend = ScriptedBackend::new()
        .with_page("/", &homepage_html(&["/about", "/blog", "/pricing"]))
        .with_page("/about", &subpage_html("About"))
        .with_page("/blog", &subpage_html("Blog"))
        .with_page("/pricing", &subpage_html("Pricing"));

    let id = submit(&pipeline).await;
    let status = pipeline.run_with_backend(id, &backend).await.unwrap();
    assert_eq!(status, AnalysisStatus::Completed);

    let record = storage.lock().unwrap().get_analysis(id).unwrap();
    assert_eq!(record.status, AnalysisStatus::Completed);
    assert!(record.overall_score.is_some());

    let pages = storage.lock().unwrap().get_page_scores(id).unwrap();
    assert_eq!(pages.len(), 4);
    assert_eq!(pages[0].url, format!("{}/", ORIGIN));

    // Overall score is the rounded mean of the page scores
    let sum: u32 = pages.iter().map(|p| p.score).sum();
    let mean = (sum as f64 / pages.len() as f64).round() as u32;
    assert_eq!(record.overall_score, Some(mean));
}

#[tokio::test]
async fn test_homepage_failure_fails_analysis_without_page_rows() {
    let (pipeline, storage) = make_pipeline(Config::default());
    let backend = ScriptedBackend::new().with_failure("/");

    let id = submit(&pipeline).await;
    let status = pipeline.run_with_backend(id, &backend).await.unwrap();
    assert_eq!(status, AnalysisStatus::Failed);

    let record = storage.lock().unwrap().get_analysis(id).unwrap();
    assert_eq!(record.status, AnalysisStatus::Failed);
    assert_eq!(
        record.error_message.as_deref(),
        Some("Failed to scrape homepage")
    );
    assert!(record.overall_score.is_none());

    let pages = storage.lock().unwrap().get_page_scores(id).unwrap();
    assert!(pages.is_empty());
}

#[tokio::test]
async fn test_failed_sublinks_are_dropped_not_fatal() {
    let (pipeline, storage) = make_pipeline(Config::default());
    let backend = ScriptedBackend::new()
        .with_page(
            "/",
            &homepage_html(&["/a", "/b", "/c", "/d", "/broken"]),
        )
        .with_page("/a", &subpage_html("A"))
        .with_page("/b", &subpage_html("B"))
        .with_page("/c", &subpage_html("C"))
        .with_page("/d", &subpage_html("D"))
        .with_failure("/broken");

    let id = submit(&pipeline).await;
    let status = pipeline.run_with_backend(id, &backend).await.unwrap();
    assert_eq!(status, AnalysisStatus::Completed);

    // Homepage plus the four sublinks that survived
    let pages = storage.lock().unwrap().get_page_scores(id).unwrap();
    assert_eq!(pages.len(), 5);
    assert!(pages.iter().all(|p| !p.url.ends_with("/broken")));
}

#[tokio::test]
async fn test_empty_homepage_fails_analysis() {
    let (pipeline, storage) = make_pipeline(Config::default());
    let backend = ScriptedBackend::new().with_page("/", "   ");

    let id = submit(&pipeline).await;
    let status = pipeline.run_with_backend(id, &backend).await.unwrap();
    assert_eq!(status, AnalysisStatus::Failed);

    let record = storage.lock().unwrap().get_analysis(id).unwrap();
    assert_eq!(
        record.error_message.as_deref(),
        Some("Failed to scrape homepage")
    );

    let pages = storage.lock().unwrap().get_page_scores(id).unwrap();
    assert!(pages.is_empty());
}

#[tokio::test]
async fn test_homepage_without_links_completes_alone() {
    let (pipeline, storage) = make_pipeline(Config::default());
    let backend = ScriptedBackend::new().with_page("/", &homepage_html(&[]));

    let id = submit(&pipeline).await;
    let status = pipeline.run_with_backend(id, &backend).await.unwrap();
    assert_eq!(status, AnalysisStatus::Completed);

    let pages = storage.lock().unwrap().get_page_scores(id).unwrap();
    assert_eq!(pages.len(), 1);

    let record = storage.lock().unwrap().get_analysis(id).unwrap();
    assert_eq!(record.overall_score, Some(pages[0].score));
}

#[tokio::test]
async fn test_deadline_marks_analysis_failed() {
    let mut config = Config::default();
    config.analysis.deadline_seconds = 1;
    let (pipeline, storage) = make_pipeline(config);

    let backend = ScriptedBackend::new()
        .with_page("/", &homepage_html(&[]))
        .with_delay(Duration::from_secs(5));

    let id = submit(&pipeline).await;
    let status = pipeline.run_with_backend(id, &backend).await.unwrap();
    assert_eq!(status, AnalysisStatus::Failed);

    let record = storage.lock().unwrap().get_analysis(id).unwrap();
    assert_eq!(record.error_message.as_deref(), Some("Analysis timed out"));
}

#[tokio::test]
async fn test_offsite_links_are_never_fetched() {
    let (pipeline, storage) = make_pipeline(Config::default());
    // The homepage links to one on-origin page and one off-origin page;
    // only the on-origin pages may be fetched and scored.
    let html = homepage_html(&["/local", "https://elsewhere.example/x"]);
    let backend = ScriptedBackend::new()
        .with_page("/", &html)
        .with_page("/local", &subpage_html("Local"));

    let id = submit(&pipeline).await;
    pipeline.run_with_backend(id, &backend).await.unwrap();

    let pages = storage.lock().unwrap().get_page_scores(id).unwrap();
    let urls: Vec<String> = pages.iter().map(|p| p.url.clone()).collect();
    assert_eq!(urls, vec![format!("{}/", ORIGIN), format!("{}/local", ORIGIN)]);
}
