//! Integration tests for the journal club curator using wiremock

use journalclub::{
    fetch, fetch_with_options, Config, Curator, Error, FetchError, FetchOptions, FetchRequest,
    Fetcher, HttpFetcher, Identifier,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MLA_ACCEPT: &str = "text/x-bibliography; style=modern-language-association";

/// Mount `/hop/0` … `/hop/{n-1}` redirecting onward and `/hop/{n}` answering 200
async fn mount_redirect_chain(server: &MockServer, n: usize) {
    for i in 0..n {
        Mock::given(method("GET"))
            .and(path(format!("/hop/{i}")))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/hop/{}", server.uri(), i + 1)),
            )
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/hop/{n}")))
        .respond_with(ResponseTemplate::new(200).set_body_string("landed"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_simple_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Hello, World!")
                .insert_header("content-type", "text/plain"),
        )
        .mount(&mock_server)
        .await;

    let req = FetchRequest::new(format!("{}/", mock_server.uri()));
    let resp = fetch(req).await.unwrap();

    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.redirects, 0);
    assert_eq!(resp.content, "Hello, World!");
}

#[tokio::test]
async fn test_follows_twenty_redirects() {
    let mock_server = MockServer::start().await;
    mount_redirect_chain(&mock_server, 20).await;

    let req = FetchRequest::new(format!("{}/hop/0", mock_server.uri()));
    let resp = fetch(req).await.unwrap();

    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.redirects, 20);
    assert_eq!(resp.url, format!("{}/hop/20", mock_server.uri()));
    assert_eq!(resp.content, "landed");
}

#[tokio::test]
async fn test_twenty_one_redirects_fail() {
    let mock_server = MockServer::start().await;
    mount_redirect_chain(&mock_server, 21).await;

    let req = FetchRequest::new(format!("{}/hop/0", mock_server.uri()));
    let result = fetch(req).await;

    assert!(matches!(
        result,
        Err(FetchError::TooManyRedirects { limit: 20, .. })
    ));
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/loop"))
        .mount(&mock_server)
        .await;

    let options = FetchOptions {
        max_redirects: 3,
        ..Default::default()
    };
    let req = FetchRequest::new(format!("{}/loop", mock_server.uri()));
    let result = fetch_with_options(req, options).await;

    assert!(matches!(
        result,
        Err(FetchError::TooManyRedirects { limit: 3, .. })
    ));
}

#[tokio::test]
async fn test_relative_redirect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/papers/old"))
        .respond_with(ResponseTemplate::new(307).insert_header("location", "new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/papers/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
        .mount(&mock_server)
        .await;

    let req = FetchRequest::new(format!("{}/papers/old", mock_server.uri()));
    let resp = fetch(req).await.unwrap();

    assert_eq!(resp.redirects, 1);
    assert_eq!(resp.content, "moved here");
}

#[tokio::test]
async fn test_non_success_body_is_returned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("DOI Not Found"))
        .mount(&mock_server)
        .await;

    let req = FetchRequest::new(format!("{}/missing", mock_server.uri()));
    let resp = fetch(req).await.unwrap();

    assert_eq!(resp.status_code, 404);
    assert!(!resp.is_success());
    assert_eq!(resp.content, "DOI Not Found");
}

#[tokio::test]
async fn test_request_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/10.1234/abc"))
        .and(header("accept", MLA_ACCEPT))
        .and(header("user-agent", "ClubBot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Doe, Jane. \"Abc.\" 2020."))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(FetchOptions {
        user_agent: Some("ClubBot/1.0".to_string()),
        ..Default::default()
    })
    .unwrap();
    let req = FetchRequest::new(format!("{}/10.1234/abc", mock_server.uri()))
        .header("Accept", MLA_ACCEPT);
    let resp = fetcher.fetch(&req).await.unwrap();

    assert_eq!(resp.status_code, 200);
    assert_eq!(resp.content, "Doe, Jane. \"Abc.\" 2020.");
}

#[tokio::test]
async fn test_first_byte_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let options = FetchOptions {
        first_byte_timeout_secs: 1,
        ..Default::default()
    };
    let req = FetchRequest::new(format!("{}/slow", mock_server.uri()));
    let result = fetch_with_options(req, options).await;

    assert!(matches!(result, Err(FetchError::FirstByteTimeout { .. })));
}

#[tokio::test]
async fn test_connection_refused() {
    let req = FetchRequest::new("http://127.0.0.1:9/");
    let result = fetch(req).await;
    assert!(result.is_err());
}

// End-to-end: crawl, choose and publish against a mock DOI resolver and
// a mock Crossref, the DOI resolver answering through a redirect.

const RECORD: &str = r#"<crossref_result><doi_record>
  <titles><title>Deep Things</title></titles>
  <jats:abstract><jats:p>We study deep
    things.</jats:p></jats:abstract>
</doi_record></crossref_result>"#;

struct Fixture {
    server: MockServer,
    dir: TempDir,
    config: Config,
}

impl Fixture {
    async fn new() -> Self {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let mut config = Config::for_dir(dir.path());
        config.identifier_pattern = format!(
            r"{}/10\.\d{{4,9}}/[-._;()/:A-Za-z0-9]+",
            regex::escape(&server.uri())
        );
        config.detail_url = format!("{}/works/{{doi}}", server.uri());

        std::fs::write(
            &config.paths.sources,
            format!("{}/accepted\n", server.uri()),
        )
        .unwrap();
        std::fs::write(&config.paths.stopwords, "workshop\n").unwrap();
        std::fs::write(
            &config.paths.page,
            "# Club\n<!-- next_start -->\n<!-- next_end -->\n## Past\n<!-- prev_start -->\n<!-- prev_end -->\n",
        )
        .unwrap();

        Self {
            server,
            dir,
            config,
        }
    }

    fn id(&self, doi: &str) -> Identifier {
        Identifier::new(format!("{}/{doi}", self.server.uri()))
    }

    async fn mount_sources(&self) {
        let uri = self.server.uri();
        Mock::given(method("GET"))
            .and(path("/accepted"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<ul><li><a href=\"{uri}/10.1234/deep\">Deep</a></li>\
                 <li><a href=\"{uri}/10.1234/ws\">Workshop paper</a></li>\
                 <li>{uri}/10.1234/deep</li></ul>"
            )))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/10.1234/deep"))
            .and(header("accept", MLA_ACCEPT))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{uri}/citations/deep")),
            )
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/citations/deep"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("Doe, Jane. \"Deep Things.\" 2020.\n"),
            )
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/10.1234/ws"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("Roe, Rick. \"Shallow.\" Workshop on Shallows, 2021."),
            )
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path("/works/10.1234/deep"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RECORD))
            .mount(&self.server)
            .await;
    }

    fn curator(&self) -> Curator {
        Curator::new(self.config.clone()).unwrap()
    }
}

#[tokio::test]
async fn test_crawl_is_idempotent() {
    let fixture = Fixture::new().await;
    fixture.mount_sources().await;
    let curator = fixture.curator();

    let report = curator.crawl().await.unwrap();
    assert_eq!(report.added, vec![fixture.id("10.1234/deep")]);
    assert_eq!(report.skipped_stopword, 1);
    let first = std::fs::read(&fixture.config.paths.dataset).unwrap();

    let report = curator.crawl().await.unwrap();
    assert!(!report.changed());
    let second = std::fs::read(&fixture.config.paths.dataset).unwrap();
    assert_eq!(first, second);

    let dataset = curator.store().dataset().await.unwrap();
    assert_eq!(
        dataset.citation(&fixture.id("10.1234/deep")),
        Some("Doe, Jane. \"Deep Things.\" 2020.")
    );
}

#[tokio::test]
async fn test_stopword_prunes_unreachable_entry() {
    let fixture = Fixture::new().await;
    fixture.mount_sources().await;
    let curator = fixture.curator();
    curator.crawl().await.unwrap();

    // A new stopword and a source that no longer links the paper
    std::fs::write(&fixture.config.paths.stopwords, "workshop\ndeep things\n").unwrap();
    std::fs::write(
        &fixture.config.paths.sources,
        format!("{}/empty\n", fixture.server.uri()),
    )
    .unwrap();
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_string("nothing"))
        .mount(&fixture.server)
        .await;

    let report = curator.crawl().await.unwrap();

    assert_eq!(report.pruned, vec![fixture.id("10.1234/deep")]);
    assert!(curator.store().dataset().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_source_leaves_dataset_untouched() {
    let fixture = Fixture::new().await;
    fixture.mount_sources().await;
    let curator = fixture.curator();
    curator.crawl().await.unwrap();
    let before = std::fs::read(&fixture.config.paths.dataset).unwrap();

    std::fs::write(
        &fixture.config.paths.sources,
        format!("{}/accepted\nhttp://127.0.0.1:9/\n", fixture.server.uri()),
    )
    .unwrap();
    assert!(curator.crawl().await.is_err());

    assert_eq!(std::fs::read(&fixture.config.paths.dataset).unwrap(), before);
}

#[tokio::test]
async fn test_choose_then_publish() {
    let fixture = Fixture::new().await;
    fixture.mount_sources().await;
    let curator = fixture.curator();
    curator.crawl().await.unwrap();

    let detail = curator
        .choose_next(&mut StdRng::seed_from_u64(11))
        .await
        .unwrap();
    let deep = fixture.id("10.1234/deep");
    assert_eq!(detail.id, deep);
    assert_eq!(detail.title, "Deep Things");
    assert_eq!(detail.abstract_text, "We study deep things.");

    let description = std::fs::read_to_string(&fixture.config.paths.description).unwrap();
    assert_eq!(
        description,
        "Deep Things\nDoe, Jane. \"Deep Things.\" 2020.\nWe study deep things."
    );
    assert_eq!(
        curator.message().await.unwrap().as_deref(),
        Some("Deep Things\nDoe, Jane. \"Deep Things.\" 2020.")
    );

    assert!(curator.update_page().await.unwrap());
    let page = std::fs::read_to_string(&fixture.config.paths.page).unwrap();
    assert_eq!(
        page,
        format!(
            "# Club\n<!-- next_start -->\n[Doe, Jane. \"Deep Things.\" 2020.]({deep})\n<!-- next_end -->\n## Past\n<!-- prev_start -->\n<!-- prev_end -->\n"
        )
    );

    // The only paper is now in the history
    let result = curator.choose_next(&mut StdRng::seed_from_u64(11)).await;
    assert!(matches!(result, Err(Error::NothingSelectable)));
    assert_eq!(
        std::fs::read_to_string(&fixture.config.paths.next).unwrap(),
        format!("{deep}\n")
    );
    drop(fixture.dir);
}
