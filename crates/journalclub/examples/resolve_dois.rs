//! Example: Resolve a few DOIs to MLA citations and Crossref titles
//!
//! Run with: cargo run -p journalclub --example resolve_dois
//!
//! Talks to the live doi.org and Crossref services.

use journalclub::detail::DEFAULT_DETAIL_URL;
use journalclub::{
    Dataset, DetailEnricher, FetchOptions, HttpFetcher, Identifier, IdentifierExtractor,
    MetadataRecord, MetadataResolver,
};

/// Test case definition
struct TestCase {
    text: &'static str,
    description: &'static str,
    expect_contains: &'static str,
}

const TEST_CASES: &[TestCase] = &[
    TestCase {
        text: "See https://doi.org/10.1038/nature14539.",
        description: "DOI at the end of a sentence",
        expect_contains: "Deep learning",
    },
    TestCase {
        text: r#"<a href="https://dx.doi.org/10.1145/3065386">paper</a>"#,
        description: "Legacy dx.doi.org link in markup",
        expect_contains: "ImageNet",
    },
];

#[tokio::main]
async fn main() {
    println!("Journal Club DOI Examples");
    println!("=========================\n");

    let fetcher = match HttpFetcher::new(FetchOptions::default()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let extractor = IdentifierExtractor::default();
    let resolver = MetadataResolver::new(&fetcher);
    let enricher = DetailEnricher::new(&fetcher, DEFAULT_DETAIL_URL);

    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in TEST_CASES.iter().enumerate() {
        println!("{}. {}", i + 1, case.description);

        let ids: Vec<Identifier> = extractor.extract(case.text).into_iter().collect();
        let Some(id) = ids.first() else {
            println!("   FAIL: no identifier found in {:?}\n", case.text);
            failed += 1;
            continue;
        };
        println!("   Identifier: {}", id);

        let mut dataset = Dataset::new();
        match resolver.resolve(&dataset, id).await {
            Ok(Some(citation)) => {
                println!("   Citation: {}", citation);
                dataset.insert(id.clone(), MetadataRecord::new(citation));
            }
            Ok(None) => {
                println!("   FAIL: no citation\n");
                failed += 1;
                continue;
            }
            Err(e) => {
                println!("   FAIL: {}\n", e);
                failed += 1;
                continue;
            }
        }

        match enricher.enrich(&dataset, id).await {
            Ok(detail) if detail.title.contains(case.expect_contains) => {
                println!("   Title: {}", detail.title);
                println!("   PASS\n");
                passed += 1;
            }
            Ok(detail) => {
                println!(
                    "   FAIL: title {:?} does not contain {:?}\n",
                    detail.title, case.expect_contains
                );
                failed += 1;
            }
            Err(e) => {
                println!("   FAIL: {}\n", e);
                failed += 1;
            }
        }
    }

    println!("Results: {} passed, {} failed", passed, failed);
    if failed > 0 {
        std::process::exit(1);
    }
}
