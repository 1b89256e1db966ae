//! Scenario: candidate scan breadth differs between paths.
//!
//! Two same-family candidates are listed on both paths. The primary path
//! expands only the first; the fallback path expands both, in listed order.

use cartfill_resolve::Credentials;
use cartfill_runtime::{DriverConfig, FulfillmentDriver};
use cartfill_schemas::{CandidateId, CandidateProduct, LineOutcome, ResolutionOutcome, Variant};
use cartfill_testkit::{line, ScriptedSession, ScriptedStorefront};

#[tokio::test]
async fn primary_expands_first_fallback_expands_all() {
    let sf = ScriptedStorefront::new()
        .with_search(
            "A100B",
            vec![
                CandidateProduct::new("p1", "100x"),
                CandidateProduct::new("p2", "100x-b"),
            ],
        )
        .with_variants("p1", vec![Variant::available("A100Z", "z")])
        .with_variants("p2", vec![Variant::available("A100B", "never")])
        .with_search(
            "HLP1",
            vec![
                CandidateProduct::new("h1", "100x"),
                CandidateProduct::new("h2", "100x"),
            ],
        )
        .with_variants("h1", vec![Variant::available("A100Y", "y")])
        .with_variants("h2", vec![Variant::available("A100B", "qty-h2")]);

    let session = ScriptedSession::accepting();
    let driver = FulfillmentDriver::new(&session, &sf, &sf, &sf, DriverConfig::default());
    let report = driver
        .run(&[line("A100B", "1", "HLP1")], &Credentials::new("a", "b"))
        .await;

    assert_eq!(
        sf.expansions(),
        vec![
            CandidateId::new("p1"),
            CandidateId::new("h1"),
            CandidateId::new("h2"),
        ]
    );
    match &report.records[0].outcome {
        LineOutcome::Resolved(ResolutionOutcome::Fulfilled { candidate, .. }) => {
            assert_eq!(candidate.as_str(), "h2")
        }
        other => panic!("expected fulfilled, got {other:?}"),
    }
}

#[tokio::test]
async fn fallback_family_without_variant_is_no_variant_match() {
    let sf = ScriptedStorefront::new()
        .with_search(
            "HLP1",
            vec![
                CandidateProduct::new("h1", "100x"),
                CandidateProduct::new("h2", "100x"),
            ],
        )
        .with_variants("h1", vec![Variant::available("A100Y", "y")]);

    let session = ScriptedSession::accepting();
    let driver = FulfillmentDriver::new(&session, &sf, &sf, &sf, DriverConfig::default());
    let report = driver
        .run(&[line("A100B", "1", "HLP1")], &Credentials::new("a", "b"))
        .await;

    assert_eq!(
        report.records[0].outcome,
        LineOutcome::Resolved(ResolutionOutcome::NoVariantMatch)
    );
    assert_eq!(sf.expansions().len(), 2);
}
