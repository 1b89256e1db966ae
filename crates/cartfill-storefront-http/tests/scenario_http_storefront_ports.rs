//! Scenario: catalog, variant and cart ports against a mocked API.

use std::time::Duration;

use cartfill_resolve::{CartPort, CatalogPort, Session, VariantPort};
use cartfill_schemas::{CandidateProduct, PortError, Quantity, QuantityField};
use cartfill_storefront_http::{HttpStorefront, SessionStore};
use httpmock::prelude::*;
use serde_json::json;

fn storefront(server: &MockServer, extra_query: Vec<(String, String)>) -> HttpStorefront {
    HttpStorefront::new(
        &server.base_url(),
        Duration::from_secs(5),
        SessionStore::new("never-written.json"),
        extra_query,
    )
    .unwrap()
}

#[tokio::test]
async fn search_sends_term_extra_query_and_bearer() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/search")
                .query_param("searchparam", "A100B")
                .query_param("lang", "de")
                .header("authorization", "Bearer tok");
            then.status(200).json_body(json!({
                "products": [ { "id": 11, "code": "100x" }, { "id": "12", "code": "art.: 100x" } ]
            }));
        })
        .await;

    let sf = storefront(&server, vec![("lang".to_string(), "de".to_string())]);
    let got = sf.search("A100B", &Session::new("tok")).await.unwrap();

    m.assert_async().await;
    assert_eq!(
        got,
        vec![
            CandidateProduct::new("11", "100x"),
            CandidateProduct::new("12", "art.: 100x")
        ]
    );
}

#[tokio::test]
async fn empty_search_is_valid() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/search");
            then.status(200).json_body(json!({ "products": [] }));
        })
        .await;

    let got = storefront(&server, vec![])
        .search("nothing", &Session::new("t"))
        .await
        .unwrap();
    assert!(got.is_empty());
}

#[tokio::test]
async fn expand_maps_missing_quantity_field_to_sold_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/products/11/variants");
            then.status(200).json_body(json!({
                "variants": [
                    { "code": "A100A", "quantity_field": "qty-a" },
                    { "code": "A100B", "quantity_field": null }
                ]
            }));
        })
        .await;

    let vs = storefront(&server, vec![])
        .expand(&CandidateProduct::new("11", "100x"), &Session::new("t"))
        .await
        .unwrap();
    assert_eq!(vs.len(), 2);
    assert_eq!(vs[0].quantity_field().map(|f| f.as_str()), Some("qty-a"));
    assert!(vs[1].is_sold_out());
}

#[tokio::test]
async fn malformed_variants_body_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/products/11/variants");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let err = storefront(&server, vec![])
        .expand(&CandidateProduct::new("11", "100x"), &Session::new("t"))
        .await
        .unwrap_err();
    assert!(matches!(err, PortError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn commit_posts_field_and_amount() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/basket")
                .header("authorization", "Bearer tok")
                .json_body(json!({ "quantity_field": "qty-b", "amount": "2" }));
            then.status(200).json_body(json!({ "message": "added" }));
        })
        .await;

    let receipt = storefront(&server, vec![])
        .commit(
            &QuantityField::new("qty-b"),
            &Quantity::parse("2").unwrap(),
            &Session::new("tok"),
        )
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(receipt.message.as_deref(), Some("added"));
    assert_eq!(receipt.quantity.as_str(), "2");
}

#[tokio::test]
async fn rejected_commit_is_port_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/basket");
            then.status(409);
        })
        .await;

    let err = storefront(&server, vec![])
        .commit(
            &QuantityField::new("qty-b"),
            &Quantity::parse("2").unwrap(),
            &Session::new("tok"),
        )
        .await
        .unwrap_err();
    assert_eq!(err, PortError::Rejected("commit http error status=409".to_string()));
}
