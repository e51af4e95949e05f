//! End-to-end path resolution against a mock backend: the batched
//! subrequests wire shape, router misses, embedded router errors and
//! direct router translation.

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quarry_client::{Client, ClientError, RequestOptions};

fn client_for(server: &MockServer) -> Client {
    Client::builder().base_url(server.uri()).build().unwrap()
}

fn resolved_document() -> String {
    json!({
        "data": {
            "type": "node--page",
            "id": "3f1c7a44-9c33-4a7b-8d6e-000000000001",
            "attributes": { "title": "About Us", "path": { "alias": "/about" } }
        }
    })
    .to_string()
}

#[tokio::test]
async fn resolves_a_path_in_a_single_batched_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subrequests"))
        .and(query_param("_format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "router": { "body": json!({"resolved": "ok"}).to_string() },
            "resolvedResource#uri{0}": { "body": resolved_document() }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let resource = client
        .get_resource_by_path("/about", &RequestOptions::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resource["title"], "About Us");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "translation and fetch must share one round trip");

    let payload: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let batch = payload.as_array().unwrap();
    assert_eq!(batch.len(), 2);

    assert_eq!(batch[0]["requestId"], "router");
    assert_eq!(batch[0]["action"], "view");
    assert_eq!(
        batch[0]["uri"],
        "/router/translate-path?path=%2Fabout&_format=json"
    );
    assert_eq!(batch[0]["headers"]["Accept"], "application/vnd.api+json");

    assert_eq!(batch[1]["requestId"], "resolvedResource");
    assert_eq!(batch[1]["waitFor"], json!(["router"]));
    assert_eq!(batch[1]["uri"], "{{router.body@$.jsonapi.individual}}");
}

#[tokio::test]
async fn router_miss_resolves_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subrequests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "router": { "body": null }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let resource =
        client.get_resource_by_path("/no-such-page", &RequestOptions::new()).await.unwrap();
    assert!(resource.is_none());
}

#[tokio::test]
async fn router_error_message_fails_the_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subrequests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "router": {
                "body": json!({"message": "Unable to resolve path /broken."}).to_string()
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.get_resource_by_path("/broken", &RequestOptions::new()).await;
    match result {
        Err(ClientError::Request(message)) => {
            assert_eq!(message, "Unable to resolve path /broken.");
        }
        other => panic!("expected request error, got {other:?}"),
    }
}

#[tokio::test]
async fn resolved_errors_array_becomes_jsonapi_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subrequests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "router": { "body": json!({"resolved": "ok"}).to_string() },
            "resolvedResource#uri{0}": {
                "body": json!({
                    "errors": [{ "status": "404", "title": "Not Found" }]
                })
                .to_string()
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.get_resource_by_path("/gone", &RequestOptions::new()).await;
    match result {
        Err(ClientError::JsonApi(message)) => assert_eq!(message, "404 Not Found"),
        other => panic!("expected JSON:API error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_default_locale_prefixes_endpoint_and_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/de/subrequests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "router": { "body": json!({"resolved": "ok"}).to_string() },
            "resolvedResource#uri{0}": { "body": resolved_document() }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let options = RequestOptions::new().locale("de").default_locale("en");
    client.get_resource_by_path("/ueber-uns", &options).await.unwrap().unwrap();

    let requests = server.received_requests().await.unwrap();
    let payload: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        payload[0]["uri"],
        "/router/translate-path?path=%2Fde%2Fueber-uns&_format=json"
    );
}

#[tokio::test]
async fn versionable_request_selects_latest_revision() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subrequests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "router": { "body": json!({"resolved": "ok"}).to_string() },
            "resolvedResource#uri{0}": { "body": resolved_document() }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let options = RequestOptions::new().versionable(true);
    client.get_resource_by_path("/about", &options).await.unwrap().unwrap();

    let requests = server.received_requests().await.unwrap();
    let payload: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        payload[1]["uri"],
        "{{router.body@$.jsonapi.individual}}?resourceVersion=rel%3Alatest-version"
    );
}

#[tokio::test]
async fn explicit_resource_version_is_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/subrequests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "router": { "body": json!({"resolved": "ok"}).to_string() },
            "resolvedResource#uri{0}": { "body": resolved_document() }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let options = RequestOptions::new().resource_version("id:7");
    client.get_resource_by_path("/about", &options).await.unwrap().unwrap();

    let requests = server.received_requests().await.unwrap();
    let payload: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        payload[1]["uri"],
        "{{router.body@$.jsonapi.individual}}?resourceVersion=id%3A7"
    );
}

#[tokio::test]
async fn translate_path_returns_route_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/router/translate-path"))
        .and(query_param("path", "/about"))
        .and(query_param("_format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resolved": "https://cms.example.com/about",
            "isHomePath": false,
            "entity": {
                "canonical": "https://cms.example.com/about",
                "type": "node",
                "bundle": "page",
                "id": "1",
                "uuid": "3f1c7a44-9c33-4a7b-8d6e-000000000001"
            },
            "label": "About Us",
            "jsonapi": {
                "individual": "https://cms.example.com/jsonapi/node/page/3f1c7a44",
                "resourceName": "node--page"
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let translated =
        client.translate_path("/about", &RequestOptions::new()).await.unwrap().unwrap();
    assert_eq!(translated.entity.bundle, "page");
    assert_eq!(translated.jsonapi.resource_name, "node--page");
    assert!(!translated.is_home_path);
}

#[tokio::test]
async fn translate_path_miss_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/router/translate-path"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let translated = client.translate_path("/no-such-page", &RequestOptions::new()).await.unwrap();
    assert!(translated.is_none());
}

#[tokio::test]
async fn translate_path_failure_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/router/translate-path"))
        .respond_with(
            ResponseTemplate::new(403).set_body_raw(
                r#"{"errors":[{"status":"403","title":"Forbidden"}]}"#,
                "application/vnd.api+json",
            ),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.translate_path("/private", &RequestOptions::new()).await;
    match result {
        Err(ClientError::JsonApi(message)) => assert_eq!(message, "403 Forbidden"),
        other => panic!("expected JSON:API error, got {other:?}"),
    }
}
