use secrecy::SecretString;
use std::time::Duration;
use waza_client::http_client::ReqwestNutrientClient;
use waza_client::retry::RetryPolicy;
use waza_client::{ClientError, CompositeQuery, FoodItem, NutrientLookup};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn query() -> CompositeQuery {
    let items = [
        FoodItem {
            quantity: 2.0,
            unit: "medium".into(),
            food_item_identifier: "banana".into(),
        },
        FoodItem {
            quantity: 1.0,
            unit: "cup".into(),
            food_item_identifier: "rice".into(),
        },
    ];
    CompositeQuery::from_items(items.iter()).expect("non-empty")
}

fn client(server: &MockServer) -> ReqwestNutrientClient {
    ReqwestNutrientClient::new(&server.uri(), "app-id", SecretString::new("app-key".into()))
        .with_retry(RetryPolicy {
            max_retries: 0,
            base_delay: Duration::from_millis(1),
        })
}

#[tokio::test]
async fn fetch_nutrients_posts_composite_query_with_credentials() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "foods": [
            {"nf_calories": 200.0, "nf_protein": 2.0, "nf_total_carbohydrate": 30.0, "nf_total_fat": 1.0},
            {"nf_calories": 210.0, "nf_protein": 4.0, "nf_total_carbohydrate": 45.0, "nf_total_fat": 0.5}
        ]
    });

    Mock::given(method("POST"))
        .and(path("/v2/natural/nutrients"))
        .and(header("x-app-id", "app-id"))
        .and(header("x-app-key", "app-key"))
        .and(body_json(
            serde_json::json!({"query": "2 medium banana;1 cup rice"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let facts = client(&server)
        .fetch_nutrients(&query())
        .await
        .expect("facts");
    assert_eq!(facts.len(), 2);
    assert_eq!(facts[0].calories, 200.0);
    assert_eq!(facts[1].carbs_g, 45.0);
}

#[tokio::test]
async fn fetch_nutrients_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/natural/nutrients"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_nutrients(&query())
        .await
        .expect_err("status error");
    assert!(matches!(err, ClientError::Upstream { status: 401, .. }));
}

#[tokio::test]
async fn fetch_nutrients_unparseable_response_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/natural/nutrients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"fods": []})))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_nutrients(&query())
        .await
        .expect_err("decode error");
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn fetch_nutrients_retries_transient_5xx_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/natural/nutrients"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    let body = serde_json::json!({
        "foods": [
            {"nf_calories": 100.0, "nf_protein": 1.0, "nf_total_carbohydrate": 10.0, "nf_total_fat": 0.0}
        ]
    });
    Mock::given(method("POST"))
        .and(path("/v2/natural/nutrients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let retrying = ReqwestNutrientClient::new(
        &server.uri(),
        "app-id",
        SecretString::new("app-key".into()),
    )
    .with_retry(RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
    });

    let facts = retrying.fetch_nutrients(&query()).await.expect("retried");
    assert_eq!(facts.len(), 1);
}

#[tokio::test]
async fn fetch_nutrients_does_not_retry_4xx() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/natural/nutrients"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad query"))
        .mount(&server)
        .await;

    let retrying = ReqwestNutrientClient::new(
        &server.uri(),
        "app-id",
        SecretString::new("app-key".into()),
    )
    .with_retry(RetryPolicy {
        max_retries: 3,
        base_delay: Duration::from_millis(1),
    });

    let err = retrying
        .fetch_nutrients(&query())
        .await
        .expect_err("no retry");
    assert!(matches!(err, ClientError::InvalidInput(_)));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
