//! Client-side contract tests for the broker's subscription and entity-write
//! endpoints, against a wiremock broker.

use bridge_daemon::orion::{OrionClient, OrionError};
use ngsi_types::{Subscription, VehicleCommand};
use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const ENTITY: &str = "urn:ngsi-ld:vehicle:demo:1";
const NOTIFY_URI: &str = "http://203.0.113.7:8080/car_update";

fn client(broker: &MockServer, command_token: Option<&str>) -> OrionClient {
    OrionClient::new(
        &broker.uri(),
        "sub-token".to_string(),
        command_token.map(str::to_string),
    )
    .unwrap()
}

#[tokio::test]
async fn subscription_request_matches_broker_contract() {
    let broker = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subscriptions/"))
        .and(header("aerOS", "true"))
        .and(header("Authorization", "Bearer sub-token"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "id": "urn:aeros:subscription:vehicle:controller",
            "description": "Subscription to Vehicle entity type",
            "type": "Subscription",
            "entities": [{"id": ENTITY, "type": "Vehicle"}],
            "watchedAttributes": ["location", "direction", "serviceStatus"],
            "notification": {
                "attributes": [
                    "location", "move", "direction", "serviceStatus",
                    "signalQuality", "speed", "heading"
                ],
                "endpoint": {"uri": NOTIFY_URI, "accept": "application/json"}
            },
            "throttling": 1
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&broker)
        .await;

    let subscription = Subscription::for_vehicle(ENTITY, NOTIFY_URI);
    client(&broker, None).subscribe(&subscription).await.unwrap();
}

#[tokio::test]
async fn non_201_subscription_reply_is_fatal() {
    let broker = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/subscriptions/"))
        .respond_with(ResponseTemplate::new(409).set_body_string("already exists"))
        .mount(&broker)
        .await;

    let subscription = Subscription::for_vehicle(ENTITY, NOTIFY_URI);
    let err = client(&broker, None)
        .subscribe(&subscription)
        .await
        .unwrap_err();

    match err {
        OrionError::SubscriptionRejected { status, body } => {
            assert_eq!(status.as_u16(), 409);
            assert_eq!(body, "already exists");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn entity_write_succeeds_on_204() {
    let broker = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("/ngsi-ld/v1/entities/{}/", ENTITY)))
        .and(header("Authorization", "Bearer cmd-token"))
        .and(body_json(json!({"heading": "36.0 degrees", "move": true})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&broker)
        .await;

    let status = client(&broker, Some("cmd-token"))
        .write_attrs(ENTITY, &VehicleCommand::advance())
        .await
        .unwrap();
    assert_eq!(status.as_u16(), 204);
}

#[tokio::test]
async fn entity_write_passes_back_non_204_statuses() {
    let broker = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("/ngsi-ld/v1/entities/{}/", ENTITY)))
        .respond_with(ResponseTemplate::new(422).set_body_string("unprocessable"))
        .expect(1)
        .mount(&broker)
        .await;

    let status = client(&broker, Some("cmd-token"))
        .write_attrs(ENTITY, &VehicleCommand::advance())
        .await
        .unwrap();
    assert_eq!(status.as_u16(), 422);
}

#[tokio::test]
async fn entity_write_without_credential_is_an_error() {
    let broker = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&broker)
        .await;

    let err = client(&broker, None)
        .write_attrs(ENTITY, &VehicleCommand::advance())
        .await
        .unwrap_err();
    assert!(matches!(err, OrionError::MissingCommandToken));
}
