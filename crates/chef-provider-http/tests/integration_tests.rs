//! Integration tests for the Chef client using wiremock.
//!
//! These tests run the client against a mock Chef server, covering CRUD
//! operations, request signing, error mapping and timeout handling.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chef_provider::entity::{EntityKind, Locator, Node};
use chef_provider::prelude::*;
use chef_provider_http::{ChefClient, ChefConfig};

const KEY: &str = include_str!("fixtures/client.pem");

// =============================================================================
// Test Helpers
// =============================================================================

async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

fn create_config(base_url: &str) -> ChefConfig {
    ChefConfig::new(base_url, "admin").with_key_material(KEY)
}

fn create_client(server: &MockServer) -> ChefClient {
    ChefClient::new(create_config(&server.uri())).unwrap()
}

async fn get_node(client: &ChefClient, name: &str) -> ProviderResult<Node> {
    client.get(&Locator::new(EntityKind::Node, name)).await
}

fn node_body(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "chef_environment": "_default",
        "json_class": "Chef::Node",
        "chef_type": "node",
        "automatic": {},
        "normal": {},
        "default": {},
        "override": {},
        "run_list": ["recipe[foo]"]
    })
}

// =============================================================================
// Read Tests
// =============================================================================

#[tokio::test]
async fn test_get_node() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/nodes/web1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(node_body("web1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let node: Node = client
        .get(&Locator::new(EntityKind::Node, "web1"))
        .await
        .unwrap();

    assert_eq!(node.name, "web1");
    assert_eq!(node.run_list, vec!["recipe[foo]"]);
}

#[tokio::test]
async fn test_requests_are_signed() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/roles/web"))
        .and(header("X-Ops-Sign", "algorithm=sha256;version=1.3"))
        .and(header("X-Ops-Userid", "admin"))
        .and(header("X-Ops-Server-API-Version", "1"))
        .and(header(
            "X-Ops-Content-Hash",
            "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=",
        ))
        .and(header("Accept", "application/json"))
        .and(header_exists("X-Ops-Timestamp"))
        .and(header_exists("X-Ops-Authorization-1"))
        .and(header_exists("X-Chef-Version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "web"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let role: chef_provider::entity::Role = client
        .get(&Locator::new(EntityKind::Role, "web"))
        .await
        .unwrap();

    assert_eq!(role.name, "web");
}

#[tokio::test]
async fn test_organization_scoped_url() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/organizations/acme/nodes/web1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(node_body("web1")))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_config(&format!("{}/organizations/acme/", server.uri()));
    let client = ChefClient::new(config).unwrap();

    let node: Node = client
        .get(&Locator::new(EntityKind::Node, "web1"))
        .await
        .unwrap();
    assert_eq!(node.name, "web1");
}

#[tokio::test]
async fn test_get_not_found() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/nodes/ghost"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": ["Cannot load node ghost"]})),
        )
        .mount(&server)
        .await;

    let client = create_client(&server);
    let err = get_node(&client, "ghost").await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_server_error() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/nodes/web1"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": ["internal failure"]})),
        )
        .mount(&server)
        .await;

    let client = create_client(&server);
    let err = get_node(&client, "web1").await.unwrap_err();

    match err {
        ProviderError::Remote { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal failure");
        }
        other => panic!("Expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_data_bag_item_unwraps_envelope() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/data/users/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "alice",
            "shell": "/bin/zsh",
            "chef_type": "data_bag_item",
            "data_bag": "users"
        })))
        .mount(&server)
        .await;

    let client = create_client(&server);
    let item: chef_provider::entity::DataBagItem = client
        .get(&Locator::within(EntityKind::DataBagItem, "users", "alice"))
        .await
        .unwrap();

    assert_eq!(item.data_bag, "users");
    assert_eq!(item.id, "alice");
    assert_eq!(item.content.len(), 1);
}

// =============================================================================
// Controller Tests
// =============================================================================

#[tokio::test]
async fn test_node_create_then_read() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/nodes"))
        .and(body_json(json!({
            "name": "web1",
            "chef_environment": "_default",
            "json_class": "Chef::Node",
            "chef_type": "node",
            "automatic": {},
            "normal": {},
            "default": {},
            "override": {},
            "run_list": ["foo"]
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"uri": format!("{}/nodes/web1", server.uri())})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/nodes/web1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(node_body("web1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let nodes = Controller::new(NodeResource::new());
    let mut record = DeclaredRecord::new()
        .with("name", "web1")
        .with("environment_name", "_default")
        .with("run_list", FieldValue::list(["foo"]));

    nodes.create(&client, &mut record).await.unwrap();

    assert_eq!(record.id(), Some("web1"));
    assert_eq!(
        record.list("run_list"),
        Some(&["recipe[foo]".to_string()][..])
    );
    assert_eq!(record.json("normal_attributes_json"), Some("{}"));
}

#[tokio::test]
async fn test_node_read_after_out_of_band_delete() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/nodes/web1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": ["not found"]})))
        .mount(&server)
        .await;

    let client = create_client(&server);
    let nodes = Controller::new(NodeResource::new());
    let mut record = DeclaredRecord::with_id("web1").with("name", "web1");

    nodes.read(&client, &mut record).await.unwrap();

    assert_eq!(record.id(), None);
}

#[tokio::test]
async fn test_node_delete_tolerates_missing_client() {
    let server = setup_mock_server().await;

    Mock::given(method("DELETE"))
        .and(path("/nodes/web1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(node_body("web1")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/clients/web1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": ["not found"]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let nodes = Controller::new(NodeResource::new());
    let mut record = DeclaredRecord::with_id("web1").with("name", "web1");

    nodes.delete(&client, &mut record).await.unwrap();

    assert_eq!(record.id(), None);
}

#[tokio::test]
async fn test_data_bag_item_update_puts_full_document() {
    let server = setup_mock_server().await;

    Mock::given(method("PUT"))
        .and(path("/data/users/alice"))
        .and(body_json(json!({"id": "alice", "shell": "/bin/bash"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "alice",
            "shell": "/bin/bash",
            "chef_type": "data_bag_item",
            "data_bag": "users"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/users/alice"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "alice", "shell": "/bin/bash"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = create_client(&server);
    let items = Controller::new(DataBagItemResource::new());
    let mut record = DeclaredRecord::with_id("alice")
        .with("data_bag_name", "users")
        .with("content_json", FieldValue::json(r#"{"id":"alice","shell":"/bin/bash"}"#));

    items.update(&client, &mut record).await.unwrap();

    assert_eq!(record.id(), Some("alice"));
    assert_eq!(
        record.json("content_json"),
        Some(r#"{"id":"alice","shell":"/bin/bash"}"#)
    );
}

// =============================================================================
// Timeout Tests
// =============================================================================

#[tokio::test]
async fn test_request_timeout() {
    let server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/nodes/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(node_body("slow"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = create_config(&server.uri()).with_request_timeout(1);
    let client = ChefClient::new(config).unwrap();

    let err = get_node(&client, "slow").await.unwrap_err();

    assert!(matches!(err, ProviderError::RequestTimeout { timeout_secs: 1 }));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let config = create_config("http://127.0.0.1:1");
    let client = ChefClient::new(config).unwrap();

    let err = get_node(&client, "web1").await.unwrap_err();

    assert!(matches!(err, ProviderError::Transport { .. }));
}
