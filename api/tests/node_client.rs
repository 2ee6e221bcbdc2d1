//! Exercises `NodeClient` against in-process fake nodes.

use std::sync::Arc;
use std::sync::Mutex;

use api::bundle;
use api::bundle::Transfer;
use api::config::NetworkConfiguration;
use api::config::NodeConfiguration;
use api::network::Network;
use api::node_client::NodeClient;
use api::node_client::NodeError;
use api::pow::LoadBalancerSettings;
use api::tangle::TangleSubmit;
use api::transaction::TRANSACTION_TRYTES;
use api::trytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde_json::json;
use serde_json::Value;

#[derive(Clone, Copy)]
enum Behaviour {
    Healthy,
    ServerError,
    RejectCommands,
}

#[derive(Clone)]
struct FakeNode {
    behaviour: Behaviour,
    known_trytes: Vec<String>,
    received: Arc<Mutex<Vec<Value>>>,
}

async fn handle(
    State(node): State<FakeNode>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    node.received.lock().unwrap().push(body.clone());

    if headers.get("X-IOTA-API-Version").and_then(|v| v.to_str().ok()) != Some("1") {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid API Version" })));
    }
    match node.behaviour {
        Behaviour::ServerError => {
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "exception": "database locked" })))
        }
        Behaviour::RejectCommands => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid addresses input" })))
        }
        Behaviour::Healthy => {}
    }

    let reply = match body["command"].as_str().unwrap_or_default() {
        "findTransactions" => json!({ "hashes": ["A".repeat(81), "B".repeat(81)] }),
        "getTrytes" => {
            let trytes: Vec<String> = body["hashes"]
                .as_array()
                .unwrap()
                .iter()
                .enumerate()
                .map(|(i, _)| {
                    node.known_trytes
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| "9".repeat(TRANSACTION_TRYTES))
                })
                .collect();
            json!({ "trytes": trytes })
        }
        "getBalances" => json!({ "balances": ["2779530283277761"], "milestoneIndex": 1 }),
        "getTransactionsToApprove" => {
            json!({ "trunkTransaction": "T".repeat(81), "branchTransaction": "B".repeat(81) })
        }
        "attachToTangle" => json!({ "trytes": body["trytes"] }),
        "storeTransactions" | "broadcastTransactions" => json!({}),
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("unknown command {other}") })),
            )
        }
    };
    (StatusCode::OK, Json(reply))
}

async fn spawn_node(behaviour: Behaviour, known_trytes: Vec<String>) -> (String, Arc<Mutex<Vec<Value>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let node = FakeNode {
        behaviour,
        known_trytes,
        received: received.clone(),
    };
    let app = Router::new().route("/", post(handle)).with_state(node);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), received)
}

/// An address nothing listens on.
async fn dead_node() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn client(providers: &[String]) -> NodeClient {
    let config = NetworkConfiguration {
        network: Network::Devnet,
        nodes: providers
            .iter()
            .map(|p| NodeConfiguration::new(p.clone(), 3, 9))
            .collect(),
        timeout_secs: 5,
    };
    NodeClient::new(Arc::new(LoadBalancerSettings::new(&config))).unwrap()
}

fn sample_trytes() -> Vec<String> {
    let transfer = Transfer {
        address: "A".repeat(81),
        value: 0,
        tag: "EXPLORER".to_string(),
        message: trytes::text_to_trytes("hello tangle"),
    };
    bundle::prepare_transfers(&[transfer], 1_545_000_000).unwrap()
}

#[tokio::test]
async fn sends_version_header_and_reads_hashes() {
    let (url, received) = spawn_node(Behaviour::Healthy, vec![]).await;
    let client = client(&[url]);

    let hashes = client
        .find_transactions("addresses", &["A".repeat(81)])
        .await
        .unwrap();
    assert_eq!(hashes.len(), 2);

    let requests = received.lock().unwrap();
    assert_eq!(requests[0]["command"], "findTransactions");
    assert_eq!(requests[0]["addresses"][0], "A".repeat(81));
}

#[tokio::test]
async fn unknown_hashes_are_filtered_out() {
    let known = sample_trytes();
    let (url, _) = spawn_node(Behaviour::Healthy, known.clone()).await;
    let client = client(&[url]);

    let txs = client
        .get_transactions(&["X".repeat(81), "Y".repeat(81)])
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].message().as_deref(), Some("hello tangle"));
}

#[tokio::test]
async fn balances_request_uses_threshold() {
    let (url, received) = spawn_node(Behaviour::Healthy, vec![]).await;
    let client = client(&[url]);

    let balances = client.get_balances(&["A".repeat(81)]).await.unwrap();
    assert_eq!(balances, vec![2_779_530_283_277_761]);
    assert_eq!(received.lock().unwrap()[0]["threshold"], 100);
}

#[tokio::test]
async fn fails_over_to_next_node() {
    let dead = dead_node().await;
    let (broken, broken_received) = spawn_node(Behaviour::ServerError, vec![]).await;
    let (healthy, healthy_received) = spawn_node(Behaviour::Healthy, vec![]).await;
    let client = client(&[dead, broken, healthy]);

    let hashes = client.find_transactions("tags", &["EXPLORER".to_string()]).await.unwrap();
    assert_eq!(hashes.len(), 2);
    assert_eq!(broken_received.lock().unwrap().len(), 1);
    assert_eq!(healthy_received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_command_is_not_retried() {
    let (rejecting, _) = spawn_node(Behaviour::RejectCommands, vec![]).await;
    let (healthy, healthy_received) = spawn_node(Behaviour::Healthy, vec![]).await;
    let client = client(&[rejecting, healthy]);

    let err = client
        .find_transactions("addresses", &["A".repeat(81)])
        .await
        .unwrap_err();
    assert!(matches!(&err, NodeError::Command(m) if m == "Invalid addresses input"));
    assert!(healthy_received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn every_node_down_reports_last_error() {
    let (a, _) = spawn_node(Behaviour::ServerError, vec![]).await;
    let (b, _) = spawn_node(Behaviour::ServerError, vec![]).await;
    let client = client(&[a, b]);

    let err = client.get_balances(&["A".repeat(81)]).await.unwrap_err();
    assert!(matches!(&err, NodeError::Http(500, m) if m == "database locked"));
}

#[tokio::test]
async fn send_trytes_fills_in_node_depth_and_weight() {
    let (url, received) = spawn_node(Behaviour::Healthy, vec![]).await;
    let client = client(&[url]);
    let trytes = sample_trytes();

    let txs = client.send_trytes(&trytes, 0, 0).await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].hash.len(), 81);

    let requests = received.lock().unwrap();
    let commands: Vec<&str> = requests.iter().map(|r| r["command"].as_str().unwrap()).collect();
    assert_eq!(
        commands,
        ["getTransactionsToApprove", "attachToTangle", "storeTransactions", "broadcastTransactions"]
    );
    assert_eq!(requests[0]["depth"], 3);
    assert_eq!(requests[1]["minWeightMagnitude"], 9);
    assert_eq!(requests[1]["trunkTransaction"], "T".repeat(81));
}

#[tokio::test]
async fn prepare_transfers_requires_a_seed() {
    let (url, _) = spawn_node(Behaviour::Healthy, vec![]).await;
    let client = client(&[url]);
    let transfer = Transfer {
        address: "A".repeat(81),
        ..Default::default()
    };

    assert!(client.prepare_transfers("SHORT", &[transfer.clone()]).await.is_err());
    let trytes = client.prepare_transfers(&"9".repeat(81), &[transfer]).await.unwrap();
    assert_eq!(trytes.len(), 1);
    assert_eq!(trytes[0].len(), TRANSACTION_TRYTES);
}
