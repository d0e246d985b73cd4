//! # API Flows
//!
//! The REST surface (qc-07) served on a real socket, with blocks sealed on
//! demand against a manual clock.

#[cfg(test)]
mod tests {
    use super::super::TestLedger;
    use qc_06_ledger::LedgerConfig;
    use qc_07_api_gateway::{ApiGatewayService, GatewayConfig};
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    struct Server {
        addr: SocketAddr,
        node: TestLedger,
        stop: Option<oneshot::Sender<()>>,
        task: JoinHandle<()>,
    }

    impl Server {
        async fn spawn() -> Self {
            // The producer task stays idle; blocks are sealed with `node.tick`.
            let node = TestLedger::new(LedgerConfig {
                block_interval_ms: 3_600_000,
                ..LedgerConfig::for_testing()
            });
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let service =
                ApiGatewayService::new(GatewayConfig::for_testing(), node.ledger.clone()).unwrap();

            let (stop, stopped) = oneshot::channel::<()>();
            let task = tokio::spawn(async move {
                service
                    .serve_on(listener, async move {
                        let _ = stopped.await;
                    })
                    .await
                    .unwrap();
            });

            Self {
                addr,
                node,
                stop: Some(stop),
                task,
            }
        }

        async fn request(&self, method: &str, path: &str, body: Option<Value>) -> (u16, Value) {
            let body = body.map(|b| b.to_string()).unwrap_or_default();
            let raw = format!(
                "{method} {path} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\
                 Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
                self.addr,
                body.len()
            );

            let mut stream = TcpStream::connect(self.addr).await.unwrap();
            stream.write_all(raw.as_bytes()).await.unwrap();
            let mut response = Vec::new();
            stream.read_to_end(&mut response).await.unwrap();

            let text = String::from_utf8(response).unwrap();
            let (head, payload) = text.split_once("\r\n\r\n").unwrap();
            let status = head
                .split_whitespace()
                .nth(1)
                .and_then(|code| code.parse().ok())
                .unwrap();
            let json = if payload.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(payload).unwrap()
            };
            (status, json)
        }

        async fn shutdown(mut self) {
            if let Some(stop) = self.stop.take() {
                let _ = stop.send(());
            }
            tokio::time::timeout(Duration::from_secs(5), self.task)
                .await
                .expect("server drains")
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_transfer_over_socket() {
        let server = Server::spawn().await;

        let (status, node) = server.request("POST", "/api/node/start", None).await;
        assert_eq!(status, 200);
        assert_eq!(node["running"], true);
        assert_eq!(node["block_height"], 1);

        let (_, alice) = server.request("POST", "/api/wallet/create", None).await;
        let (_, bob) = server.request("POST", "/api/wallet/create", None).await;

        let (status, tx) = server
            .request(
                "POST",
                "/api/transaction/send",
                Some(json!({
                    "from": alice["address"],
                    "to": bob["address"],
                    "amount": 300,
                    "fee": 2,
                })),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(tx["status"], "pending");

        let path = format!("/api/wallet/{}/balance", alice["address"].as_str().unwrap());
        let (_, balance) = server.request("GET", &path, None).await;
        assert_eq!(balance["balance"], 1000);
        assert_eq!(balance["available_balance"], 698);

        server.node.tick(1).expect("transfer sealed");

        let path = format!("/api/transaction/{}", tx["hash"].as_str().unwrap());
        let (_, confirmed) = server.request("GET", &path, None).await;
        assert_eq!(confirmed["status"], "confirmed");
        assert_eq!(confirmed["block_number"], 2);

        let (_, block) = server.request("GET", "/api/block/2", None).await;
        assert_eq!(block["transactions"][0]["hash"], tx["hash"]);

        let (_, stats) = server.request("GET", "/api/stats", None).await;
        assert_eq!(stats["block_height"], 2);
        assert_eq!(stats["total_wallets"], 2);
        assert_eq!(stats["pending_transactions"], 0);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_errors_over_socket() {
        let server = Server::spawn().await;
        let (_, alice) = server.request("POST", "/api/wallet/create", None).await;
        let (_, bob) = server.request("POST", "/api/wallet/create", None).await;
        let transfer = json!({"from": alice["address"], "to": bob["address"], "amount": 5});

        let (status, body) = server
            .request("POST", "/api/transaction/send", Some(transfer.clone()))
            .await;
        assert_eq!(status, 503);
        assert_eq!(body["code"], "node_not_running");

        server.request("POST", "/api/node/start", None).await;
        let (status, body) = server
            .request("POST", "/api/transaction/send", Some(json!({"amount": 5})))
            .await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], "bad_request");

        let (status, _) = server.request("GET", "/api/wallet/0xzz", None).await;
        assert_eq!(status, 400);

        let (status, body) = server.request("GET", "/api/block/99", None).await;
        assert_eq!(status, 404);
        assert_eq!(body["code"], "not_found");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_validator_endpoints_over_socket() {
        let server = Server::spawn().await;
        server.request("POST", "/api/node/start", None).await;
        let (_, wallet) = server.request("POST", "/api/wallet/create", None).await;

        let (status, validator) = server
            .request(
                "POST",
                "/api/validator/register",
                Some(json!({"address": wallet["address"], "stake": 64})),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(validator["active"], true);

        let (status, _) = server
            .request(
                "POST",
                "/api/validator/register",
                Some(json!({"address": wallet["address"], "stake": 64})),
            )
            .await;
        assert_eq!(status, 409);

        let (_, listed) = server.request("GET", "/api/validators", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, unstaked) = server
            .request(
                "POST",
                "/api/validator/unstake",
                Some(json!({"address": wallet["address"]})),
            )
            .await;
        assert_eq!(status, 200);
        assert_eq!(unstaked["active"], false);

        let path = format!("/api/wallet/{}", wallet["address"].as_str().unwrap());
        let (_, account) = server.request("GET", &path, None).await;
        assert_eq!(account["balance"], 1000);

        server.shutdown().await;
    }
}
