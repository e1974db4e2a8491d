use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sentinel_utils::Network;

use crate::daemon::Daemon;
use crate::dash_conf::DashConf;
use crate::error::DaemonError;

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a [Value],
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC over HTTP client for dashd.
pub struct DashDaemon {
    client: Client,
    url: String,
    user: String,
    password: String,
    network: Network,
    request_id: AtomicU64,
}

impl DashDaemon {
    pub fn new(
        host: &str,
        port: u16,
        user: &str,
        password: &str,
        network: Network,
        timeout: Duration,
    ) -> Result<Self, DaemonError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DaemonError::Config(e.to_string()))?;
        Ok(Self {
            client,
            url: format!("http://{}:{}/", host, port),
            user: user.to_string(),
            password: password.to_string(),
            network,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn from_dash_conf(conf: &DashConf, timeout: Duration) -> Result<Self, DaemonError> {
        let network = conf.network();
        let user = conf
            .rpcuser
            .as_deref()
            .ok_or_else(|| DaemonError::Config("rpcuser is not set".to_string()))?;
        let password = conf
            .rpcpassword
            .as_deref()
            .ok_or_else(|| DaemonError::Config("rpcpassword is not set".to_string()))?;
        let host = conf.rpchost.as_deref().unwrap_or("127.0.0.1");
        let port = conf.rpcport.unwrap_or_else(|| network.default_rpc_port());
        Self::new(host, port, user, password, network, timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Daemon for DashDaemon {
    fn network(&self) -> Network {
        self.network
    }

    async fn rpc_command(&self, method: &str, params: &[Value]) -> Result<Value, DaemonError> {
        let request = RpcRequest {
            jsonrpc: "1.0",
            id: self.request_id.fetch_add(1, Ordering::SeqCst),
            method,
            params,
        };
        log::trace!("rpc {} {:?}", method, params);

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&request)
            .send()
            .await
            .map_err(|e| DaemonError::Connectivity(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DaemonError::Connectivity(format!("RPC credentials rejected ({})", status)));
        }

        // dashd reports RPC failures with a non-2xx status and a JSON body
        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| DaemonError::invalid_response(method, format!("{} ({})", e, status)))?;

        if let Some(error) = body.error {
            return Err(DaemonError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(body.result.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dash_conf_uses_network_default_port() {
        let conf = DashConf::parse("rpcuser=u\nrpcpassword=p\ntestnet=1\n").unwrap();
        let daemon = DashDaemon::from_dash_conf(&conf, Duration::from_secs(5)).unwrap();
        assert_eq!(daemon.url(), "http://127.0.0.1:19998/");
        assert_eq!(daemon.network(), Network::Testnet);
    }

    #[test]
    fn test_from_dash_conf_requires_credentials() {
        let conf = DashConf::parse("rpcport=9998\n").unwrap();
        assert!(matches!(
            DashDaemon::from_dash_conf(&conf, Duration::from_secs(5)),
            Err(DaemonError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_daemon_is_a_connectivity_error() {
        // nothing listens on port 1
        let daemon = DashDaemon::new("127.0.0.1", 1, "u", "p", Network::Mainnet, Duration::from_secs(2)).unwrap();
        let err = daemon.check_connectivity().await.unwrap_err();
        assert!(err.is_connectivity());
    }
}
