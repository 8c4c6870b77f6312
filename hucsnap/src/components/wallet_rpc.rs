//! Wallets reached over the Bitcoin-style JSON-RPC interface.

use std::time::Duration;

use async_trait::async_trait;
use jsonrpsee::core::{client::ClientT, params::ArrayParams};
use jsonrpsee_http_client::{HttpClient, HttpClientBuilder};
use tower::ServiceBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{
    claim::ClaimError,
    wallet::{OwnershipOracle, WalletInfo, WalletMutator, WalletRole},
};

mod http_response_compatibility;
use http_response_compatibility::{HttpResponseMiddleware, HttpResponseMiddlewareLayer};

/// A JSON-RPC connection to a single wallet of a node.
///
/// The endpoint URL carries everything needed to reach the wallet: the credentials as
/// URL userinfo, and the wallet name as a `/wallet/<name>` path if the node has more
/// than one wallet loaded.
#[derive(Debug)]
pub(crate) struct WalletRpc {
    client: HttpClient<HttpResponseMiddleware>,
    role: WalletRole,
}

#[derive(Deserialize)]
struct AddressInfo {
    ismine: bool,
}

impl WalletRpc {
    /// Prepares a client for `endpoint`. No request is made yet.
    pub(crate) fn connect(
        endpoint: &str,
        role: WalletRole,
        timeout: Duration,
    ) -> Result<Self, ClaimError> {
        let client = HttpClientBuilder::default()
            .request_timeout(timeout)
            .set_http_middleware(
                ServiceBuilder::new().layer(HttpResponseMiddlewareLayer::default()),
            )
            .build(endpoint)
            .map_err(|e| ClaimError::Connect {
                wallet: role,
                err: e.to_string(),
            })?;

        Ok(Self { client, role })
    }

    fn transport_error(&self, err: impl ToString) -> ClaimError {
        ClaimError::Transport {
            wallet: self.role,
            err: err.to_string(),
        }
    }

    fn param<T: Serialize>(&self, params: &mut ArrayParams, value: T) -> Result<(), ClaimError> {
        params.insert(value).map_err(|e| self.transport_error(e))
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: ArrayParams,
    ) -> Result<R, ClaimError> {
        self.client
            .request(method, params)
            .await
            .map_err(|e| self.transport_error(format!("{method}: {e}")))
    }
}

#[async_trait]
impl OwnershipOracle for WalletRpc {
    async fn wallet_info(&self) -> Result<WalletInfo, ClaimError> {
        self.call("getwalletinfo", ArrayParams::new()).await
    }

    async fn is_mine(&self, address: &str) -> Result<bool, ClaimError> {
        let mut params = ArrayParams::new();
        self.param(&mut params, address)?;
        let info: AddressInfo = self.call("getaddressinfo", params).await?;
        Ok(info.ismine)
    }

    async fn dump_priv_key(&self, address: &str) -> Result<SecretString, ClaimError> {
        let mut params = ArrayParams::new();
        self.param(&mut params, address)?;
        let key: String = self.call("dumpprivkey", params).await?;
        Ok(SecretString::new(key))
    }
}

#[async_trait]
impl WalletMutator for WalletRpc {
    async fn wallet_info(&self) -> Result<WalletInfo, ClaimError> {
        self.call("getwalletinfo", ArrayParams::new()).await
    }

    async fn import_priv_key(
        &self,
        key: &SecretString,
        label: &str,
        rescan: bool,
    ) -> Result<(), ClaimError> {
        let mut params = ArrayParams::new();
        self.param(&mut params, key.expose_secret())?;
        self.param(&mut params, label)?;
        self.param(&mut params, rescan)?;
        let _: serde_json::Value = self.call("importprivkey", params).await?;
        Ok(())
    }
}

/// Renders an endpoint URL for logging, with any credentials masked out.
pub(crate) fn redact_endpoint(endpoint: &str) -> String {
    let (scheme, rest) = match endpoint.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, endpoint),
    };
    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, path) = rest.split_at(authority_end);

    let host = match authority.rsplit_once('@') {
        Some((_, host)) => format!("***@{host}"),
        None => authority.to_owned(),
    };

    match scheme {
        Some(scheme) => format!("{scheme}://{host}{path}"),
        None => format!("{host}{path}"),
    }
}
