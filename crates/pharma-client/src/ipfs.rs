//! # Content-Addressed Upload Client
//!
//! Pins byte payloads to an IPFS-compatible store through its HTTP `add`
//! endpoint and builds public retrieval links.
//!
//! ## API Path Convention
//!
//! | Purpose | URL |
//! |---------|-----|
//! | Upload | `POST {api}/api/v0/add` (multipart field `file`) |
//! | Retrieval link | `{gateway}/ipfs/{cid}` |
//!
//! The returned identifier is handed on opaquely. It is not re-fetched or
//! checked for retrievability before use.

use async_trait::async_trait;
use pharma_core::ContentId;
use serde::Deserialize;
use url::Url;

use crate::error::StoreError;

/// A content-addressed object store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Pin `bytes` and return their identifier.
    async fn upload(&self, bytes: Vec<u8>) -> Result<ContentId, StoreError>;

    /// Public link under which `cid` is retrievable.
    fn retrieval_link(&self, cid: &ContentId) -> String;
}

/// Client for the IPFS HTTP API.
#[derive(Debug, Clone)]
pub struct IpfsClient {
    http: reqwest::Client,
    api_url: Url,
    gateway_url: Url,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

impl IpfsClient {
    pub fn new(http: reqwest::Client, api_url: Url, gateway_url: Url) -> Self {
        Self {
            http,
            api_url,
            gateway_url,
        }
    }

    fn add_endpoint(&self) -> String {
        format!("{}/api/v0/add", self.api_url.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl ContentStore for IpfsClient {
    async fn upload(&self, bytes: Vec<u8>) -> Result<ContentId, StoreError> {
        if bytes.is_empty() {
            return Err(StoreError::InvalidPayload("payload is empty".to_string()));
        }
        let endpoint = self.add_endpoint();
        let size = bytes.len();
        tracing::debug!(endpoint = %endpoint, size, "uploading to content store");

        let part = reqwest::multipart::Part::bytes(bytes).file_name("payload");
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .http
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StoreError::Unreachable {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| StoreError::Unreachable {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        if status.is_client_error() {
            return Err(StoreError::InvalidPayload(format!("{status}: {body}")));
        }
        if !status.is_success() {
            return Err(StoreError::Unreachable {
                endpoint,
                reason: format!("{status}: {body}"),
            });
        }

        // `add` streams one JSON object per line; the last names the root.
        let line = body
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| StoreError::Malformed {
                endpoint: endpoint.clone(),
                reason: "empty response body".to_string(),
            })?;
        let parsed: AddResponse = serde_json::from_str(line).map_err(|e| StoreError::Malformed {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;
        let cid = ContentId::new(parsed.hash).map_err(|e| StoreError::Malformed {
            endpoint,
            reason: e.to_string(),
        })?;

        tracing::info!(cid = %cid, size, "content pinned");
        Ok(cid)
    }

    fn retrieval_link(&self, cid: &ContentId) -> String {
        retrieval_link(&self.gateway_url, cid)
    }
}

/// `{gateway}/ipfs/{cid}`, without a doubled slash.
pub fn retrieval_link(gateway: &Url, cid: &ContentId) -> String {
    format!("{}/ipfs/{}", gateway.as_str().trim_end_matches('/'), cid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_shape() {
        let gateway: Url = "http://127.0.0.1:8080".parse().unwrap();
        let cid = ContentId::new("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG").unwrap();
        assert_eq!(
            retrieval_link(&gateway, &cid),
            "http://127.0.0.1:8080/ipfs/QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"
        );
    }

    #[test]
    fn add_endpoint_joins_cleanly() {
        let c = IpfsClient::new(
            reqwest::Client::new(),
            "http://localhost:5001/".parse().unwrap(),
            "http://localhost:8080".parse().unwrap(),
        );
        assert_eq!(c.add_endpoint(), "http://localhost:5001/api/v0/add");
    }

    #[tokio::test]
    async fn empty_payload_is_rejected_without_network() {
        let c = IpfsClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1".parse().unwrap(),
            "http://127.0.0.1:1".parse().unwrap(),
        );
        assert!(matches!(c.upload(vec![]).await, Err(StoreError::InvalidPayload(_))));
    }
}
