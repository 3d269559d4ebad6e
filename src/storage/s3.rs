//! S3-compatible object store client.
//!
//! Speaks the subset of the S3 REST API the catalog needs: `PUT Object` and
//! `DELETE Object`, authenticated with AWS Signature Version 4. Works
//! against S3 itself and S3-compatible services such as Cloudflare R2 or
//! MinIO. The client is built once from configuration and reused for every
//! call.

use std::time::Duration;

use bookbin_common::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::{Digest, Sha256};

use crate::config::ObjectStoreConfig;

use super::ObjectStore;

/// Per-request timeout so one slow upload cannot hang a whole operation.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// SHA-256 of the empty payload, used for bodyless requests.
const EMPTY_PAYLOAD_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

pub struct S3ObjectStore {
    client: Client,
    endpoint: String,
    host: String,
    region: String,
    bucket: String,
    access_key_id: String,
    secret_access_key: String,
}

impl S3ObjectStore {
    /// Build a client from configuration.
    pub fn new(config: &ObjectStoreConfig) -> Result<Self> {
        let endpoint = config.endpoint.trim_end_matches('/').to_string();
        let url = reqwest::Url::parse(&endpoint)
            .map_err(|e| Error::invalid_input(format!("Invalid object store endpoint: {}", e)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(Error::invalid_input(
                    "Object store endpoint has no host".to_string(),
                ))
            }
        };

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::invalid_input(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            host,
            region: config.region.clone(),
            bucket: config.bucket.clone(),
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.secret_access_key.clone(),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}{}", self.endpoint, self.uri_path(key))
    }

    fn uri_path(&self, key: &str) -> String {
        format!("/{}/{}", self.bucket, encode_path_segment(key))
    }

    /// Produce the `x-amz-date` value and `Authorization` header for a
    /// request, per AWS Signature Version 4.
    fn sign_request(
        &self,
        method: &str,
        uri_path: &str,
        content_type: Option<&str>,
        payload_hash: &str,
        now: DateTime<Utc>,
    ) -> (String, String) {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let mut headers: Vec<(String, String)> = vec![
            ("host".to_string(), self.host.clone()),
            ("x-amz-content-sha256".to_string(), payload_hash.to_string()),
            ("x-amz-date".to_string(), amz_date.clone()),
        ];
        if let Some(ct) = content_type {
            headers.push(("content-type".to_string(), ct.to_string()));
        }
        headers.sort();

        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value))
            .collect();
        let signed_headers = headers
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";");

        // No query string in any request this client makes.
        let canonical_request = format!(
            "{}\n{}\n\n{}\n{}\n{}",
            method, uri_path, canonical_headers, signed_headers, payload_hash
        );

        let scope = format!("{}/{}/s3/aws4_request", date, self.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let k_date = hmac_sha256(
            format!("AWS4{}", self.secret_access_key).as_bytes(),
            date.as_bytes(),
        );
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, b"s3");
        let k_signing = hmac_sha256(&k_service, b"aws4_request");
        let signature = hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes()));

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.access_key_id, scope, signed_headers, signature
        );

        (amz_date, authorization)
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Bytes) -> Result<()> {
        let payload_hash = sha256_hex(&bytes);
        let (amz_date, authorization) = self.sign_request(
            "PUT",
            &self.uri_path(key),
            Some(content_type),
            &payload_hash,
            Utc::now(),
        );

        let response = self
            .client
            .put(self.object_url(key))
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", &payload_hash)
            .header("Content-Type", content_type)
            .header("Authorization", authorization)
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::storage_write(key, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::storage_write(
                key,
                format!("HTTP {}: {}", status, body),
            ));
        }

        tracing::debug!(key, "stored object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let (amz_date, authorization) = self.sign_request(
            "DELETE",
            &self.uri_path(key),
            None,
            EMPTY_PAYLOAD_HASH,
            Utc::now(),
        );

        let response = self
            .client
            .delete(self.object_url(key))
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", EMPTY_PAYLOAD_HASH)
            .header("Authorization", authorization)
            .send()
            .await
            .map_err(|e| Error::storage_delete(key, e.to_string()))?;

        // Delete-of-absent is success: storage services are best treated as
        // eventually consistent with respect to deleting a missing key.
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::storage_delete(
                key,
                format!("HTTP {}: {}", status, body),
            ));
        }

        tracing::debug!(key, "deleted object");
        Ok(())
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Percent-encode a single path segment, leaving only unreserved characters.
fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
