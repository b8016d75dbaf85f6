//! Chef request signing
//!
//! Implements version 1.3 of the Chef server authentication protocol. Every
//! request carries the client name, a timestamp and a SHA-256 hash of the
//! body, and an RSA signature over a canonical rendering of those values and
//! the request path. The signature travels base64 encoded, split over
//! numbered `X-Ops-Authorization-N` headers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Digest, Sha256};

use chef_provider::error::{ProviderError, ProviderResult};

/// Protocol version sent in `X-Ops-Sign`.
pub const SIGN_VERSION: &str = "1.3";

/// Server API version requested by every call.
pub const SERVER_API_VERSION: &str = "1";

/// Length of each `X-Ops-Authorization-N` header value.
const AUTHORIZATION_CHUNK: usize = 60;

/// Parse an RSA private key from PKCS#1 or PKCS#8 PEM text.
pub fn parse_private_key(pem: &str) -> ProviderResult<RsaPrivateKey> {
    RsaPrivateKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
        .map_err(|e| ProviderError::invalid_configuration(format!("invalid client key: {e}")))
}

/// Collapse repeated slashes and drop a trailing slash.
pub fn canonical_path(path: &str) -> String {
    let mut canonical = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && canonical.ends_with('/') {
            continue;
        }
        canonical.push(c);
    }
    if canonical.len() > 1 && canonical.ends_with('/') {
        canonical.pop();
    }
    canonical
}

/// Base64 SHA-256 digest of a request body.
pub fn content_hash(body: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(body))
}

/// Signs requests on behalf of one API client.
#[derive(Clone)]
pub struct RequestSigner {
    client_name: String,
    key: RsaPrivateKey,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("client_name", &self.client_name)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    pub fn new(client_name: impl Into<String>, pem: &str) -> ProviderResult<Self> {
        Ok(Self {
            client_name: client_name.into(),
            key: parse_private_key(pem)?,
        })
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// Authentication headers for a request sent now.
    pub fn sign(&self, method: &str, path: &str, body: &[u8]) -> ProviderResult<Vec<(String, String)>> {
        self.sign_at(method, path, body, Utc::now())
    }

    /// Authentication headers for a request stamped with `timestamp`.
    pub fn sign_at(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
        timestamp: DateTime<Utc>,
    ) -> ProviderResult<Vec<(String, String)>> {
        let timestamp = timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
        let hash = content_hash(body);
        let canonical = self.canonical_request(method, path, &hash, &timestamp);

        let signature = self
            .key
            .sign(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(canonical.as_bytes()))
            .map_err(|e| ProviderError::invalid_configuration(format!("failed to sign request: {e}")))?;
        let signature = STANDARD.encode(signature);

        let mut headers = vec![
            (
                "X-Ops-Sign".to_string(),
                format!("algorithm=sha256;version={SIGN_VERSION}"),
            ),
            ("X-Ops-Userid".to_string(), self.client_name.clone()),
            ("X-Ops-Timestamp".to_string(), timestamp),
            ("X-Ops-Content-Hash".to_string(), hash),
            (
                "X-Ops-Server-API-Version".to_string(),
                SERVER_API_VERSION.to_string(),
            ),
        ];

        // base64 output is ASCII, so byte chunks are valid UTF-8
        for (i, chunk) in signature.as_bytes().chunks(AUTHORIZATION_CHUNK).enumerate() {
            headers.push((
                format!("X-Ops-Authorization-{}", i + 1),
                String::from_utf8_lossy(chunk).into_owned(),
            ));
        }

        Ok(headers)
    }

    /// The text the signature covers.
    pub fn canonical_request(&self, method: &str, path: &str, hash: &str, timestamp: &str) -> String {
        [
            format!("Method:{}", method.to_uppercase()),
            format!("Path:{}", canonical_path(path)),
            format!("X-Ops-Content-Hash:{hash}"),
            format!("X-Ops-Sign:version={SIGN_VERSION}"),
            format!("X-Ops-Timestamp:{timestamp}"),
            format!("X-Ops-UserId:{}", self.client_name),
            format!("X-Ops-Server-API-Version:{SERVER_API_VERSION}"),
        ]
        .join("\n")
    }
}
