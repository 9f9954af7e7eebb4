//! Preview-image URL provider.
//!
//! The [`ImageUrlProvider`] trait is the seam to the external image service:
//! one call per page, input is the fully qualified page URL plus the opaque
//! image options, output is a single image URL. Everything past that seam —
//! retries, caching, timeouts — belongs to the provider, not the pipeline.
//!
//! The production implementation is [`SignedUrlProvider`]: the image service
//! renders previews on demand from a signed request URL, so no network call
//! is needed here — the provider computes the URL locally from the
//! publishable key and signature secret.
//!
//! ## Signed URL Shape
//!
//! ```text
//! <endpoint>?<canonical query>&sig=<hex hmac-sha256>
//! ```
//!
//! The canonical query is `key` (publishable key), `url` (page URL), and all
//! scalar image options, sorted by key and percent-encoded. The signature is
//! HMAC-SHA256 over that query using the signature secret, so the image
//! service can verify the request was produced by a key holder.

use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Everything except ASCII unreserved characters gets percent-encoded.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider {0} must not be empty")]
    MissingCredential(&'static str),
    #[error("image option '{0}' is not a scalar value")]
    UnsupportedOption(String),
    #[error("invalid signature secret: {0}")]
    Key(String),
    #[error("image URL request failed: {0}")]
    Service(String),
}

/// Seam to the external image-generation service.
///
/// `Sync` so the orchestrator can share one provider across a rayon pool.
pub trait ImageUrlProvider: Sync {
    /// Compute (or fetch) the preview-image URL for one page.
    fn image_url(
        &self,
        page_url: &str,
        image_options: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, ProviderError>;
}

/// Builds signed image URLs locally from provider credentials.
#[derive(Debug, Clone)]
pub struct SignedUrlProvider {
    endpoint: String,
    publishable_key: String,
    signature_secret: String,
}

impl SignedUrlProvider {
    pub fn new(
        endpoint: &str,
        publishable_key: &str,
        signature_secret: &str,
    ) -> Result<Self, ProviderError> {
        if endpoint.is_empty() {
            return Err(ProviderError::MissingCredential("endpoint"));
        }
        if publishable_key.is_empty() {
            return Err(ProviderError::MissingCredential("publishable_key"));
        }
        if signature_secret.is_empty() {
            return Err(ProviderError::MissingCredential("signature_secret"));
        }
        Ok(Self {
            endpoint: endpoint.to_string(),
            publishable_key: publishable_key.to_string(),
            signature_secret: signature_secret.to_string(),
        })
    }
}

/// Render a JSON scalar as its query-parameter text.
fn scalar_value(key: &str, value: &serde_json::Value) -> Result<String, ProviderError> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ProviderError::UnsupportedOption(key.to_string())),
    }
}

impl ImageUrlProvider for SignedUrlProvider {
    fn image_url(
        &self,
        page_url: &str,
        image_options: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, ProviderError> {
        let mut params: Vec<(String, String)> = vec![
            ("key".to_string(), self.publishable_key.clone()),
            ("url".to_string(), page_url.to_string()),
        ];
        for (key, value) in image_options {
            params.push((key.clone(), scalar_value(key, value)?));
        }
        // Canonical order: the signature covers the exact query text, so the
        // text must be deterministic.
        params.sort();

        let query = params
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, QUERY),
                    utf8_percent_encode(v, QUERY)
                )
            })
            .collect::<Vec<_>>()
            .join("&");

        let mut mac = HmacSha256::new_from_slice(self.signature_secret.as_bytes())
            .map_err(|e| ProviderError::Key(e.to_string()))?;
        mac.update(query.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{}?{}&sig={}", self.endpoint, query, sig))
    }
}
