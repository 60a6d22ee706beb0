//! Intercepted-response records and the bounded buffer that accumulates them
//! during a page load.
//!
//! The buffer is explicitly owned by the collection run and handed to the
//! engine as a plain slice; nothing here is shared or ambient. Ordering is
//! best-effort network arrival order and carries no semantic weight — the
//! reconciler treats the set as unordered.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// URLs worth retaining: catalog/search/product-like API paths. Everything
/// else (analytics beacons, fonts, trackers) is discarded at push time.
const RELEVANCE_PATTERN: &str =
    r"(?i)(catalog|search|product|browse|item|inventory|collection|graphql|api)";

/// One intercepted network response recorded during page load.
///
/// Deserializable so capture logs written by the browser-orchestration layer
/// can be replayed from disk. The parsed JSON body is populated by
/// [`CaptureBuffer::push`], not by deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedResponse {
    pub url: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub status: u16,
    /// Originating request kind: `"xhr"`, `"fetch"`, or `"document"`.
    #[serde(default)]
    pub resource_type: String,
    pub body: String,
    /// Parsed body, present when the content type indicated JSON and the
    /// body parsed cleanly.
    #[serde(skip)]
    pub json: Option<serde_json::Value>,
}

impl CapturedResponse {
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        content_type: impl Into<String>,
        status: u16,
        resource_type: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.into(),
            status,
            resource_type: resource_type.into(),
            body: body.into(),
            json: None,
        }
    }

    /// Body size in bytes, the basis for the buffer's retention bounds.
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

/// Retention bounds for [`CaptureBuffer`].
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Hard cap on retained responses per page load.
    pub max_captures: usize,
    /// Bodies smaller than this are trivial non-candidates.
    pub min_body_bytes: usize,
    /// Bodies larger than this are discarded to bound memory.
    pub max_body_bytes: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_captures: 20,
            min_body_bytes: 2_000,
            max_body_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Bounded, append-only accumulator for intercepted responses.
///
/// Each response is offered independently as it arrives; [`push`] decides
/// retention and parses JSON bodies eagerly so the reconciler later works
/// over already-collected data without re-parsing.
///
/// [`push`]: CaptureBuffer::push
#[derive(Debug)]
pub struct CaptureBuffer {
    config: CaptureConfig,
    relevance: Regex,
    captures: Vec<CapturedResponse>,
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}

impl CaptureBuffer {
    #[must_use]
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            relevance: Regex::new(RELEVANCE_PATTERN).expect("valid regex"),
            captures: Vec::new(),
        }
    }

    /// Offers a response to the buffer. Returns `true` if it was retained.
    ///
    /// A response is retained only when the buffer is below its cap, the URL
    /// matches the relevance pattern, and the body size is within bounds.
    /// JSON content types are parsed at this point; a parse failure keeps the
    /// raw body but leaves `json` unset.
    pub fn push(&mut self, mut response: CapturedResponse) -> bool {
        if self.captures.len() >= self.config.max_captures {
            tracing::trace!(url = %response.url, "capture buffer full, dropping response");
            return false;
        }
        if !self.relevance.is_match(&response.url) {
            return false;
        }
        let len = response.body_len();
        if len < self.config.min_body_bytes || len > self.config.max_body_bytes {
            return false;
        }

        if response.content_type.to_ascii_lowercase().contains("json") {
            response.json = serde_json::from_str(&response.body).ok();
        }

        self.captures.push(response);
        true
    }

    #[must_use]
    pub fn captures(&self) -> &[CapturedResponse] {
        &self.captures
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}
