//! Core types shared by bid adapters.

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::userid::eids::Eid;

/// Media type enumeration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Banner,
    Video,
    Native,
}

/// A single impression the host asks an adapter to bid on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidRequest {
    /// Host-assigned id correlating returned bids to the impression.
    pub bid_id: String,
    pub media_type: MediaType,
    /// Requested sizes as (width, height) pairs.
    #[serde(default)]
    pub sizes: Vec<(u32, u32)>,
    pub params: BidParams,
    /// Extended ids contributed by user-id submodules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eids: Vec<Eid>,
}

/// Bidder-specific parameters configured by the publisher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BidParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_id: Option<String>,
}

/// Page-level context for building outgoing requests.
#[derive(Debug, Clone, Default)]
pub struct AdapterContext {
    pub page: Option<String>,
    pub domain: Option<String>,
    pub consent: ConsentData,
}

/// Privacy signals forwarded to bid endpoints and sync assets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsentData {
    pub gdpr_applies: Option<bool>,
    pub gdpr_consent: Option<String>,
    pub us_privacy: Option<String>,
}

/// Outgoing request descriptor. The host owns the actual transport.
#[derive(Debug, Clone)]
pub struct ServerRequest {
    pub method: Method,
    pub url: String,
    pub body: Value,
}

/// Raw response body handed back by the host transport.
#[derive(Debug, Clone, Default)]
pub struct ServerResponse {
    pub body: Value,
}

impl ServerResponse {
    #[must_use]
    pub fn new(body: Value) -> Self {
        Self { body }
    }
}

/// Individual bid interpreted from a server response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    /// The impression this bid answers.
    pub request_id: String,
    /// Price in CPM.
    pub price: f64,
    /// Currency code (e.g., "USD").
    pub currency: String,
    /// Creative markup (HTML/VAST).
    pub creative: Option<String>,
    pub width: u32,
    pub height: u32,
    pub media_type: MediaType,
    /// How long the host may cache this bid.
    pub ttl_seconds: u32,
    /// Advertiser domains.
    pub adomain: Option<Vec<String>>,
}

/// Which sync mechanisms the host permits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub iframe_enabled: bool,
    pub pixel_enabled: bool,
}

/// Kind of user-sync asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    Iframe,
    Image,
}

/// User sync the host should load after the auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSync {
    #[serde(rename = "type")]
    pub sync_type: SyncType,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_media_type_serializes_lowercase() {
        assert_eq!(serde_json::to_value(MediaType::Banner).unwrap(), json!("banner"));
        assert_eq!(serde_json::to_value(MediaType::Video).unwrap(), json!("video"));
        assert_eq!(serde_json::to_value(MediaType::Native).unwrap(), json!("native"));
    }

    #[test]
    fn test_bid_request_deserializes_with_defaults() {
        let bid: BidRequest = serde_json::from_value(json!({
            "bid_id": "bid-1",
            "media_type": "banner",
            "params": {"placement_id": "42"}
        }))
        .unwrap();

        assert_eq!(bid.bid_id, "bid-1");
        assert!(bid.sizes.is_empty());
        assert!(bid.eids.is_empty());
        assert_eq!(bid.params.placement_id.as_deref(), Some("42"));
        assert!(bid.params.endpoint_id.is_none());
    }

    #[test]
    fn test_user_sync_serialized_type_tag() {
        let sync = UserSync {
            sync_type: SyncType::Iframe,
            url: "https://sync.test/iframe".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&sync).unwrap(),
            json!({"type": "iframe", "url": "https://sync.test/iframe"})
        );
    }
}
