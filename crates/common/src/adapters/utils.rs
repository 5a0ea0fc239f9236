//! Shared request/response plumbing for thin delegating adapters.
//!
//! Adapters that speak the common exchange protocol differ only in their
//! bidder code, endpoints, and supported media kinds. Everything else
//! (parameter validation, request-body assembly, response mapping, sync
//! URL production) lives here, parameterized by the two endpoint URLs.

use error_stack::{Report, ResultExt};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::adapters::types::{
    AdapterContext, Bid, BidRequest, ConsentData, MediaType, ServerRequest, ServerResponse,
    SyncOptions, SyncType, UserSync,
};
use crate::error::ModuleError;
use crate::userid::eids::Eid;

/// Endpoint-parameterized implementation of the delegated adapter
/// operations.
pub struct EndpointBidder {
    bidder_code: &'static str,
    ad_url: String,
    sync_url: String,
}

/// Exchange bid-request body; one placement entry per impression.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRequestBody {
    request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gdpr: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gdpr_consent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    us_privacy: Option<String>,
    placements: Vec<PlacementRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacementRequest {
    bid_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    placement_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint_id: Option<String>,
    ad_format: MediaType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sizes: Vec<(u32, u32)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    eids: Vec<Eid>,
}

/// Exchange bid-response body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeResponseBody {
    #[serde(default)]
    bids: Vec<ExchangeBid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeBid {
    bid_id: String,
    cpm: f64,
    #[serde(default = "default_currency")]
    currency: String,
    width: u32,
    height: u32,
    #[serde(default)]
    creative: Option<String>,
    media_type: MediaType,
    #[serde(default = "default_ttl")]
    ttl: u32,
    #[serde(default)]
    adomain: Option<Vec<String>>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_ttl() -> u32 {
    300
}

impl EndpointBidder {
    #[must_use]
    pub fn new(
        bidder_code: &'static str,
        ad_url: impl Into<String>,
        sync_url: impl Into<String>,
    ) -> Self {
        Self {
            bidder_code,
            ad_url: ad_url.into(),
            sync_url: sync_url.into(),
        }
    }

    fn error(&self, message: impl Into<String>) -> ModuleError {
        ModuleError::Adapter {
            adapter: self.bidder_code.to_string(),
            message: message.into(),
        }
    }

    /// A bid must name either a placement or an endpoint.
    #[must_use]
    pub fn is_bid_request_valid(&self, bid: &BidRequest) -> bool {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty())
        };
        present(&bid.params.placement_id) || present(&bid.params.endpoint_id)
    }

    /// One POST per batch, every impression as a placement entry.
    pub fn build_requests(
        &self,
        bids: &[BidRequest],
        ctx: &AdapterContext,
    ) -> Result<Vec<ServerRequest>, Report<ModuleError>> {
        if bids.is_empty() {
            return Ok(Vec::new());
        }

        let body = ExchangeRequestBody {
            request_id: Uuid::new_v4().to_string(),
            page: ctx.page.clone(),
            domain: ctx.domain.clone(),
            gdpr: ctx.consent.gdpr_applies.map(u8::from),
            gdpr_consent: ctx.consent.gdpr_consent.clone(),
            us_privacy: ctx.consent.us_privacy.clone(),
            placements: bids.iter().map(placement_from_bid).collect(),
        };

        let body = serde_json::to_value(&body)
            .change_context(self.error("failed to serialize bid request body"))?;

        log::debug!(
            "{}: built bid request for {} placement(s)",
            self.bidder_code,
            bids.len()
        );

        Ok(vec![ServerRequest {
            method: Method::POST,
            url: self.ad_url.clone(),
            body,
        }])
    }

    /// Map the exchange response to host bids. An empty body means no
    /// bids, not an error.
    pub fn interpret_response(
        &self,
        response: &ServerResponse,
    ) -> Result<Vec<Bid>, Report<ModuleError>> {
        if response.body.is_null() {
            return Ok(Vec::new());
        }

        let parsed: ExchangeResponseBody = serde_json::from_value(response.body.clone())
            .change_context(self.error("unexpected exchange response shape"))?;

        Ok(parsed.bids.into_iter().map(bid_from_exchange).collect())
    }

    /// A single sync asset, iframe preferred when the host allows both.
    #[must_use]
    pub fn get_user_syncs(&self, options: &SyncOptions, consent: &ConsentData) -> Vec<UserSync> {
        let sync_type = if options.iframe_enabled {
            SyncType::Iframe
        } else if options.pixel_enabled {
            SyncType::Image
        } else {
            return Vec::new();
        };

        let mut url = match Url::parse(&self.sync_url) {
            Ok(url) => url,
            Err(err) => {
                log::warn!("{}: invalid sync URL: {err}", self.bidder_code);
                return Vec::new();
            }
        };
        url.set_path(match sync_type {
            SyncType::Iframe => "/iframe",
            SyncType::Image => "/image",
        });

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("pbjs", "1");
            if let Some(applies) = consent.gdpr_applies {
                pairs.append_pair("gdpr", if applies { "1" } else { "0" });
            }
            if let Some(ref consent_string) = consent.gdpr_consent {
                pairs.append_pair("gdpr_consent", consent_string);
            }
            if let Some(ref us_privacy) = consent.us_privacy {
                pairs.append_pair("us_privacy", us_privacy);
            }
        }

        vec![UserSync {
            sync_type,
            url: url.to_string(),
        }]
    }
}

fn placement_from_bid(bid: &BidRequest) -> PlacementRequest {
    PlacementRequest {
        bid_id: bid.bid_id.clone(),
        placement_id: bid.params.placement_id.clone(),
        endpoint_id: bid.params.endpoint_id.clone(),
        ad_format: bid.media_type,
        sizes: bid.sizes.clone(),
        eids: bid.eids.clone(),
    }
}

fn bid_from_exchange(bid: ExchangeBid) -> Bid {
    Bid {
        request_id: bid.bid_id,
        price: bid.cpm,
        currency: bid.currency,
        creative: bid.creative,
        width: bid.width,
        height: bid.height,
        media_type: bid.media_type,
        ttl_seconds: bid.ttl,
        adomain: bid.adomain,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::adapters::types::{AdapterContext, BidParams};

    use super::*;

    fn bidder() -> EndpointBidder {
        EndpointBidder::new(
            "testbidder",
            "https://exchange.test/bid",
            "https://sync.test",
        )
    }

    fn banner_bid(bid_id: &str, placement_id: Option<&str>, endpoint_id: Option<&str>) -> BidRequest {
        BidRequest {
            bid_id: bid_id.to_string(),
            media_type: MediaType::Banner,
            sizes: vec![(300, 250)],
            params: BidParams {
                placement_id: placement_id.map(str::to_string),
                endpoint_id: endpoint_id.map(str::to_string),
            },
            eids: Vec::new(),
        }
    }

    #[test]
    fn test_valid_bid_needs_placement_or_endpoint() {
        let bidder = bidder();

        assert!(bidder.is_bid_request_valid(&banner_bid("b1", Some("42"), None)));
        assert!(bidder.is_bid_request_valid(&banner_bid("b1", None, Some("ep-7"))));
        assert!(!bidder.is_bid_request_valid(&banner_bid("b1", None, None)));
        assert!(!bidder.is_bid_request_valid(&banner_bid("b1", Some(""), None)));
        assert!(!bidder.is_bid_request_valid(&banner_bid("b1", Some("   "), None)));
    }

    #[test]
    fn test_build_requests_batches_placements() {
        let bidder = bidder();
        let bids = vec![
            banner_bid("b1", Some("42"), None),
            banner_bid("b2", None, Some("ep-7")),
        ];
        let ctx = AdapterContext {
            page: Some("https://publisher.test/article".to_string()),
            domain: Some("publisher.test".to_string()),
            consent: ConsentData {
                gdpr_applies: Some(true),
                gdpr_consent: Some("CONSENT".to_string()),
                us_privacy: Some("1YNN".to_string()),
            },
        };

        let requests = bidder.build_requests(&bids, &ctx).unwrap();
        assert_eq!(requests.len(), 1);

        let request = &requests[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "https://exchange.test/bid");

        let body = &request.body;
        assert!(body["requestId"].is_string());
        assert_eq!(body["page"], json!("https://publisher.test/article"));
        assert_eq!(body["domain"], json!("publisher.test"));
        assert_eq!(body["gdpr"], json!(1));
        assert_eq!(body["gdprConsent"], json!("CONSENT"));
        assert_eq!(body["usPrivacy"], json!("1YNN"));

        let placements = body["placements"].as_array().unwrap();
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0]["bidId"], json!("b1"));
        assert_eq!(placements[0]["placementId"], json!("42"));
        assert_eq!(placements[0]["adFormat"], json!("banner"));
        assert_eq!(placements[0]["sizes"], json!([[300, 250]]));
        assert_eq!(placements[1]["endpointId"], json!("ep-7"));
    }

    #[test]
    fn test_build_requests_carries_eids() {
        let bidder = bidder();
        let mut bid = banner_bid("b1", Some("42"), None);
        bid.eids = vec![crate::userid::eids::Eid {
            source: "paf".to_string(),
            uids: vec![crate::userid::eids::Uid {
                id: "abc123".to_string(),
                atype: 1,
                ext: None,
            }],
            ext: None,
        }];

        let requests = bidder
            .build_requests(&[bid], &AdapterContext::default())
            .unwrap();
        let placement = &requests[0].body["placements"][0];
        assert_eq!(placement["eids"][0]["source"], json!("paf"));
        assert_eq!(placement["eids"][0]["uids"][0]["id"], json!("abc123"));
    }

    #[test]
    fn test_build_requests_empty_batch() {
        let bidder = bidder();
        let requests = bidder
            .build_requests(&[], &AdapterContext::default())
            .unwrap();
        assert!(requests.is_empty());
    }

    #[test]
    fn test_interpret_response_maps_bids() {
        let bidder = bidder();
        let response = ServerResponse::new(json!({
            "bids": [{
                "bidId": "b1",
                "cpm": 1.25,
                "currency": "EUR",
                "width": 300,
                "height": 250,
                "creative": "<div>ad</div>",
                "mediaType": "banner",
                "ttl": 60,
                "adomain": ["advertiser.test"]
            }]
        }));

        let bids = bidder.interpret_response(&response).unwrap();
        assert_eq!(bids.len(), 1);

        let bid = &bids[0];
        assert_eq!(bid.request_id, "b1");
        assert!((bid.price - 1.25).abs() < f64::EPSILON);
        assert_eq!(bid.currency, "EUR");
        assert_eq!(bid.creative.as_deref(), Some("<div>ad</div>"));
        assert_eq!(bid.media_type, MediaType::Banner);
        assert_eq!(bid.ttl_seconds, 60);
        assert_eq!(bid.adomain, Some(vec!["advertiser.test".to_string()]));
    }

    #[test]
    fn test_interpret_response_applies_defaults() {
        let bidder = bidder();
        let response = ServerResponse::new(json!({
            "bids": [{
                "bidId": "b1",
                "cpm": 0.5,
                "width": 728,
                "height": 90,
                "mediaType": "banner"
            }]
        }));

        let bids = bidder.interpret_response(&response).unwrap();
        assert_eq!(bids[0].currency, "USD");
        assert_eq!(bids[0].ttl_seconds, 300);
        assert!(bids[0].creative.is_none());
    }

    #[test]
    fn test_interpret_response_tolerates_empty_bodies() {
        let bidder = bidder();

        assert!(bidder
            .interpret_response(&ServerResponse::default())
            .unwrap()
            .is_empty());
        assert!(bidder
            .interpret_response(&ServerResponse::new(json!({})))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_interpret_response_rejects_malformed_body() {
        let bidder = bidder();
        let response = ServerResponse::new(json!({"bids": "nope"}));

        assert!(bidder.interpret_response(&response).is_err());
    }

    #[test]
    fn test_user_syncs_prefer_iframe() {
        let bidder = bidder();
        let options = SyncOptions {
            iframe_enabled: true,
            pixel_enabled: true,
        };

        let syncs = bidder.get_user_syncs(&options, &ConsentData::default());
        assert_eq!(syncs.len(), 1);
        assert_eq!(syncs[0].sync_type, SyncType::Iframe);
        assert_eq!(syncs[0].url, "https://sync.test/iframe?pbjs=1");
    }

    #[test]
    fn test_user_syncs_image_fallback_with_consent() {
        let bidder = bidder();
        let options = SyncOptions {
            iframe_enabled: false,
            pixel_enabled: true,
        };
        let consent = ConsentData {
            gdpr_applies: Some(false),
            gdpr_consent: Some("CONSENT STRING".to_string()),
            us_privacy: Some("1YNN".to_string()),
        };

        let syncs = bidder.get_user_syncs(&options, &consent);
        assert_eq!(syncs[0].sync_type, SyncType::Image);
        assert_eq!(
            syncs[0].url,
            "https://sync.test/image?pbjs=1&gdpr=0&gdpr_consent=CONSENT+STRING&us_privacy=1YNN"
        );
    }

    #[test]
    fn test_user_syncs_disabled() {
        let bidder = bidder();
        let syncs = bidder.get_user_syncs(&SyncOptions::default(), &ConsentData::default());
        assert!(syncs.is_empty());
    }
}
