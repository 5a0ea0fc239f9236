//! VisibleMeasures bidder registration.
//!
//! Registration glue only: the bidder code, endpoints, and media kinds
//! live here; every delegated operation comes from
//! [`utils::EndpointBidder`](crate::adapters::utils::EndpointBidder).

use std::sync::Arc;

use error_stack::Report;

use crate::adapters::types::{
    AdapterContext, Bid, BidRequest, ConsentData, MediaType, ServerRequest, ServerResponse,
    SyncOptions, UserSync,
};
use crate::adapters::utils::EndpointBidder;
use crate::adapters::BidAdapter;
use crate::error::ModuleError;
use crate::settings::Settings;

const BIDDER_CODE: &str = "visiblemeasures";

const SUPPORTED_MEDIA_TYPES: &[MediaType] =
    &[MediaType::Banner, MediaType::Video, MediaType::Native];

/// VisibleMeasures adapter implementation.
pub struct VisibleMeasuresAdapter {
    bidder: EndpointBidder,
}

impl VisibleMeasuresAdapter {
    fn new(ad_url: &str, sync_url: &str) -> Arc<Self> {
        Arc::new(Self {
            bidder: EndpointBidder::new(BIDDER_CODE, ad_url, sync_url),
        })
    }
}

impl BidAdapter for VisibleMeasuresAdapter {
    fn bidder_code(&self) -> &'static str {
        BIDDER_CODE
    }

    fn supported_media_types(&self) -> &[MediaType] {
        SUPPORTED_MEDIA_TYPES
    }

    fn is_bid_request_valid(&self, bid: &BidRequest) -> bool {
        self.bidder.is_bid_request_valid(bid)
    }

    fn build_requests(
        &self,
        bids: &[BidRequest],
        ctx: &AdapterContext,
    ) -> Result<Vec<ServerRequest>, Report<ModuleError>> {
        self.bidder.build_requests(bids, ctx)
    }

    fn interpret_response(
        &self,
        response: &ServerResponse,
    ) -> Result<Vec<Bid>, Report<ModuleError>> {
        self.bidder.interpret_response(response)
    }

    fn get_user_syncs(&self, options: &SyncOptions, consent: &ConsentData) -> Vec<UserSync> {
        self.bidder.get_user_syncs(options, consent)
    }
}

fn build(settings: &Settings) -> Option<Arc<VisibleMeasuresAdapter>> {
    let config = &settings.visiblemeasures;
    if !config.enabled {
        return None;
    }
    if config.ad_url.trim().is_empty() {
        log::warn!("VisibleMeasures adapter disabled: visiblemeasures.ad_url missing");
        return None;
    }
    Some(VisibleMeasuresAdapter::new(&config.ad_url, &config.sync_url))
}

/// Register the VisibleMeasures adapter when enabled.
#[must_use]
pub fn register(settings: &Settings) -> Option<Arc<dyn BidAdapter>> {
    build(settings).map(|adapter| adapter as Arc<dyn BidAdapter>)
}
