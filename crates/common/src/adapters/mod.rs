//! Bid adapter seam and registry.

use std::sync::Arc;

use error_stack::Report;

use crate::error::ModuleError;
use crate::settings::Settings;

pub mod types;
pub mod utils;
pub mod visiblemeasures;

pub use types::{
    AdapterContext, Bid, BidParams, BidRequest, ConsentData, MediaType, ServerRequest,
    ServerResponse, SyncOptions, SyncType, UserSync,
};

/// Trait implemented by bid adapters registered with the host.
pub trait BidAdapter: Send + Sync {
    /// Bidder code the host uses for targeting and reporting.
    fn bidder_code(&self) -> &'static str;

    /// Media kinds this adapter bids on.
    fn supported_media_types(&self) -> &[MediaType];

    /// Whether an impression carries the parameters this bidder needs.
    fn is_bid_request_valid(&self, bid: &BidRequest) -> bool;

    /// Shape outgoing server requests for a batch of valid impressions.
    fn build_requests(
        &self,
        bids: &[BidRequest],
        ctx: &AdapterContext,
    ) -> Result<Vec<ServerRequest>, Report<ModuleError>>;

    /// Map a server response back to host bids.
    fn interpret_response(
        &self,
        response: &ServerResponse,
    ) -> Result<Vec<Bid>, Report<ModuleError>>;

    /// User-sync assets the host should load after the auction.
    fn get_user_syncs(&self, options: &SyncOptions, consent: &ConsentData) -> Vec<UserSync>;
}

type AdapterBuilder = fn(&Settings) -> Option<Arc<dyn BidAdapter>>;

fn builders() -> &'static [AdapterBuilder] {
    &[visiblemeasures::register]
}

/// In-memory registry of bid adapters discovered from settings.
#[derive(Clone, Default)]
pub struct BidderRegistry {
    adapters: Vec<Arc<dyn BidAdapter>>,
}

impl BidderRegistry {
    /// Build a registry from the provided settings.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let mut adapters = Vec::new();
        for builder in builders() {
            if let Some(adapter) = builder(settings) {
                log::info!("Registered bid adapter: {}", adapter.bidder_code());
                adapters.push(adapter);
            }
        }
        Self { adapters }
    }

    /// Look up an adapter by bidder code.
    #[must_use]
    pub fn adapter(&self, code: &str) -> Option<&Arc<dyn BidAdapter>> {
        self.adapters.iter().find(|a| a.bidder_code() == code)
    }

    /// Registered bidder codes, in registration order.
    #[must_use]
    pub fn codes(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.bidder_code()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
