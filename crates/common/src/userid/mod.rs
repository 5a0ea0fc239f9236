//! User-identity submodule seam and registry.
//!
//! Submodules supply an id payload for bid requests through three
//! operations: a deferred acquisition (`get_id`), a stored-value decoder
//! (`decode`), and extended-id assembly (`eids`). The registry only
//! discovers and looks up submodules; caching, refresh, and timeout
//! policy belong to the embedding host.

use std::sync::Arc;

use serde_json::Value;

use crate::settings::Settings;

pub mod eids;
pub mod onekey;
pub mod types;

pub use types::{Identifier, IdentityEnvelope, IdsAndPreferences};

/// Continuation invoked with the acquired payload, or `None` when the
/// provider is unavailable.
pub type IdCallback = Box<dyn FnOnce(Option<IdsAndPreferences>) + Send + 'static>;

/// Deferred acquisition produced by [`UserIdSubmodule::get_id`]. Invoking
/// it arms the retrieval; the continuation fires at some later point, or
/// never.
pub type AcquisitionFn = Box<dyn FnOnce(IdCallback) + Send + 'static>;

/// Host-side configuration handed to a submodule on acquisition. Opaque
/// from the submodule's perspective; none of the current submodules
/// consult it.
#[derive(Debug, Clone, Default)]
pub struct SubmoduleConfig {
    pub name: String,
    pub params: Value,
}

/// Result of [`UserIdSubmodule::get_id`]: always a callback, never a
/// synchronously available id.
pub struct IdResponse {
    pub callback: AcquisitionFn,
}

/// Trait implemented by user-identity submodules.
pub trait UserIdSubmodule: Send + Sync {
    /// Name the submodule registers under, used by the host to link
    /// configuration to the implementation.
    fn name(&self) -> &'static str;

    /// Wrap the stored data value for passing to bid requests. Must not
    /// fail and must not inspect the value's shape.
    fn decode(&self, data: &Value) -> Value;

    /// Arm an id acquisition. The host drives the returned callback and
    /// applies its own timeout policy; submodules promise nothing about
    /// when (or whether) the continuation fires.
    fn get_id(&self, config: &SubmoduleConfig) -> IdResponse;

    /// Extended ids derived from the stored data value for
    /// `user.ext.eids` on outgoing bid requests.
    fn eids(&self, data: &Value) -> Vec<eids::Eid> {
        let _ = data;
        Vec::new()
    }
}

type SubmoduleBuilder = fn(&Settings) -> Option<Arc<dyn UserIdSubmodule>>;

fn builders() -> &'static [SubmoduleBuilder] {
    &[onekey::register]
}

/// In-memory registry of user-identity submodules discovered from
/// settings.
#[derive(Clone, Default)]
pub struct UserIdRegistry {
    submodules: Vec<Arc<dyn UserIdSubmodule>>,
}

impl UserIdRegistry {
    /// Build a registry from the provided settings.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let mut submodules = Vec::new();
        for builder in builders() {
            if let Some(submodule) = builder(settings) {
                log::info!("Registered user-id submodule: {}", submodule.name());
                submodules.push(submodule);
            }
        }
        Self { submodules }
    }

    /// Look up a submodule by its registration name.
    #[must_use]
    pub fn submodule(&self, name: &str) -> Option<&Arc<dyn UserIdSubmodule>> {
        self.submodules.iter().find(|s| s.name() == name)
    }

    /// Registration names, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.submodules.iter().map(|s| s.name()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.submodules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.submodules.is_empty()
    }

    /// Arm an acquisition for every registered submodule. Continuation
    /// timing is submodule-specific; the caller owns any deadline.
    #[must_use]
    pub fn request_ids(&self, config: &SubmoduleConfig) -> Vec<(&'static str, IdResponse)> {
        self.submodules
            .iter()
            .map(|s| (s.name(), s.get_id(config)))
            .collect()
    }
}
