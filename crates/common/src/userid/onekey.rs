//! OneKey identity bridge submodule.
//!
//! The OneKey vendor loads and configures itself outside this library,
//! at a time nobody here controls. Every retrieval is therefore parked
//! as a command on a process-wide namespace queue; the vendor drains the
//! queue once it is ready. The bridge never waits on the vendor itself:
//! if the queue is never drained, the host's continuation simply never
//! fires, and the host's own deadline policy decides what that means.
//!
//! Failures are absorbed here. The host only ever observes "got a
//! payload" or "got nothing"; the reasons stay in the logs.

use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use error_stack::Report;
use futures::future::BoxFuture;
use futures::FutureExt;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::error::ModuleError;
use crate::settings::Settings;
use crate::userid::types::{IdentityEnvelope, IdsAndPreferences, RetrievalOutcome};
use crate::userid::{eids, IdCallback, IdResponse, SubmoduleConfig, UserIdSubmodule};

/// Name the bridge registers under with the host's user-id layer.
pub const ONEKEY_SUBMODULE_NAME: &str = "oneKeyData";

const LOG_PREFIX: &str = "OneKey.Id-Module";

/// Asynchronous retrieval surface the vendor exposes once loaded.
#[async_trait]
pub trait OneKeyVendor: Send + Sync {
    /// Resolve the `{status, data}` envelope. A rejection carries no
    /// payload the bridge can use; it collapses to "unavailable".
    async fn get_ids_and_preferences(&self) -> Result<Value, Report<ModuleError>>;
}

/// Command parked on the namespace queue until the vendor drains it.
type QueuedCommand = Box<dyn FnOnce(Arc<dyn OneKeyVendor>) -> BoxFuture<'static, ()> + Send>;

/// Process-wide rendezvous between the bridge and the vendor.
///
/// The bridge appends commands; the vendor harness installs itself and
/// drains. Commands enqueued before any vendor exists stay parked, so
/// enqueue order never races vendor load order. Once parked, a command
/// cannot be withdrawn.
#[derive(Default)]
pub struct OneKeyNamespace {
    queue: Mutex<Vec<QueuedCommand>>,
    vendor: RwLock<Option<Arc<dyn OneKeyVendor>>>,
}

static GLOBAL_NAMESPACE: Lazy<Arc<OneKeyNamespace>> =
    Lazy::new(|| Arc::new(OneKeyNamespace::default()));

impl OneKeyNamespace {
    /// The process-wide namespace, created empty on first touch from
    /// either side of the rendezvous.
    #[must_use]
    pub fn global() -> Arc<OneKeyNamespace> {
        Arc::clone(&GLOBAL_NAMESPACE)
    }

    /// A private namespace, for hosts that scope the vendor themselves
    /// and for tests that drain synchronously.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command in FIFO position.
    pub fn enqueue<F>(&self, command: F)
    where
        F: FnOnce(Arc<dyn OneKeyVendor>) -> BoxFuture<'static, ()> + Send + 'static,
    {
        self.queue
            .lock()
            .expect("onekey queue poisoned")
            .push(Box::new(command));
    }

    /// Number of commands currently parked.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.lock().expect("onekey queue poisoned").len()
    }

    /// Install the vendor implementation. Draining stays a separate,
    /// vendor-initiated step.
    pub fn install(&self, vendor: Arc<dyn OneKeyVendor>) {
        *self.vendor.write().expect("onekey vendor slot poisoned") = Some(vendor);
    }

    /// Run every parked command against the installed vendor, in FIFO
    /// order, and return how many ran. Without an installed vendor this
    /// is a no-op and the queue is left intact.
    pub async fn drain(&self) -> usize {
        let vendor = self
            .vendor
            .read()
            .expect("onekey vendor slot poisoned")
            .clone();
        let Some(vendor) = vendor else {
            log::warn!("{LOG_PREFIX}: drain requested but no vendor installed");
            return 0;
        };

        let commands: Vec<QueuedCommand> =
            std::mem::take(&mut *self.queue.lock().expect("onekey queue poisoned"));
        let count = commands.len();
        for command in commands {
            command(Arc::clone(&vendor)).await;
        }
        count
    }
}

/// Wrap the stored data value for bid-request consumption. Pure
/// pass-through: the shape of `data` is never inspected.
#[must_use]
pub fn decode(data: &Value) -> Value {
    json!({ "oneKeyData": data })
}

/// Park a retrieval on the vendor queue. The continuation fires whenever
/// the vendor gets around to draining, which may be never.
fn get_ids_and_preferences(namespace: &OneKeyNamespace, callback: IdCallback) {
    log::debug!("{LOG_PREFIX}: queue get_ids_and_preferences call");
    namespace.enqueue(move |vendor| {
        async move {
            log::debug!("{LOG_PREFIX}: get ids and prefs");
            let outcome = match vendor.get_ids_and_preferences().await {
                Ok(raw) => narrow_envelope(raw),
                Err(report) => {
                    let report = report.change_context(ModuleError::Submodule {
                        submodule: ONEKEY_SUBMODULE_NAME.to_string(),
                        message: "cannot retrieve the ids and preferences".to_string(),
                    });
                    log::error!("{LOG_PREFIX}: {report:?}");
                    RetrievalOutcome::Unavailable
                }
            };
            if let RetrievalOutcome::Resolved(ref envelope) = outcome {
                log::info!(
                    "{LOG_PREFIX}: has got ids and prefs with status: {:?}",
                    envelope.status
                );
            }
            callback(outcome.into_payload());
        }
        .boxed()
    });
}

/// Narrow the loosely-typed vendor envelope at the boundary.
fn narrow_envelope(raw: Value) -> RetrievalOutcome {
    match serde_json::from_value::<IdentityEnvelope>(raw) {
        Ok(envelope) => RetrievalOutcome::Resolved(envelope),
        Err(err) => {
            log::error!("{LOG_PREFIX}: malformed envelope: {}", ModuleError::Json(err));
            RetrievalOutcome::Unavailable
        }
    }
}

/// OneKey user-identity submodule.
pub struct OneKeySubmodule {
    namespace: Arc<OneKeyNamespace>,
}

impl OneKeySubmodule {
    /// Submodule bound to the process-wide namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::with_namespace(OneKeyNamespace::global())
    }

    /// Submodule bound to a caller-scoped namespace.
    #[must_use]
    pub fn with_namespace(namespace: Arc<OneKeyNamespace>) -> Self {
        Self { namespace }
    }
}

impl Default for OneKeySubmodule {
    fn default() -> Self {
        Self::new()
    }
}

impl UserIdSubmodule for OneKeySubmodule {
    fn name(&self) -> &'static str {
        ONEKEY_SUBMODULE_NAME
    }

    fn decode(&self, data: &Value) -> Value {
        decode(data)
    }

    fn get_id(&self, _config: &SubmoduleConfig) -> IdResponse {
        let namespace = Arc::clone(&self.namespace);
        IdResponse {
            callback: Box::new(move |callback: IdCallback| {
                get_ids_and_preferences(&namespace, callback);
            }),
        }
    }

    fn eids(&self, data: &Value) -> Vec<eids::Eid> {
        let payload = serde_json::from_value::<IdsAndPreferences>(data.clone()).ok();
        eids::to_eid(payload.as_ref()).into_iter().collect()
    }
}

fn build(settings: &Settings) -> Option<Arc<OneKeySubmodule>> {
    if !settings.onekey.enabled {
        return None;
    }
    Some(Arc::new(OneKeySubmodule::new()))
}

/// Register the OneKey submodule when enabled.
#[must_use]
pub fn register(settings: &Settings) -> Option<Arc<dyn UserIdSubmodule>> {
    build(settings).map(|submodule| submodule as Arc<dyn UserIdSubmodule>)
}
