//! Data model for the identity retrieval boundary.
//!
//! The vendor resolves loosely-typed JSON; these types narrow it once at
//! the edge so everything downstream works with a known shape. Unknown
//! fields are kept in `extra` maps so re-serialization never drops them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{status, data}` wrapper resolved by the vendor's retrieval call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityEnvelope {
    /// Opaque vendor status, logged but never branched on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<IdsAndPreferences>,
    #[serde(default, flatten)]
    pub extra: HashMap<String, Value>,
}

/// Identifier bundle carried inside the envelope.
///
/// An absent `identifiers` sequence deserializes to an empty one; both
/// mean "no value" to every consumer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdsAndPreferences {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<Identifier>,
    /// Opaque consent-preference payload, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Value>,
    #[serde(default, flatten)]
    pub extra: HashMap<String, Value>,
}

/// A single identifier record. All fields besides `value` are opaque
/// pass-through strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, flatten)]
    pub extra: HashMap<String, Value>,
}

/// Internal narrowing of the vendor boundary. The contract towards the
/// host stays binary (`Some(payload)` / `None`); the richer kind exists
/// for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RetrievalOutcome {
    Resolved(IdentityEnvelope),
    Unavailable,
}

impl RetrievalOutcome {
    /// Collapse to the payload handed to the host's continuation. A
    /// resolved envelope without `data` forwards nothing, not an error.
    pub(crate) fn into_payload(self) -> Option<IdsAndPreferences> {
        match self {
            RetrievalOutcome::Resolved(envelope) => envelope.data,
            RetrievalOutcome::Unavailable => None,
        }
    }
}
