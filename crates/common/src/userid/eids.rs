//! Extended-id views over the identifier payload.
//!
//! Every extraction is defensive: a missing payload, an absent sequence,
//! or an empty one all yield `None` rather than panicking.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::userid::types::IdsAndPreferences;

/// OpenRTB `user.ext.eids` source for OneKey identifiers.
pub const EID_SOURCE: &str = "paf";

/// Agent type for a browser-scoped person identifier.
pub const EID_ATYPE: u8 = 1;

/// First identifier's value, if any.
#[must_use]
pub fn get_value(data: Option<&IdsAndPreferences>) -> Option<&str> {
    data.and_then(|d| d.identifiers.first())
        .map(|id| id.value.as_str())
}

/// Eid-level extension carrying the consent preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EidExt {
    pub preferences: Value,
}

/// Extension present only when the payload carries preferences.
#[must_use]
pub fn get_eid_ext(data: Option<&IdsAndPreferences>) -> Option<EidExt> {
    data.and_then(|d| d.preferences.clone())
        .map(|preferences| EidExt { preferences })
}

/// Uid-level extension copied from the first identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UidExt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[must_use]
pub fn get_uid_ext(data: Option<&IdsAndPreferences>) -> Option<UidExt> {
    data.and_then(|d| d.identifiers.first()).map(|id| UidExt {
        version: id.version.clone(),
        id_type: id.id_type.clone(),
        source: id.source.clone(),
    })
}

/// Single uid entry inside an eid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uid {
    pub id: String,
    pub atype: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<UidExt>,
}

/// OpenRTB extended identifier assembled from the identifier payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eid {
    pub source: String,
    pub uids: Vec<Uid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<EidExt>,
}

/// Assemble the `user.ext.eids` entry, or `None` without a first
/// identifier.
#[must_use]
pub fn to_eid(data: Option<&IdsAndPreferences>) -> Option<Eid> {
    let value = get_value(data)?;
    Some(Eid {
        source: EID_SOURCE.to_string(),
        uids: vec![Uid {
            id: value.to_string(),
            atype: EID_ATYPE,
            ext: get_uid_ext(data),
        }],
        ext: get_eid_ext(data),
    })
}
