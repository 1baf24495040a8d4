//! Content envelopes and frame (de)serialization helpers (spec §4.4, §4.5, §6).
//!
//! Bus messages are length-delimited framed JSON objects discriminated by a
//! `type` field; consumers route on it. This module provides the generic
//! encode/decode helpers and the inline-vs-reference content envelope that
//! every subsystem's wire types build on.

use crate::cid::Cid;
use crate::error::StrandError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    // Encoding a value we constructed ourselves never fails.
    serde_json::to_vec(value).expect("wire value must serialize")
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> crate::error::Result<T> {
    serde_json::from_slice(bytes).map_err(|e| StrandError::Corrupted(e.to_string()))
}

/// Metadata describing a blob stored in the Content Store (spec §4.5).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentReference {
    pub cid: Cid,
    pub size: u64,
    pub mime: String,
    pub created_by: String,
}

/// Inline-vs-reference content policy envelope (spec §4.4).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentEnvelope {
    Inline { bytes: Vec<u8> },
    Reference { reference: ContentReference },
}

/// Default byte threshold above which a payload is stored by CID rather
/// than sent inline.
pub const DEFAULT_CONTENT_THRESHOLD: usize = 8 * 1024;
