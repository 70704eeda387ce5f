//! Binary persistence of the raw-text registry
//!
//! Only raw text is persisted, as `namespace -> qualified name -> text`.
//! Parse trees and associations are always rebuilt on restore. Ordered maps
//! keep the encoding deterministic: the same registry content always yields
//! the same bytes. There is no version field; a format change is breaking.

use std::collections::BTreeMap;

use crate::error::CodecError;

/// Raw text of every namespace
pub type RawTextMap = BTreeMap<String, BTreeMap<String, String>>;

/// Encode the raw-text map
pub fn encode(raw: &RawTextMap) -> Result<Vec<u8>, CodecError> {
    postcard::to_stdvec(raw).map_err(CodecError::Encode)
}

/// Decode a raw-text map, rejecting truncated input and trailing bytes
pub fn decode(bytes: &[u8]) -> Result<RawTextMap, CodecError> {
    let (raw, rest): (RawTextMap, &[u8]) =
        postcard::take_from_bytes(bytes).map_err(|e| CodecError::Malformed {
            reason: e.to_string(),
        })?;

    if !rest.is_empty() {
        return Err(CodecError::Malformed {
            reason: format!("{} trailing bytes after bundle", rest.len()),
        });
    }

    Ok(raw)
}
