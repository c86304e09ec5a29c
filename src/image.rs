//! Inline image embedding for read responses.
//!
//! Stored images are raw bytes plus an optional MIME type. Reads return them as
//! `data:` URIs so a client can drop the value straight into an `<img src>`.
//! The list and detail endpoints disagree on what to do when the MIME type is
//! missing, and both behaviours are kept:
//!
//! - [`embed_if_typed`] (list) yields nothing unless bytes *and* type are present.
//! - [`embed_or_default`] (detail) falls back to [`DEFAULT_IMAGE_TYPE`].

use base64::{engine::general_purpose, Engine as _};

pub const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

/// Encodes `bytes` as `data:<mime>;base64,<payload>`.
pub fn data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}

pub fn embed_if_typed(bytes: Option<&[u8]>, mime: Option<&str>) -> Option<String> {
    let mime = mime.filter(|m| !m.is_empty())?;
    bytes.map(|bytes| data_uri(bytes, mime))
}

pub fn embed_or_default(bytes: Option<&[u8]>, mime: Option<&str>) -> Option<String> {
    let mime = mime.filter(|m| !m.is_empty()).unwrap_or(DEFAULT_IMAGE_TYPE);
    bytes.map(|bytes| data_uri(bytes, mime))
}
