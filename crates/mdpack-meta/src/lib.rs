//! Package metadata for mdpack.
//!
//! - [`MetadataSynthesizer`] -- minimal companion descriptors for artifacts
//!   that ship without a hand-authored one
//! - [`Manifest`] -- the package-level `package.xml`
//!
//! All generated XML uses CRLF line endings. Artifact names are escaped
//! before they are written into element text.

use std::borrow::Cow;

pub mod manifest;
pub mod synthesizer;

pub use manifest::{Manifest, CATEGORIES, MANIFEST_FILE_NAME};
pub use synthesizer::MetadataSynthesizer;

/// Default target API version.
pub const DEFAULT_API_VERSION: u32 = 34;

/// Namespace of every generated document.
pub const METADATA_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";

pub(crate) const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub(crate) const LINE_ENDING: &str = "\r\n";

/// Escape the XML special characters of `text` for use in element text.
pub(crate) fn escape_xml(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
