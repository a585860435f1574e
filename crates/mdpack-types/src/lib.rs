//! Foundation types for mdpack.
//!
//! Every other mdpack crate depends on `mdpack-types`.
//!
//! # Key Types
//!
//! - [`ArtifactPath`] -- A source file identified by its path relative to the project root
//! - [`Fingerprint`] -- BLAKE3 digest of an artifact's bytes, used for change detection

pub mod artifact;
pub mod error;
pub mod fingerprint;

pub use artifact::{is_companion_name, ArtifactPath, COMPANION_SUFFIX, RULE_FILE_NAME};
pub use error::TypeError;
pub use fingerprint::Fingerprint;
