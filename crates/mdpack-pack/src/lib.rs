//! Package assembly and archiving for mdpack.
//!
//! # Architecture
//!
//! - **Assembler**: copies planned artifacts into the staging tree, places
//!   companion descriptors and writes `package.xml`
//! - **ArchiveWriter**: streams the staging tree into a ZIP rooted at
//!   `unpackaged/`, atomically replacing the destination on success
//! - **mock**: placeholder static resources for test deployments

pub mod archive;
pub mod assembler;
pub mod companion;
pub mod error;
pub mod mock;

pub use archive::{ArchiveSummary, ArchiveWriter, ARCHIVE_ROOT};
pub use assembler::{clear_staging, Assembler, AssemblyReport};
pub use companion::CompanionIndex;
pub use error::{PackError, PackResult};
pub use mock::{mock_resource, STATIC_RESOURCE_FOLDER};
