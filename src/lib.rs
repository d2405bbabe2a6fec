//! Liberty release resolution and feature catalog for `server.xml` editing.
//!
//! Editing assistance asks one question over and over: does feature `X` exist
//! for the project that owns this configuration file? Answering it takes three
//! pieces, wired together by [`VersionFeatureFacade`]:
//!
//! - [`WorkspaceResolver`]: which workspace folder owns the file, and where its
//!   build descriptor probably is.
//! - [`BuildFileIndex`]: which Liberty release each `pom.xml` targets, as
//!   reported by the Liberty Maven Plugin.
//! - [`FeatureCatalog`]: which features that release publishes, cached and
//!   throttled, with the bundled dataset as the last resort.

pub mod build_files;
pub mod catalog;
pub mod config;
pub mod facade;
pub mod models;
pub mod sources;
pub mod workspace;

pub use build_files::BuildFileIndex;
pub use catalog::FeatureCatalog;
pub use config::{FetchPolicy, Settings};
pub use facade::VersionFeatureFacade;
pub use workspace::WorkspaceResolver;
