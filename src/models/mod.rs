//! Domain models for liberty-features.
//!
//! # Core Concepts
//!
//! - [`Feature`]: A capability published for one Liberty release. Only features
//!   with `PUBLIC` visibility are ever kept in memory.
//! - [`BuildDescriptor`]: A `pom.xml` found in a workspace together with the
//!   Liberty release Maven reported for it.
//! - [`WorkspaceFolder`]: A root the editor host told us about. Configuration
//!   files are attributed to the first folder that contains them.

mod build_file;
mod feature;
mod workspace;

pub use build_file::*;
pub use feature::*;
pub use workspace::*;

/// File name of a Liberty server configuration.
pub const SERVER_XML: &str = "server.xml";

/// File name of the Maven build descriptor.
pub const POM_XML: &str = "pom.xml";

/// Visibility value of features that users may list in `server.xml`.
pub const PUBLIC_VISIBILITY: &str = "PUBLIC";

/// Release of the bundled feature dataset, used when no version is known.
pub const DEFAULT_LIBERTY_VERSION: &str = "20.0.0.9";

/// Whether the URI or path names a `server.xml`.
pub fn is_server_xml(uri: &str) -> bool {
    uri.ends_with(&format!("/{}", SERVER_XML))
}

/// Whether the URI or path names a `pom.xml`.
pub fn is_pom_xml(uri: &str) -> bool {
    uri.ends_with(&format!("/{}", POM_XML))
}
