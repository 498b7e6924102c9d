//! # labkey-core
//!
//! Core library for querying one or more LabKey servers.
//!
//! A config document lists servers (with shared defaults); each resolves to an
//! independent [`LabKeyClient`] holding its own session. Queries are written
//! in caller-facing column names, translated to the server's native names,
//! and the rows come back relabelled and ordered.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use labkey_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> labkey_core::Result<()> {
//!     let registry = InstanceRegistry::load(None)?;
//!
//!     for mut client in registry.into_clients()? {
//!         client.login(None, None).await?;
//!         let filters = FilterSpec::new().with("gender~eq", "Male");
//!         let table = client.query(&filters).await?;
//!         println!("{}: {} rows", client.host(), table.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`]: HTTP client (`login`, `query`) and wire models
//! - [`core`]: instance registry, alias translation, native requests, result tables
//! - [`storage`]: config document loading (YAML / TOML)
//! - [`utils`]: template substitution, validation, re-login policy
//! - [`error`]: hierarchical error system with troubleshooting hints

pub use error::AppError;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::Result;
    pub use crate::error::AppError;

    pub use crate::api::client::LabKeyClient;
    pub use crate::core::filters::FilterSpec;
    pub use crate::core::instance::InstanceConfig;
    pub use crate::core::registry::InstanceRegistry;
    pub use crate::core::table::{ResponseMetadata, ResultTable, Row};
    pub use crate::storage::config::ConfigDocument;
    pub use crate::utils::retry::query_with_relogin;
}

pub mod api;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;

/// Convenient Result type alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[doc(hidden)]
pub use crate::api::client::LabKeyClient;
#[doc(hidden)]
pub use crate::core::filters::FilterSpec;
#[doc(hidden)]
pub use crate::core::registry::InstanceRegistry;
#[doc(hidden)]
pub use crate::core::table::ResultTable;
