//! SQLite store access and template rendering for a minimal website.
//!
//! # Intention
//!
//! - Provide table-agnostic CRUD primitives over a single SQLite file.
//! - Render HTML template files against per-call data contexts.
//! - Encapsulate driver and template-engine error handling.
//!
//! # Architectural Boundaries
//!
//! - Only store access, template rendering, and their configuration belong
//!   here.
//! - Page composition and template authoring live with the caller.

pub mod config;
pub mod error;
pub mod page;
pub mod store;

pub use config::Config;
pub use error::{ConfigError, RenderError, StoreError};
pub use page::{Page, PageData};
pub use store::{Fields, Record, Store, Value};
