//! Organization Registry Module
//!
//! Community organization records in two schema generations: legacy records
//! embed members and Base64 payloads, normalized records reference separate
//! member and document collections. The accessor reads either format and the
//! migration engine converts between them.

// Public exports
pub mod contract;
pub use contract::{
    client::OrganizationRegistryApi, error::RegistryError, DocumentStats, IncludeOptions,
    MemberView, MigrationOptions, MigrationSummary, Organization, OrganizationWithMembers,
    ProvisionalBoard, RollbackSummary,
};

pub mod module;
pub use module::OrgRegistryModule;

pub mod config;
pub use config::Config;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
