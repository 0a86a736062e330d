//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.

pub mod client;
pub mod error;
pub mod model;

pub use client::OrganizationRegistryApi;
pub use error::RegistryError;
pub use model::{
    calculate_size, ContactInfo, Document, DocumentContext, DocumentSource, DocumentStats,
    DocumentType, IncludeOptions, LegacyContent, LegacyMember, Member, MemberRole, MemberSource,
    MemberView, MigrationOptions, MigrationOutcome, MigrationSummary, MinistroAssignment,
    NameParts, Organization, OrganizationWithMembers, ProvisionalBoard, ProvisionalDirectorio,
    ProvisionalSeat, RecordFailure, RollbackOutcome, RollbackSummary, SchemaVersion, SignerInfo,
    ValidationData, DEFAULT_BATCH_SIZE,
};
