//! Domain layer - business logic and services

pub mod accessor;
pub mod events;
pub mod legacy;
pub mod migration;
pub mod planner;
pub mod repository;
pub mod service;
pub mod size;

pub use accessor::{FormatReader, LegacyReader, NormalizedReader, OrganizationAccessor};
pub use events::{
    NoOpProgressReporter, NormalizationEvent, ProgressReporter, TracingProgressReporter,
};
pub use migration::MigrationEngine;
pub use planner::{plan_migration, MigrationPlan, RollbackPlan};
pub use repository::{
    AlreadyNormalized, DocumentRepository, MemberRepository, NormalizationStore, NotNormalized,
    OrganizationRepository,
};
pub use service::Service;
