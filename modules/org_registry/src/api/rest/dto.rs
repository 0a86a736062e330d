//! REST DTOs with serde derives for HTTP API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ===== Organization DTOs =====

/// Organization response DTO. Embedded legacy payloads are never echoed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationDto {
    pub id: Uuid,

    #[schema(example = "Junta de Vecinos Villa Los Aromos")]
    pub name: String,

    /// Whether reads come from the normalized collections
    pub is_normalized: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_at: Option<chrono::DateTime<chrono::Utc>>,

    /// 1 = legacy, 2 = normalized
    #[schema(example = 2)]
    pub schema_version: i32,

    pub member_ids: Vec<Uuid>,

    pub document_ids: Vec<Uuid>,

    /// Creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Last update timestamp
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Organization with its resolved member lists
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizationWithMembersDto {
    pub organization: OrganizationDto,
    pub members: Vec<MemberDto>,
    pub electoral_commission: Vec<MemberDto>,
}

// ===== Member DTOs =====

/// Member response DTO, identical for both storage formats
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberDto {
    /// Absent when read from embedded data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    #[schema(example = "12.345.678-9")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rut: Option<String>,

    pub first_name: String,

    pub last_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub primer_nombre: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub segundo_nombre: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub apellido_paterno: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub apellido_materno: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[schema(example = "member")]
    pub role: String,

    pub is_founding_member: bool,

    pub is_electoral_commission: bool,

    pub is_provisional_board: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisional_role: Option<String>,

    /// Position in the source array
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_index: Option<u32>,

    /// Base64 signature, only when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Base64 certificate, only when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
}

/// List of members
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberListResponse {
    pub items: Vec<MemberDto>,
    pub total: usize,
}

/// Provisional board seats
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProvisionalBoardDto {
    pub president: Option<MemberDto>,
    pub secretary: Option<MemberDto>,
    pub treasurer: Option<MemberDto>,
    /// Board members whose provisional role matches no seat
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unassigned: Vec<MemberDto>,
}

// ===== Document DTOs =====

/// A single Base64 signature
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignatureDto {
    #[schema(example = "ministro")]
    pub key: String,
    pub content: String,
}

/// Aggregate payload statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentStatsDto {
    pub total_size_bytes: u64,
    pub total_size_kb: f64,
    pub total_size_mb: f64,
    pub signature_count: usize,
    pub certificate_count: usize,
    pub document_count: usize,
    pub is_normalized: bool,
    pub schema_version: i32,
}

// ===== Normalization DTOs =====

/// Batch run request (migration or rollback)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NormalizationRequest {
    /// Plan and count without writing
    #[serde(default)]
    pub dry_run: bool,

    /// Organizations per batch
    #[serde(default = "default_batch_size")]
    #[schema(example = 10)]
    pub batch_size: usize,

    /// Restrict the run to one organization
    #[serde(default)]
    pub organization_id: Option<Uuid>,
}

fn default_batch_size() -> usize {
    crate::contract::DEFAULT_BATCH_SIZE
}

/// One organization that failed during a run
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordFailureDto {
    pub organization_id: Uuid,
    pub error: String,
}

/// Migration run counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MigrationSummaryDto {
    pub dry_run: bool,
    pub processed: usize,
    pub migrated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub members_created: usize,
    pub documents_created: usize,
    pub failures: Vec<RecordFailureDto>,
}

/// Rollback run counters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RollbackSummaryDto {
    pub dry_run: bool,
    pub processed: usize,
    pub rolled_back: usize,
    pub skipped: usize,
    pub errors: usize,
    pub members_deleted: usize,
    pub documents_deleted: usize,
    pub failures: Vec<RecordFailureDto>,
}
