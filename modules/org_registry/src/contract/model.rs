//! Contract models for the organization registry
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - storage and REST layers have their own representations.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ===== Organization (aggregate root) =====

/// Community organization record covering both schema generations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: Uuid,
    /// Registered name
    pub name: String,
    /// Embedded (schema v1) content. Never deleted by normalization.
    pub legacy: LegacyContent,
    /// Ordered references into the member collection (schema v2)
    pub member_ids: Vec<Uuid>,
    /// References into the document collection (schema v2)
    pub document_ids: Vec<Uuid>,
    pub is_normalized: bool,
    pub normalized_at: Option<DateTime<Utc>>,
    pub schema_version: SchemaVersion,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// New organization in legacy format, as the registration workflow creates it
    pub fn new_legacy(name: impl Into<String>, legacy: LegacyContent) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            legacy,
            member_ids: Vec::new(),
            document_ids: Vec::new(),
            is_normalized: false,
            normalized_at: None,
            schema_version: SchemaVersion::Legacy,
            created_at: now,
            updated_at: now,
        }
    }

    /// Which generation is the source of truth for reads
    pub fn storage_format(&self) -> SchemaVersion {
        if self.is_normalized {
            SchemaVersion::Normalized
        } else {
            SchemaVersion::Legacy
        }
    }
}

/// Schema generation tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// Members and payloads embedded in the organization record
    Legacy,
    /// Members and documents in their own collections
    Normalized,
}

impl SchemaVersion {
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Legacy => 1,
            Self::Normalized => 2,
        }
    }

    /// Unknown numbers fall back to the legacy generation
    pub fn from_i32(value: i32) -> Self {
        match value {
            2 => Self::Normalized,
            _ => Self::Legacy,
        }
    }
}

/// Embedded schema v1 content of an organization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyContent {
    pub members: Vec<LegacyMember>,
    pub electoral_commission: Vec<LegacyMember>,
    pub provisional_directorio: Option<ProvisionalDirectorio>,
    pub ministro_signature: Option<String>,
    pub validation_data: Option<ValidationData>,
    pub ministro_assignment: Option<MinistroAssignment>,
}

/// Member entry as embedded in legacy records. Every field is optional
/// because the source data predates any validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyMember {
    pub rut: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub primer_nombre: Option<String>,
    pub segundo_nombre: Option<String>,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    /// Base64 signature image
    pub signature: Option<String>,
    /// Base64 certificate
    pub certificate: Option<String>,
}

/// Embedded provisional board (directorio provisorio)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionalDirectorio {
    pub president: Option<LegacyMember>,
    pub secretary: Option<LegacyMember>,
    pub treasurer: Option<LegacyMember>,
}

impl ProvisionalDirectorio {
    /// Seats in fixed order with their slot name
    pub fn seats(&self) -> [(ProvisionalSeat, Option<&LegacyMember>); 3] {
        [
            (ProvisionalSeat::President, self.president.as_ref()),
            (ProvisionalSeat::Secretary, self.secretary.as_ref()),
            (ProvisionalSeat::Treasurer, self.treasurer.as_ref()),
        ]
    }
}

/// Signatures collected by the validation wizard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationData {
    pub signatures: BTreeMap<String, String>,
    pub ministro_signature: Option<String>,
}

/// Ministro de fe assigned to the constitution assembly
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinistroAssignment {
    pub name: Option<String>,
    pub rut: Option<String>,
}

/// The three provisional board seats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisionalSeat {
    President,
    Secretary,
    Treasurer,
}

impl ProvisionalSeat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::President => "president",
            Self::Secretary => "secretary",
            Self::Treasurer => "treasurer",
        }
    }

    /// Exact seat names only; anything else is not a seat
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "president" => Some(Self::President),
            "secretary" => Some(Self::Secretary),
            "treasurer" => Some(Self::Treasurer),
            _ => None,
        }
    }
}

// ===== Member (normalized) =====

/// Normalized member record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// National id (RUT); a `TEMP-` placeholder when the source had none
    pub rut: String,
    pub first_name: String,
    pub last_name: String,
    pub name_parts: NameParts,
    pub contact: ContactInfo,
    pub role: MemberRole,
    pub is_founding_member: bool,
    pub is_electoral_commission: bool,
    pub is_provisional_board: bool,
    pub provisional_role: Option<String>,
    pub signature_id: Option<Uuid>,
    pub certificate_id: Option<Uuid>,
    pub migrated_from: Option<MemberSource>,
    pub original_index: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Structured Chilean name parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    pub primer_nombre: Option<String>,
    pub segundo_nombre: Option<String>,
    pub apellido_paterno: Option<String>,
    pub apellido_materno: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Member role within the organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberRole {
    President,
    VicePresident,
    Secretary,
    Treasurer,
    Director,
    Member,
    ElectoralCommission,
    Additional,
}

impl MemberRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::President => "president",
            Self::VicePresident => "vice_president",
            Self::Secretary => "secretary",
            Self::Treasurer => "treasurer",
            Self::Director => "director",
            Self::Member => "member",
            Self::ElectoralCommission => "electoral_commission",
            Self::Additional => "additional",
        }
    }
}

impl FromStr for MemberRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "president" => Ok(Self::President),
            "vice_president" => Ok(Self::VicePresident),
            "secretary" => Ok(Self::Secretary),
            "treasurer" => Ok(Self::Treasurer),
            "director" => Ok(Self::Director),
            "member" => Ok(Self::Member),
            "electoral_commission" => Ok(Self::ElectoralCommission),
            "additional" => Ok(Self::Additional),
            other => Err(UnknownVariant::new("member role", other)),
        }
    }
}

/// Legacy array a member was migrated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberSource {
    Members,
    ElectoralCommission,
}

impl MemberSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Members => "members",
            Self::ElectoralCommission => "electoralCommission",
        }
    }
}

impl FromStr for MemberSource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "members" => Ok(Self::Members),
            "electoralCommission" => Ok(Self::ElectoralCommission),
            other => Err(UnknownVariant::new("member source", other)),
        }
    }
}

// ===== Document (normalized) =====

/// Normalized binary document (Base64 content)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub member_id: Option<Uuid>,
    pub doc_type: DocumentType,
    content: String,
    pub mime_type: String,
    size: u64,
    pub signer: SignerInfo,
    pub context: DocumentContext,
    pub migrated_from: Option<DocumentSource>,
    pub original_path: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a document; `size` is derived from `content`
    pub fn new(
        organization_id: Uuid,
        doc_type: DocumentType,
        content: impl Into<String>,
        mime_type: impl Into<String>,
        context: DocumentContext,
    ) -> Self {
        let content = content.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            member_id: None,
            doc_type,
            size: calculate_size(&content),
            content,
            mime_type: mime_type.into(),
            signer: SignerInfo::default(),
            context,
            migrated_from: None,
            original_path: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Replace content and recompute size
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.size = calculate_size(&self.content);
        self.updated_at = Utc::now();
    }
}

/// Decoded byte count of a Base64 string: `floor(len * 3 / 4)`
pub fn calculate_size(content: &str) -> u64 {
    (content.len() as u64 * 3) / 4
}

/// Signer metadata attached to a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignerInfo {
    pub role: Option<String>,
    pub rut: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    Signature,
    Certificate,
    MinistroSignature,
    GroupPhoto,
    Acta,
    Estatutos,
    AttendeeList,
    Other,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::Certificate => "certificate",
            Self::MinistroSignature => "ministro_signature",
            Self::GroupPhoto => "group_photo",
            Self::Acta => "acta",
            Self::Estatutos => "estatutos",
            Self::AttendeeList => "attendee_list",
            Self::Other => "other",
        }
    }
}

impl FromStr for DocumentType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signature" => Ok(Self::Signature),
            "certificate" => Ok(Self::Certificate),
            "ministro_signature" => Ok(Self::MinistroSignature),
            "group_photo" => Ok(Self::GroupPhoto),
            "acta" => Ok(Self::Acta),
            "estatutos" => Ok(Self::Estatutos),
            "attendee_list" => Ok(Self::AttendeeList),
            "other" => Ok(Self::Other),
            other => Err(UnknownVariant::new("document type", other)),
        }
    }
}

/// Where a document was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentContext {
    ConstitutionAssembly,
    ValidationWizard,
    MemberRegistration,
    ManualUpload,
    Migration,
}

impl DocumentContext {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConstitutionAssembly => "constitution_assembly",
            Self::ValidationWizard => "validation_wizard",
            Self::MemberRegistration => "member_registration",
            Self::ManualUpload => "manual_upload",
            Self::Migration => "migration",
        }
    }
}

impl FromStr for DocumentContext {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constitution_assembly" => Ok(Self::ConstitutionAssembly),
            "validation_wizard" => Ok(Self::ValidationWizard),
            "member_registration" => Ok(Self::MemberRegistration),
            "manual_upload" => Ok(Self::ManualUpload),
            "migration" => Ok(Self::Migration),
            other => Err(UnknownVariant::new("document context", other)),
        }
    }
}

/// Embedded location kind a document was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentSource {
    MemberSignature,
    MemberCertificate,
    ElectoralCommissionSignature,
    ElectoralCommissionCertificate,
    MinistroSignature,
    ValidationSignature,
}

impl DocumentSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MemberSignature => "members.signature",
            Self::MemberCertificate => "members.certificate",
            Self::ElectoralCommissionSignature => "electoralCommission.signature",
            Self::ElectoralCommissionCertificate => "electoralCommission.certificate",
            Self::MinistroSignature => "ministroSignature",
            Self::ValidationSignature => "validationData.signatures",
        }
    }
}

impl FromStr for DocumentSource {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "members.signature" => Ok(Self::MemberSignature),
            "members.certificate" => Ok(Self::MemberCertificate),
            "electoralCommission.signature" => Ok(Self::ElectoralCommissionSignature),
            "electoralCommission.certificate" => Ok(Self::ElectoralCommissionCertificate),
            "ministroSignature" => Ok(Self::MinistroSignature),
            "validationData.signatures" => Ok(Self::ValidationSignature),
            other => Err(UnknownVariant::new("document source", other)),
        }
    }
}

/// Parse failure for a stored enumeration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

// ===== Read-side views =====

/// Format-independent member shape returned by the accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberView {
    /// `None` when read from embedded data
    pub id: Option<Uuid>,
    pub rut: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub name_parts: NameParts,
    pub contact: ContactInfo,
    pub role: MemberRole,
    pub is_founding_member: bool,
    pub is_electoral_commission: bool,
    pub is_provisional_board: bool,
    pub provisional_role: Option<String>,
    pub original_index: Option<u32>,
    pub signature: Option<String>,
    pub certificate: Option<String>,
}

/// Which payloads `get_organization_with_members` attaches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncludeOptions {
    pub include_signatures: bool,
    pub include_certificates: bool,
}

impl IncludeOptions {
    pub fn any(&self) -> bool {
        self.include_signatures || self.include_certificates
    }
}

/// Organization with its member lists resolved from the right source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationWithMembers {
    pub organization: Organization,
    pub members: Vec<MemberView>,
    pub electoral_commission: Vec<MemberView>,
}

/// Provisional board in its three-seat shape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionalBoard {
    pub president: Option<MemberView>,
    pub secretary: Option<MemberView>,
    pub treasurer: Option<MemberView>,
    /// Board members whose provisional role is not one of the three seats
    pub unassigned: Vec<MemberView>,
}

/// Aggregate Base64 payload statistics for an organization
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStats {
    pub total_size_bytes: u64,
    pub total_size_kb: f64,
    pub total_size_mb: f64,
    pub signature_count: usize,
    pub certificate_count: usize,
    pub document_count: usize,
    pub is_normalized: bool,
    pub schema_version: SchemaVersion,
}

// ===== Migration driver =====

/// Options for a batch run (migration or rollback)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOptions {
    pub dry_run: bool,
    pub batch_size: usize,
    /// Restrict the run to a single organization
    pub organization_id: Option<Uuid>,
}

pub const DEFAULT_BATCH_SIZE: usize = 10;

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            batch_size: DEFAULT_BATCH_SIZE,
            organization_id: None,
        }
    }
}

/// Result of migrating one organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Migrated {
        members_created: usize,
        documents_created: usize,
        anomalies: Vec<String>,
    },
    /// Already normalized; nothing written
    Skipped,
}

/// Result of rolling back one organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackOutcome {
    RolledBack {
        members_deleted: usize,
        documents_deleted: usize,
    },
    /// Not normalized; nothing written
    Skipped,
}

/// One organization that failed during a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub organization_id: Uuid,
    pub error: String,
}

/// Aggregate counters of a migration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub dry_run: bool,
    pub processed: usize,
    pub migrated: usize,
    pub skipped: usize,
    pub errors: usize,
    pub members_created: usize,
    pub documents_created: usize,
    pub failures: Vec<RecordFailure>,
}

/// Aggregate counters of a rollback run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackSummary {
    pub dry_run: bool,
    pub processed: usize,
    pub rolled_back: usize,
    pub skipped: usize,
    pub errors: usize,
    pub members_deleted: usize,
    pub documents_deleted: usize,
    pub failures: Vec<RecordFailure>,
}
