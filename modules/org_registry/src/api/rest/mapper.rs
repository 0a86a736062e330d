//! Mapper implementations for converting between DTOs and contract models
//!
//! This module contains all From/Into implementations for bidirectional
//! conversion between REST DTOs and transport-agnostic contract models.

use super::dto::*;
use crate::contract;

// ===== Organization conversions =====

impl From<contract::Organization> for OrganizationDto {
    fn from(organization: contract::Organization) -> Self {
        Self {
            id: organization.id,
            name: organization.name,
            is_normalized: organization.is_normalized,
            normalized_at: organization.normalized_at,
            schema_version: organization.schema_version.as_i32(),
            member_ids: organization.member_ids,
            document_ids: organization.document_ids,
            created_at: organization.created_at,
            updated_at: organization.updated_at,
        }
    }
}

impl From<contract::OrganizationWithMembers> for OrganizationWithMembersDto {
    fn from(resolved: contract::OrganizationWithMembers) -> Self {
        Self {
            organization: resolved.organization.into(),
            members: resolved.members.into_iter().map(Into::into).collect(),
            electoral_commission: resolved
                .electoral_commission
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

// ===== Member conversions =====

impl From<contract::MemberView> for MemberDto {
    fn from(member: contract::MemberView) -> Self {
        Self {
            id: member.id,
            rut: member.rut,
            first_name: member.first_name,
            last_name: member.last_name,
            primer_nombre: member.name_parts.primer_nombre,
            segundo_nombre: member.name_parts.segundo_nombre,
            apellido_paterno: member.name_parts.apellido_paterno,
            apellido_materno: member.name_parts.apellido_materno,
            email: member.contact.email,
            phone: member.contact.phone,
            address: member.contact.address,
            role: member.role.as_str().to_string(),
            is_founding_member: member.is_founding_member,
            is_electoral_commission: member.is_electoral_commission,
            is_provisional_board: member.is_provisional_board,
            provisional_role: member.provisional_role,
            original_index: member.original_index,
            signature: member.signature,
            certificate: member.certificate,
        }
    }
}

impl From<Vec<contract::MemberView>> for MemberListResponse {
    fn from(members: Vec<contract::MemberView>) -> Self {
        let items: Vec<MemberDto> = members.into_iter().map(Into::into).collect();
        let total = items.len();
        Self { items, total }
    }
}

impl From<contract::ProvisionalBoard> for ProvisionalBoardDto {
    fn from(board: contract::ProvisionalBoard) -> Self {
        Self {
            president: board.president.map(Into::into),
            secretary: board.secretary.map(Into::into),
            treasurer: board.treasurer.map(Into::into),
            unassigned: board.unassigned.into_iter().map(Into::into).collect(),
        }
    }
}

// ===== Document conversions =====

impl From<contract::DocumentStats> for DocumentStatsDto {
    fn from(stats: contract::DocumentStats) -> Self {
        Self {
            total_size_bytes: stats.total_size_bytes,
            total_size_kb: stats.total_size_kb,
            total_size_mb: stats.total_size_mb,
            signature_count: stats.signature_count,
            certificate_count: stats.certificate_count,
            document_count: stats.document_count,
            is_normalized: stats.is_normalized,
            schema_version: stats.schema_version.as_i32(),
        }
    }
}

// ===== Normalization conversions =====

impl From<NormalizationRequest> for contract::MigrationOptions {
    fn from(req: NormalizationRequest) -> Self {
        Self {
            dry_run: req.dry_run,
            batch_size: req.batch_size,
            organization_id: req.organization_id,
        }
    }
}

impl From<contract::RecordFailure> for RecordFailureDto {
    fn from(failure: contract::RecordFailure) -> Self {
        Self {
            organization_id: failure.organization_id,
            error: failure.error,
        }
    }
}

impl From<contract::MigrationSummary> for MigrationSummaryDto {
    fn from(summary: contract::MigrationSummary) -> Self {
        Self {
            dry_run: summary.dry_run,
            processed: summary.processed,
            migrated: summary.migrated,
            skipped: summary.skipped,
            errors: summary.errors,
            members_created: summary.members_created,
            documents_created: summary.documents_created,
            failures: summary.failures.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<contract::RollbackSummary> for RollbackSummaryDto {
    fn from(summary: contract::RollbackSummary) -> Self {
        Self {
            dry_run: summary.dry_run,
            processed: summary.processed,
            rolled_back: summary.rolled_back,
            skipped: summary.skipped,
            errors: summary.errors,
            members_deleted: summary.members_deleted,
            documents_deleted: summary.documents_deleted,
            failures: summary.failures.into_iter().map(Into::into).collect(),
        }
    }
}
