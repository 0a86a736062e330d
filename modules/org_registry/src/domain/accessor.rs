//! Format-agnostic read access to organizations
//!
//! Every read dispatches on the organization's storage format to a
//! [`FormatReader`]. Both readers return the same view types, so callers
//! never branch on raw fields.

use super::legacy::{build_roster, ministro_signature, view_from_legacy};
use super::repository::{DocumentRepository, MemberRepository, OrganizationRepository};
use super::size::{calculate_size, DocumentTally};
use crate::contract::{
    Document, DocumentSource, DocumentStats, DocumentType, IncludeOptions, Member, MemberRole,
    MemberSource, MemberView, Organization, OrganizationWithMembers, ProvisionalBoard,
    ProvisionalSeat, RegistryError, SchemaVersion,
};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Key selecting the ministro de fe signature in `get_signature`
pub const MINISTRO_SIGNATURE_KEY: &str = "ministro";

/// Reads organization data stored in one schema generation
#[async_trait]
pub trait FormatReader: Send + Sync {
    async fn with_members(
        &self,
        organization: Organization,
        include: IncludeOptions,
    ) -> Result<OrganizationWithMembers>;

    async fn members(&self, organization: &Organization) -> Result<Vec<MemberView>>;

    async fn electoral_commission(&self, organization: &Organization) -> Result<Vec<MemberView>>;

    async fn provisional_board(&self, organization: &Organization) -> Result<ProvisionalBoard>;

    async fn signature(&self, organization: &Organization, key: &str) -> Result<Option<String>>;

    async fn document_stats(&self, organization: &Organization) -> Result<DocumentStats>;
}

// ===== Legacy (schema v1) =====

/// Reads embedded content
pub struct LegacyReader;

#[async_trait]
impl FormatReader for LegacyReader {
    async fn with_members(
        &self,
        organization: Organization,
        _include: IncludeOptions,
    ) -> Result<OrganizationWithMembers> {
        let legacy = &organization.legacy;
        let members = legacy
            .members
            .iter()
            .enumerate()
            .map(|(i, m)| view_from_legacy(m, MemberSource::Members, i as u32, MemberRole::Member))
            .collect();
        let electoral_commission = legacy
            .electoral_commission
            .iter()
            .enumerate()
            .map(|(j, m)| {
                view_from_legacy(
                    m,
                    MemberSource::ElectoralCommission,
                    j as u32,
                    MemberRole::ElectoralCommission,
                )
            })
            .collect();

        Ok(OrganizationWithMembers {
            organization,
            members,
            electoral_commission,
        })
    }

    async fn members(&self, organization: &Organization) -> Result<Vec<MemberView>> {
        let roster = build_roster(&organization.legacy);
        Ok(roster.entries.iter().map(|e| e.to_view()).collect())
    }

    async fn electoral_commission(&self, organization: &Organization) -> Result<Vec<MemberView>> {
        let roster = build_roster(&organization.legacy);
        Ok(roster
            .entries
            .iter()
            .filter(|e| e.is_electoral_commission)
            .map(|e| e.to_view())
            .collect())
    }

    async fn provisional_board(&self, organization: &Organization) -> Result<ProvisionalBoard> {
        let Some(directorio) = &organization.legacy.provisional_directorio else {
            return Ok(ProvisionalBoard::default());
        };

        let mut board = ProvisionalBoard::default();
        for (seat, occupant) in directorio.seats() {
            let Some(occupant) = occupant else { continue };
            let mut view = view_from_legacy(occupant, MemberSource::Members, 0, MemberRole::Member);
            view.original_index = None;
            view.is_provisional_board = true;
            view.provisional_role = Some(seat.as_str().to_string());
            *seat_slot(&mut board, seat) = Some(view);
        }
        Ok(board)
    }

    async fn signature(&self, organization: &Organization, key: &str) -> Result<Option<String>> {
        let legacy = &organization.legacy;
        let validation = legacy.validation_data.as_ref();
        if key == MINISTRO_SIGNATURE_KEY {
            // Same precedence as the planner; short values only surface when
            // no location carries a payload.
            if let Some((content, _)) = ministro_signature(legacy) {
                return Ok(Some(content.to_string()));
            }
            let non_empty = |value: Option<&String>| value.filter(|s| !s.is_empty()).cloned();
            return Ok(non_empty(legacy.ministro_signature.as_ref())
                .or_else(|| non_empty(validation.and_then(|v| v.ministro_signature.as_ref()))));
        }
        Ok(validation.and_then(|v| v.signatures.get(key).cloned()))
    }

    async fn document_stats(&self, organization: &Organization) -> Result<DocumentStats> {
        let roster = build_roster(&organization.legacy);
        let mut tally = DocumentTally::default();
        for payload in &roster.payloads {
            tally.add(payload.doc_type, calculate_size(payload.content));
        }
        Ok(tally.into_stats(organization.is_normalized, organization.schema_version))
    }
}

// ===== Normalized (schema v2) =====

/// Reads the member and document collections
pub struct NormalizedReader {
    members: Arc<dyn MemberRepository>,
    documents: Arc<dyn DocumentRepository>,
}

impl NormalizedReader {
    pub fn new(members: Arc<dyn MemberRepository>, documents: Arc<dyn DocumentRepository>) -> Self {
        Self { members, documents }
    }

    /// Referenced members in `member_ids` order; dangling ids are skipped
    async fn ordered_members(&self, organization: &Organization) -> Result<Vec<Member>> {
        if organization.member_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut by_id: HashMap<Uuid, Member> = self
            .members
            .find_by_ids(&organization.member_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let ordered: Vec<Member> = organization
            .member_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        if ordered.len() != organization.member_ids.len() {
            tracing::warn!(
                organization_id = %organization.id,
                referenced = organization.member_ids.len(),
                found = ordered.len(),
                "organization references missing members"
            );
        }
        Ok(ordered)
    }
}

#[async_trait]
impl FormatReader for NormalizedReader {
    async fn with_members(
        &self,
        organization: Organization,
        include: IncludeOptions,
    ) -> Result<OrganizationWithMembers> {
        if organization.member_ids.is_empty() {
            return LegacyReader.with_members(organization, include).await;
        }

        let members = self.ordered_members(&organization).await?;

        let mut types = Vec::new();
        if include.include_signatures {
            types.push(DocumentType::Signature);
        }
        if include.include_certificates {
            types.push(DocumentType::Certificate);
        }
        let documents = if types.is_empty() {
            Vec::new()
        } else {
            let ids: Vec<Uuid> = members.iter().map(|m| m.id).collect();
            self.documents.find_for_members(&ids, &types).await?
        };

        let views: Vec<MemberView> = members
            .iter()
            .map(|m| {
                let mut view = member_view(m);
                if include.include_signatures {
                    view.signature = payload_for(m, m.signature_id, DocumentType::Signature, &documents);
                }
                if include.include_certificates {
                    view.certificate =
                        payload_for(m, m.certificate_id, DocumentType::Certificate, &documents);
                }
                view
            })
            .collect();
        let electoral_commission = views
            .iter()
            .filter(|v| v.is_electoral_commission)
            .cloned()
            .collect();

        Ok(OrganizationWithMembers {
            organization,
            members: views,
            electoral_commission,
        })
    }

    async fn members(&self, organization: &Organization) -> Result<Vec<MemberView>> {
        let members = self.ordered_members(organization).await?;
        Ok(members.iter().map(member_view).collect())
    }

    async fn electoral_commission(&self, organization: &Organization) -> Result<Vec<MemberView>> {
        let members = self.ordered_members(organization).await?;
        Ok(members
            .iter()
            .filter(|m| m.is_electoral_commission)
            .map(member_view)
            .collect())
    }

    async fn provisional_board(&self, organization: &Organization) -> Result<ProvisionalBoard> {
        let mut members = self.members.find_provisional_board(organization.id).await?;
        members.sort_by_key(|m| (m.migrated_from.map(|s| s.as_str()), m.original_index));

        let mut board = ProvisionalBoard::default();
        for member in &members {
            let view = member_view(member);
            if let Some(seat) = member.provisional_role.as_deref().and_then(ProvisionalSeat::parse) {
                let slot = seat_slot(&mut board, seat);
                if slot.is_none() {
                    *slot = Some(view);
                    continue;
                }
            }
            tracing::warn!(
                organization_id = %organization.id,
                member_id = %member.id,
                provisional_role = ?member.provisional_role,
                "provisional board member has no free seat"
            );
            board.unassigned.push(view);
        }
        Ok(board)
    }

    async fn signature(&self, organization: &Organization, key: &str) -> Result<Option<String>> {
        if key == MINISTRO_SIGNATURE_KEY {
            let mut documents = self
                .documents
                .find_by_organization(organization.id, DocumentType::MinistroSignature)
                .await?;
            documents.retain(|d| d.is_active);
            documents.sort_by_key(|d| d.created_at);
            return Ok(documents.first().map(|d| d.content().to_string()));
        }

        let mut candidates: Vec<Document> = self
            .documents
            .find_by_organization(organization.id, DocumentType::Signature)
            .await?
            .into_iter()
            .filter(|d| d.is_active)
            .filter(|d| d.original_path.as_deref().is_some_and(|p| p.contains(key)))
            .collect();
        candidates.sort_by(|a, b| {
            let rank = |d: &Document| d.migrated_from != Some(DocumentSource::ValidationSignature);
            rank(a)
                .cmp(&rank(b))
                .then_with(|| a.original_path.cmp(&b.original_path))
        });
        Ok(candidates.first().map(|d| d.content().to_string()))
    }

    async fn document_stats(&self, organization: &Organization) -> Result<DocumentStats> {
        let documents = if organization.document_ids.is_empty() {
            Vec::new()
        } else {
            self.documents.find_by_ids(&organization.document_ids).await?
        };
        let mut tally = DocumentTally::default();
        for document in &documents {
            tally.add(document.doc_type, document.size());
        }
        Ok(tally.into_stats(organization.is_normalized, organization.schema_version))
    }
}

fn member_view(member: &Member) -> MemberView {
    MemberView {
        id: Some(member.id),
        rut: Some(member.rut.clone()),
        first_name: member.first_name.clone(),
        last_name: member.last_name.clone(),
        name_parts: member.name_parts.clone(),
        contact: member.contact.clone(),
        role: member.role,
        is_founding_member: member.is_founding_member,
        is_electoral_commission: member.is_electoral_commission,
        is_provisional_board: member.is_provisional_board,
        provisional_role: member.provisional_role.clone(),
        original_index: member.original_index,
        signature: None,
        certificate: None,
    }
}

/// Content of the referenced document, else any document of that type the
/// member owns
fn payload_for(
    member: &Member,
    reference: Option<Uuid>,
    doc_type: DocumentType,
    documents: &[Document],
) -> Option<String> {
    let owned = |d: &&Document| d.member_id == Some(member.id) && d.doc_type == doc_type;
    reference
        .and_then(|id| documents.iter().filter(owned).find(|d| d.id == id))
        .or_else(|| documents.iter().find(owned))
        .map(|d| d.content().to_string())
}

fn seat_slot(board: &mut ProvisionalBoard, seat: ProvisionalSeat) -> &mut Option<MemberView> {
    match seat {
        ProvisionalSeat::President => &mut board.president,
        ProvisionalSeat::Secretary => &mut board.secretary,
        ProvisionalSeat::Treasurer => &mut board.treasurer,
    }
}

// ===== Accessor =====

/// Read API over organizations in either schema generation
pub struct OrganizationAccessor {
    organizations: Arc<dyn OrganizationRepository>,
    legacy: LegacyReader,
    normalized: NormalizedReader,
}

impl OrganizationAccessor {
    pub fn new(
        organizations: Arc<dyn OrganizationRepository>,
        members: Arc<dyn MemberRepository>,
        documents: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            organizations,
            legacy: LegacyReader,
            normalized: NormalizedReader::new(members, documents),
        }
    }

    fn reader(&self, organization: &Organization) -> &dyn FormatReader {
        match organization.storage_format() {
            SchemaVersion::Legacy => &self.legacy,
            SchemaVersion::Normalized => &self.normalized,
        }
    }

    async fn load(&self, organization_id: Uuid) -> Result<Option<Organization>, RegistryError> {
        self.organizations
            .find_by_id(organization_id)
            .await
            .map_err(RegistryError::store)
    }

    /// Organization with members resolved from the active format
    pub async fn get_organization_with_members(
        &self,
        organization_id: Uuid,
        include: IncludeOptions,
    ) -> Result<Option<OrganizationWithMembers>, RegistryError> {
        let Some(organization) = self.load(organization_id).await? else {
            return Ok(None);
        };
        let reader = self.reader(&organization);
        reader
            .with_members(organization, include)
            .await
            .map(Some)
            .map_err(RegistryError::store)
    }

    /// All members, without payloads
    pub async fn get_organization_members(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MemberView>, RegistryError> {
        let Some(organization) = self.load(organization_id).await? else {
            return Ok(Vec::new());
        };
        self.reader(&organization)
            .members(&organization)
            .await
            .map_err(RegistryError::store)
    }

    /// Electoral commission members, without payloads
    pub async fn get_electoral_commission(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MemberView>, RegistryError> {
        let Some(organization) = self.load(organization_id).await? else {
            return Ok(Vec::new());
        };
        self.reader(&organization)
            .electoral_commission(&organization)
            .await
            .map_err(RegistryError::store)
    }

    pub async fn get_provisional_board(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<ProvisionalBoard>, RegistryError> {
        let Some(organization) = self.load(organization_id).await? else {
            return Ok(None);
        };
        self.reader(&organization)
            .provisional_board(&organization)
            .await
            .map(Some)
            .map_err(RegistryError::store)
    }

    pub async fn get_signature(
        &self,
        organization_id: Uuid,
        signature_key: &str,
    ) -> Result<Option<String>, RegistryError> {
        let Some(organization) = self.load(organization_id).await? else {
            return Ok(None);
        };
        self.reader(&organization)
            .signature(&organization, signature_key)
            .await
            .map_err(RegistryError::store)
    }

    pub async fn get_organization_document_stats(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<DocumentStats>, RegistryError> {
        let Some(organization) = self.load(organization_id).await? else {
            return Ok(None);
        };
        self.reader(&organization)
            .document_stats(&organization)
            .await
            .map(Some)
            .map_err(RegistryError::store)
    }
}
