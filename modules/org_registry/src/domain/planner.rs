//! Pure planning of the v1 to v2 conversion
//!
//! A plan holds every row one organization's migration would write. Dry runs
//! stop at the plan; real runs hand it to the store, which applies it inside
//! a single transaction.

use super::legacy::build_roster;
use super::size::sniff_mime_type;
use crate::contract::{
    Document, DocumentContext, DocumentType, Member, MemberSource, Organization, SignerInfo,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Rows produced by migrating one organization
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub organization_id: Uuid,
    /// Written first; documents may reference them
    pub members: Vec<Member>,
    pub documents: Vec<Document>,
    pub normalized_at: DateTime<Utc>,
    pub anomalies: Vec<String>,
}

impl MigrationPlan {
    pub fn member_ids(&self) -> Vec<Uuid> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn document_ids(&self) -> Vec<Uuid> {
        self.documents.iter().map(|d| d.id).collect()
    }
}

/// Rows removed by rolling back one organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackPlan {
    pub organization_id: Uuid,
    pub member_ids: Vec<Uuid>,
    pub document_ids: Vec<Uuid>,
}

impl RollbackPlan {
    pub fn for_organization(organization: &Organization) -> Self {
        Self {
            organization_id: organization.id,
            member_ids: organization.member_ids.clone(),
            document_ids: organization.document_ids.clone(),
        }
    }
}

/// Build the migration plan for a legacy organization
pub fn plan_migration(organization: &Organization, now: DateTime<Utc>) -> MigrationPlan {
    let legacy = &organization.legacy;
    let roster = build_roster(legacy);
    let mut anomalies = roster.anomalies.clone();
    let millis = now.timestamp_millis();

    let mut members: Vec<Member> = roster
        .entries
        .iter()
        .map(|entry| {
            let rut = match &entry.rut {
                Some(rut) => rut.clone(),
                None => {
                    let placeholder =
                        placeholder_rut(entry.source, entry.original_index, millis);
                    anomalies.push(format!(
                        "{}[{}] has no rut; assigned {}",
                        entry.source.as_str(),
                        entry.original_index,
                        placeholder
                    ));
                    placeholder
                }
            };
            Member {
                id: Uuid::new_v4(),
                organization_id: organization.id,
                rut,
                first_name: entry.first_name.clone(),
                last_name: entry.last_name.clone(),
                name_parts: entry.name_parts.clone(),
                contact: entry.contact.clone(),
                role: entry.role,
                is_founding_member: entry.is_founding_member,
                is_electoral_commission: entry.is_electoral_commission,
                is_provisional_board: entry.is_provisional_board,
                provisional_role: entry.provisional_role.clone(),
                signature_id: None,
                certificate_id: None,
                migrated_from: Some(entry.source),
                original_index: Some(entry.original_index),
                created_at: now,
                updated_at: now,
            }
        })
        .collect();

    let assignment = legacy.ministro_assignment.as_ref();
    let mut documents = Vec::with_capacity(roster.payloads.len());

    for payload in &roster.payloads {
        let mut document = Document::new(
            organization.id,
            payload.doc_type,
            payload.content,
            sniff_mime_type(payload.content),
            DocumentContext::Migration,
        );
        document.migrated_from = Some(payload.source);
        document.original_path = Some(payload.path.clone());
        document.created_at = now;
        document.updated_at = now;

        match payload.owner {
            Some(owner) => {
                let member = &mut members[owner];
                document.member_id = Some(member.id);
                document.signer = SignerInfo {
                    role: Some(member.role.as_str().to_string()),
                    rut: Some(member.rut.clone()),
                    name: Some(full_name(member)),
                };
                link_document(member, &document);
            }
            None if payload.doc_type == DocumentType::MinistroSignature => {
                document.signer = SignerInfo {
                    role: payload.signer_role.clone(),
                    rut: assignment.and_then(|a| a.rut.clone()),
                    name: assignment.and_then(|a| a.name.clone()),
                };
            }
            None => {
                document.signer = SignerInfo {
                    role: payload.signer_role.clone(),
                    ..Default::default()
                };
            }
        }

        documents.push(document);
    }

    MigrationPlan {
        organization_id: organization.id,
        members,
        documents,
        normalized_at: now,
        anomalies,
    }
}

/// First payload of each kind becomes the member's canonical reference
fn link_document(member: &mut Member, document: &Document) {
    match document.doc_type {
        DocumentType::Signature if member.signature_id.is_none() => {
            member.signature_id = Some(document.id);
        }
        DocumentType::Certificate if member.certificate_id.is_none() => {
            member.certificate_id = Some(document.id);
        }
        _ => {}
    }
}

fn placeholder_rut(source: MemberSource, index: u32, millis: i64) -> String {
    match source {
        MemberSource::Members => format!("TEMP-{}-{}", millis, index),
        MemberSource::ElectoralCommission => format!("TEMP-EC-{}-{}", millis, index),
    }
}

fn full_name(member: &Member) -> String {
    format!("{} {}", member.first_name, member.last_name)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{
        DocumentSource, LegacyContent, LegacyMember, MemberRole, MinistroAssignment,
        ValidationData,
    };
    use crate::domain::legacy::MINISTRO_SIGNER_ROLE;

    fn legacy_member(rut: Option<&str>, signature_len: usize) -> LegacyMember {
        LegacyMember {
            rut: rut.map(str::to_string),
            first_name: Some("Ana".to_string()),
            last_name: Some("Lopez".to_string()),
            signature: Some("x".repeat(signature_len)),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_member_example() {
        let org = Organization::new_legacy(
            "Junta de Vecinos Villa Los Aromos",
            LegacyContent {
                members: vec![legacy_member(Some("1-1"), 180)],
                ..Default::default()
            },
        );

        let plan = plan_migration(&org, Utc::now());
        assert_eq!(plan.members.len(), 1);
        assert_eq!(plan.documents.len(), 1);

        let member = &plan.members[0];
        let document = &plan.documents[0];
        assert_eq!(member.role, MemberRole::Member);
        assert!(member.is_founding_member);
        assert_eq!(member.original_index, Some(0));
        assert_eq!(member.signature_id, Some(document.id));
        assert_eq!(document.doc_type, DocumentType::Signature);
        assert_eq!(document.member_id, Some(member.id));
        assert_eq!(document.size(), 135);
        assert_eq!(document.mime_type, "image/jpeg");
        assert_eq!(document.context, DocumentContext::Migration);
        assert_eq!(document.signer.name.as_deref(), Some("Ana Lopez"));
        assert!(plan.anomalies.is_empty());
    }

    #[test]
    fn test_threshold_boundary() {
        let org = Organization::new_legacy(
            "Club Deportivo",
            LegacyContent {
                members: vec![
                    legacy_member(Some("1-1"), 100),
                    legacy_member(Some("2-2"), 101),
                ],
                ..Default::default()
            },
        );

        let plan = plan_migration(&org, Utc::now());
        assert_eq!(plan.members.len(), 2);
        assert_eq!(plan.documents.len(), 1);
        assert_eq!(plan.members[0].signature_id, None);
        assert_eq!(plan.members[1].signature_id, Some(plan.documents[0].id));
    }

    #[test]
    fn test_missing_rut_gets_unique_placeholders() {
        let org = Organization::new_legacy(
            "Comité de Adelanto",
            LegacyContent {
                members: vec![legacy_member(None, 0), legacy_member(None, 0)],
                electoral_commission: vec![legacy_member(None, 0)],
                ..Default::default()
            },
        );

        let plan = plan_migration(&org, Utc::now());
        let ruts: std::collections::HashSet<&str> =
            plan.members.iter().map(|m| m.rut.as_str()).collect();
        assert_eq!(ruts.len(), 3);
        assert!(plan.members.iter().all(|m| m.rut.starts_with("TEMP-")));
        assert!(plan.members[2].rut.starts_with("TEMP-EC-"));
        assert_eq!(plan.anomalies.len(), 3);
    }

    #[test]
    fn test_png_mime_is_sniffed() {
        let mut member = legacy_member(Some("1-1"), 0);
        member.signature = Some(format!("data:image/png;base64,{}", "i".repeat(120)));
        let org = Organization::new_legacy(
            "Centro de Madres",
            LegacyContent {
                members: vec![member],
                ..Default::default()
            },
        );

        let plan = plan_migration(&org, Utc::now());
        assert_eq!(plan.documents[0].mime_type, "image/png");
    }

    #[test]
    fn test_ministro_signer_metadata_from_assignment() {
        let org = Organization::new_legacy(
            "Junta de Vecinos",
            LegacyContent {
                ministro_signature: Some("m".repeat(250)),
                ministro_assignment: Some(MinistroAssignment {
                    name: Some("Carmen Fuentes".to_string()),
                    rut: Some("12.345.678-9".to_string()),
                }),
                ..Default::default()
            },
        );

        let plan = plan_migration(&org, Utc::now());
        assert_eq!(plan.documents.len(), 1);
        let document = &plan.documents[0];
        assert_eq!(document.doc_type, DocumentType::MinistroSignature);
        assert_eq!(document.member_id, None);
        assert_eq!(document.migrated_from, Some(DocumentSource::MinistroSignature));
        assert_eq!(document.signer.name.as_deref(), Some("Carmen Fuentes"));
        assert_eq!(document.signer.rut.as_deref(), Some("12.345.678-9"));
        assert_eq!(document.signer.role.as_deref(), Some(MINISTRO_SIGNER_ROLE));
    }

    #[test]
    fn test_validation_signatures_keep_source_key() {
        let mut signatures = std::collections::BTreeMap::new();
        signatures.insert("secretario".to_string(), "s".repeat(140));
        let org = Organization::new_legacy(
            "Junta de Vecinos",
            LegacyContent {
                validation_data: Some(ValidationData {
                    signatures,
                    ministro_signature: None,
                }),
                ..Default::default()
            },
        );

        let plan = plan_migration(&org, Utc::now());
        let document = &plan.documents[0];
        assert_eq!(
            document.original_path.as_deref(),
            Some("validationData.signatures.secretario")
        );
        assert_eq!(document.signer.role.as_deref(), Some("secretario"));
    }

    #[test]
    fn test_commission_match_keeps_first_signature_reference() {
        let member = legacy_member(Some("1-1"), 150);
        let commission = legacy_member(Some("1-1"), 160);
        let org = Organization::new_legacy(
            "Junta de Vecinos",
            LegacyContent {
                members: vec![member],
                electoral_commission: vec![commission],
                ..Default::default()
            },
        );

        let plan = plan_migration(&org, Utc::now());
        assert_eq!(plan.members.len(), 1);
        assert_eq!(plan.documents.len(), 2);
        assert!(plan.members[0].is_electoral_commission);
        assert_eq!(plan.members[0].signature_id, Some(plan.documents[0].id));
        assert_eq!(plan.documents[1].member_id, Some(plan.members[0].id));
    }

    #[test]
    fn test_rollback_plan_copies_references() {
        let mut org = Organization::new_legacy("Club", LegacyContent::default());
        org.member_ids = vec![Uuid::new_v4()];
        org.document_ids = vec![Uuid::new_v4(), Uuid::new_v4()];

        let plan = RollbackPlan::for_organization(&org);
        assert_eq!(plan.member_ids, org.member_ids);
        assert_eq!(plan.document_ids, org.document_ids);
    }
}
