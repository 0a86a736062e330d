//! Interpretation of embedded (schema v1) organization content
//!
//! The roster built here is the single definition of "who the members are"
//! in a legacy record. The migration planner turns it into normalized rows
//! and the legacy reader serves it directly, so both formats agree.

use super::size::{is_payload, payload};
use crate::contract::{
    ContactInfo, DocumentSource, DocumentType, LegacyContent, LegacyMember, MemberRole,
    MemberSource, MemberView, NameParts,
};
use std::collections::HashMap;

/// Members and payloads derived from one legacy record
#[derive(Debug, Clone, Default)]
pub struct Roster<'a> {
    pub entries: Vec<RosterEntry>,
    pub payloads: Vec<Payload<'a>>,
    /// Data problems repaired or ignored while building the roster
    pub anomalies: Vec<String>,
}

/// One distinct person in the legacy record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub source: MemberSource,
    pub original_index: u32,
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
}

impl RosterEntry {
    pub fn to_view(&self) -> MemberView {
        MemberView {
            id: None,
            rut: self.rut.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            name_parts: self.name_parts.clone(),
            contact: self.contact.clone(),
            role: self.role,
            is_founding_member: self.is_founding_member,
            is_electoral_commission: self.is_electoral_commission,
            is_provisional_board: self.is_provisional_board,
            provisional_role: self.provisional_role.clone(),
            original_index: Some(self.original_index),
            signature: None,
            certificate: None,
        }
    }
}

/// An embedded Base64 string long enough to become a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload<'a> {
    /// Index into `Roster::entries`; `None` for organization-level payloads
    pub owner: Option<usize>,
    pub doc_type: DocumentType,
    pub source: DocumentSource,
    /// Concrete embedded path, e.g. `members[2].signature`
    pub path: String,
    pub content: &'a str,
    /// Signer role for organization-level payloads
    pub signer_role: Option<String>,
}

pub const MINISTRO_SIGNER_ROLE: &str = "ministro_de_fe";

/// Build the roster and payload list for a legacy record
pub fn build_roster(legacy: &LegacyContent) -> Roster<'_> {
    let mut roster = Roster::default();
    let mut by_rut: HashMap<&str, usize> = HashMap::new();

    for (i, raw) in legacy.members.iter().enumerate() {
        let rut = present(raw.rut.as_ref());
        let owner = match rut.and_then(|r| by_rut.get(r).copied()) {
            Some(existing) => {
                roster.anomalies.push(format!(
                    "members[{}] repeats rut {} of members[{}]",
                    i,
                    rut.unwrap_or_default(),
                    roster.entries[existing].original_index
                ));
                existing
            }
            None => {
                let (role, anomaly) = parse_role(raw.role.as_ref(), MemberRole::Member);
                if let Some(bad) = anomaly {
                    roster
                        .anomalies
                        .push(format!("members[{}] has unknown role '{}'", i, bad));
                }
                let mut entry = entry_from_legacy(raw, MemberSource::Members, i as u32, role);
                entry.is_founding_member = true;
                roster.entries.push(entry);
                let idx = roster.entries.len() - 1;
                if let Some(r) = rut {
                    by_rut.insert(r, idx);
                }
                idx
            }
        };
        push_member_payloads(&mut roster, owner, raw, "members", i, MemberSource::Members);
    }

    for (j, raw) in legacy.electoral_commission.iter().enumerate() {
        let rut = present(raw.rut.as_ref());
        let owner = match rut.and_then(|r| by_rut.get(r).copied()) {
            Some(existing) => {
                roster.entries[existing].is_electoral_commission = true;
                existing
            }
            None => {
                let mut entry = entry_from_legacy(
                    raw,
                    MemberSource::ElectoralCommission,
                    j as u32,
                    MemberRole::ElectoralCommission,
                );
                entry.is_electoral_commission = true;
                roster.entries.push(entry);
                let idx = roster.entries.len() - 1;
                if let Some(r) = rut {
                    by_rut.insert(r, idx);
                }
                idx
            }
        };
        push_member_payloads(
            &mut roster,
            owner,
            raw,
            "electoralCommission",
            j,
            MemberSource::ElectoralCommission,
        );
    }

    if let Some(directorio) = &legacy.provisional_directorio {
        for (seat, occupant) in directorio.seats() {
            let Some(occupant) = occupant else { continue };
            match present(occupant.rut.as_ref()).and_then(|r| by_rut.get(r).copied()) {
                Some(idx) if roster.entries[idx].is_provisional_board => {
                    roster.anomalies.push(format!(
                        "provisional seat {} repeats a member already seated as {}",
                        seat.as_str(),
                        roster.entries[idx].provisional_role.as_deref().unwrap_or("?")
                    ));
                }
                Some(idx) => {
                    let entry = &mut roster.entries[idx];
                    entry.is_provisional_board = true;
                    entry.provisional_role = Some(seat.as_str().to_string());
                }
                None => roster.anomalies.push(format!(
                    "provisional seat {} has no matching member",
                    seat.as_str()
                )),
            }
        }
    }

    if let Some((content, path)) = ministro_signature(legacy) {
        roster.payloads.push(Payload {
            owner: None,
            doc_type: DocumentType::MinistroSignature,
            source: DocumentSource::MinistroSignature,
            path: path.to_string(),
            content,
            signer_role: Some(MINISTRO_SIGNER_ROLE.to_string()),
        });
    }

    if let Some(validation) = &legacy.validation_data {
        for (key, value) in &validation.signatures {
            if !is_payload(value) {
                continue;
            }
            roster.payloads.push(Payload {
                owner: None,
                doc_type: DocumentType::Signature,
                source: DocumentSource::ValidationSignature,
                path: format!("validationData.signatures.{}", key),
                content: value,
                signer_role: Some(key.clone()),
            });
        }
    }

    roster
}

/// Effective ministro signature: top level first, then the validation wizard copy
pub fn ministro_signature(legacy: &LegacyContent) -> Option<(&str, &'static str)> {
    payload(legacy.ministro_signature.as_ref())
        .map(|s| (s, "ministroSignature"))
        .or_else(|| {
            legacy
                .validation_data
                .as_ref()
                .and_then(|v| payload(v.ministro_signature.as_ref()))
                .map(|s| (s, "validationData.ministroSignature"))
        })
}

/// Member view of an embedded entry, payloads copied verbatim
pub fn view_from_legacy(
    raw: &LegacyMember,
    source: MemberSource,
    index: u32,
    default_role: MemberRole,
) -> MemberView {
    let (role, _) = parse_role(raw.role.as_ref(), default_role);
    let entry = entry_from_legacy(raw, source, index, role);
    MemberView {
        is_founding_member: source == MemberSource::Members,
        is_electoral_commission: source == MemberSource::ElectoralCommission,
        signature: raw.signature.clone(),
        certificate: raw.certificate.clone(),
        ..entry.to_view()
    }
}

fn entry_from_legacy(
    raw: &LegacyMember,
    source: MemberSource,
    index: u32,
    role: MemberRole,
) -> RosterEntry {
    RosterEntry {
        source,
        original_index: index,
        rut: present(raw.rut.as_ref()).map(str::to_string),
        first_name: present(raw.first_name.as_ref())
            .or_else(|| present(raw.primer_nombre.as_ref()))
            .unwrap_or_default()
            .to_string(),
        last_name: present(raw.last_name.as_ref())
            .or_else(|| present(raw.apellido_paterno.as_ref()))
            .unwrap_or_default()
            .to_string(),
        name_parts: NameParts {
            primer_nombre: raw.primer_nombre.clone(),
            segundo_nombre: raw.segundo_nombre.clone(),
            apellido_paterno: raw.apellido_paterno.clone(),
            apellido_materno: raw.apellido_materno.clone(),
        },
        contact: ContactInfo {
            email: raw.email.clone(),
            phone: raw.phone.clone(),
            address: raw.address.clone(),
        },
        role,
        is_founding_member: false,
        is_electoral_commission: false,
        is_provisional_board: false,
        provisional_role: None,
    }
}

fn push_member_payloads<'a>(
    roster: &mut Roster<'a>,
    owner: usize,
    raw: &'a LegacyMember,
    array: &str,
    index: usize,
    source: MemberSource,
) {
    let (signature_source, certificate_source) = match source {
        MemberSource::Members => (
            DocumentSource::MemberSignature,
            DocumentSource::MemberCertificate,
        ),
        MemberSource::ElectoralCommission => (
            DocumentSource::ElectoralCommissionSignature,
            DocumentSource::ElectoralCommissionCertificate,
        ),
    };

    if let Some(content) = payload(raw.signature.as_ref()) {
        roster.payloads.push(Payload {
            owner: Some(owner),
            doc_type: DocumentType::Signature,
            source: signature_source,
            path: format!("{}[{}].signature", array, index),
            content,
            signer_role: None,
        });
    }
    if let Some(content) = payload(raw.certificate.as_ref()) {
        roster.payloads.push(Payload {
            owner: Some(owner),
            doc_type: DocumentType::Certificate,
            source: certificate_source,
            path: format!("{}[{}].certificate", array, index),
            content,
            signer_role: None,
        });
    }
}

/// Returns the parsed role and, when unrecognized, the offending value
fn parse_role(raw: Option<&String>, default: MemberRole) -> (MemberRole, Option<String>) {
    match present(raw) {
        None => (default, None),
        Some(value) => match value.parse() {
            Ok(role) => (role, None),
            Err(_) => (default, Some(value.to_string())),
        },
    }
}

/// Blank strings count as absent
fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}
