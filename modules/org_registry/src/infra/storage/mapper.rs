//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity;
use crate::contract::{
    ContactInfo, Document, LegacyContent, LegacyMember, Member, MinistroAssignment, NameParts,
    Organization, ProvisionalDirectorio, SchemaVersion, SignerInfo, ValidationData,
};
use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ===== Organization Conversions =====

impl TryFrom<entity::Model> for Organization {
    type Error = anyhow::Error;

    fn try_from(entity: entity::Model) -> Result<Self, Self::Error> {
        let legacy: LegacyContentJson = serde_json::from_value(entity.legacy_content)
            .with_context(|| format!("organization {} has malformed legacy content", entity.id))?;
        let member_ids: Vec<Uuid> = serde_json::from_value(entity.member_ids)
            .with_context(|| format!("organization {} has malformed member_ids", entity.id))?;
        let document_ids: Vec<Uuid> = serde_json::from_value(entity.document_ids)
            .with_context(|| format!("organization {} has malformed document_ids", entity.id))?;

        Ok(Self {
            id: entity.id,
            name: entity.name,
            legacy: legacy.into(),
            member_ids,
            document_ids,
            is_normalized: entity.is_normalized,
            normalized_at: entity.normalized_at,
            schema_version: SchemaVersion::from_i32(entity.schema_version),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl TryFrom<&Organization> for entity::ActiveModel {
    type Error = anyhow::Error;

    fn try_from(model: &Organization) -> Result<Self, Self::Error> {
        use sea_orm::ActiveValue::*;

        let legacy = LegacyContentJson::from(&model.legacy);

        Ok(Self {
            id: Set(model.id),
            name: Set(model.name.clone()),
            legacy_content: Set(serde_json::to_value(legacy)?),
            member_ids: Set(serde_json::to_value(&model.member_ids)?),
            document_ids: Set(serde_json::to_value(&model.document_ids)?),
            is_normalized: Set(model.is_normalized),
            normalized_at: Set(model.normalized_at),
            schema_version: Set(model.schema_version.as_i32()),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        })
    }
}

// ===== Member Conversions =====

impl TryFrom<entity::member::Model> for Member {
    type Error = anyhow::Error;

    fn try_from(entity: entity::member::Model) -> Result<Self, Self::Error> {
        let name_parts: NamePartsJson = serde_json::from_value(entity.name_parts)?;

        Ok(Self {
            id: entity.id,
            organization_id: entity.organization_id,
            rut: entity.rut,
            first_name: entity.first_name,
            last_name: entity.last_name,
            name_parts: name_parts.into(),
            contact: ContactInfo {
                email: entity.email,
                phone: entity.phone,
                address: entity.address,
            },
            role: entity.role.parse()?,
            is_founding_member: entity.is_founding_member,
            is_electoral_commission: entity.is_electoral_commission,
            is_provisional_board: entity.is_provisional_board,
            provisional_role: entity.provisional_role,
            signature_id: entity.signature_id,
            certificate_id: entity.certificate_id,
            migrated_from: entity.migrated_from.as_deref().map(str::parse).transpose()?,
            original_index: entity.original_index.map(u32::try_from).transpose()?,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl TryFrom<&Member> for entity::member::ActiveModel {
    type Error = anyhow::Error;

    fn try_from(model: &Member) -> Result<Self, Self::Error> {
        use sea_orm::ActiveValue::*;

        Ok(Self {
            id: Set(model.id),
            organization_id: Set(model.organization_id),
            rut: Set(model.rut.clone()),
            first_name: Set(model.first_name.clone()),
            last_name: Set(model.last_name.clone()),
            name_parts: Set(serde_json::to_value(NamePartsJson::from(&model.name_parts))?),
            email: Set(model.contact.email.clone()),
            phone: Set(model.contact.phone.clone()),
            address: Set(model.contact.address.clone()),
            role: Set(model.role.as_str().to_string()),
            is_founding_member: Set(model.is_founding_member),
            is_electoral_commission: Set(model.is_electoral_commission),
            is_provisional_board: Set(model.is_provisional_board),
            provisional_role: Set(model.provisional_role.clone()),
            signature_id: Set(model.signature_id),
            certificate_id: Set(model.certificate_id),
            migrated_from: Set(model.migrated_from.map(|s| s.as_str().to_string())),
            original_index: Set(model.original_index.map(i32::try_from).transpose()?),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        })
    }
}

// ===== Document Conversions =====

impl TryFrom<entity::document::Model> for Document {
    type Error = anyhow::Error;

    fn try_from(entity: entity::document::Model) -> Result<Self, Self::Error> {
        let mut document = Document::new(
            entity.organization_id,
            entity.doc_type.parse()?,
            entity.content,
            entity.mime_type,
            entity.context.parse()?,
        );
        document.id = entity.id;
        document.member_id = entity.member_id;
        document.signer = SignerInfo {
            role: entity.signer_role,
            rut: entity.signer_rut,
            name: entity.signer_name,
        };
        document.migrated_from = entity.migrated_from.as_deref().map(str::parse).transpose()?;
        document.original_path = entity.original_path;
        document.is_active = entity.is_active;
        document.created_at = entity.created_at;
        document.updated_at = entity.updated_at;
        Ok(document)
    }
}

impl From<&Document> for entity::document::ActiveModel {
    fn from(model: &Document) -> Self {
        use sea_orm::ActiveValue::*;

        Self {
            id: Set(model.id),
            organization_id: Set(model.organization_id),
            member_id: Set(model.member_id),
            doc_type: Set(model.doc_type.as_str().to_string()),
            content: Set(model.content().to_string()),
            mime_type: Set(model.mime_type.clone()),
            // Recomputed by before_save
            size: NotSet,
            signer_role: Set(model.signer.role.clone()),
            signer_rut: Set(model.signer.rut.clone()),
            signer_name: Set(model.signer.name.clone()),
            context: Set(model.context.as_str().to_string()),
            migrated_from: Set(model.migrated_from.map(|s| s.as_str().to_string())),
            original_path: Set(model.original_path.clone()),
            is_active: Set(model.is_active),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

// ===== JSON Serialization Helpers =====

/// JSON representation of embedded legacy content. Every field is optional
/// and scalar values of the wrong type are dropped rather than rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyContentJson {
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    members: Vec<LegacyMemberJson>,
    #[serde(deserialize_with = "lenient_list", skip_serializing_if = "Vec::is_empty")]
    electoral_commission: Vec<LegacyMemberJson>,
    #[serde(deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    provisional_directorio: Option<ProvisionalDirectorioJson>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    ministro_signature: Option<String>,
    #[serde(deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    validation_data: Option<ValidationDataJson>,
    #[serde(deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    ministro_assignment: Option<MinistroAssignmentJson>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LegacyMemberJson {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    rut: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    primer_nombre: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    segundo_nombre: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    apellido_paterno: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    apellido_materno: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    certificate: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ProvisionalDirectorioJson {
    #[serde(deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    president: Option<LegacyMemberJson>,
    #[serde(deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    secretary: Option<LegacyMemberJson>,
    #[serde(deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    treasurer: Option<LegacyMemberJson>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ValidationDataJson {
    #[serde(deserialize_with = "lenient_map")]
    signatures: BTreeMap<String, String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    ministro_signature: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct MinistroAssignmentJson {
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    rut: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct NamePartsJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    primer_nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    segundo_nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    apellido_paterno: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    apellido_materno: Option<String>,
}

/// Strings pass through, numbers are stringified, anything else is absent
fn scalar_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_string(serde_json::Value::deserialize(deserializer)?))
}

/// Non-object entries in an embedded array become empty members
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<LegacyMemberJson>, D::Error>
where
    D: Deserializer<'de>,
{
    let serde_json::Value::Array(items) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// Nested records that are not JSON objects are absent
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match serde_json::Value::deserialize(deserializer)? {
        value @ serde_json::Value::Object(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

fn lenient_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let serde_json::Value::Object(entries) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| scalar_string(value).map(|v| (key, v)))
        .collect())
}

impl From<LegacyContentJson> for LegacyContent {
    fn from(json: LegacyContentJson) -> Self {
        Self {
            members: json.members.into_iter().map(Into::into).collect(),
            electoral_commission: json.electoral_commission.into_iter().map(Into::into).collect(),
            provisional_directorio: json.provisional_directorio.map(|d| ProvisionalDirectorio {
                president: d.president.map(Into::into),
                secretary: d.secretary.map(Into::into),
                treasurer: d.treasurer.map(Into::into),
            }),
            ministro_signature: json.ministro_signature,
            validation_data: json.validation_data.map(|v| ValidationData {
                signatures: v.signatures,
                ministro_signature: v.ministro_signature,
            }),
            ministro_assignment: json.ministro_assignment.map(|a| MinistroAssignment {
                name: a.name,
                rut: a.rut,
            }),
        }
    }
}

impl From<&LegacyContent> for LegacyContentJson {
    fn from(legacy: &LegacyContent) -> Self {
        Self {
            members: legacy.members.iter().map(Into::into).collect(),
            electoral_commission: legacy.electoral_commission.iter().map(Into::into).collect(),
            provisional_directorio: legacy.provisional_directorio.as_ref().map(|d| {
                ProvisionalDirectorioJson {
                    president: d.president.as_ref().map(Into::into),
                    secretary: d.secretary.as_ref().map(Into::into),
                    treasurer: d.treasurer.as_ref().map(Into::into),
                }
            }),
            ministro_signature: legacy.ministro_signature.clone(),
            validation_data: legacy.validation_data.as_ref().map(|v| ValidationDataJson {
                signatures: v.signatures.clone(),
                ministro_signature: v.ministro_signature.clone(),
            }),
            ministro_assignment: legacy.ministro_assignment.as_ref().map(|a| {
                MinistroAssignmentJson {
                    name: a.name.clone(),
                    rut: a.rut.clone(),
                }
            }),
        }
    }
}

impl From<LegacyMemberJson> for LegacyMember {
    fn from(json: LegacyMemberJson) -> Self {
        Self {
            rut: json.rut,
            first_name: json.first_name,
            last_name: json.last_name,
            primer_nombre: json.primer_nombre,
            segundo_nombre: json.segundo_nombre,
            apellido_paterno: json.apellido_paterno,
            apellido_materno: json.apellido_materno,
            email: json.email,
            phone: json.phone,
            address: json.address,
            role: json.role,
            signature: json.signature,
            certificate: json.certificate,
        }
    }
}

impl From<&LegacyMember> for LegacyMemberJson {
    fn from(member: &LegacyMember) -> Self {
        Self {
            rut: member.rut.clone(),
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            primer_nombre: member.primer_nombre.clone(),
            segundo_nombre: member.segundo_nombre.clone(),
            apellido_paterno: member.apellido_paterno.clone(),
            apellido_materno: member.apellido_materno.clone(),
            email: member.email.clone(),
            phone: member.phone.clone(),
            address: member.address.clone(),
            role: member.role.clone(),
            signature: member.signature.clone(),
            certificate: member.certificate.clone(),
        }
    }
}

impl From<NamePartsJson> for NameParts {
    fn from(json: NamePartsJson) -> Self {
        Self {
            primer_nombre: json.primer_nombre,
            segundo_nombre: json.segundo_nombre,
            apellido_paterno: json.apellido_paterno,
            apellido_materno: json.apellido_materno,
        }
    }
}

impl From<&NameParts> for NamePartsJson {
    fn from(parts: &NameParts) -> Self {
        Self {
            primer_nombre: parts.primer_nombre.clone(),
            segundo_nombre: parts.segundo_nombre.clone(),
            apellido_paterno: parts.apellido_paterno.clone(),
            apellido_materno: parts.apellido_materno.clone(),
        }
    }
}
