//! Common test utilities: legacy fixtures and an in-memory record store
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use org_registry::contract::*;
use org_registry::domain::{
    AlreadyNormalized, DocumentRepository, MemberRepository, MigrationPlan, NoOpProgressReporter,
    NormalizationEvent, NormalizationStore, NotNormalized, OrganizationRepository,
    ProgressReporter, RollbackPlan, Service,
};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

// ===== Fixtures =====

/// Base64-looking payload of exactly `len` characters
pub fn payload(len: usize) -> String {
    "QUJD".repeat(len / 4 + 1)[..len].to_string()
}

pub fn legacy_member(rut: &str, first: &str, last: &str) -> LegacyMember {
    LegacyMember {
        rut: Some(rut.to_string()),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        ..Default::default()
    }
}

/// A junta de vecinos exercising every embedded location:
/// - 3 members (one signature, one certificate, one below threshold)
/// - commission: one repeat of a member, one new person with a signature
/// - provisional president and treasurer seats
/// - ministro signature with assignment
/// - two validation signatures, one below threshold
///
/// 4 members and 5 documents once normalized.
pub fn junta_de_vecinos() -> Organization {
    let mut ana = legacy_member("11.111.111-1", "Ana", "López");
    ana.signature = Some(payload(180));
    ana.email = Some("ana@villalosaromos.cl".to_string());
    let mut luis = legacy_member("22.222.222-2", "Luis", "Soto");
    luis.certificate = Some(payload(150));
    luis.role = Some("secretary".to_string());
    let mut eva = legacy_member("33.333.333-3", "Eva", "Rojas");
    eva.signature = Some(payload(50));

    let mut pedro = legacy_member("44.444.444-4", "Pedro", "Muñoz");
    pedro.signature = Some(payload(120));

    let mut signatures = BTreeMap::new();
    signatures.insert("presidente".to_string(), payload(140));
    signatures.insert("secretario".to_string(), payload(30));

    Organization::new_legacy(
        "Junta de Vecinos Villa Los Aromos",
        LegacyContent {
            members: vec![ana, luis, eva],
            electoral_commission: vec![legacy_member("22.222.222-2", "Luis", "Soto"), pedro],
            provisional_directorio: Some(ProvisionalDirectorio {
                president: Some(legacy_member("11.111.111-1", "Ana", "López")),
                secretary: None,
                treasurer: Some(legacy_member("44.444.444-4", "Pedro", "Muñoz")),
            }),
            ministro_signature: Some(payload(200)),
            validation_data: Some(ValidationData {
                signatures,
                ministro_signature: None,
            }),
            ministro_assignment: Some(MinistroAssignment {
                name: Some("Carmen Fuentes".to_string()),
                rut: Some("9.999.999-9".to_string()),
            }),
        },
    )
}

/// The single-member organization from the registry handbook
pub fn single_member_organization() -> Organization {
    let mut ana = legacy_member("1-1", "Ana", "Lopez");
    ana.signature = Some(payload(180));
    Organization::new_legacy(
        "Club Deportivo Los Aromos",
        LegacyContent {
            members: vec![ana],
            ..Default::default()
        },
    )
}

// ===== In-memory store =====

#[derive(Default)]
struct Tables {
    /// Insertion order stands in for created_at ordering
    organization_order: Vec<Uuid>,
    organizations: HashMap<Uuid, Organization>,
    members: HashMap<Uuid, Member>,
    documents: HashMap<Uuid, Document>,
}

/// Implements every repository trait over shared maps. Commits validate
/// the whole plan before touching any table, so a failed commit leaves
/// no partial rows.
#[derive(Default)]
pub struct MockStore {
    tables: RwLock<Tables>,
    fail_commits_for: RwLock<HashSet<Uuid>>,
    fail_batch_fetch: AtomicBool,
}

impl MockStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, organization: Organization) -> Uuid {
        let id = organization.id;
        let mut tables = self.tables.write();
        tables.organization_order.push(id);
        tables.organizations.insert(id, organization);
        id
    }

    pub fn organization(&self, id: Uuid) -> Organization {
        self.tables.read().organizations[&id].clone()
    }

    pub fn member_count(&self) -> usize {
        self.tables.read().members.len()
    }

    pub fn document_count(&self) -> usize {
        self.tables.read().documents.len()
    }

    pub fn members_of(&self, organization_id: Uuid) -> Vec<Member> {
        self.tables
            .read()
            .members
            .values()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect()
    }

    pub fn documents_of(&self, organization_id: Uuid) -> Vec<Document> {
        self.tables
            .read()
            .documents
            .values()
            .filter(|d| d.organization_id == organization_id)
            .cloned()
            .collect()
    }

    /// Make every commit touching this organization fail
    pub fn fail_commits_for(&self, organization_id: Uuid) {
        self.fail_commits_for.write().insert(organization_id);
    }

    /// Make batch loads fail
    pub fn fail_batch_fetch(&self, fail: bool) {
        self.fail_batch_fetch.store(fail, Ordering::SeqCst);
    }

    /// Flip the flag behind the engine's back, as a concurrent run would
    pub fn mark_normalized(&self, organization_id: Uuid) {
        if let Some(org) = self.tables.write().organizations.get_mut(&organization_id) {
            org.is_normalized = true;
            org.schema_version = SchemaVersion::Normalized;
        }
    }

    /// Insert a member directly into the normalized collection
    pub fn insert_member(&self, member: Member) {
        let mut tables = self.tables.write();
        if let Some(org) = tables.organizations.get_mut(&member.organization_id) {
            org.member_ids.push(member.id);
        }
        tables.members.insert(member.id, member);
    }

    pub fn service(self: &Arc<Self>) -> Service {
        self.service_with_reporter(Arc::new(NoOpProgressReporter))
    }

    pub fn service_with_reporter(self: &Arc<Self>, reporter: Arc<dyn ProgressReporter>) -> Service {
        Service::new(
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            reporter,
        )
    }
}

#[async_trait]
impl OrganizationRepository for MockStore {
    async fn insert(&self, organization: &Organization) -> Result<Organization> {
        self.seed(organization.clone());
        Ok(organization.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>> {
        Ok(self.tables.read().organizations.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, Result<Organization>)>> {
        if self.fail_batch_fetch.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset while loading batch"));
        }
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.organizations.get(id).cloned())
            .map(|org| (org.id, Ok(org)))
            .collect())
    }

    async fn list_ids(&self, normalized: bool) -> Result<Vec<Uuid>> {
        let tables = self.tables.read();
        Ok(tables
            .organization_order
            .iter()
            .filter(|id| tables.organizations[*id].is_normalized == normalized)
            .copied()
            .collect())
    }
}

#[async_trait]
impl MemberRepository for MockStore {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Member>> {
        let tables = self.tables.read();
        // Reverse to prove callers restore reference order themselves
        Ok(ids
            .iter()
            .rev()
            .filter_map(|id| tables.members.get(id).cloned())
            .collect())
    }

    async fn find_provisional_board(&self, organization_id: Uuid) -> Result<Vec<Member>> {
        Ok(self
            .members_of(organization_id)
            .into_iter()
            .filter(|m| m.is_provisional_board)
            .collect())
    }
}

#[async_trait]
impl DocumentRepository for MockStore {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Document>> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.documents.get(id).cloned())
            .collect())
    }

    async fn find_for_members(
        &self,
        member_ids: &[Uuid],
        types: &[DocumentType],
    ) -> Result<Vec<Document>> {
        Ok(self
            .tables
            .read()
            .documents
            .values()
            .filter(|d| d.is_active)
            .filter(|d| d.member_id.is_some_and(|m| member_ids.contains(&m)))
            .filter(|d| types.contains(&d.doc_type))
            .cloned()
            .collect())
    }

    async fn find_by_organization(
        &self,
        organization_id: Uuid,
        doc_type: DocumentType,
    ) -> Result<Vec<Document>> {
        Ok(self
            .documents_of(organization_id)
            .into_iter()
            .filter(|d| d.is_active && d.doc_type == doc_type)
            .collect())
    }
}

#[async_trait]
impl NormalizationStore for MockStore {
    async fn commit_migration(&self, plan: &MigrationPlan) -> Result<()> {
        if self.fail_commits_for.read().contains(&plan.organization_id) {
            return Err(anyhow!("simulated write failure"));
        }

        let mut tables = self.tables.write();
        let org = tables
            .organizations
            .get(&plan.organization_id)
            .ok_or_else(|| anyhow!("organization {} vanished", plan.organization_id))?;
        if org.is_normalized {
            return Err(AlreadyNormalized(plan.organization_id).into());
        }

        // Unique (organization, rut), checked before any write
        let mut ruts: HashSet<&str> = tables
            .members
            .values()
            .filter(|m| m.organization_id == plan.organization_id)
            .map(|m| m.rut.as_str())
            .collect();
        for member in &plan.members {
            if !ruts.insert(member.rut.as_str()) {
                return Err(anyhow!("duplicate rut {}", member.rut));
            }
        }

        for member in &plan.members {
            tables.members.insert(member.id, member.clone());
        }
        for document in &plan.documents {
            tables.documents.insert(document.id, document.clone());
        }
        if let Some(org) = tables.organizations.get_mut(&plan.organization_id) {
            org.member_ids = plan.member_ids();
            org.document_ids = plan.document_ids();
            org.is_normalized = true;
            org.normalized_at = Some(plan.normalized_at);
            org.schema_version = SchemaVersion::Normalized;
            org.updated_at = plan.normalized_at;
        }
        Ok(())
    }

    async fn commit_rollback(&self, plan: &RollbackPlan) -> Result<(usize, usize)> {
        if self.fail_commits_for.read().contains(&plan.organization_id) {
            return Err(anyhow!("simulated write failure"));
        }

        let mut tables = self.tables.write();
        let normalized = tables
            .organizations
            .get(&plan.organization_id)
            .is_some_and(|o| o.is_normalized);
        if !normalized {
            return Err(NotNormalized(plan.organization_id).into());
        }

        let mut members_deleted = 0;
        for id in &plan.member_ids {
            if tables.members.remove(id).is_some() {
                members_deleted += 1;
            }
        }
        let mut documents_deleted = 0;
        for id in &plan.document_ids {
            if tables.documents.remove(id).is_some() {
                documents_deleted += 1;
            }
        }
        if let Some(org) = tables.organizations.get_mut(&plan.organization_id) {
            org.member_ids.clear();
            org.document_ids.clear();
            org.is_normalized = false;
            org.normalized_at = None;
            org.schema_version = SchemaVersion::Legacy;
        }
        Ok((members_deleted, documents_deleted))
    }
}

// ===== Progress capture =====

#[derive(Default)]
pub struct RecordingReporter {
    events: RwLock<Vec<NormalizationEvent>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<NormalizationEvent> {
        self.events.read().clone()
    }
}

#[async_trait]
impl ProgressReporter for RecordingReporter {
    async fn report(&self, event: NormalizationEvent) -> Result<()> {
        self.events.write().push(event);
        Ok(())
    }
}

/// Reporter whose sink is always down
pub struct BrokenReporter;

#[async_trait]
impl ProgressReporter for BrokenReporter {
    async fn report(&self, _event: NormalizationEvent) -> Result<()> {
        Err(anyhow!("progress sink unavailable"))
    }
}
