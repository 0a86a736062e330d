//! SeaORM entities for database tables

use sea_orm::entity::prelude::*;

/// Organizations table entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    /// Embedded schema v1 content (members, electoralCommission, ...)
    pub legacy_content: Json,

    /// Ordered member ids as a JSON array
    pub member_ids: Json,

    /// Document ids as a JSON array
    pub document_ids: Json,

    pub is_normalized: bool,

    pub normalized_at: Option<DateTimeUtc>,

    /// 1 = legacy, 2 = normalized
    pub schema_version: i32,

    /// Creation timestamp
    pub created_at: DateTimeUtc,

    /// Last update timestamp
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "member::Entity")]
    Members,
    #[sea_orm(has_many = "document::Entity")]
    Documents,
}

impl Related<member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Normalized members
pub mod member {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "members")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        pub organization_id: Uuid,

        /// National id, unique per organization
        pub rut: String,

        pub first_name: String,

        pub last_name: String,

        /// primerNombre / segundoNombre / apellidoPaterno / apellidoMaterno
        pub name_parts: Json,

        pub email: Option<String>,

        pub phone: Option<String>,

        pub address: Option<String>,

        pub role: String,

        pub is_founding_member: bool,

        pub is_electoral_commission: bool,

        pub is_provisional_board: bool,

        pub provisional_role: Option<String>,

        pub signature_id: Option<Uuid>,

        pub certificate_id: Option<Uuid>,

        pub migrated_from: Option<String>,

        pub original_index: Option<i32>,

        pub created_at: DateTimeUtc,

        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::Entity",
            from = "Column::OrganizationId",
            to = "super::Column::Id"
        )]
        Organization,
        #[sea_orm(has_many = "super::document::Entity")]
        Documents,
    }

    impl Related<super::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Organization.def()
        }
    }

    impl Related<super::document::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Documents.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Normalized Base64 documents
pub mod document {
    use crate::domain::size::calculate_size;
    use sea_orm::entity::prelude::*;
    use sea_orm::{ActiveValue, ConnectionTrait};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "documents")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,

        pub organization_id: Uuid,

        /// Owning member; cleared when the member is deleted
        pub member_id: Option<Uuid>,

        pub doc_type: String,

        /// Base64 payload
        #[sea_orm(column_type = "Text")]
        pub content: String,

        pub mime_type: String,

        /// Decoded byte count, kept in step with `content`
        pub size: i64,

        pub signer_role: Option<String>,

        pub signer_rut: Option<String>,

        pub signer_name: Option<String>,

        pub context: String,

        pub migrated_from: Option<String>,

        pub original_path: Option<String>,

        pub is_active: bool,

        pub created_at: DateTimeUtc,

        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::Entity",
            from = "Column::OrganizationId",
            to = "super::Column::Id"
        )]
        Organization,
        #[sea_orm(
            belongs_to = "super::member::Entity",
            from = "Column::MemberId",
            to = "super::member::Column::Id"
        )]
        Member,
    }

    impl Related<super::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Organization.def()
        }
    }

    impl Related<super::member::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Member.def()
        }
    }

    #[async_trait::async_trait]
    impl ActiveModelBehavior for ActiveModel {
        /// Recompute `size` whenever `content` is written
        async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
        where
            C: ConnectionTrait,
        {
            if let ActiveValue::Set(content) = &self.content {
                let size = i64::try_from(calculate_size(content)).unwrap_or(i64::MAX);
                self.size = ActiveValue::Set(size);
            }
            Ok(self)
        }
    }
}
