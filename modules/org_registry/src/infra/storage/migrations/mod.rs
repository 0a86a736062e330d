//! Database migrations for the organization registry

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_organizations::Migration),
            Box::new(m20250301_000002_create_members::Migration),
            Box::new(m20250301_000003_create_documents::Migration),
        ]
    }
}

mod m20250301_000001_create_organizations {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_organizations"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Organizations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Organizations::Id)
                                .uuid()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Organizations::Name).string().not_null())
                        .col(ColumnDef::new(Organizations::LegacyContent).json().not_null())
                        .col(ColumnDef::new(Organizations::MemberIds).json().not_null())
                        .col(ColumnDef::new(Organizations::DocumentIds).json().not_null())
                        .col(
                            ColumnDef::new(Organizations::IsNormalized)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Organizations::NormalizedAt)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(Organizations::SchemaVersion)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Organizations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Organizations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;

            // The batch driver selects by flag in creation order
            manager
                .create_index(
                    Index::create()
                        .name("idx_organizations_is_normalized")
                        .table(Organizations::Table)
                        .col(Organizations::IsNormalized)
                        .col(Organizations::CreatedAt)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Organizations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
        Name,
        LegacyContent,
        MemberIds,
        DocumentIds,
        IsNormalized,
        NormalizedAt,
        SchemaVersion,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000002_create_members {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_members"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Members::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Members::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Members::OrganizationId).uuid().not_null())
                        .col(ColumnDef::new(Members::Rut).string().not_null())
                        .col(ColumnDef::new(Members::FirstName).string().not_null())
                        .col(ColumnDef::new(Members::LastName).string().not_null())
                        .col(ColumnDef::new(Members::NameParts).json().not_null())
                        .col(ColumnDef::new(Members::Email).string())
                        .col(ColumnDef::new(Members::Phone).string())
                        .col(ColumnDef::new(Members::Address).string())
                        .col(ColumnDef::new(Members::Role).string().not_null())
                        .col(
                            ColumnDef::new(Members::IsFoundingMember)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Members::IsElectoralCommission)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Members::IsProvisionalBoard)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Members::ProvisionalRole).string())
                        .col(ColumnDef::new(Members::SignatureId).uuid())
                        .col(ColumnDef::new(Members::CertificateId).uuid())
                        .col(ColumnDef::new(Members::MigratedFrom).string())
                        .col(ColumnDef::new(Members::OriginalIndex).integer())
                        .col(
                            ColumnDef::new(Members::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Members::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_members_organization")
                                .from(Members::Table, Members::OrganizationId)
                                .to(Organizations::Table, Organizations::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_members_organization_rut")
                        .table(Members::Table)
                        .col(Members::OrganizationId)
                        .col(Members::Rut)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Members::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Members {
        Table,
        Id,
        OrganizationId,
        Rut,
        FirstName,
        LastName,
        NameParts,
        Email,
        Phone,
        Address,
        Role,
        IsFoundingMember,
        IsElectoralCommission,
        IsProvisionalBoard,
        ProvisionalRole,
        SignatureId,
        CertificateId,
        MigratedFrom,
        OriginalIndex,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
    }
}

mod m20250301_000003_create_documents {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_documents"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Documents::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Documents::Id).uuid().not_null().primary_key())
                        .col(ColumnDef::new(Documents::OrganizationId).uuid().not_null())
                        .col(ColumnDef::new(Documents::MemberId).uuid())
                        .col(ColumnDef::new(Documents::DocType).string().not_null())
                        .col(ColumnDef::new(Documents::Content).text().not_null())
                        .col(ColumnDef::new(Documents::MimeType).string().not_null())
                        .col(ColumnDef::new(Documents::Size).big_integer().not_null())
                        .col(ColumnDef::new(Documents::SignerRole).string())
                        .col(ColumnDef::new(Documents::SignerRut).string())
                        .col(ColumnDef::new(Documents::SignerName).string())
                        .col(ColumnDef::new(Documents::Context).string().not_null())
                        .col(ColumnDef::new(Documents::MigratedFrom).string())
                        .col(ColumnDef::new(Documents::OriginalPath).string())
                        .col(
                            ColumnDef::new(Documents::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Documents::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Documents::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_documents_organization")
                                .from(Documents::Table, Documents::OrganizationId)
                                .to(Organizations::Table, Organizations::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_documents_member")
                                .from(Documents::Table, Documents::MemberId)
                                .to(Members::Table, Members::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_documents_organization_type")
                        .table(Documents::Table)
                        .col(Documents::OrganizationId)
                        .col(Documents::DocType)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_documents_member_id")
                        .table(Documents::Table)
                        .col(Documents::MemberId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Documents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Documents {
        Table,
        Id,
        OrganizationId,
        MemberId,
        DocType,
        Content,
        MimeType,
        Size,
        SignerRole,
        SignerRut,
        SignerName,
        Context,
        MigratedFrom,
        OriginalPath,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Organizations {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Members {
        Table,
        Id,
    }
}
