use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Phone).string().null())
                    .col(
                        ColumnDef::new(Users::UserType)
                            .string()
                            .not_null()
                            .default("user"),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Companies::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Companies::Name).string().not_null())
                    .col(ColumnDef::new(Companies::AddressLine1).string().null())
                    .col(ColumnDef::new(Companies::AddressLine2).string().null())
                    .col(ColumnDef::new(Companies::AddressLine3).string().null())
                    .col(ColumnDef::new(Companies::Phone).string().null())
                    .col(
                        ColumnDef::new(Companies::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Companies::SalesRepId).uuid().null())
                    .col(
                        ColumnDef::new(Companies::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CompanyUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CompanyUsers::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(CompanyUsers::UserId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(CompanyUsers::CompanyId)
                            .col(CompanyUsers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CompanyUsers::Table, CompanyUsers::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CompanyUsers::Table, CompanyUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RepAccounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RepAccounts::UserId).uuid().not_null())
                    .col(ColumnDef::new(RepAccounts::CompanyId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(RepAccounts::UserId)
                            .col(RepAccounts::CompanyId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RepAccounts::Table, RepAccounts::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Services::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Services::Name).string().not_null())
                    .col(
                        ColumnDef::new(Services::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Services::ServiceType).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_services_type_active")
                    .table(Services::Table)
                    .col(Services::ServiceType)
                    .col(Services::Active)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Services::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RepAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CompanyUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Phone,
    UserType,
    CreatedAt,
}

#[derive(Iden)]
enum Companies {
    Table,
    Id,
    Name,
    #[iden = "address_line_1"]
    AddressLine1,
    #[iden = "address_line_2"]
    AddressLine2,
    #[iden = "address_line_3"]
    AddressLine3,
    Phone,
    IsPrimary,
    SalesRepId,
    CreatedAt,
}

#[derive(Iden)]
enum CompanyUsers {
    Table,
    CompanyId,
    UserId,
}

#[derive(Iden)]
enum RepAccounts {
    Table,
    UserId,
    CompanyId,
}

#[derive(Iden)]
enum Services {
    Table,
    Id,
    Name,
    Active,
    ServiceType,
}
