use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PickupRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PickupRequests::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PickupRequests::WaybillId).uuid().not_null())
                    .col(
                        ColumnDef::new(PickupRequests::PickupContact)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PickupRequests::PickupPhone)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PickupRequests::PickupEmail)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PickupRequests::PickupDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PickupRequests::PickupCompany)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PickupRequests::PickupAddressLine1)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PickupRequests::PickupAddressLine2)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PickupRequests::PickupAddressLine3)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PickupRequests::PickupReadyTime)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PickupRequests::PickupCloseTime)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PickupRequests::Notes).text().null())
                    .col(
                        ColumnDef::new(PickupRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PickupRequests::Table, PickupRequests::WaybillId)
                            .to(Waybills::Table, Waybills::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Skids::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Skids::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Skids::PickupRequestId).uuid().not_null())
                    .col(ColumnDef::new(Skids::SkidNumber).small_integer().not_null())
                    .col(ColumnDef::new(Skids::Length).decimal().not_null())
                    .col(ColumnDef::new(Skids::Width).decimal().not_null())
                    .col(ColumnDef::new(Skids::Height).decimal().not_null())
                    .col(ColumnDef::new(Skids::Weight).decimal().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Skids::Table, Skids::PickupRequestId)
                            .to(PickupRequests::Table, PickupRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Skids::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PickupRequests::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum PickupRequests {
    Table,
    Id,
    WaybillId,
    PickupContact,
    PickupPhone,
    PickupEmail,
    PickupDate,
    PickupCompany,
    #[iden = "pickup_address_line_1"]
    PickupAddressLine1,
    #[iden = "pickup_address_line_2"]
    PickupAddressLine2,
    #[iden = "pickup_address_line_3"]
    PickupAddressLine3,
    PickupReadyTime,
    PickupCloseTime,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Skids {
    Table,
    Id,
    PickupRequestId,
    SkidNumber,
    Length,
    Width,
    Height,
    Weight,
}

#[derive(Iden)]
enum Waybills {
    Table,
    Id,
}
