use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Waybills::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Waybills::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    // uniqueness backs the read-max-then-increment assignment;
                    // concurrent commits retry on conflict
                    .col(
                        ColumnDef::new(Waybills::WaybillNumber)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Waybills::UserId).uuid().not_null())
                    .col(ColumnDef::new(Waybills::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Waybills::SalesRepId).uuid().null())
                    .col(ColumnDef::new(Waybills::ShipperCompany).string().null())
                    .col(ColumnDef::new(Waybills::ShipperContact).string().null())
                    .col(
                        ColumnDef::new(Waybills::ShipperAddressLine1)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Waybills::ShipperAddressLine2)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Waybills::ShipperAddressLine3)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(Waybills::ShipperPhone).string().null())
                    .col(ColumnDef::new(Waybills::ConsigneeCompany).string().null())
                    .col(ColumnDef::new(Waybills::ConsigneeContact).string().null())
                    .col(
                        ColumnDef::new(Waybills::ConsigneeAddressLine1)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Waybills::ConsigneeAddressLine2)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Waybills::ConsigneeAddressLine3)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(Waybills::ConsigneePhone).string().null())
                    .col(ColumnDef::new(Waybills::ShipDate).date().null())
                    .col(ColumnDef::new(Waybills::QuoteNumber).uuid().null())
                    .col(
                        ColumnDef::new(Waybills::JobReferenceNumber)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(Waybills::Notes).text().null())
                    .col(
                        ColumnDef::new(Waybills::NotifyDiscrepancies)
                            .boolean()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Waybills::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_waybills_company_created")
                    .table(Waybills::Table)
                    .col(Waybills::CompanyId)
                    .col(Waybills::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WaybillServices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WaybillServices::WaybillId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WaybillServices::ServiceId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WaybillServices::Pieces)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WaybillServices::Pounds)
                            .decimal()
                            .not_null()
                            .default(0.0),
                    )
                    .primary_key(
                        Index::create()
                            .col(WaybillServices::WaybillId)
                            .col(WaybillServices::ServiceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(WaybillServices::Table, WaybillServices::WaybillId)
                            .to(Waybills::Table, Waybills::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WaybillServices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Waybills::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Waybills {
    Table,
    Id,
    WaybillNumber,
    UserId,
    CompanyId,
    SalesRepId,
    ShipperCompany,
    ShipperContact,
    #[iden = "shipper_address_line_1"]
    ShipperAddressLine1,
    #[iden = "shipper_address_line_2"]
    ShipperAddressLine2,
    #[iden = "shipper_address_line_3"]
    ShipperAddressLine3,
    ShipperPhone,
    ConsigneeCompany,
    ConsigneeContact,
    #[iden = "consignee_address_line_1"]
    ConsigneeAddressLine1,
    #[iden = "consignee_address_line_2"]
    ConsigneeAddressLine2,
    #[iden = "consignee_address_line_3"]
    ConsigneeAddressLine3,
    ConsigneePhone,
    ShipDate,
    QuoteNumber,
    JobReferenceNumber,
    Notes,
    NotifyDiscrepancies,
    CreatedAt,
}

#[derive(Iden)]
enum WaybillServices {
    Table,
    WaybillId,
    ServiceId,
    Pieces,
    Pounds,
}
