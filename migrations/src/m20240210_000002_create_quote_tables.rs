use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Quotes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Quotes::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Quotes::CompanyId).uuid().not_null())
                    .col(ColumnDef::new(Quotes::JobReferenceNumber).string().null())
                    .col(ColumnDef::new(Quotes::Notes).text().null())
                    // back-filled once the quote has been converted into a waybill
                    .col(ColumnDef::new(Quotes::WaybillId).uuid().null())
                    .col(
                        ColumnDef::new(Quotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_quotes_company")
                    .table(Quotes::Table)
                    .col(Quotes::CompanyId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuoteItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuoteItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(QuoteItems::QuoteId).uuid().not_null())
                    .col(ColumnDef::new(QuoteItems::ServiceId).uuid().not_null())
                    .col(
                        ColumnDef::new(QuoteItems::PieceCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(QuoteItems::Pounds)
                            .decimal()
                            .not_null()
                            .default(0.0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(QuoteItems::Table, QuoteItems::QuoteId)
                            .to(Quotes::Table, Quotes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QuoteItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Quotes::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Quotes {
    Table,
    Id,
    CompanyId,
    JobReferenceNumber,
    Notes,
    WaybillId,
    CreatedAt,
}

#[derive(Iden)]
enum QuoteItems {
    Table,
    Id,
    QuoteId,
    ServiceId,
    PieceCount,
    Pounds,
}
