use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CatalogItem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CatalogItem::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CatalogItem::Code)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CatalogItem::Kind).string().not_null())
                    .col(ColumnDef::new(CatalogItem::Name).string().not_null())
                    .col(ColumnDef::new(CatalogItem::Description).text().not_null())
                    .col(ColumnDef::new(CatalogItem::Image).string().not_null())
                    .col(
                        ColumnDef::new(CatalogItem::Quantity)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CatalogItem::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(CatalogItem::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(CatalogItem::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CatalogItem::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CatalogItem::Table, CatalogItem::OwnerId)
                            .to(AppUser::Table, AppUser::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_catalog_item_kind")
                    .table(CatalogItem::Table)
                    .col(CatalogItem::Kind)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CatalogItem::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AppUser {
    Table,
    Id,
}

#[derive(Iden)]
enum CatalogItem {
    Table,
    Id,
    Code,
    Kind,
    Name,
    Description,
    Image,
    Quantity,
    IsActive,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}
