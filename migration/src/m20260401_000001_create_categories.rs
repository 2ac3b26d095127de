use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // category
        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Category::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Category::Name).string().not_null())
                    .col(ColumnDef::new(Category::Description).text().null())
                    .col(
                        ColumnDef::new(Category::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Category::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Category::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // category_field
        manager
            .create_table(
                Table::create()
                    .table(CategoryField::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CategoryField::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CategoryField::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(CategoryField::Name).string().not_null())
                    .col(ColumnDef::new(CategoryField::FieldType).string().not_null())
                    .col(
                        ColumnDef::new(CategoryField::Required)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CategoryField::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(CategoryField::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CategoryField::Table, CategoryField::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_category_field_category")
                    .table(CategoryField::Table)
                    .col(CategoryField::CategoryId)
                    .to_owned(),
            )
            .await?;

        // field_option
        manager
            .create_table(
                Table::create()
                    .table(FieldOption::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FieldOption::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FieldOption::FieldId).uuid().not_null())
                    .col(ColumnDef::new(FieldOption::Value).string().not_null())
                    .col(
                        ColumnDef::new(FieldOption::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(FieldOption::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FieldOption::Table, FieldOption::FieldId)
                            .to(CategoryField::Table, CategoryField::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_field_option_field")
                    .table(FieldOption::Table)
                    .col(FieldOption::FieldId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FieldOption::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CategoryField::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Category::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
    Name,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CategoryField {
    Table,
    Id,
    CategoryId,
    Name,
    FieldType,
    Required,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum FieldOption {
    Table,
    Id,
    FieldId,
    Value,
    IsActive,
    CreatedAt,
}
