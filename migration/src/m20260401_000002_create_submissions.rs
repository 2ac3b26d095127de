use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // form_submission
        manager
            .create_table(
                Table::create()
                    .table(FormSubmission::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FormSubmission::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FormSubmission::CategoryId).uuid().not_null())
                    .col(
                        ColumnDef::new(FormSubmission::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(FormSubmission::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(FormSubmission::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FormSubmission::Table, FormSubmission::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_form_submission_category")
                    .table(FormSubmission::Table)
                    .col(FormSubmission::CategoryId)
                    .to_owned(),
            )
            .await?;

        // form_value
        manager
            .create_table(
                Table::create()
                    .table(FormValue::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FormValue::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(FormValue::SubmissionId).uuid().not_null())
                    .col(ColumnDef::new(FormValue::FieldId).uuid().not_null())
                    .col(ColumnDef::new(FormValue::Value).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(FormValue::Table, FormValue::SubmissionId)
                            .to(FormSubmission::Table, FormSubmission::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(FormValue::Table, FormValue::FieldId)
                            .to(CategoryField::Table, CategoryField::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .unique()
                    .name("uq_form_value_submission_field")
                    .table(FormValue::Table)
                    .col(FormValue::SubmissionId)
                    .col(FormValue::FieldId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FormValue::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FormSubmission::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}

#[derive(Iden)]
enum CategoryField {
    Table,
    Id,
}

#[derive(Iden)]
enum FormSubmission {
    Table,
    Id,
    CategoryId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum FormValue {
    Table,
    Id,
    SubmissionId,
    FieldId,
    Value,
}
