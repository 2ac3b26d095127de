use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ui_screen
        manager
            .create_table(
                Table::create()
                    .table(UiScreen::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UiScreen::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(UiScreen::ScreenName)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UiScreen::Title).string().not_null())
                    .col(ColumnDef::new(UiScreen::Description).text().null())
                    .col(ColumnDef::new(UiScreen::Icon).string().null())
                    .col(
                        ColumnDef::new(UiScreen::OrderIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UiScreen::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(UiScreen::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UiScreen::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ui_component
        manager
            .create_table(
                Table::create()
                    .table(UiComponent::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UiComponent::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UiComponent::ScreenId).uuid().not_null())
                    .col(ColumnDef::new(UiComponent::ComponentType).string().not_null())
                    .col(ColumnDef::new(UiComponent::ComponentKey).string().not_null())
                    .col(ColumnDef::new(UiComponent::Label).string().null())
                    .col(ColumnDef::new(UiComponent::Placeholder).string().null())
                    .col(ColumnDef::new(UiComponent::ValidationRules).text().null())
                    .col(ColumnDef::new(UiComponent::Properties).text().null())
                    .col(
                        ColumnDef::new(UiComponent::OrderIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UiComponent::IsRequired)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UiComponent::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UiComponent::Table, UiComponent::ScreenId)
                            .to(UiScreen::Table, UiScreen::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ui_component_screen_order")
                    .table(UiComponent::Table)
                    .col(UiComponent::ScreenId)
                    .col(UiComponent::OrderIndex)
                    .to_owned(),
            )
            .await?;

        // ui_action
        manager
            .create_table(
                Table::create()
                    .table(UiAction::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UiAction::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(UiAction::ComponentId).uuid().not_null())
                    .col(ColumnDef::new(UiAction::ActionType).string().not_null())
                    .col(ColumnDef::new(UiAction::Endpoint).string().null())
                    .col(
                        ColumnDef::new(UiAction::HttpMethod)
                            .string()
                            .not_null()
                            .default("GET"),
                    )
                    .col(ColumnDef::new(UiAction::Params).text().null())
                    .col(ColumnDef::new(UiAction::NavigationTarget).string().null())
                    .col(
                        ColumnDef::new(UiAction::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UiAction::Table, UiAction::ComponentId)
                            .to(UiComponent::Table, UiComponent::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UiAction::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UiComponent::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UiScreen::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UiScreen {
    Table,
    Id,
    ScreenName,
    Title,
    Description,
    Icon,
    OrderIndex,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UiComponent {
    Table,
    Id,
    ScreenId,
    ComponentType,
    ComponentKey,
    Label,
    Placeholder,
    ValidationRules,
    Properties,
    OrderIndex,
    IsRequired,
    CreatedAt,
}

#[derive(Iden)]
enum UiAction {
    Table,
    Id,
    ComponentId,
    ActionType,
    Endpoint,
    HttpMethod,
    Params,
    NavigationTarget,
    CreatedAt,
}
