use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ui_component")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub screen_id: Uuid,
    pub component_type: String,
    /// Stable key the client binds data to (exposed as `component_id`).
    pub component_key: String,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    /// JSON text
    pub validation_rules: Option<String>,
    /// JSON text
    pub properties: Option<String>,
    pub order_index: i32,
    pub is_required: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ui_screen::Entity",
        from = "Column::ScreenId",
        to = "super::ui_screen::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    UiScreen,
    #[sea_orm(has_many = "super::ui_action::Entity")]
    UiAction,
}

impl Related<super::ui_screen::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UiScreen.def()
    }
}

impl Related<super::ui_action::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UiAction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
