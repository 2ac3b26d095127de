use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ui_action")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub component_id: Uuid,
    pub action_type: String,
    pub endpoint: Option<String>,
    pub http_method: String,
    /// JSON text
    pub params: Option<String>,
    pub navigation_target: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ui_component::Entity",
        from = "Column::ComponentId",
        to = "super::ui_component::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    UiComponent,
}

impl Related<super::ui_component::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UiComponent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
