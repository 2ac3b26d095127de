use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ui_screen")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub screen_name: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub order_index: i32,
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ui_component::Entity")]
    UiComponent,
}

impl Related<super::ui_component::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UiComponent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
