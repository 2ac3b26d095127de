use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "field_option")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub field_id: Uuid,
    pub value: String,
    pub is_active: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category_field::Entity",
        from = "Column::FieldId",
        to = "super::category_field::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    CategoryField,
}

impl Related<super::category_field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CategoryField.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
