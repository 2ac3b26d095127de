use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "form_value")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub submission_id: Uuid,
    /// Live reference: name and type are read from the field at display time.
    pub field_id: Uuid,
    /// Literal input, or a stored-file reference for image fields.
    pub value: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::form_submission::Entity",
        from = "Column::SubmissionId",
        to = "super::form_submission::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FormSubmission,
    #[sea_orm(
        belongs_to = "super::category_field::Entity",
        from = "Column::FieldId",
        to = "super::category_field::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    CategoryField,
}

impl Related<super::form_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FormSubmission.def()
    }
}

impl Related<super::category_field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CategoryField.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
