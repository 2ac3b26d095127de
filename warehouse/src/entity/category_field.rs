use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "category_field")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    /// One of the [`FieldType`] names; kept as text so new kinds need no migration.
    pub field_type: String,
    pub required: bool,
    pub is_active: bool,
    pub created_at: DateTime,
}

impl Model {
    pub fn kind(&self) -> Option<FieldType> {
        self.field_type.parse().ok()
    }

    /// Multipart key a client uses to send this field's value.
    pub fn form_key(&self) -> String {
        format!("field_{}", self.id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Category,
    #[sea_orm(has_many = "super::field_option::Entity")]
    FieldOption,
    #[sea_orm(has_many = "super::form_value::Entity")]
    FormValue,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::field_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FieldOption.def()
    }
}

impl Related<super::form_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FormValue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Input kinds a category field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    TextArea,
    Number,
    Date,
    Select,
    Checkbox,
    Image,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::TextArea => "textarea",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::Image => "image",
        }
    }
}

impl std::str::FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "textarea" => Ok(FieldType::TextArea),
            "number" => Ok(FieldType::Number),
            "date" => Ok(FieldType::Date),
            "select" => Ok(FieldType::Select),
            "checkbox" => Ok(FieldType::Checkbox),
            "image" => Ok(FieldType::Image),
            other => Err(Error::validation(format!("Unknown field type: {other}"))),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Select".parse::<FieldType>().unwrap(), FieldType::Select);
        assert_eq!(" image ".parse::<FieldType>().unwrap(), FieldType::Image);
    }

    #[test]
    fn test_parse_unknown_is_validation_error() {
        let err = "colour".parse::<FieldType>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_as_str_round_trips_through_parse() {
        for t in [
            FieldType::Text,
            FieldType::TextArea,
            FieldType::Number,
            FieldType::Date,
            FieldType::Select,
            FieldType::Checkbox,
            FieldType::Image,
        ] {
            assert_eq!(t.as_str().parse::<FieldType>().unwrap(), t);
        }
    }
}
