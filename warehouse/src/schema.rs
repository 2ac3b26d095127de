//! Schema store: categories and their dynamically defined fields/options.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entity::{category, category_field, field_option};
use crate::error::{Error, Result};

pub use crate::entity::category_field::FieldType;

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NewField {
    pub category_id: Uuid,
    pub name: String,
    pub field_type: String,
    pub required: bool,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NewFieldOption {
    pub field_id: Uuid,
    pub value: String,
    pub active: bool,
}

/// A category, optionally with its active fields attached.
#[derive(Debug, Clone)]
pub struct CategoryDetail {
    pub category: category::Model,
    /// `None` when fields were not requested.
    pub fields: Option<Vec<FieldDetail>>,
}

#[derive(Debug, Clone)]
pub struct FieldDetail {
    pub field: category_field::Model,
    /// Active options for select fields; always empty for other types.
    pub options: Vec<field_option::Model>,
}

#[derive(Clone)]
pub struct SchemaStore {
    db: DatabaseConnection,
}

impl SchemaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_category(&self, input: NewCategory) -> Result<category::Model> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(Error::validation("Category name is required"));
        }

        let now = Utc::now().naive_utc();
        let model = category::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            description: Set(input.description),
            is_active: Set(input.active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(category_id = %model.id, name = %model.name, "created category");
        Ok(model)
    }

    pub async fn list_categories(&self) -> Result<Vec<category::Model>> {
        Ok(category::Entity::find()
            .filter(category::Column::IsActive.eq(true))
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Fetch an active category. With `include_fields`, attaches its active
    /// fields in insertion order, each select field with its active options.
    pub async fn get_category(&self, id: Uuid, include_fields: bool) -> Result<CategoryDetail> {
        let category = category::Entity::find_by_id(id)
            .filter(category::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::not_found("Category not found"))?;

        if !include_fields {
            return Ok(CategoryDetail {
                category,
                fields: None,
            });
        }

        let fields = category_field::Entity::find()
            .filter(category_field::Column::CategoryId.eq(id))
            .filter(category_field::Column::IsActive.eq(true))
            .order_by_asc(category_field::Column::Id)
            .all(&self.db)
            .await?;

        let select_ids: Vec<Uuid> = fields
            .iter()
            .filter(|f| f.kind() == Some(FieldType::Select))
            .map(|f| f.id)
            .collect();

        let mut options_by_field: HashMap<Uuid, Vec<field_option::Model>> = HashMap::new();
        if !select_ids.is_empty() {
            let options = field_option::Entity::find()
                .filter(field_option::Column::FieldId.is_in(select_ids))
                .filter(field_option::Column::IsActive.eq(true))
                .order_by_asc(field_option::Column::Id)
                .all(&self.db)
                .await?;
            for option in options {
                options_by_field.entry(option.field_id).or_default().push(option);
            }
        }

        let fields = fields
            .into_iter()
            .map(|field| FieldDetail {
                options: options_by_field.remove(&field.id).unwrap_or_default(),
                field,
            })
            .collect();

        Ok(CategoryDetail {
            category,
            fields: Some(fields),
        })
    }

    /// Soft-delete or restore a category. Repeating the current state is a conflict.
    pub async fn set_category_active(&self, id: Uuid, active: bool) -> Result<category::Model> {
        let category = category::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::not_found("Category not found"))?;

        if category.is_active == active {
            return Err(Error::conflict(if active {
                "Category is already active"
            } else {
                "Category is already inactive"
            }));
        }

        let mut active_model: category::ActiveModel = category.into();
        active_model.is_active = Set(active);
        active_model.updated_at = Set(Utc::now().naive_utc());
        Ok(active_model.update(&self.db).await?)
    }

    /// Bulk-create fields. Either every field is persisted or none is.
    pub async fn add_fields(&self, fields: Vec<NewField>) -> Result<Vec<category_field::Model>> {
        if fields.is_empty() {
            return Err(Error::validation("At least one field is required"));
        }

        let mut planned = Vec::with_capacity(fields.len());
        for field in fields {
            let name = field.name.trim().to_string();
            if name.is_empty() {
                return Err(Error::validation("Field name is required"));
            }
            let field_type: FieldType = field.field_type.parse()?;
            planned.push((field, name, field_type));
        }

        let category_ids: BTreeSet<Uuid> = planned.iter().map(|(f, _, _)| f.category_id).collect();

        let txn = self.db.begin().await?;

        let found = category::Entity::find()
            .filter(category::Column::Id.is_in(category_ids.iter().copied()))
            .filter(category::Column::IsActive.eq(true))
            .count(&txn)
            .await?;
        if found as usize != category_ids.len() {
            return Err(Error::not_found("Category not found"));
        }

        let now = Utc::now().naive_utc();
        let mut created = Vec::with_capacity(planned.len());
        for (field, name, field_type) in planned {
            let model = category_field::ActiveModel {
                id: Set(Uuid::now_v7()),
                category_id: Set(field.category_id),
                name: Set(name),
                field_type: Set(field_type.as_str().to_string()),
                required: Set(field.required),
                is_active: Set(field.active),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
            created.push(model);
        }

        txn.commit().await?;

        tracing::info!(count = created.len(), "created category fields");
        Ok(created)
    }

    /// Bulk-create options for select fields, all-or-nothing.
    pub async fn add_field_options(
        &self,
        options: Vec<NewFieldOption>,
    ) -> Result<Vec<field_option::Model>> {
        if options.is_empty() {
            return Err(Error::validation("At least one option is required"));
        }
        if options.iter().any(|o| o.value.trim().is_empty()) {
            return Err(Error::validation("Option value is required"));
        }

        let field_ids: BTreeSet<Uuid> = options.iter().map(|o| o.field_id).collect();

        let txn = self.db.begin().await?;

        let fields: HashMap<Uuid, category_field::Model> = category_field::Entity::find()
            .filter(category_field::Column::Id.is_in(field_ids.iter().copied()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();

        for field_id in &field_ids {
            let field = fields
                .get(field_id)
                .ok_or_else(|| Error::not_found(format!("Field {field_id} not found")))?;
            if field.kind() != Some(FieldType::Select) {
                return Err(Error::validation(format!(
                    "Field '{}' is of type '{}'; only select fields take options",
                    field.name, field.field_type
                )));
            }
        }

        let now = Utc::now().naive_utc();
        let mut created = Vec::with_capacity(options.len());
        for option in options {
            let model = field_option::ActiveModel {
                id: Set(Uuid::now_v7()),
                field_id: Set(option.field_id),
                value: Set(option.value.trim().to_string()),
                is_active: Set(option.active),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
            created.push(model);
        }

        txn.commit().await?;

        tracing::info!(count = created.len(), "created field options");
        Ok(created)
    }
}
