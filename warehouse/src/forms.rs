//! Form engine: validates and stores submissions against a category's fields.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::{category, category_field, field_option, form_submission, form_value};
use crate::entity::category_field::FieldType;
use crate::error::{Error, Result};
use crate::storage::{FileStore, Upload, check_upload};

/// Raw input for one field as it arrived from the client.
#[derive(Debug, Clone)]
pub enum RawValue {
    Text(String),
    File(Upload),
}

impl RawValue {
    /// Absent, blank text and zero-byte files all count as "no value".
    fn into_present(self) -> Option<RawValue> {
        match self {
            RawValue::Text(s) if s.trim().is_empty() => None,
            RawValue::File(u) if u.is_empty() => None,
            other => Some(other),
        }
    }
}

/// Stored value interpreted according to the field's current type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Select(String),
    Checkbox(bool),
    Image(String),
}

impl TypedValue {
    /// Falls back to `Text` when the stored string does not parse as the
    /// declared type.
    pub fn interpret(field_type: Option<FieldType>, raw: &str) -> Self {
        let text = || TypedValue::Text(raw.to_string());
        match field_type {
            // NaN and infinities have no JSON form; keep them as text.
            Some(FieldType::Number) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(TypedValue::Number)
                .unwrap_or_else(text),
            Some(FieldType::Date) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(TypedValue::Date)
                .unwrap_or_else(|_| text()),
            Some(FieldType::Select) => TypedValue::Select(raw.to_string()),
            Some(FieldType::Checkbox) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => TypedValue::Checkbox(true),
                "false" | "0" | "off" | "no" => TypedValue::Checkbox(false),
                _ => text(),
            },
            Some(FieldType::Image) => TypedValue::Image(raw.to_string()),
            Some(FieldType::Text) | Some(FieldType::TextArea) | None => text(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionDetail {
    pub submission: form_submission::Model,
    /// `None` when values were not requested.
    pub values: Option<Vec<ValueDetail>>,
}

#[derive(Debug, Clone)]
pub struct ValueDetail {
    pub value: form_value::Model,
    /// The field as it is now, not as it was when the value was stored.
    pub field: Option<category_field::Model>,
}

impl ValueDetail {
    pub fn typed(&self) -> Option<TypedValue> {
        let raw = self.value.value.as_deref()?;
        Some(TypedValue::interpret(
            self.field.as_ref().and_then(|f| f.kind()),
            raw,
        ))
    }
}

/// What will be written for one field once validation has passed.
enum Planned {
    Empty,
    Text(String),
    File(Upload),
}

#[derive(Clone)]
pub struct FormEngine {
    db: DatabaseConnection,
    files: Arc<dyn FileStore>,
}

impl FormEngine {
    pub fn new(db: DatabaseConnection, files: Arc<dyn FileStore>) -> Self {
        Self { db, files }
    }

    /// Validate `values` (keyed `field_<id>`) against the category's active
    /// fields and persist one value per field. Unknown keys are ignored.
    pub async fn create_submission(
        &self,
        category_id: Uuid,
        mut values: HashMap<String, RawValue>,
    ) -> Result<SubmissionDetail> {
        let txn = self.db.begin().await?;

        category::Entity::find_by_id(category_id)
            .filter(category::Column::IsActive.eq(true))
            .one(&txn)
            .await?
            .ok_or_else(|| Error::not_found("Category not found"))?;

        let fields = category_field::Entity::find()
            .filter(category_field::Column::CategoryId.eq(category_id))
            .filter(category_field::Column::IsActive.eq(true))
            .order_by_asc(category_field::Column::Id)
            .all(&txn)
            .await?;

        let select_ids: Vec<Uuid> = fields
            .iter()
            .filter(|f| f.kind() == Some(FieldType::Select))
            .map(|f| f.id)
            .collect();
        let selects_with_options: HashSet<Uuid> = if select_ids.is_empty() {
            HashSet::new()
        } else {
            field_option::Entity::find()
                .select_only()
                .column(field_option::Column::FieldId)
                .filter(field_option::Column::FieldId.is_in(select_ids))
                .filter(field_option::Column::IsActive.eq(true))
                .into_tuple::<Uuid>()
                .all(&txn)
                .await?
                .into_iter()
                .collect()
        };

        let mut plan = Vec::with_capacity(fields.len());
        for field in fields {
            let raw = values
                .remove(&field.form_key())
                .and_then(RawValue::into_present);
            let planned = plan_value(&field, raw, &selects_with_options)?;
            plan.push((field, planned));
        }

        let mut stored = Vec::new();
        match self.persist(txn, category_id, plan, &mut stored).await {
            Ok(detail) => {
                tracing::info!(
                    submission_id = %detail.submission.id,
                    category_id = %category_id,
                    files = stored.len(),
                    "created submission"
                );
                Ok(detail)
            }
            Err(err) => {
                self.discard(&stored).await;
                Err(err)
            }
        }
    }

    /// Write phase. Dropping `txn` on any error rolls it back; references of
    /// files stored so far are pushed to `stored` for cleanup by the caller.
    async fn persist(
        &self,
        txn: DatabaseTransaction,
        category_id: Uuid,
        plan: Vec<(category_field::Model, Planned)>,
        stored: &mut Vec<String>,
    ) -> Result<SubmissionDetail> {
        let now = Utc::now().naive_utc();
        let submission = form_submission::ActiveModel {
            id: Set(Uuid::now_v7()),
            category_id: Set(category_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut values = Vec::with_capacity(plan.len());
        for (field, planned) in plan {
            let value = match planned {
                Planned::Empty => None,
                Planned::Text(s) => Some(s),
                Planned::File(upload) => {
                    let reference = self.files.store(&upload).await?;
                    stored.push(reference.clone());
                    Some(reference)
                }
            };

            let model = form_value::ActiveModel {
                id: Set(Uuid::now_v7()),
                submission_id: Set(submission.id),
                field_id: Set(field.id),
                value: Set(value),
            }
            .insert(&txn)
            .await?;
            values.push(ValueDetail {
                value: model,
                field: Some(field),
            });
        }

        txn.commit().await?;

        Ok(SubmissionDetail {
            submission,
            values: Some(values),
        })
    }

    async fn discard(&self, references: &[String]) {
        for reference in references {
            if let Err(e) = self.files.remove(reference).await {
                tracing::warn!(reference = %reference, error = %e, "failed to remove orphaned upload");
            }
        }
    }

    pub async fn get_submission(&self, id: Uuid, include_values: bool) -> Result<SubmissionDetail> {
        let submission = form_submission::Entity::find_by_id(id)
            .filter(form_submission::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::not_found("Submission not found"))?;

        if !include_values {
            return Ok(SubmissionDetail {
                submission,
                values: None,
            });
        }

        let values = form_value::Entity::find()
            .filter(form_value::Column::SubmissionId.eq(id))
            .find_also_related(category_field::Entity)
            .order_by_asc(form_value::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|(value, field)| ValueDetail { value, field })
            .collect();

        Ok(SubmissionDetail {
            submission,
            values: Some(values),
        })
    }

    /// Active submissions of an active category, oldest first.
    pub async fn list_submissions(&self, category_id: Uuid) -> Result<Vec<form_submission::Model>> {
        category::Entity::find_by_id(category_id)
            .filter(category::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::not_found("Category not found"))?;

        Ok(form_submission::Entity::find()
            .filter(form_submission::Column::CategoryId.eq(category_id))
            .filter(form_submission::Column::IsActive.eq(true))
            .order_by_asc(form_submission::Column::Id)
            .all(&self.db)
            .await?)
    }
}

fn plan_value(
    field: &category_field::Model,
    raw: Option<RawValue>,
    selects_with_options: &HashSet<Uuid>,
) -> Result<Planned> {
    let kind = field.kind();
    let planned = match (kind, raw) {
        (_, None) => Planned::Empty,
        (Some(FieldType::Image), Some(RawValue::File(upload))) => {
            check_upload(&upload)?;
            Planned::File(upload)
        }
        (Some(FieldType::Image), Some(RawValue::Text(_))) => {
            return Err(Error::validation(format!(
                "Field '{}' expects an image file",
                field.name
            )));
        }
        (_, Some(RawValue::File(_))) => {
            return Err(Error::validation(format!(
                "Field '{}' does not accept files",
                field.name
            )));
        }
        (_, Some(RawValue::Text(s))) => Planned::Text(s),
    };

    if field.required && matches!(planned, Planned::Empty) {
        return Err(Error::validation(format!("Field '{}' is required", field.name)));
    }
    if kind == Some(FieldType::Select)
        && !matches!(planned, Planned::Empty)
        && !selects_with_options.contains(&field.id)
    {
        return Err(Error::validation(format!(
            "Field '{}' has no active options to choose from",
            field.name
        )));
    }
    Ok(planned)
}
