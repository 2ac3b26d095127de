use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::{
    app_user, catalog_item, category, category_field, field_option, form_submission, ui_action,
    ui_component, ui_screen,
};
use crate::forms::{SubmissionDetail, TypedValue, ValueDetail};
use crate::schema::{CategoryDetail, FieldDetail};
use crate::ui::{ComponentDescriptor, ScreenDescriptor};

// ---------- flag parsing ----------

/// Clients send flags as JSON booleans, 0/1, or query-string text.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl RawFlag {
    fn into_bool<E: de::Error>(self) -> Result<bool, E> {
        match self {
            RawFlag::Bool(b) => Ok(b),
            RawFlag::Int(0) => Ok(false),
            RawFlag::Int(1) => Ok(true),
            RawFlag::Int(n) => Err(E::custom(format!("expected 0 or 1, got {n}"))),
            RawFlag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(true),
                "false" | "0" | "no" | "off" => Ok(false),
                other => Err(E::custom(format!("expected a boolean, got '{other}'"))),
            },
        }
    }
}

fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    RawFlag::deserialize(d)?.into_bool()
}

fn opt_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Option::<RawFlag>::deserialize(d)?
        .map(RawFlag::into_bool)
        .transpose()
}

fn default_true() -> bool {
    true
}

// ---------- schema requests ----------

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub active: bool,
}

/// `category_id` may be given once at the top level or on every item.
#[derive(Debug, Deserialize)]
pub struct CreateFieldsRequest {
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub fields: Vec<FieldItem>,
}

#[derive(Debug, Deserialize)]
pub struct FieldItem {
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub field_type: String,
    #[serde(default, deserialize_with = "flag")]
    pub required: bool,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateOptionsRequest {
    #[serde(default)]
    pub options: Vec<OptionItem>,
}

#[derive(Debug, Deserialize)]
pub struct OptionItem {
    pub field_id: Uuid,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    #[serde(default, deserialize_with = "flag")]
    pub include_fields: bool,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionQuery {
    #[serde(default, deserialize_with = "flag")]
    pub include_values: bool,
}

// ---------- schema responses ----------

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldResponse>>,
}

impl From<category::Model> for CategoryResponse {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
            fields: None,
        }
    }
}

impl From<CategoryDetail> for CategoryResponse {
    fn from(d: CategoryDetail) -> Self {
        let mut resp = CategoryResponse::from(d.category);
        resp.fields = d
            .fields
            .map(|fields| fields.into_iter().map(FieldResponse::from).collect());
        resp
    }
}

#[derive(Debug, Serialize)]
pub struct FieldResponse {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub field_type: String,
    /// Multipart key to submit this field's value under.
    pub form_key: String,
    pub required: bool,
    pub active: bool,
    pub created_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<OptionResponse>>,
}

impl From<category_field::Model> for FieldResponse {
    fn from(m: category_field::Model) -> Self {
        Self {
            form_key: m.form_key(),
            id: m.id,
            category_id: m.category_id,
            name: m.name,
            field_type: m.field_type,
            required: m.required,
            active: m.is_active,
            created_at: m.created_at,
            options: None,
        }
    }
}

impl From<FieldDetail> for FieldResponse {
    fn from(d: FieldDetail) -> Self {
        let mut resp = FieldResponse::from(d.field);
        resp.options = Some(d.options.into_iter().map(OptionResponse::from).collect());
        resp
    }
}

#[derive(Debug, Serialize)]
pub struct OptionResponse {
    pub id: Uuid,
    pub field_id: Uuid,
    pub value: String,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl From<field_option::Model> for OptionResponse {
    fn from(m: field_option::Model) -> Self {
        Self {
            id: m.id,
            field_id: m.field_id,
            value: m.value,
            active: m.is_active,
            created_at: m.created_at,
        }
    }
}

// ---------- submission responses ----------

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub category_id: Uuid,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<ValueResponse>>,
}

impl From<form_submission::Model> for SubmissionResponse {
    fn from(m: form_submission::Model) -> Self {
        Self {
            id: m.id,
            category_id: m.category_id,
            active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
            values: None,
        }
    }
}

impl From<SubmissionDetail> for SubmissionResponse {
    fn from(d: SubmissionDetail) -> Self {
        let mut resp = SubmissionResponse::from(d.submission);
        resp.values = d
            .values
            .map(|values| values.into_iter().map(ValueResponse::from).collect());
        resp
    }
}

#[derive(Debug, Serialize)]
pub struct ValueResponse {
    pub id: Uuid,
    pub field_id: Uuid,
    pub field_name: Option<String>,
    pub field_type: Option<String>,
    pub value: Option<String>,
    pub typed: Option<TypedValue>,
}

impl From<ValueDetail> for ValueResponse {
    fn from(d: ValueDetail) -> Self {
        let typed = d.typed();
        Self {
            id: d.value.id,
            field_id: d.value.field_id,
            field_name: d.field.as_ref().map(|f| f.name.clone()),
            field_type: d.field.map(|f| f.field_type),
            value: d.value.value,
            typed,
        }
    }
}

// ---------- UI requests ----------

#[derive(Debug, Deserialize)]
pub struct CreateScreenRequest {
    #[serde(default)]
    pub screen_name: String,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateComponentRequest {
    pub screen_id: Uuid,
    #[serde(default)]
    pub component_type: String,
    /// Client data-binding key.
    #[serde(default)]
    pub component_id: String,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub validation_rules: Option<Value>,
    pub properties: Option<Value>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default, deserialize_with = "flag")]
    pub is_required: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateActionRequest {
    pub component_id: Uuid,
    #[serde(default)]
    pub action_type: String,
    pub endpoint: Option<String>,
    pub http_method: Option<String>,
    pub params: Option<Value>,
    pub navigation_target: Option<String>,
}

// ---------- UI responses ----------

fn parse_json(text: Option<String>) -> Option<Value> {
    text.and_then(|s| serde_json::from_str(&s).ok())
}

#[derive(Debug, Serialize)]
pub struct ScreenResponse {
    pub id: Uuid,
    pub screen_name: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub order_index: i32,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ComponentResponse>>,
}

impl From<ui_screen::Model> for ScreenResponse {
    fn from(m: ui_screen::Model) -> Self {
        Self {
            id: m.id,
            screen_name: m.screen_name,
            title: m.title,
            description: m.description,
            icon: m.icon,
            order_index: m.order_index,
            active: m.is_active,
            components: None,
        }
    }
}

impl From<ScreenDescriptor> for ScreenResponse {
    fn from(d: ScreenDescriptor) -> Self {
        let mut resp = ScreenResponse::from(d.screen);
        resp.components = Some(d.components.into_iter().map(ComponentResponse::from).collect());
        resp
    }
}

#[derive(Debug, Serialize)]
pub struct ComponentResponse {
    pub id: Uuid,
    pub screen_id: Uuid,
    pub component_type: String,
    pub component_id: String,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub validation_rules: Option<Value>,
    pub properties: Option<Value>,
    pub order_index: i32,
    pub is_required: bool,
    pub actions: Vec<ActionResponse>,
}

impl From<ui_component::Model> for ComponentResponse {
    fn from(m: ui_component::Model) -> Self {
        Self {
            id: m.id,
            screen_id: m.screen_id,
            component_type: m.component_type,
            component_id: m.component_key,
            label: m.label,
            placeholder: m.placeholder,
            validation_rules: parse_json(m.validation_rules),
            properties: parse_json(m.properties),
            order_index: m.order_index,
            is_required: m.is_required,
            actions: Vec::new(),
        }
    }
}

impl From<ComponentDescriptor> for ComponentResponse {
    fn from(d: ComponentDescriptor) -> Self {
        let mut resp = ComponentResponse::from(d.component);
        resp.actions = d.actions.into_iter().map(ActionResponse::from).collect();
        resp
    }
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub id: Uuid,
    pub component_id: Uuid,
    pub action_type: String,
    pub endpoint: Option<String>,
    pub http_method: String,
    pub params: Option<Value>,
    pub navigation_target: Option<String>,
}

impl From<ui_action::Model> for ActionResponse {
    fn from(m: ui_action::Model) -> Self {
        Self {
            id: m.id,
            component_id: m.component_id,
            action_type: m.action_type,
            endpoint: m.endpoint,
            http_method: m.http_method,
            params: parse_json(m.params),
            navigation_target: m.navigation_target,
        }
    }
}

// ---------- auth ----------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<app_user::Model> for UserResponse {
    fn from(m: app_user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            first_name: m.first_name,
            last_name: m.last_name,
            phone: m.phone,
            role: m.role,
            is_active: m.is_active,
            last_login_at: m.last_login_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

// ---------- catalog ----------

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub quantity: Option<i32>,
    pub owner_id: Option<Uuid>,
    #[serde(default, deserialize_with = "opt_flag")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub quantity: Option<i32>,
    pub owner_id: Option<Uuid>,
    #[serde(default, deserialize_with = "opt_flag")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    #[serde(default, deserialize_with = "opt_flag")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItemsQuery {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_flag")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: Uuid,
    pub code: String,
    pub kind: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub quantity: i32,
    pub is_active: bool,
    pub owner_id: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<catalog_item::Model> for ItemResponse {
    fn from(m: catalog_item::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            kind: m.kind,
            name: m.name,
            description: m.description,
            image: m.image,
            quantity: m.quantity,
            is_active: m.is_active,
            owner_id: m.owner_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
