//! UI descriptor service: screens, their components and component actions.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::Value;
use uuid::Uuid;

use crate::entity::{ui_action, ui_component, ui_screen};
use crate::error::{Error, Result, is_unique_violation};

const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

#[derive(Debug, Clone)]
pub struct NewScreen {
    pub screen_name: String,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub order_index: i32,
}

#[derive(Debug, Clone)]
pub struct NewComponent {
    pub screen_id: Uuid,
    pub component_type: String,
    pub component_key: String,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub validation_rules: Option<Value>,
    pub properties: Option<Value>,
    pub order_index: i32,
    pub is_required: bool,
}

#[derive(Debug, Clone)]
pub struct NewAction {
    pub component_id: Uuid,
    pub action_type: String,
    pub endpoint: Option<String>,
    /// Defaults to `GET`.
    pub http_method: Option<String>,
    pub params: Option<Value>,
    pub navigation_target: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScreenDescriptor {
    pub screen: ui_screen::Model,
    pub components: Vec<ComponentDescriptor>,
}

#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    pub component: ui_component::Model,
    pub actions: Vec<ui_action::Model>,
}

#[derive(Clone)]
pub struct UiDescriptors {
    db: DatabaseConnection,
}

impl UiDescriptors {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Active screens by `order_index`, ties broken by insertion order.
    pub async fn list_screens(&self) -> Result<Vec<ui_screen::Model>> {
        Ok(ui_screen::Entity::find()
            .filter(ui_screen::Column::IsActive.eq(true))
            .order_by_asc(ui_screen::Column::OrderIndex)
            .order_by_asc(ui_screen::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get_screen(&self, screen_name: &str) -> Result<ScreenDescriptor> {
        let screen = ui_screen::Entity::find()
            .filter(ui_screen::Column::ScreenName.eq(screen_name))
            .filter(ui_screen::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::not_found(format!("Screen '{screen_name}' not found")))?;

        let components = ui_component::Entity::find()
            .filter(ui_component::Column::ScreenId.eq(screen.id))
            .order_by_asc(ui_component::Column::OrderIndex)
            .order_by_asc(ui_component::Column::Id)
            .all(&self.db)
            .await?;

        let component_ids: Vec<Uuid> = components.iter().map(|c| c.id).collect();
        let mut actions_by_component: HashMap<Uuid, Vec<ui_action::Model>> = HashMap::new();
        if !component_ids.is_empty() {
            let actions = ui_action::Entity::find()
                .filter(ui_action::Column::ComponentId.is_in(component_ids))
                .order_by_asc(ui_action::Column::Id)
                .all(&self.db)
                .await?;
            for action in actions {
                actions_by_component
                    .entry(action.component_id)
                    .or_default()
                    .push(action);
            }
        }

        let components = components
            .into_iter()
            .map(|component| ComponentDescriptor {
                actions: actions_by_component.remove(&component.id).unwrap_or_default(),
                component,
            })
            .collect();

        Ok(ScreenDescriptor { screen, components })
    }

    pub async fn create_screen(&self, input: NewScreen) -> Result<ui_screen::Model> {
        let screen_name = input.screen_name.trim();
        let title = input.title.trim();
        if screen_name.is_empty() {
            return Err(Error::validation("screen_name is required"));
        }
        if title.is_empty() {
            return Err(Error::validation("title is required"));
        }

        let existing = ui_screen::Entity::find()
            .filter(ui_screen::Column::ScreenName.eq(screen_name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(Error::conflict(format!("Screen '{screen_name}' already exists")));
        }

        let now = Utc::now().naive_utc();
        let screen = ui_screen::ActiveModel {
            id: Set(Uuid::now_v7()),
            screen_name: Set(screen_name.to_string()),
            title: Set(title.to_string()),
            description: Set(input.description),
            icon: Set(input.icon),
            order_index: Set(input.order_index),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::conflict(format!("Screen '{screen_name}' already exists"))
            } else {
                Error::Db(e)
            }
        })?;

        tracing::info!(screen = %screen.screen_name, "created UI screen");
        Ok(screen)
    }

    /// Soft-delete or restore a screen. Components and actions are untouched.
    pub async fn set_screen_active(&self, screen_name: &str, active: bool) -> Result<ui_screen::Model> {
        let screen = ui_screen::Entity::find()
            .filter(ui_screen::Column::ScreenName.eq(screen_name))
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::not_found(format!("Screen '{screen_name}' not found")))?;

        if screen.is_active == active {
            return Err(Error::conflict(if active {
                "Screen is already active"
            } else {
                "Screen is already inactive"
            }));
        }

        let mut model: ui_screen::ActiveModel = screen.into();
        model.is_active = Set(active);
        model.updated_at = Set(Utc::now().naive_utc());
        Ok(model.update(&self.db).await?)
    }

    /// Attach a component. Inactive screens still accept components.
    pub async fn add_component(&self, input: NewComponent) -> Result<ui_component::Model> {
        if input.component_type.trim().is_empty() {
            return Err(Error::validation("component_type is required"));
        }
        if input.component_key.trim().is_empty() {
            return Err(Error::validation("component_id is required"));
        }

        ui_screen::Entity::find_by_id(input.screen_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::not_found("Screen not found"))?;

        let component = ui_component::ActiveModel {
            id: Set(Uuid::now_v7()),
            screen_id: Set(input.screen_id),
            component_type: Set(input.component_type.trim().to_string()),
            component_key: Set(input.component_key.trim().to_string()),
            label: Set(input.label),
            placeholder: Set(input.placeholder),
            validation_rules: Set(input.validation_rules.map(|v| v.to_string())),
            properties: Set(input.properties.map(|v| v.to_string())),
            order_index: Set(input.order_index),
            is_required: Set(input.is_required),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(&self.db)
        .await?;

        tracing::debug!(component_id = %component.id, screen_id = %component.screen_id, "added UI component");
        Ok(component)
    }

    pub async fn add_action(&self, input: NewAction) -> Result<ui_action::Model> {
        if input.action_type.trim().is_empty() {
            return Err(Error::validation("action_type is required"));
        }
        let http_method = match input.http_method.as_deref().map(str::trim) {
            None | Some("") => "GET".to_string(),
            Some(m) => {
                let upper = m.to_ascii_uppercase();
                if !HTTP_METHODS.contains(&upper.as_str()) {
                    return Err(Error::validation(format!("Unsupported http_method: {m}")));
                }
                upper
            }
        };

        ui_component::Entity::find_by_id(input.component_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Error::not_found("Component not found"))?;

        let action = ui_action::ActiveModel {
            id: Set(Uuid::now_v7()),
            component_id: Set(input.component_id),
            action_type: Set(input.action_type.trim().to_string()),
            endpoint: Set(input.endpoint),
            http_method: Set(http_method),
            params: Set(input.params.map(|v| v.to_string())),
            navigation_target: Set(input.navigation_target),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(&self.db)
        .await?;

        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, PaginatorTrait};
    use serde_json::json;

    async fn setup() -> UiDescriptors {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        UiDescriptors::new(db)
    }

    fn screen(name: &str, order_index: i32) -> NewScreen {
        NewScreen {
            screen_name: name.to_string(),
            title: name.to_uppercase(),
            description: None,
            icon: None,
            order_index,
        }
    }

    fn component(screen_id: Uuid, key: &str, order_index: i32) -> NewComponent {
        NewComponent {
            screen_id,
            component_type: "input".to_string(),
            component_key: key.to_string(),
            label: Some(key.to_string()),
            placeholder: None,
            validation_rules: Some(json!({"max_length": 40})),
            properties: None,
            order_index,
            is_required: false,
        }
    }

    #[tokio::test]
    async fn test_components_ordered_by_order_index() {
        let ui = setup().await;
        let s = ui.create_screen(screen("inventory", 0)).await.unwrap();

        ui.add_component(component(s.id, "c3", 3)).await.unwrap();
        ui.add_component(component(s.id, "c1", 1)).await.unwrap();
        ui.add_component(component(s.id, "c2", 2)).await.unwrap();

        let got = ui.get_screen("inventory").await.unwrap();
        let keys: Vec<&str> = got
            .components
            .iter()
            .map(|c| c.component.component_key.as_str())
            .collect();
        assert_eq!(keys, vec!["c1", "c2", "c3"]);
    }

    #[tokio::test]
    async fn test_equal_order_index_keeps_insertion_order() {
        let ui = setup().await;
        let s = ui.create_screen(screen("inventory", 0)).await.unwrap();
        for key in ["first", "second", "third"] {
            ui.add_component(component(s.id, key, 0)).await.unwrap();
        }

        let got = ui.get_screen("inventory").await.unwrap();
        let keys: Vec<&str> = got
            .components
            .iter()
            .map(|c| c.component.component_key.as_str())
            .collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_actions_attached_in_insertion_order() {
        let ui = setup().await;
        let s = ui.create_screen(screen("inventory", 0)).await.unwrap();
        let c = ui.add_component(component(s.id, "save", 0)).await.unwrap();

        let submit = ui
            .add_action(NewAction {
                component_id: c.id,
                action_type: "submit".to_string(),
                endpoint: Some("/submissions".to_string()),
                http_method: Some("post".to_string()),
                params: Some(json!({"category_id": "x"})),
                navigation_target: None,
            })
            .await
            .unwrap();
        assert_eq!(submit.http_method, "POST");

        let nav = ui
            .add_action(NewAction {
                component_id: c.id,
                action_type: "navigate".to_string(),
                endpoint: None,
                http_method: None,
                params: None,
                navigation_target: Some("home".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(nav.http_method, "GET");

        let got = ui.get_screen("inventory").await.unwrap();
        let types: Vec<&str> = got.components[0]
            .actions
            .iter()
            .map(|a| a.action_type.as_str())
            .collect();
        assert_eq!(types, vec!["submit", "navigate"]);
    }

    #[tokio::test]
    async fn test_add_action_validation() {
        let ui = setup().await;
        let err = ui
            .add_action(NewAction {
                component_id: Uuid::now_v7(),
                action_type: "submit".to_string(),
                endpoint: None,
                http_method: None,
                params: None,
                navigation_target: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = ui
            .add_action(NewAction {
                component_id: Uuid::now_v7(),
                action_type: "submit".to_string(),
                endpoint: None,
                http_method: Some("TRACE".to_string()),
                params: None,
                navigation_target: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_screens_active_only_in_order() {
        let ui = setup().await;
        ui.create_screen(screen("reports", 2)).await.unwrap();
        ui.create_screen(screen("home", 0)).await.unwrap();
        ui.create_screen(screen("inventory", 1)).await.unwrap();
        ui.create_screen(screen("settings", 1)).await.unwrap();
        ui.set_screen_active("reports", false).await.unwrap();

        let names: Vec<String> = ui
            .list_screens()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.screen_name)
            .collect();
        assert_eq!(names, vec!["home", "inventory", "settings"]);
    }

    #[tokio::test]
    async fn test_duplicate_screen_name_is_conflict() {
        let ui = setup().await;
        ui.create_screen(screen("home", 0)).await.unwrap();
        let err = ui.create_screen(screen("home", 5)).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_empty_screen_name_or_title_rejected() {
        let ui = setup().await;
        let mut blank_title = screen("home", 0);
        blank_title.title = " ".to_string();
        assert!(matches!(
            ui.create_screen(blank_title).await.unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            ui.create_screen(screen("", 0)).await.unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_deactivated_screen_hidden_but_rows_survive() {
        let ui = setup().await;
        let s = ui.create_screen(screen("inventory", 0)).await.unwrap();
        ui.add_component(component(s.id, "sku", 0)).await.unwrap();

        ui.set_screen_active("inventory", false).await.unwrap();
        assert!(matches!(
            ui.get_screen("inventory").await.unwrap_err(),
            Error::NotFound(_)
        ));
        assert!(ui.list_screens().await.unwrap().is_empty());
        assert_eq!(ui_component::Entity::find().count(&ui.db).await.unwrap(), 1);

        // Inactive screens still accept components.
        ui.add_component(component(s.id, "qty", 1)).await.unwrap();

        assert!(matches!(
            ui.set_screen_active("inventory", false).await.unwrap_err(),
            Error::Conflict(_)
        ));

        ui.set_screen_active("inventory", true).await.unwrap();
        let restored = ui.get_screen("inventory").await.unwrap();
        assert_eq!(restored.components.len(), 2);
    }

    #[tokio::test]
    async fn test_add_component_unknown_screen_is_not_found() {
        let ui = setup().await;
        let err = ui
            .add_component(component(Uuid::now_v7(), "x", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
