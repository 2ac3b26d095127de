use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};

use crate::ui::{NewAction, NewComponent, NewScreen};

use super::{
    ApiErr, AppState,
    extract::{ApiJson, ApiPath},
    dto::{
        ActionResponse, ComponentResponse, CreateActionRequest, CreateComponentRequest,
        CreateScreenRequest, ScreenResponse,
    },
};

pub async fn list_screens(State(state): State<AppState>) -> Result<Json<Value>, ApiErr> {
    let screens: Vec<ScreenResponse> = state
        .ui
        .list_screens()
        .await?
        .into_iter()
        .map(ScreenResponse::from)
        .collect();

    Ok(Json(json!({ "success": true, "screens": screens })))
}

pub async fn get_screen(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<Value>, ApiErr> {
    let screen = state.ui.get_screen(&name).await?;
    Ok(Json(
        json!({ "success": true, "screen": ScreenResponse::from(screen) }),
    ))
}

pub async fn create_screen(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateScreenRequest>,
) -> Result<(StatusCode, Json<Value>), ApiErr> {
    let screen = state
        .ui
        .create_screen(NewScreen {
            screen_name: body.screen_name,
            title: body.title,
            description: body.description,
            icon: body.icon,
            order_index: body.order_index,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "screen": ScreenResponse::from(screen) })),
    ))
}

pub async fn activate_screen(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<Value>, ApiErr> {
    let screen = state.ui.set_screen_active(&name, true).await?;
    Ok(Json(
        json!({ "success": true, "screen": ScreenResponse::from(screen) }),
    ))
}

pub async fn deactivate_screen(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<Value>, ApiErr> {
    let screen = state.ui.set_screen_active(&name, false).await?;
    Ok(Json(
        json!({ "success": true, "screen": ScreenResponse::from(screen) }),
    ))
}

pub async fn create_component(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateComponentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiErr> {
    let component = state
        .ui
        .add_component(NewComponent {
            screen_id: body.screen_id,
            component_type: body.component_type,
            component_key: body.component_id,
            label: body.label,
            placeholder: body.placeholder,
            validation_rules: body.validation_rules,
            properties: body.properties,
            order_index: body.order_index,
            is_required: body.is_required,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "component": ComponentResponse::from(component) })),
    ))
}

pub async fn create_action(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateActionRequest>,
) -> Result<(StatusCode, Json<Value>), ApiErr> {
    let action = state
        .ui
        .add_action(NewAction {
            component_id: body.component_id,
            action_type: body.action_type,
            endpoint: body.endpoint,
            http_method: body.http_method,
            params: body.params,
            navigation_target: body.navigation_target,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "action": ActionResponse::from(action) })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::*;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request},
        routing::{get, patch, post},
    };
    use tower::ServiceExt;

    fn make_router(state: AppState) -> Router {
        Router::new()
            .route("/ui/screens", get(list_screens).post(create_screen))
            .route("/ui/screens/{name}", get(get_screen))
            .route("/ui/screens/{name}/activate", patch(activate_screen))
            .route("/ui/screens/{name}/deactivate", patch(deactivate_screen))
            .route("/ui/components", post(create_component))
            .route("/ui/actions", post(create_action))
            .with_state(state)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("Content-Type", "application/json");
                json_body(v)
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        (status, read_json(resp).await)
    }

    async fn raw_get(app: &Router, uri: &str) -> Vec<u8> {
        let resp = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    async fn setup() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let app = make_router(make_state(setup_db().await, dir.path()));
        (app, dir)
    }

    async fn inventory_screen(app: &Router) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/ui/screens",
            Some(json!({"screen_name": "inventory", "title": "Inventory", "icon": "box"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["screen"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_screen_descriptor_tree() {
        let (app, _dir) = setup().await;
        let screen_id = inventory_screen(&app).await;

        for (key, order) in [("qty", 3), ("sku", 1), ("name", 2)] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/ui/components",
                Some(json!({
                    "screen_id": screen_id,
                    "component_type": "input",
                    "component_id": key,
                    "order_index": order,
                    "validation_rules": {"required": true},
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, body) = send(&app, Method::GET, "/ui/screens/inventory", None).await;
        let component_id = body["screen"]["components"][0]["id"].as_str().unwrap().to_string();
        let (status, body) = send(
            &app,
            Method::POST,
            "/ui/actions",
            Some(json!({
                "component_id": component_id,
                "action_type": "submit",
                "endpoint": "/submissions",
                "http_method": "POST",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["action"]["http_method"], "POST");

        let (status, body) = send(&app, Method::GET, "/ui/screens/inventory", None).await;
        assert_eq!(status, StatusCode::OK);
        let components = body["screen"]["components"].as_array().unwrap();
        let keys: Vec<&str> = components
            .iter()
            .map(|c| c["component_id"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["sku", "name", "qty"]);
        assert_eq!(components[0]["validation_rules"], json!({"required": true}));
        assert_eq!(components[0]["actions"][0]["action_type"], "submit");
        assert_eq!(components[1]["actions"], json!([]));
    }

    #[tokio::test]
    async fn test_get_screen_is_byte_identical_across_calls() {
        let (app, _dir) = setup().await;
        let screen_id = inventory_screen(&app).await;
        send(
            &app,
            Method::POST,
            "/ui/components",
            Some(json!({"screen_id": screen_id, "component_type": "button", "component_id": "save",
                        "properties": {"variant": "primary", "size": "lg"}})),
        )
        .await;

        let first = raw_get(&app, "/ui/screens/inventory").await;
        let second = raw_get(&app, "/ui/screens/inventory").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_screen_soft_delete_round_trip() {
        let (app, _dir) = setup().await;
        inventory_screen(&app).await;

        let (status, _) = send(&app, Method::PATCH, "/ui/screens/inventory/deactivate", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::GET, "/ui/screens/inventory", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, body) = send(&app, Method::GET, "/ui/screens", None).await;
        assert_eq!(body["screens"], json!([]));

        let (status, body) = send(&app, Method::PATCH, "/ui/screens/inventory/deactivate", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Screen is already inactive");

        let (status, _) = send(&app, Method::PATCH, "/ui/screens/inventory/activate", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, "/ui/screens/inventory", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_duplicate_screen_conflict() {
        let (app, _dir) = setup().await;
        inventory_screen(&app).await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/ui/screens",
            Some(json!({"screen_name": "inventory", "title": "Again"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_component_for_unknown_screen_not_found() {
        let (app, _dir) = setup().await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/ui/components",
            Some(json!({"screen_id": uuid::Uuid::now_v7(), "component_type": "input", "component_id": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
