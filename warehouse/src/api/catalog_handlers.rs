use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::catalog::{ItemPatch, ItemSearch, NewItem, item_kind};

use super::{
    ApiErr, AppState,
    extract::{ApiJson, ApiPath, ApiQuery},
    dto::{CreateItemRequest, ItemResponse, ListItemsQuery, SearchItemsQuery, UpdateItemRequest},
};

fn items_body(items: Vec<ItemResponse>) -> Value {
    json!({ "success": true, "total": items.len(), "items": items })
}

pub async fn list_items(
    State(state): State<AppState>,
    ApiPath(kind): ApiPath<String>,
    ApiQuery(query): ApiQuery<ListItemsQuery>,
) -> Result<Json<Value>, ApiErr> {
    let kind = item_kind(&kind)?;
    let items = state
        .catalog
        .list(kind, query.is_active)
        .await?
        .into_iter()
        .map(ItemResponse::from)
        .collect();
    Ok(Json(items_body(items)))
}

pub async fn create_item(
    State(state): State<AppState>,
    ApiPath(kind): ApiPath<String>,
    ApiJson(body): ApiJson<CreateItemRequest>,
) -> Result<(StatusCode, Json<Value>), ApiErr> {
    let kind = item_kind(&kind)?;
    let item = state
        .catalog
        .create(
            kind,
            NewItem {
                name: body.name,
                description: body.description,
                image: body.image,
                quantity: body.quantity,
                owner_id: body.owner_id,
                is_active: body.is_active,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "item": ItemResponse::from(item) })),
    ))
}

/// 404 when nothing matches.
pub async fn search_items(
    State(state): State<AppState>,
    ApiPath(kind): ApiPath<String>,
    ApiQuery(query): ApiQuery<SearchItemsQuery>,
) -> Result<Json<Value>, ApiErr> {
    let kind = item_kind(&kind)?;
    let items: Vec<ItemResponse> = state
        .catalog
        .search(
            kind,
            ItemSearch {
                code: query.code,
                name: query.name,
                is_active: query.is_active,
            },
        )
        .await?
        .into_iter()
        .map(ItemResponse::from)
        .collect();

    if items.is_empty() {
        return Err(ApiErr::not_found(format!(
            "No {} matched the search criteria",
            kind.slug
        )));
    }
    Ok(Json(items_body(items)))
}

pub async fn update_item(
    State(state): State<AppState>,
    ApiPath((kind, id)): ApiPath<(String, Uuid)>,
    ApiJson(body): ApiJson<UpdateItemRequest>,
) -> Result<Json<Value>, ApiErr> {
    let kind = item_kind(&kind)?;
    let item = state
        .catalog
        .update(
            kind,
            id,
            ItemPatch {
                name: body.name,
                description: body.description,
                image: body.image,
                quantity: body.quantity,
                owner_id: body.owner_id,
                is_active: body.is_active,
            },
        )
        .await?;
    Ok(Json(json!({ "success": true, "item": ItemResponse::from(item) })))
}

/// Soft delete.
pub async fn delete_item(
    State(state): State<AppState>,
    ApiPath((kind, id)): ApiPath<(String, Uuid)>,
) -> Result<Json<Value>, ApiErr> {
    let kind = item_kind(&kind)?;
    let item = state.catalog.deactivate(kind, id).await?;
    Ok(Json(json!({ "success": true, "item": ItemResponse::from(item) })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::*;
    use crate::auth::Registration;
    use axum::{
        Router,
        body::Body,
        http::{Method, Request},
        routing::{get, put},
    };
    use tower::ServiceExt;

    fn make_router(state: AppState) -> Router {
        Router::new()
            .route("/catalog/{kind}", get(list_items).post(create_item))
            .route("/catalog/{kind}/search", get(search_items))
            .route("/catalog/{kind}/{id}", put(update_item).delete(delete_item))
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

    async fn setup() -> (Router, Uuid, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(setup_db().await, dir.path());
        let owner = state
            .auth
            .register(Registration {
                email: "owner@example.com".to_string(),
                password: "Secret123".to_string(),
                first_name: "Olga".to_string(),
                last_name: "Owner".to_string(),
                phone: None,
            })
            .await
            .unwrap();
        (make_router(state), owner.id, dir)
    }

    fn boot(owner: Uuid) -> Value {
        json!({
            "name": "Trail Boot",
            "description": "Waterproof",
            "image": "/static/uploads/boot.png",
            "quantity": 12,
            "owner_id": owner,
        })
    }

    #[tokio::test]
    async fn test_create_list_search_delete() {
        let (app, owner, _dir) = setup().await;

        let (status, body) = send(&app, Method::POST, "/catalog/shoes", Some(boot(owner))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["item"]["code"], "ZAP001");
        let id = body["item"]["id"].as_str().unwrap().to_string();

        let (_, body) = send(&app, Method::POST, "/catalog/shoes", Some(boot(owner))).await;
        assert_eq!(body["item"]["code"], "ZAP002");

        let (_, body) = send(&app, Method::GET, "/catalog/shoes", None).await;
        assert_eq!(body["total"], 2);

        let (status, body) = send(&app, Method::GET, "/catalog/shoes/search?code=ZAP001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["id"], id.as_str());

        let (status, body) = send(&app, Method::DELETE, &format!("/catalog/shoes/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["item"]["is_active"], false);

        let (status, _) = send(&app, Method::DELETE, &format!("/catalog/shoes/{id}"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = send(&app, Method::GET, "/catalog/shoes?is_active=1", None).await;
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_search_without_matches_is_not_found() {
        let (app, _owner, _dir) = setup().await;
        let (status, body) = send(&app, Method::GET, "/catalog/pants/search?name=denim", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_missing_required_field_bad_request() {
        let (app, owner, _dir) = setup().await;
        let mut body = boot(owner);
        body.as_object_mut().unwrap().remove("quantity");
        let (status, body) = send(&app, Method::POST, "/catalog/jackets", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Field 'quantity' is required");
    }

    #[tokio::test]
    async fn test_wrong_kind_and_unknown_kind() {
        let (app, owner, _dir) = setup().await;
        let (_, body) = send(&app, Method::POST, "/catalog/accessories", Some(boot(owner))).await;
        let id = body["item"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/catalog/shoes/{id}"),
            Some(json!({"quantity": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/catalog/accessories/{id}"),
            Some(json!({"quantity": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["item"]["quantity"], 1);

        let (status, _) = send(&app, Method::GET, "/catalog/hats", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
