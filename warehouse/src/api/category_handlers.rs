use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::schema::{NewCategory, NewField, NewFieldOption};

use super::{
    ApiErr, AppState,
    extract::{ApiJson, ApiPath, ApiQuery},
    dto::{
        CategoryQuery, CategoryResponse, CreateCategoryRequest, CreateFieldsRequest,
        CreateOptionsRequest, FieldResponse, OptionResponse,
    },
};

pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Value>), ApiErr> {
    let category = state
        .schema
        .create_category(NewCategory {
            name: body.name,
            description: body.description,
            active: body.active,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "category": CategoryResponse::from(category) })),
    ))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Value>, ApiErr> {
    let categories: Vec<CategoryResponse> = state
        .schema
        .list_categories()
        .await?
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(Json(json!({
        "success": true,
        "total": categories.len(),
        "categories": categories,
    })))
}

pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<CategoryQuery>,
) -> Result<Json<Value>, ApiErr> {
    let detail = state.schema.get_category(id, query.include_fields).await?;
    Ok(Json(
        json!({ "success": true, "category": CategoryResponse::from(detail) }),
    ))
}

pub async fn activate_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiErr> {
    let category = state.schema.set_category_active(id, true).await?;
    Ok(Json(
        json!({ "success": true, "category": CategoryResponse::from(category) }),
    ))
}

pub async fn deactivate_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiErr> {
    let category = state.schema.set_category_active(id, false).await?;
    Ok(Json(
        json!({ "success": true, "category": CategoryResponse::from(category) }),
    ))
}

pub async fn create_fields(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateFieldsRequest>,
) -> Result<(StatusCode, Json<Value>), ApiErr> {
    let mut fields = Vec::with_capacity(body.fields.len());
    for item in body.fields {
        let category_id = item
            .category_id
            .or(body.category_id)
            .ok_or_else(|| ApiErr::bad_request("category_id is required for every field"))?;
        fields.push(NewField {
            category_id,
            name: item.name,
            field_type: item.field_type,
            required: item.required,
            active: item.active,
        });
    }

    let created: Vec<FieldResponse> = state
        .schema
        .add_fields(fields)
        .await?
        .into_iter()
        .map(FieldResponse::from)
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "fields": created })),
    ))
}

pub async fn create_options(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateOptionsRequest>,
) -> Result<(StatusCode, Json<Value>), ApiErr> {
    let options = body
        .options
        .into_iter()
        .map(|o| NewFieldOption {
            field_id: o.field_id,
            value: o.value,
            active: o.active,
        })
        .collect();

    let created: Vec<OptionResponse> = state
        .schema
        .add_field_options(options)
        .await?
        .into_iter()
        .map(OptionResponse::from)
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "options": created })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::*;
    use axum::{
        Router,
        body::Body,
        http::{Method, Request},
        routing::{get, patch, post},
    };
    use tower::ServiceExt;

    fn make_router(state: AppState) -> Router {
        Router::new()
            .route("/create/categories", post(create_category))
            .route("/categories", get(list_categories))
            .route("/categories/{id}", get(get_category))
            .route("/categories/{id}/deactivate", patch(deactivate_category))
            .route("/create/category-fields", post(create_fields))
            .route("/field-options", post(create_options))
            .with_state(state)
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(json_body(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        (status, read_json(resp).await)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        (status, read_json(resp).await)
    }

    async fn setup() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = make_state(setup_db().await, dir.path());
        (make_router(state), dir)
    }

    #[tokio::test]
    async fn test_laptops_schema_end_to_end() {
        let (app, _dir) = setup().await;

        let (status, body) =
            post_json(&app, "/create/categories", json!({"name": "Laptops", "active": 1})).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        let cat_id = body["category"]["id"].as_str().unwrap().to_string();

        let (status, body) = post_json(
            &app,
            "/create/category-fields",
            json!({"fields": [
                {"category_id": cat_id, "name": "Brand", "field_type": "text", "required": 1},
                {"category_id": cat_id, "name": "RAM", "field_type": "select"},
            ]}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let ram_id = body["fields"][1]["id"].as_str().unwrap().to_string();
        assert_eq!(body["fields"][0]["required"], true);
        assert_eq!(body["fields"][1]["required"], false);

        let (status, _) = post_json(
            &app,
            "/field-options",
            json!({"options": [
                {"field_id": ram_id, "value": "8GB"},
                {"field_id": ram_id, "value": "16GB"},
            ]}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) =
            get_json(&app, &format!("/categories/{cat_id}?include_fields=true")).await;
        assert_eq!(status, StatusCode::OK);
        let fields = body["category"]["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0]["name"], "Brand");
        assert_eq!(fields[0]["options"], json!([]));
        assert_eq!(fields[1]["options"][0]["value"], "8GB");
        assert_eq!(fields[1]["options"][1]["value"], "16GB");
        assert_eq!(fields[1]["form_key"], format!("field_{ram_id}"));

        // Without the flag, fields are omitted entirely.
        let (_, body) = get_json(&app, &format!("/categories/{cat_id}")).await;
        assert!(body["category"].get("fields").is_none());
    }

    #[tokio::test]
    async fn test_top_level_category_id_applies_to_items() {
        let (app, _dir) = setup().await;
        let (_, body) = post_json(&app, "/create/categories", json!({"name": "Phones"})).await;
        let cat_id = body["category"]["id"].as_str().unwrap().to_string();

        let (status, body) = post_json(
            &app,
            "/create/category-fields",
            json!({"category_id": cat_id, "fields": [{"name": "IMEI", "field_type": "text"}]}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["fields"][0]["category_id"], cat_id.as_str());
    }

    #[tokio::test]
    async fn test_fields_for_unknown_category_not_found() {
        let (app, _dir) = setup().await;
        let (_, body) = post_json(&app, "/create/categories", json!({"name": "Phones"})).await;
        let cat_id = body["category"]["id"].as_str().unwrap().to_string();

        let (status, body) = post_json(
            &app,
            "/create/category-fields",
            json!({"fields": [
                {"category_id": cat_id, "name": "IMEI", "field_type": "text"},
                {"category_id": Uuid::now_v7(), "name": "Ghost", "field_type": "text"},
            ]}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (_, body) = get_json(&app, &format!("/categories/{cat_id}?include_fields=1")).await;
        assert_eq!(body["category"]["fields"], json!([]));
    }

    #[tokio::test]
    async fn test_missing_name_is_bad_request() {
        let (app, _dir) = setup().await;
        let (status, body) = post_json(&app, "/create/categories", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Category name is required");
    }

    #[tokio::test]
    async fn test_deactivated_category_leaves_list() {
        let (app, _dir) = setup().await;
        let (_, body) = post_json(&app, "/create/categories", json!({"name": "Old"})).await;
        let cat_id = body["category"]["id"].as_str().unwrap().to_string();

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::PATCH)
                    .uri(format!("/categories/{cat_id}/deactivate"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let (_, body) = get_json(&app, "/categories").await;
        assert_eq!(body["total"], 0);
        let (status, _) = get_json(&app, &format!("/categories/{cat_id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
