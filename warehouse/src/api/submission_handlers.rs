use std::collections::HashMap;

use axum::{
    extract::{State, multipart::MultipartError},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::forms::RawValue;
use crate::storage::Upload;

use super::{
    ApiErr, AppState,
    extract::{ApiMultipart, ApiPath, ApiQuery},
    dto::{SubmissionQuery, SubmissionResponse},
};

fn multipart_err(e: MultipartError) -> ApiErr {
    ApiErr::new(e.status(), e.body_text())
}

/// Multipart body: `category_id` plus one `field_<id>` part per field. Image
/// fields are sent as file parts, everything else as plain text parts.
pub async fn create_submission(
    State(state): State<AppState>,
    ApiMultipart(mut multipart): ApiMultipart,
) -> Result<(StatusCode, Json<Value>), ApiErr> {
    let mut category_id: Option<Uuid> = None;
    let mut values: HashMap<String, RawValue> = HashMap::new();

    while let Some(part) = multipart.next_field().await.map_err(multipart_err)? {
        let Some(name) = part.name().map(str::to_owned) else {
            continue;
        };

        if name == "category_id" {
            let text = part.text().await.map_err(multipart_err)?;
            let id = text
                .trim()
                .parse()
                .map_err(|_| ApiErr::bad_request(format!("Invalid category_id: {text}")))?;
            category_id = Some(id);
        } else if name.starts_with("field_") {
            let value = match part.file_name().map(str::to_owned) {
                Some(file_name) => {
                    let content_type = part.content_type().map(str::to_owned);
                    let bytes = part.bytes().await.map_err(multipart_err)?;
                    RawValue::File(Upload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    })
                }
                None => RawValue::Text(part.text().await.map_err(multipart_err)?),
            };
            values.insert(name, value);
        }
    }

    let category_id = category_id.ok_or_else(|| ApiErr::bad_request("category_id is required"))?;
    let detail = state.forms.create_submission(category_id, values).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "submission": SubmissionResponse::from(detail) })),
    ))
}

pub async fn get_submission(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<SubmissionQuery>,
) -> Result<Json<Value>, ApiErr> {
    let detail = state.forms.get_submission(id, query.include_values).await?;
    Ok(Json(
        json!({ "success": true, "submission": SubmissionResponse::from(detail) }),
    ))
}

pub async fn list_submissions(
    State(state): State<AppState>,
    ApiPath(category_id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiErr> {
    let submissions: Vec<SubmissionResponse> = state
        .forms
        .list_submissions(category_id)
        .await?
        .into_iter()
        .map(SubmissionResponse::from)
        .collect();

    Ok(Json(json!({
        "success": true,
        "total": submissions.len(),
        "submissions": submissions,
    })))
}
