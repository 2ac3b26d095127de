use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{Value, json};

use crate::auth::Registration;

use super::{
    ApiErr, AppState,
    extract::ApiJson,
    dto::{LoginRequest, RegisterRequest, UserResponse},
    jwt::{AuthClaims, Claims, encode_jwt},
};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiErr> {
    let user = state
        .auth
        .register(Registration {
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
            phone: body.phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "user": UserResponse::from(user) })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<Value>, ApiErr> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiErr::bad_request("Email and password are required"));
    }

    let user = state.auth.authenticate(&body.email, &body.password).await?;

    let claims = Claims::for_user(&user, state.jwt_expiry_hours);
    let token = encode_jwt(&claims, &state.jwt_secret).map_err(ApiErr::internal)?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(json!({
        "success": true,
        "token": token,
        "user": UserResponse::from(user),
    })))
}

pub async fn me(
    AuthClaims(claims): AuthClaims,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiErr> {
    let user = state.auth.find_user(claims.sub).await?;
    Ok(Json(json!({ "success": true, "user": UserResponse::from(user) })))
}
