//! Request extractors whose rejections render as the JSON error envelope.
//!
//! axum's stock `Json`, `Path`, `Query` and `Multipart` reject with plain-text
//! bodies (and 422 for a well-formed body of the wrong shape). These wrappers
//! route every rejection through `ApiErr`, so clients always get
//! `{"success": false, "error": "..."}` with a 400.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};

use super::ApiErr;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiErr))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiErr))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiErr))]
pub struct ApiQuery<T>(pub T);

pub struct ApiMultipart(pub Multipart);

impl<S: Send + Sync> FromRequest<S> for ApiMultipart {
    type Rejection = ApiErr;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(Multipart::from_request(req, state).await?))
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        ApiErr::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiErr {
    fn from(rejection: PathRejection) -> Self {
        ApiErr::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        ApiErr::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiErr {
    fn from(rejection: MultipartRejection) -> Self {
        ApiErr::bad_request(rejection.body_text())
    }
}
