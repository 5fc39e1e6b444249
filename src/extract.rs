// src/extract.rs

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;

/// Drop-in replacements for the axum `Json`, `Query` and `Path` extractors.
///
/// The stock extractors answer decode failures with plain-text rejections.
/// These wrappers route every rejection through [`AppError::BadRequest`]
/// instead, so an undecodable body, an unknown JSON field, a bad query
/// string, or a non-numeric path id all come back as 400 with the same
/// `{"error": ...}` envelope the rest of the API uses.
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// Responses keep going through the stock serializer.
impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

pub struct Query<T>(pub T);

impl<S, T> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Query::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Query(value)) => Ok(Query(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(axum::extract::Path(value)) => Ok(Path(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};

    #[derive(Debug, serde::Deserialize)]
    #[serde(deny_unknown_fields)]
    struct StrictInput {
        name: String,
    }

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn well_formed_json_extracts() {
        let Json(input) = Json::<StrictInput>::from_request(json_request(r#"{"name": "x"}"#), &())
            .await
            .unwrap();

        assert_eq!(input.name, "x");
    }

    #[tokio::test]
    async fn undecodable_json_maps_to_bad_request() {
        let result = Json::<StrictInput>::from_request(json_request("{not json"), &()).await;

        let Err(err) = result else {
            panic!("expected a rejection");
        };
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_json_fields_map_to_bad_request() {
        let result =
            Json::<StrictInput>::from_request(json_request(r#"{"name": "x", "bogus": 1}"#), &())
                .await;

        let Err(err) = result else {
            panic!("expected a rejection");
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_query_strings_map_to_bad_request() {
        #[derive(Debug, serde::Deserialize)]
        struct Window {
            #[allow(dead_code)]
            count: i64,
        }

        let (mut parts, _) = axum::http::Request::builder()
            .uri("/list?count=abc")
            .body(Body::empty())
            .unwrap()
            .into_parts();

        let result = Query::<Window>::from_request_parts(&mut parts, &()).await;

        let Err(err) = result else {
            panic!("expected a rejection");
        };
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
