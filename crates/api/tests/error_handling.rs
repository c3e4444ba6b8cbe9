//! `AppError` to HTTP response mapping, exercised without a server.

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use deckhub_api::error::AppError;
use deckhub_core::error::CoreError;
use http_body_util::BodyExt;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn not_found_by_id_names_the_entity() {
    let (status, json) = error_to_response(AppError::Core(CoreError::NotFound {
        entity: "Deck",
        id: 7,
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Deck with id 7 not found");
}

#[tokio::test]
async fn not_found_by_slug_quotes_the_key() {
    let (status, json) = error_to_response(AppError::Core(CoreError::NotFoundByKey {
        entity: "Shared deck",
        key: "spanish-101".into(),
    }))
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Shared deck 'spanish-101' not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let (status, json) = error_to_response(AppError::Core(CoreError::Validation(
        "Deck content is unchanged since version 2".into(),
    )))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Deck content is unchanged since version 2");
}

#[tokio::test]
async fn bad_request_keeps_its_own_code() {
    let (status, json) = error_to_response(AppError::BadRequest("bad query".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn conflict_returns_409() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Conflict("Slug taken".into()))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "Slug taken");
}

#[tokio::test]
async fn auth_errors_return_401_and_403() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Unauthorized("no token".into()))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "UNAUTHORIZED");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Forbidden("not yours".into()))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn internal_errors_hide_details() {
    for err in [
        AppError::InternalError("pool exhausted at 10.0.0.5".into()),
        AppError::Core(CoreError::Internal("hash mismatch in row 12".into())),
    ] {
        let (status, json) = error_to_response(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"], "An internal error occurred");
    }
}

#[tokio::test]
async fn row_not_found_maps_to_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn other_database_errors_are_sanitized() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::PoolTimedOut)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

#[test]
fn question_mark_keeps_the_error_layer() {
    fn core_failure() -> Result<(), AppError> {
        let checked: Result<(), CoreError> =
            Err(CoreError::Conflict("Slug 'numbers' is already taken".into()));
        checked?;
        Ok(())
    }
    fn db_failure() -> Result<(), AppError> {
        let fetched: Result<(), sqlx::Error> = Err(sqlx::Error::RowNotFound);
        fetched?;
        Ok(())
    }

    assert_matches!(
        core_failure(),
        Err(AppError::Core(CoreError::Conflict(msg))) if msg.contains("numbers")
    );
    assert_matches!(db_failure(), Err(AppError::Database(sqlx::Error::RowNotFound)));
}
