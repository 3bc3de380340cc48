use thiserror::Error;
use warp::{http::StatusCode, reject::Reject, Rejection, Reply};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Please provide a non-empty query.")]
    Empty,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Reject for ApiError {}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    let (code, body) = if let Some(api_err) = err.find::<ApiError>() {
        match api_err {
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": api_err.to_string() }),
            ),
        }
    } else if let Some(body_err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            serde_json::json!({ "error": "Bad request", "details": body_err.to_string() }),
        )
    } else if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            serde_json::json!({ "error": "Resource not found" }),
        )
    } else {
        return Err(err);
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), code))
}
