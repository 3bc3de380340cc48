use std::sync::Arc;
use tracing::error;
use warp::{Rejection, Reply};

use crate::agents::QueryRouter;
use crate::error::ApiError;
use crate::models::QueryRequest;

pub async fn handle_ask(
    request: QueryRequest,
    router: Arc<QueryRouter>,
) -> Result<impl Reply, Rejection> {
    // A panic anywhere in the pipeline surfaces here as a JoinError.
    let response = tokio::spawn(async move { router.submit(&request.query).await })
        .await
        .map_err(|e| {
            error!("Unhandled error in /ask: {}", e);
            warp::reject::custom(ApiError::Internal(e.to_string()))
        })?;

    Ok(warp::reply::json(&response))
}
