use std::sync::Arc;
use tracing::info;
use warp::{Rejection, Reply};

use crate::agents::QueryRouter;
use crate::models::ClearResponse;

pub async fn handle_list(router: Arc<QueryRouter>) -> Result<impl Reply, Rejection> {
    Ok(warp::reply::json(&router.memory().list()))
}

pub async fn handle_clear(router: Arc<QueryRouter>) -> Result<impl Reply, Rejection> {
    router.memory().clear();
    info!("Short-term memory cleared");
    Ok(warp::reply::json(&ClearResponse {
        message: "Memory cleared successfully".to_string(),
    }))
}
