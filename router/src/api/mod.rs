use std::sync::Arc;
use warp::{Filter, Rejection, Reply};

use crate::agents::QueryRouter;

mod ask;
mod memory;

pub fn routes(
    router: Arc<QueryRouter>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let ask_route = warp::path("ask")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(64 * 1024))
        .and(warp::body::json())
        .and(with_router(router.clone()))
        .and_then(ask::handle_ask);

    let memory_route = warp::path("memory")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_router(router.clone()))
        .and_then(memory::handle_list);

    let clear_route = warp::path!("memory" / "clear")
        .and(warp::post())
        .and(with_router(router))
        .and_then(memory::handle_clear);

    ask_route.or(memory_route).or(clear_route)
}

fn with_router(
    router: Arc<QueryRouter>,
) -> impl Filter<Extract = (Arc<QueryRouter>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || router.clone())
}
