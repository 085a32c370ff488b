use crate::server::ServerRouter;
use axum::Router;

mod posts;
mod timeline;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(posts::routes())
        .merge(timeline::routes())
}
