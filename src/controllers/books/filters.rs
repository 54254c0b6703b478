use std::collections::HashMap;
use std::sync::Arc;

use mobc::Pool;
use warp::{filters::BoxedFilter, Filter, Reply};

use super::{list_books, map_result};
use crate::{
    connection_pool::PgConnectionManager, controllers::RequestOrigin, media::MediaStore,
};

pub fn get_filters(
    db_pool: Pool<PgConnectionManager>,
    media: Arc<MediaStore>,
    origin: BoxedFilter<(RequestOrigin,)>,
) -> impl Filter<Extract = impl Reply, Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path("books"))
        .and(warp::path::end())
        .and(warp::query::<HashMap<String, String>>())
        .and(origin)
        .and(warp::any().map(move || db_pool.clone()))
        .and(warp::any().map(move || media.clone()))
        .then(list_books)
        .map(map_result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::MediaConfiguration;
    use crate::connection_pool::establish_connection_pool;
    use crate::controllers::request_origin;
    use serde_json::{json, Value};

    // Nothing listens here; requests that reach the database fail with 500.
    const UNREACHABLE_DATABASE: &str = "postgres://catalog@127.0.0.1:1/catalog";

    fn routes() -> impl Filter<Extract = impl Reply, Error = warp::Rejection> + Clone {
        get_filters(
            establish_connection_pool(UNREACHABLE_DATABASE),
            Arc::new(MediaStore::new(&MediaConfiguration::default())),
            request_origin("http".into(), "localhost:3000".into()),
        )
    }

    fn body_json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn non_integer_id_is_a_client_error() {
        let response = warp::test::request()
            .path("/books/?id=abc")
            .reply(&routes())
            .await;
        assert_eq!(response.status(), 400);
        assert_eq!(
            body_json(response.body()),
            json!({"id": ["Enter a whole number."]})
        );
    }

    #[tokio::test]
    async fn malformed_id_list_is_a_client_error() {
        let response = warp::test::request()
            .path("/books/?id__in=1,2,x")
            .reply(&routes())
            .await;
        assert_eq!(response.status(), 400);
        assert_eq!(
            body_json(response.body()),
            json!({"id__in": ["Enter a whole number."]})
        );
    }

    #[tokio::test]
    async fn unusable_host_header_is_a_client_error() {
        let response = warp::test::request()
            .path("/books/")
            .header("host", "not a host")
            .reply(&routes())
            .await;
        assert_eq!(response.status(), 400);
        assert_eq!(
            body_json(response.body()),
            json!({"message": "Invalid host header."})
        );
    }

    #[tokio::test]
    async fn host_with_userinfo_is_a_client_error() {
        let response = warp::test::request()
            .path("/books/")
            .header("host", "catalog.local@evil.example")
            .reply(&routes())
            .await;
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn database_failures_are_server_errors() {
        let response = warp::test::request()
            .path("/books/?language=en")
            .reply(&routes())
            .await;
        assert_eq!(response.status(), 500);
        assert_eq!(
            body_json(response.body()),
            json!({"message": "An internal exception occurred."})
        );
    }

    #[test]
    fn only_get_is_routed() {
        tokio_test::block_on(async {
            let response = warp::test::request()
                .method("POST")
                .path("/books/")
                .reply(&routes())
                .await;
            assert_eq!(response.status(), 405);
        });
    }
}
