use std::sync::Arc;

use mobc::Pool;
use warp::{Filter, Reply};

use super::{autofill_books, debug_books, fix_books, map_result};
use crate::{connection_pool::PgConnectionManager, media::MediaStore};

pub fn get_filters(
    db_pool: Pool<PgConnectionManager>,
    media: Arc<MediaStore>,
) -> impl Filter<Extract = impl Reply, Error = warp::Rejection> + Clone {
    let autofill_db = db_pool.clone();
    let autofill_media = media.clone();
    let autofill_filter = warp::get()
        .and(warp::path("books"))
        .and(warp::path("autofill"))
        .and(warp::path::end())
        .and(warp::any().map(move || autofill_db.clone()))
        .and(warp::any().map(move || autofill_media.clone()))
        .then(autofill_books)
        .map(map_result);
    let debug_db = db_pool.clone();
    let debug_media = media.clone();
    let debug_filter = warp::get()
        .and(warp::path("books"))
        .and(warp::path("debug"))
        .and(warp::path::end())
        .and(warp::any().map(move || debug_db.clone()))
        .and(warp::any().map(move || debug_media.clone()))
        .then(debug_books)
        .map(map_result);
    let fix_filter = warp::get()
        .and(warp::path("books"))
        .and(warp::path("fix"))
        .and(warp::path::end())
        .and(warp::any().map(move || db_pool.clone()))
        .and(warp::any().map(move || media.clone()))
        .then(fix_books)
        .map(map_result);
    autofill_filter.or(debug_filter).or(fix_filter)
}
