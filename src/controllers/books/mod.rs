mod errors;
mod filters;
pub mod params;
pub mod presentation;
pub mod query;

use std::collections::HashMap;
use std::sync::Arc;

use mobc::Pool;
use serde::Serialize;
use tracing::{error, span, Instrument, Level};
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{reply, Reply};

use crate::connection_pool::PgConnectionManager;
use crate::controllers::{MediaLinks, RequestOrigin};
use crate::media::MediaStore;
use crate::util::ErrorMessage;
pub use errors::Error;
pub use filters::get_filters;
use params::BookQuery;
use presentation::BookResponse;

#[tracing::instrument(
name = "Listing books.",
err,
level = "info",
skip(db_pool, media),
fields(
    request_id = %Uuid::new_v4(),
)
)]
pub async fn list_books(
    params: HashMap<String, String>,
    origin: RequestOrigin,
    db_pool: Pool<PgConnectionManager>,
    media: Arc<MediaStore>,
) -> Result<Vec<BookResponse>, Error> {
    let book_query = BookQuery::from_params(&params)?;
    let links = MediaLinks::new(&origin, &media)?;
    let conn = db_pool
        .get()
        .instrument(tracing::info_span!("Acquiring a DB Connection."))
        .await?;

    let db_span = span!(Level::INFO, "Fetching matching books from db.");
    let records = {
        let _a = db_span.enter();
        let books = query::find_books(&conn, &book_query)?;
        query::load_relations(&conn, books)?
    };

    let responses = records
        .iter()
        .map(|record| presentation::present(record, &links))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(responses)
}

fn map_result(result: Result<impl Serialize, Error>) -> impl Reply {
    match result {
        Ok(x) => reply::with_status(reply::json(&x), StatusCode::OK),
        Err(Error::InvalidParameter(invalid)) => {
            let mut body = HashMap::new();
            body.insert(invalid.parameter, vec![invalid.message]);
            reply::with_status(reply::json(&body), StatusCode::BAD_REQUEST)
        }
        Err(err) => {
            let (status, body): (StatusCode, ErrorMessage) = match err {
                Error::InvalidHost(_) => (StatusCode::BAD_REQUEST, "Invalid host header.".into()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal exception occurred.".into(),
                ),
            };
            error!(
                "Returning error body: {}, StatusCode: {}, Source: {}",
                body.message, status, err
            );
            reply::with_status(reply::json(&body), status)
        }
    }
}
