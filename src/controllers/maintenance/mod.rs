mod errors;
mod filters;
pub mod autofill;
pub mod fake;
pub mod repair;

use std::sync::Arc;

use mobc::Pool;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{error, span, warn, Instrument, Level};
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{reply, Reply};

use crate::connection_pool::PgConnectionManager;
use crate::media::{self, MediaStore};
use crate::util::{ErrorMessage, InlineError};
pub use errors::Error;
use fake::FakeData;
pub use filters::get_filters;
use repair::BookDiagnostics;

#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub books: Vec<BookDiagnostics>,
}

#[derive(Debug, Serialize)]
pub struct FixResponse {
    pub message: String,
    pub fixed_count: usize,
}

#[tracing::instrument(
name = "Seeding synthetic books.",
err,
level = "info",
skip(db_pool, media),
fields(
    request_id = %Uuid::new_v4(),
)
)]
pub async fn autofill_books(
    db_pool: Pool<PgConnectionManager>,
    media: Arc<MediaStore>,
) -> Result<ErrorMessage, Error> {
    media.ensure_sample()?;
    let conn = db_pool
        .get()
        .instrument(tracing::info_span!("Acquiring a DB Connection."))
        .await?;

    let db_span = span!(Level::INFO, "Inserting synthetic books into db.");
    let seeded = {
        let _a = db_span.enter();
        let mut fake = FakeData::new(StdRng::from_entropy());
        autofill::seed_books(&conn, &media, &mut fake)?
    };
    let uploads = seeded
        .iter()
        .filter(|seeded| seeded.format.stored_file().is_some())
        .count();
    Ok(format!(
        "{} books created. {} with real PDF uploads!",
        seeded.len(),
        uploads
    )
    .into())
}

#[tracing::instrument(
name = "Describing book formats.",
err,
level = "info",
skip(db_pool, media),
fields(
    request_id = %Uuid::new_v4(),
)
)]
pub async fn debug_books(
    db_pool: Pool<PgConnectionManager>,
    media: Arc<MediaStore>,
) -> Result<DebugResponse, Error> {
    let conn = db_pool
        .get()
        .instrument(tracing::info_span!("Acquiring a DB Connection."))
        .await?;

    let db_span = span!(Level::INFO, "Fetching books and formats from db.");
    let books = {
        let _a = db_span.enter();
        repair::describe_books(&conn, &media)?
    };
    Ok(DebugResponse { books })
}

#[tracing::instrument(
name = "Backfilling uploaded files.",
err,
level = "info",
skip(db_pool, media),
fields(
    request_id = %Uuid::new_v4(),
)
)]
pub async fn fix_books(
    db_pool: Pool<PgConnectionManager>,
    media: Arc<MediaStore>,
) -> Result<FixResponse, Error> {
    media.ensure_sample()?;
    let conn = db_pool
        .get()
        .instrument(tracing::info_span!("Acquiring a DB Connection."))
        .await?;

    let db_span = span!(Level::INFO, "Patching formats without uploads.");
    let fixed_count = {
        let _a = db_span.enter();
        repair::backfill_uploads(&conn, &media)?
    };
    Ok(FixResponse {
        message: format!("Fixed {} books with uploaded PDF files", fixed_count),
        fixed_count,
    })
}

fn map_result(result: Result<impl Serialize, Error>) -> impl Reply {
    match result {
        Ok(x) => reply::with_status(reply::json(&x), StatusCode::OK),
        // Reported inline with a 200, which is what existing clients expect.
        Err(Error::Media(err @ media::Error::SampleMissing(_))) => {
            warn!("Sample file missing: {}", err);
            reply::with_status(reply::json(&InlineError::from(&err)), StatusCode::OK)
        }
        Err(err) => {
            let body: ErrorMessage = "An internal exception occurred.".into();
            let status = StatusCode::INTERNAL_SERVER_ERROR;
            error!(
                "Returning error body: {}, StatusCode: {}, Source: {}",
                body.message, status, err
            );
            reply::with_status(reply::json(&body), status)
        }
    }
}
