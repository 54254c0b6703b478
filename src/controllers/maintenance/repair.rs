use diesel::prelude::*;
use serde::Serialize;
use tracing::info;

use super::Error;
use crate::connection_pool::DbConnection;
use crate::controllers::books::query::load_formats;
use crate::media::MediaStore;
use crate::models::{Book, MimeType, NewFormat};
use crate::schema::{books, formats};

pub const DEBUG_BOOK_LIMIT: i64 = 5;

#[derive(Debug, Serialize, PartialEq)]
pub struct FormatDiagnostics {
    pub id: i32,
    pub mime_type: MimeType,
    pub has_uploaded_file: bool,
    pub uploaded_file_url: Option<String>,
    pub has_url: bool,
    pub url: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BookDiagnostics {
    pub id: i32,
    pub title: String,
    pub formats_count: usize,
    pub formats: Vec<FormatDiagnostics>,
}

/// Format state of the first few books, in id order.
pub fn describe_books(
    conn: &DbConnection,
    media: &MediaStore,
) -> QueryResult<Vec<BookDiagnostics>> {
    let books = books::table
        .order(books::id.asc())
        .limit(DEBUG_BOOK_LIMIT)
        .load::<Book>(conn)?;
    let formats = load_formats(conn, &books)?;
    Ok(books
        .into_iter()
        .zip(formats)
        .map(|(book, formats)| BookDiagnostics {
            id: book.id,
            title: book.title,
            formats_count: formats.len(),
            formats: formats
                .into_iter()
                .map(|format| FormatDiagnostics {
                    id: format.id,
                    mime_type: format.mime_type,
                    has_uploaded_file: format.stored_file().is_some(),
                    uploaded_file_url: format.stored_file().map(|name| media.url(name)),
                    has_url: format.external_url().is_some(),
                    url: format.url,
                })
                .collect(),
        })
        .collect())
}

/// Gives every book without an uploaded file a copy of the sample PDF and
/// returns how many books were touched.
///
/// An existing pdf format is patched in place; otherwise a new pdf format is
/// added. Books that already have an upload are left alone, so a second run
/// reports zero. The sample is only read for books that need it; callers
/// wanting an up-front check use [`MediaStore::ensure_sample`].
pub fn backfill_uploads(conn: &DbConnection, media: &MediaStore) -> Result<usize, Error> {
    let books = books::table.order(books::id.asc()).load::<Book>(conn)?;
    let formats_by_book = load_formats(conn, &books)?;

    let mut fixed_count = 0;
    for (book, book_formats) in books.iter().zip(formats_by_book) {
        if book_formats.iter().any(|format| format.stored_file().is_some()) {
            continue;
        }
        let bytes = media.read_sample()?;
        match book_formats.iter().find(|format| format.mime_type == MimeType::Pdf) {
            Some(pdf_format) => {
                let stored_name = media.save(&format!("sample_fixed_{}.pdf", book.id), &bytes)?;
                diesel::update(pdf_format)
                    .set(formats::uploaded_file.eq(&stored_name))
                    .execute(conn)?;
                info!(
                    book_id = book.id,
                    format_id = pdf_format.id,
                    %stored_name,
                    "Patched pdf format."
                );
            }
            None => {
                let stored_name = media.save(&format!("sample_new_{}.pdf", book.id), &bytes)?;
                diesel::insert_into(formats::table)
                    .values(NewFormat {
                        book_id: book.id,
                        uploaded_file: Some(stored_name.clone()),
                        mime_type: MimeType::Pdf,
                        url: None,
                    })
                    .execute(conn)?;
                info!(book_id = book.id, %stored_name, "Added pdf format.");
            }
        }
        fixed_count += 1;
    }
    Ok(fixed_count)
}
