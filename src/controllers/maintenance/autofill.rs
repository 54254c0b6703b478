use diesel::prelude::*;
use rand::Rng;
use tracing::info;

use super::fake::FakeData;
use super::Error;
use crate::connection_pool::DbConnection;
use crate::media::{self, MediaStore};
use crate::models::{
    Author, Book, Bookshelf, Format, MimeType, NewAuthor, NewBook, NewBookAuthor,
    NewBookBookshelf, NewBookSubject, NewBookshelf, NewFormat, NewSubject, Subject,
};
use crate::schema::{
    authors, book_authors, book_bookshelves, book_subjects, books, bookshelves, formats, subjects,
};

pub const SEED_COUNT: usize = 20;
/// The first books seeded get a copy of the sample file instead of a URL.
pub const UPLOAD_COUNT: usize = 5;
const TITLE_WORDS: usize = 5;

/// Books created by one seeding run, in creation order.
#[derive(Debug)]
pub struct SeededBook {
    pub book: Book,
    pub format: Format,
}

// Matching names are treated as the same record; with duplicates already in
// the table the oldest row wins.
fn author_named(conn: &DbConnection, name: &str) -> QueryResult<Author> {
    let existing = authors::table
        .filter(authors::name.eq(name))
        .order(authors::id.asc())
        .first::<Author>(conn)
        .optional()?;
    match existing {
        Some(author) => Ok(author),
        None => diesel::insert_into(authors::table)
            .values(NewAuthor { name })
            .get_result(conn),
    }
}

fn subject_named(conn: &DbConnection, name: &str) -> QueryResult<Subject> {
    let existing = subjects::table
        .filter(subjects::name.eq(name))
        .order(subjects::id.asc())
        .first::<Subject>(conn)
        .optional()?;
    match existing {
        Some(subject) => Ok(subject),
        None => diesel::insert_into(subjects::table)
            .values(NewSubject { name })
            .get_result(conn),
    }
}

fn bookshelf_named(conn: &DbConnection, name: &str) -> QueryResult<Bookshelf> {
    let existing = bookshelves::table
        .filter(bookshelves::name.eq(name))
        .order(bookshelves::id.asc())
        .first::<Bookshelf>(conn)
        .optional()?;
    match existing {
        Some(bookshelf) => Ok(bookshelf),
        None => diesel::insert_into(bookshelves::table)
            .values(NewBookshelf { name })
            .get_result(conn),
    }
}

/// Creates [`SEED_COUNT`] synthetic books, each with one format.
///
/// Rows are committed one at a time. If the sample file disappears, the run
/// stops before touching the database for that book; books created earlier
/// in the run are kept.
pub fn seed_books<R: Rng>(
    conn: &DbConnection,
    media: &MediaStore,
    fake: &mut FakeData<R>,
) -> Result<Vec<SeededBook>, Error> {
    seed_books_with(conn, media, fake, || media.read_sample())
}

/// [`seed_books`], taking the upload bytes from `read_sample`, which is
/// called once for each of the first [`UPLOAD_COUNT`] books.
pub fn seed_books_with<R, F>(
    conn: &DbConnection,
    media: &MediaStore,
    fake: &mut FakeData<R>,
    mut read_sample: F,
) -> Result<Vec<SeededBook>, Error>
where
    R: Rng,
    F: FnMut() -> Result<Vec<u8>, media::Error>,
{
    let mut seeded = Vec::with_capacity(SEED_COUNT);
    for i in 0..SEED_COUNT {
        let sample = if i < UPLOAD_COUNT {
            Some(read_sample()?)
        } else {
            None
        };

        let author = author_named(conn, &fake.name())?;
        let subject = subject_named(conn, &fake.word())?;
        let bookshelf = bookshelf_named(conn, &fake.word())?;

        let mime_type = fake.mime_type();
        let download_url = fake.url();
        let book: Book = diesel::insert_into(books::table)
            .values(NewBook {
                title: fake.sentence(TITLE_WORDS),
                language: fake.language().to_owned(),
                download_count: fake.download_count(),
                format: Some(mime_type.to_string()),
                download_link: Some(download_url.clone()),
            })
            .get_result(conn)?;

        diesel::insert_into(book_authors::table)
            .values(NewBookAuthor {
                book_id: book.id,
                author_id: author.id,
            })
            .execute(conn)?;
        diesel::insert_into(book_subjects::table)
            .values(NewBookSubject {
                book_id: book.id,
                subject_id: subject.id,
            })
            .execute(conn)?;
        diesel::insert_into(book_bookshelves::table)
            .values(NewBookBookshelf {
                book_id: book.id,
                bookshelf_id: bookshelf.id,
            })
            .execute(conn)?;

        let new_format = match sample {
            Some(bytes) => NewFormat {
                book_id: book.id,
                uploaded_file: Some(media.save(&format!("sample_{}.pdf", i), &bytes)?),
                mime_type: MimeType::Pdf,
                url: None,
            },
            None => NewFormat {
                book_id: book.id,
                uploaded_file: None,
                mime_type,
                url: Some(download_url),
            },
        };
        let format: Format = diesel::insert_into(formats::table)
            .values(new_format)
            .get_result(conn)?;

        info!(
            book_id = book.id,
            author = %author,
            format = %format.describe(&book),
            "Seeded book."
        );
        seeded.push(SeededBook { book, format });
    }
    Ok(seeded)
}
