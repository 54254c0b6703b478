use std::collections::HashMap;

use diesel::dsl;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use itertools::Itertools;

use super::params::{BookFilter, BookQuery, TextField, SEARCH_FIELDS};
use crate::connection_pool::DbConnection;
use crate::models::{Author, Book, Bookshelf, Format, Subject};
use crate::schema::{
    authors, book_authors, book_bookshelves, book_subjects, books, bookshelves, formats, subjects,
};

type BookPredicate = Box<dyn BoxableExpression<books::table, Pg, SqlType = Bool>>;

/// A book together with everything the listing shows about it.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub book: Book,
    pub authors: Vec<Author>,
    pub subjects: Vec<Subject>,
    pub bookshelves: Vec<Bookshelf>,
    pub formats: Vec<Format>,
}

/// Wraps `value` for ILIKE so that `%`, `_` and `\` match literally.
pub fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// Relationship matches go through `id IN (subquery)`, so a book with several
// matching relations still comes back once.
fn contains(field: TextField, value: &str) -> BookPredicate {
    let pattern = contains_pattern(value);
    match field {
        TextField::Title => Box::new(books::title.ilike(pattern)),
        TextField::FormatMimeType => Box::new(
            books::id.eq_any(
                formats::table
                    .filter(formats::mime_type.ilike(pattern))
                    .select(formats::book_id),
            ),
        ),
        TextField::AuthorName => Box::new(
            books::id.eq_any(
                book_authors::table
                    .inner_join(authors::table)
                    .filter(authors::name.ilike(pattern))
                    .select(book_authors::book_id),
            ),
        ),
        TextField::SubjectName => Box::new(
            books::id.eq_any(
                book_subjects::table
                    .inner_join(subjects::table)
                    .filter(subjects::name.ilike(pattern))
                    .select(book_subjects::book_id),
            ),
        ),
        TextField::BookshelfName => Box::new(
            books::id.eq_any(
                book_bookshelves::table
                    .inner_join(bookshelves::table)
                    .filter(bookshelves::name.ilike(pattern))
                    .select(book_bookshelves::book_id),
            ),
        ),
    }
}

fn predicate(filter: &BookFilter) -> BookPredicate {
    match filter {
        BookFilter::IdExact(id) => Box::new(books::id.eq(*id)),
        BookFilter::IdIn(ids) => Box::new(books::id.eq_any(ids.clone())),
        BookFilter::LanguageExact(language) => Box::new(books::language.eq(language.clone())),
        BookFilter::LanguageIn(languages) => Box::new(books::language.eq_any(languages.clone())),
        BookFilter::Contains(field, value) => contains(*field, value),
    }
}

fn matches_search_term(term: &str) -> BookPredicate {
    SEARCH_FIELDS
        .iter()
        .map(|field| contains(*field, term))
        .fold1(|matched, next| -> BookPredicate { Box::new(matched.or(next)) })
        .unwrap_or_else(|| Box::new(dsl::sql::<Bool>("FALSE")))
}

pub fn build_query(query: &BookQuery) -> books::BoxedQuery<'static, Pg> {
    let mut statement = books::table.into_boxed::<Pg>();
    for filter in &query.filters {
        statement = statement.filter(predicate(filter));
    }
    for term in &query.search_terms {
        statement = statement.filter(matches_search_term(term));
    }
    statement.order((books::download_count.desc(), books::id.asc()))
}

pub fn find_books(conn: &DbConnection, query: &BookQuery) -> QueryResult<Vec<Book>> {
    build_query(query).load(conn)
}

/// Formats of each book, in the same order as `books`, each list by id.
pub fn load_formats(conn: &DbConnection, books: &[Book]) -> QueryResult<Vec<Vec<Format>>> {
    Ok(Format::belonging_to(books)
        .order(formats::id.asc())
        .load::<Format>(conn)?
        .grouped_by(books))
}

pub fn load_relations(conn: &DbConnection, books: Vec<Book>) -> QueryResult<Vec<BookRecord>> {
    if books.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = books.iter().map(|book| book.id).collect();

    let mut authors_by_book: HashMap<i32, Vec<Author>> = book_authors::table
        .inner_join(authors::table)
        .filter(book_authors::book_id.eq_any(&ids))
        .order(book_authors::id.asc())
        .select((book_authors::book_id, authors::all_columns))
        .load::<(i32, Author)>(conn)?
        .into_iter()
        .into_group_map();
    let mut subjects_by_book: HashMap<i32, Vec<Subject>> = book_subjects::table
        .inner_join(subjects::table)
        .filter(book_subjects::book_id.eq_any(&ids))
        .order(book_subjects::id.asc())
        .select((book_subjects::book_id, subjects::all_columns))
        .load::<(i32, Subject)>(conn)?
        .into_iter()
        .into_group_map();
    let mut bookshelves_by_book: HashMap<i32, Vec<Bookshelf>> = book_bookshelves::table
        .inner_join(bookshelves::table)
        .filter(book_bookshelves::book_id.eq_any(&ids))
        .order(book_bookshelves::id.asc())
        .select((book_bookshelves::book_id, bookshelves::all_columns))
        .load::<(i32, Bookshelf)>(conn)?
        .into_iter()
        .into_group_map();
    let formats = load_formats(conn, &books)?;

    Ok(books
        .into_iter()
        .zip(formats)
        .map(|(book, formats)| BookRecord {
            authors: authors_by_book.remove(&book.id).unwrap_or_default(),
            subjects: subjects_by_book.remove(&book.id).unwrap_or_default(),
            bookshelves: bookshelves_by_book.remove(&book.id).unwrap_or_default(),
            formats,
            book,
        })
        .collect())
}
