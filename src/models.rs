use crate::schema::{
    authors, book_authors, book_bookshelves, book_subjects, books, bookshelves, formats, subjects,
};

use derive_more::{Display, Error};
use diesel::{
    sql_types,
    types::{FromSql, ToSql},
    Identifiable, Queryable,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[sql_type = "sql_types::Text"]
pub enum MimeType {
    #[serde(rename = "application/pdf")]
    Pdf,
    #[serde(rename = "text/plain")]
    PlainText,
    #[serde(rename = "application/vnd.openxmlformats-officedocument.wordprocessingml.document")]
    Docx,
    #[serde(rename = "application/epub+zip")]
    Epub,
}

impl MimeType {
    pub const ALL: [MimeType; 4] = [
        MimeType::Pdf,
        MimeType::PlainText,
        MimeType::Epub,
        MimeType::Docx,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Pdf => "application/pdf",
            MimeType::PlainText => "text/plain",
            MimeType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            MimeType::Epub => "application/epub+zip",
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Display, Error)]
#[display(fmt = "Unknown mime type: {}", _0)]
pub struct UnknownMimeType(#[error(not(source))] pub String);

impl FromStr for MimeType {
    type Err = UnknownMimeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MimeType::ALL
            .iter()
            .copied()
            .find(|mime| mime.as_str() == s)
            .ok_or_else(|| UnknownMimeType(s.to_owned()))
    }
}

impl<DB> ToSql<sql_types::Text, DB> for MimeType
where
    DB: diesel::backend::Backend,
    str: ToSql<sql_types::Text, DB>,
{
    fn to_sql<W: std::io::Write>(
        &self,
        out: &mut diesel::serialize::Output<W, DB>,
    ) -> diesel::serialize::Result {
        self.as_str().to_sql(out)
    }
}

impl<DB> FromSql<sql_types::Text, DB> for MimeType
where
    DB: diesel::backend::Backend,
    String: FromSql<sql_types::Text, DB>,
{
    fn from_sql(bytes: Option<&DB::RawValue>) -> diesel::deserialize::Result<Self> {
        let value = String::from_sql(bytes)?;
        Ok(value.parse()?)
    }
}

#[derive(Identifiable, Queryable, PartialEq, Debug, Clone)]
pub struct Author {
    pub id: i32,
    pub name: String,
}

#[derive(Identifiable, Queryable, PartialEq, Debug, Clone)]
pub struct Subject {
    pub id: i32,
    pub name: String,
}

#[derive(Identifiable, Queryable, PartialEq, Debug, Clone)]
#[table_name = "bookshelves"]
pub struct Bookshelf {
    pub id: i32,
    pub name: String,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for Bookshelf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Insertable, Debug)]
#[table_name = "authors"]
pub struct NewAuthor<'a> {
    pub name: &'a str,
}

#[derive(Insertable, Debug)]
#[table_name = "subjects"]
pub struct NewSubject<'a> {
    pub name: &'a str,
}

#[derive(Insertable, Debug)]
#[table_name = "bookshelves"]
pub struct NewBookshelf<'a> {
    pub name: &'a str,
}

/// `format` and `download_link` predate [`Format`] and are never presented.
#[derive(Identifiable, Queryable, PartialEq, Debug, Clone)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub language: String,
    pub download_count: i32,
    pub format: Option<String>,
    pub download_link: Option<String>,
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Insertable, Debug)]
#[table_name = "books"]
pub struct NewBook {
    pub title: String,
    pub language: String,
    pub download_count: i32,
    pub format: Option<String>,
    pub download_link: Option<String>,
}

#[derive(Insertable, Debug)]
#[table_name = "book_authors"]
pub struct NewBookAuthor {
    pub book_id: i32,
    pub author_id: i32,
}

#[derive(Insertable, Debug)]
#[table_name = "book_subjects"]
pub struct NewBookSubject {
    pub book_id: i32,
    pub subject_id: i32,
}

#[derive(Insertable, Debug)]
#[table_name = "book_bookshelves"]
pub struct NewBookBookshelf {
    pub book_id: i32,
    pub bookshelf_id: i32,
}

/// A downloadable representation of a book.
///
/// Nothing stops both `uploaded_file` and `url` from being set (or neither).
/// Readers decide precedence; see the download link resolution in the books
/// controller.
#[derive(Identifiable, Queryable, Associations, PartialEq, Debug, Clone)]
#[belongs_to(Book)]
pub struct Format {
    pub id: i32,
    pub book_id: i32,
    pub uploaded_file: Option<String>,
    pub mime_type: MimeType,
    pub url: Option<String>,
}

impl Format {
    /// Stored name of the uploaded file, relative to the media root.
    pub fn stored_file(&self) -> Option<&str> {
        self.uploaded_file.as_deref().filter(|name| !name.is_empty())
    }

    pub fn external_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn describe(&self, book: &Book) -> String {
        format!("{} of {}", self.mime_type, book.title)
    }
}

#[derive(Insertable, Debug)]
#[table_name = "formats"]
pub struct NewFormat {
    pub book_id: i32,
    pub uploaded_file: Option<String>,
    pub mime_type: MimeType,
    pub url: Option<String>,
}
