use serde::Serialize;

use super::query::BookRecord;
use crate::controllers::MediaLinks;
use crate::models::{Format, MimeType};

#[derive(Debug, Serialize, PartialEq)]
pub struct AuthorResponse {
    pub name: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FormatResponse {
    pub mime_type: MimeType,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BookResponse {
    pub id: i32,
    pub title: String,
    pub authors: Vec<AuthorResponse>,
    pub subjects: Vec<String>,
    pub bookshelves: Vec<String>,
    pub formats: Vec<FormatResponse>,
    pub language: String,
    pub download_count: i32,
    pub download_link: Option<String>,
}

/// Picks the one link a client should download the book from.
///
/// Any uploaded file beats any external URL, whatever order the formats are
/// in. Among candidates of the same kind the first format wins.
pub fn resolve_download_link(
    formats: &[Format],
    links: &MediaLinks,
) -> Result<Option<String>, url::ParseError> {
    if let Some(stored_name) = formats.iter().find_map(Format::stored_file) {
        return links.absolute(stored_name).map(Some);
    }
    Ok(formats
        .iter()
        .find_map(Format::external_url)
        .map(String::from))
}

pub fn present(record: &BookRecord, links: &MediaLinks) -> Result<BookResponse, url::ParseError> {
    Ok(BookResponse {
        id: record.book.id,
        title: record.book.title.clone(),
        authors: record
            .authors
            .iter()
            .map(|author| AuthorResponse {
                name: author.name.clone(),
            })
            .collect(),
        subjects: record.subjects.iter().map(ToString::to_string).collect(),
        bookshelves: record.bookshelves.iter().map(ToString::to_string).collect(),
        formats: record
            .formats
            .iter()
            .map(|format| FormatResponse {
                mime_type: format.mime_type,
            })
            .collect(),
        language: record.book.language.clone(),
        download_count: record.book.download_count,
        download_link: resolve_download_link(&record.formats, links)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::MediaConfiguration;
    use crate::controllers::RequestOrigin;
    use crate::media::MediaStore;
    use crate::models::{Author, Book, Bookshelf, Subject};
    use serde_json::json;

    fn links() -> MediaLinks {
        MediaLinks::new(
            &RequestOrigin {
                scheme: "http".into(),
                host: "testserver".into(),
            },
            &MediaStore::new(&MediaConfiguration::default()),
        )
        .unwrap()
    }

    fn url_only(id: i32, url: &str) -> Format {
        Format {
            id,
            book_id: 1,
            uploaded_file: None,
            mime_type: MimeType::Epub,
            url: Some(url.into()),
        }
    }

    fn uploaded(id: i32, name: &str) -> Format {
        Format {
            id,
            book_id: 1,
            uploaded_file: Some(name.into()),
            mime_type: MimeType::Pdf,
            url: None,
        }
    }

    #[test]
    fn uploaded_file_wins_over_an_earlier_url() {
        let formats = vec![
            url_only(1, "https://mirror.example.org/moby.epub"),
            uploaded(2, "formats/sample_0.pdf"),
        ];
        assert_eq!(
            resolve_download_link(&formats, &links()).unwrap(),
            Some("http://testserver/media/formats/sample_0.pdf".to_owned())
        );
    }

    #[test]
    fn first_url_is_returned_verbatim() {
        let formats = vec![
            url_only(1, "HTTPS://Mirror.Example.org/a%20b?x=1"),
            url_only(2, "https://other.example.org/"),
        ];
        assert_eq!(
            resolve_download_link(&formats, &links()).unwrap(),
            Some("HTTPS://Mirror.Example.org/a%20b?x=1".to_owned())
        );
    }

    #[test]
    fn first_uploaded_file_wins_among_uploads() {
        let formats = vec![
            uploaded(1, "formats/first.pdf"),
            uploaded(2, "formats/second.pdf"),
        ];
        assert_eq!(
            resolve_download_link(&formats, &links()).unwrap(),
            Some("http://testserver/media/formats/first.pdf".to_owned())
        );
    }

    #[test]
    fn no_formats_means_no_link() {
        assert_eq!(resolve_download_link(&[], &links()).unwrap(), None);
        let empty = Format {
            id: 1,
            book_id: 1,
            uploaded_file: Some(String::new()),
            mime_type: MimeType::PlainText,
            url: Some(String::new()),
        };
        assert_eq!(resolve_download_link(&[empty], &links()).unwrap(), None);
    }

    #[test]
    fn record_is_shaped_for_the_listing() {
        let record = BookRecord {
            book: Book {
                id: 3,
                title: "Moby Dick".into(),
                language: "en".into(),
                download_count: 812,
                format: Some("application/epub+zip".into()),
                download_link: Some("https://legacy.example.org/".into()),
            },
            authors: vec![Author {
                id: 1,
                name: "Herman Melville".into(),
            }],
            subjects: vec![Subject {
                id: 4,
                name: "Whaling".into(),
            }],
            bookshelves: vec![Bookshelf {
                id: 5,
                name: "Best Books Ever Listings".into(),
            }],
            formats: vec![url_only(9, "https://mirror.example.org/moby.epub")],
        };

        let response = serde_json::to_value(present(&record, &links()).unwrap()).unwrap();
        assert_eq!(
            response,
            json!({
                "id": 3,
                "title": "Moby Dick",
                "authors": [{"name": "Herman Melville"}],
                "subjects": ["Whaling"],
                "bookshelves": ["Best Books Ever Listings"],
                "formats": [{"mime_type": "application/epub+zip"}],
                "language": "en",
                "download_count": 812,
                "download_link": "https://mirror.example.org/moby.epub",
            })
        );
    }
}
