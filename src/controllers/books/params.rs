use std::collections::HashMap;

use derive_more::{Display, Error};

const INVALID_INTEGER: &str = "Enter a whole number.";

/// Text columns a listing may be narrowed by with a case-insensitive
/// substring match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    FormatMimeType,
    AuthorName,
    SubjectName,
    BookshelfName,
}

/// Fields the `search` parameter looks at. A term matches a book when any of
/// them contains it.
pub const SEARCH_FIELDS: [TextField; 4] = [
    TextField::Title,
    TextField::AuthorName,
    TextField::SubjectName,
    TextField::BookshelfName,
];

#[derive(Debug, Clone, PartialEq)]
pub enum BookFilter {
    IdExact(i32),
    IdIn(Vec<i32>),
    LanguageExact(String),
    LanguageIn(Vec<String>),
    Contains(TextField, String),
}

#[derive(Debug, Clone, Copy)]
enum Parameter {
    IdExact,
    IdIn,
    LanguageExact,
    LanguageIn,
    Contains(TextField),
}

/// Every query parameter the listing understands. Anything else is ignored.
const PARAMETERS: [(&str, Parameter); 9] = [
    ("id", Parameter::IdExact),
    ("id__in", Parameter::IdIn),
    ("language", Parameter::LanguageExact),
    ("language__in", Parameter::LanguageIn),
    (
        "formats__mime_type__icontains",
        Parameter::Contains(TextField::FormatMimeType),
    ),
    (
        "authors__name__icontains",
        Parameter::Contains(TextField::AuthorName),
    ),
    ("title__icontains", Parameter::Contains(TextField::Title)),
    (
        "subjects__name__icontains",
        Parameter::Contains(TextField::SubjectName),
    ),
    (
        "bookshelves__name__icontains",
        Parameter::Contains(TextField::BookshelfName),
    ),
];

const SEARCH_PARAMETER: &str = "search";

#[derive(Debug, Display, Error, Clone, PartialEq)]
#[display(fmt = "{}: {}", parameter, message)]
pub struct InvalidParameter {
    pub parameter: &'static str,
    pub message: &'static str,
}

/// A listing request: every filter must hold, and every search term must be
/// found in at least one of [`SEARCH_FIELDS`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookQuery {
    pub filters: Vec<BookFilter>,
    pub search_terms: Vec<String>,
}

impl BookQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<BookQuery, InvalidParameter> {
        let mut filters = Vec::new();
        for &(name, parameter) in PARAMETERS.iter() {
            let value = match params.get(name).map(|value| clean(value)) {
                Some(value) if !value.is_empty() => value,
                _ => continue,
            };
            let filter = match parameter {
                Parameter::IdExact => BookFilter::IdExact(parse_id(name, &value)?),
                Parameter::IdIn => {
                    let ids = split_list(&value)
                        .map(|item| parse_id(name, item))
                        .collect::<Result<Vec<_>, _>>()?;
                    if ids.is_empty() {
                        continue;
                    }
                    BookFilter::IdIn(ids)
                }
                Parameter::LanguageExact => BookFilter::LanguageExact(value),
                Parameter::LanguageIn => {
                    let languages: Vec<String> = split_list(&value).map(String::from).collect();
                    if languages.is_empty() {
                        continue;
                    }
                    BookFilter::LanguageIn(languages)
                }
                Parameter::Contains(field) => BookFilter::Contains(field, value),
            };
            filters.push(filter);
        }

        let search_terms = params
            .get(SEARCH_PARAMETER)
            .map(|value| search_terms(value))
            .unwrap_or_default();

        Ok(BookQuery {
            filters,
            search_terms,
        })
    }
}

fn clean(value: &str) -> String {
    value.replace('\0', "").trim().to_owned()
}

/// Splits `a,b,c` (optionally wrapped as `[a,b,c]`), dropping blank items.
fn split_list(value: &str) -> impl Iterator<Item = &str> {
    let value = value.trim();
    let value = value
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(value);
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn parse_id(parameter: &'static str, value: &str) -> Result<i32, InvalidParameter> {
    value.trim().parse().map_err(|_| InvalidParameter {
        parameter,
        message: INVALID_INTEGER,
    })
}

fn search_terms(value: &str) -> Vec<String> {
    value
        .replace('\0', "")
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|term| !term.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(pairs: &[(&str, &str)]) -> Result<BookQuery, InvalidParameter> {
        let params = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BookQuery::from_params(&params)
    }

    #[test]
    fn no_parameters_means_no_filters() {
        assert_eq!(parse(&[]).unwrap(), BookQuery::default());
    }

    #[test]
    fn every_listed_parameter_is_recognised() {
        let query = parse(&[
            ("id", "7"),
            ("id__in", "1,2,3"),
            ("language", "en"),
            ("language__in", "fr,de"),
            ("formats__mime_type__icontains", "pdf"),
            ("authors__name__icontains", "austen"),
            ("title__icontains", "pride"),
            ("subjects__name__icontains", "romance"),
            ("bookshelves__name__icontains", "classics"),
        ])
        .unwrap();

        assert_eq!(
            query.filters,
            vec![
                BookFilter::IdExact(7),
                BookFilter::IdIn(vec![1, 2, 3]),
                BookFilter::LanguageExact("en".into()),
                BookFilter::LanguageIn(vec!["fr".into(), "de".into()]),
                BookFilter::Contains(TextField::FormatMimeType, "pdf".into()),
                BookFilter::Contains(TextField::AuthorName, "austen".into()),
                BookFilter::Contains(TextField::Title, "pride".into()),
                BookFilter::Contains(TextField::SubjectName, "romance".into()),
                BookFilter::Contains(TextField::BookshelfName, "classics".into()),
            ]
        );
    }

    #[test]
    fn unknown_and_blank_parameters_are_ignored() {
        let query = parse(&[
            ("authors__id", "3"),
            ("formats__url__icontains", "x"),
            ("ordering", "title"),
            ("language", "  "),
            ("id__in", ","),
            ("search", ""),
        ])
        .unwrap();
        assert_eq!(query, BookQuery::default());
    }

    #[test]
    fn bracketed_lists_are_accepted() {
        let query = parse(&[("id__in", "[1, 2,,3]")]).unwrap();
        assert_eq!(query.filters, vec![BookFilter::IdIn(vec![1, 2, 3])]);
    }

    #[test]
    fn non_integer_ids_are_rejected() {
        let err = parse(&[("id", "abc")]).unwrap_err();
        assert_eq!(err.parameter, "id");
        assert_eq!(err.message, "Enter a whole number.");

        let err = parse(&[("id__in", "1,two")]).unwrap_err();
        assert_eq!(err.parameter, "id__in");

        assert!(parse(&[("id", "99999999999")]).is_err());
        assert!(parse(&[("id", "1.5")]).is_err());
    }

    #[test]
    fn search_splits_on_whitespace_and_commas() {
        let query = parse(&[("search", " pride,  prejudice\tausten ")]).unwrap();
        assert_eq!(query.search_terms, vec!["pride", "prejudice", "austen"]);
        assert!(query.filters.is_empty());
    }

    #[test]
    fn nul_bytes_are_stripped() {
        let query = parse(&[("title__icontains", "mo\0by")]).unwrap();
        assert_eq!(
            query.filters,
            vec![BookFilter::Contains(TextField::Title, "moby".into())]
        );
    }
}
