table! {
    authors (id) {
        id -> Int4,
        name -> Varchar,
    }
}

table! {
    subjects (id) {
        id -> Int4,
        name -> Varchar,
    }
}

table! {
    bookshelves (id) {
        id -> Int4,
        name -> Varchar,
    }
}

table! {
    books (id) {
        id -> Int4,
        title -> Varchar,
        language -> Varchar,
        download_count -> Int4,
        format -> Nullable<Varchar>,
        download_link -> Nullable<Varchar>,
    }
}

table! {
    book_authors (id) {
        id -> Int4,
        book_id -> Int4,
        author_id -> Int4,
    }
}

table! {
    book_subjects (id) {
        id -> Int4,
        book_id -> Int4,
        subject_id -> Int4,
    }
}

table! {
    book_bookshelves (id) {
        id -> Int4,
        book_id -> Int4,
        bookshelf_id -> Int4,
    }
}

table! {
    formats (id) {
        id -> Int4,
        book_id -> Int4,
        uploaded_file -> Nullable<Varchar>,
        mime_type -> Varchar,
        url -> Nullable<Varchar>,
    }
}

joinable!(book_authors -> authors (author_id));
joinable!(book_authors -> books (book_id));
joinable!(book_subjects -> subjects (subject_id));
joinable!(book_subjects -> books (book_id));
joinable!(book_bookshelves -> bookshelves (bookshelf_id));
joinable!(book_bookshelves -> books (book_id));
joinable!(formats -> books (book_id));

allow_tables_to_appear_in_same_query!(
    authors,
    subjects,
    bookshelves,
    books,
    book_authors,
    book_subjects,
    book_bookshelves,
    formats,
);
