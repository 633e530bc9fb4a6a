//! Book pages

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::resource::{FormMode, Resource};
use crate::{
    error::AppResult,
    models::{Author, Book, BookForm, BookInstance, BookListing, Genre, PopulatedBook},
    repository::Repository,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetail {
    pub book: PopulatedBook,
    pub book_instances: Vec<BookInstance>,
}

/// Genre offered on the book form, checked when the book carries it
#[derive(Debug, Serialize)]
pub struct GenreChoice {
    #[serde(flatten)]
    pub genre: Genre,
    pub checked: bool,
}

#[derive(Debug, Serialize)]
pub struct BookFormData {
    pub authors: Vec<Author>,
    pub genres: Vec<GenreChoice>,
    pub book: Option<BookForm>,
}

#[async_trait]
impl Resource for Book {
    type Form = BookForm;
    type Listing = BookListing;
    type Detail = BookDetail;
    type FormData = BookFormData;
    type Dependent = BookInstance;

    const VIEW: &'static str = "book";
    const SEGMENT: &'static str = "book";
    const PLURAL: &'static str = "books";
    const LABEL: &'static str = "Book";
    const LIST_TITLE: &'static str = "Book List";
    const DELETE_TITLE: &'static str = "Delete Book";

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_form(form: &BookForm, id: Uuid) -> Self {
        form.to_record(id)
    }

    fn to_form(&self) -> BookForm {
        BookForm::from(self)
    }

    async fn list(repo: &Repository) -> AppResult<Vec<BookListing>> {
        repo.books_with_authors().await
    }

    async fn find(repo: &Repository, id: Uuid) -> AppResult<Option<Self>> {
        repo.store.books_get(id).await
    }

    async fn detail(repo: &Repository, id: Uuid) -> AppResult<Option<(String, BookDetail)>> {
        let (book, book_instances) =
            tokio::try_join!(repo.book_populated(id), repo.store.instances_by_book(id))?;
        Ok(book.map(|book| {
            (
                book.title.clone(),
                BookDetail {
                    book,
                    book_instances,
                },
            )
        }))
    }

    async fn form_page(
        repo: &Repository,
        mode: FormMode,
        entry: Option<&BookForm>,
    ) -> AppResult<(String, BookFormData)> {
        let (authors, genres) =
            tokio::try_join!(repo.store.authors_list(), repo.store.genres_list())?;
        let genres = genres
            .into_iter()
            .map(|genre| GenreChoice {
                checked: entry.is_some_and(|form| form.selects_genre(genre.id)),
                genre,
            })
            .collect();

        let title = match mode {
            FormMode::Create => "Create Book",
            FormMode::Update => "Update Book",
        };
        Ok((
            title.to_string(),
            BookFormData {
                authors,
                genres,
                book: entry.cloned(),
            },
        ))
    }

    async fn insert(repo: &Repository, record: &Self) -> AppResult<()> {
        repo.store.books_insert(record).await
    }

    async fn replace(repo: &Repository, record: &Self) -> AppResult<bool> {
        repo.store.books_replace(record).await
    }

    async fn remove(repo: &Repository, id: Uuid) -> AppResult<bool> {
        repo.store.books_delete(id).await
    }

    async fn dependents(repo: &Repository, id: Uuid) -> AppResult<Vec<BookInstance>> {
        repo.store.instances_by_book(id).await
    }
}
