//! Genre pages

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::resource::{FormMode, Resource};
use crate::{
    config::NameMatch,
    error::AppResult,
    models::{BookSummary, Genre, GenreForm},
    repository::Repository,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreDetail {
    pub genre: Genre,
    pub genre_books: Vec<BookSummary>,
}

#[async_trait]
impl Resource for Genre {
    type Form = GenreForm;
    type Listing = Genre;
    type Detail = GenreDetail;
    type FormData = Option<GenreForm>;
    type Dependent = BookSummary;

    const VIEW: &'static str = "genre";
    const SEGMENT: &'static str = "genre";
    const PLURAL: &'static str = "genres";
    const LABEL: &'static str = "Genre";
    const LIST_TITLE: &'static str = "Genre List";
    const DELETE_TITLE: &'static str = "Delete Genre";

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_form(form: &GenreForm, id: Uuid) -> Self {
        form.to_record(id)
    }

    fn to_form(&self) -> GenreForm {
        GenreForm::from(self)
    }

    async fn list(repo: &Repository) -> AppResult<Vec<Genre>> {
        repo.store.genres_list().await
    }

    async fn find(repo: &Repository, id: Uuid) -> AppResult<Option<Self>> {
        repo.store.genres_get(id).await
    }

    async fn detail(repo: &Repository, id: Uuid) -> AppResult<Option<(String, GenreDetail)>> {
        let (genre, genre_books) =
            tokio::try_join!(repo.store.genres_get(id), repo.store.books_by_genre(id))?;
        Ok(genre.map(|genre| {
            (
                "Genre Detail".to_string(),
                GenreDetail { genre, genre_books },
            )
        }))
    }

    async fn form_page(
        _repo: &Repository,
        mode: FormMode,
        entry: Option<&GenreForm>,
    ) -> AppResult<(String, Option<GenreForm>)> {
        let title = match mode {
            FormMode::Create => "Create Genre",
            FormMode::Update => "Update genre",
        };
        Ok((title.to_string(), entry.cloned()))
    }

    async fn insert(repo: &Repository, record: &Self) -> AppResult<()> {
        repo.store.genres_insert(record).await
    }

    async fn replace(repo: &Repository, record: &Self) -> AppResult<bool> {
        repo.store.genres_replace(record).await
    }

    async fn remove(repo: &Repository, id: Uuid) -> AppResult<bool> {
        repo.store.genres_delete(id).await
    }

    async fn dependents(repo: &Repository, id: Uuid) -> AppResult<Vec<BookSummary>> {
        repo.store.books_by_genre(id).await
    }

    async fn find_duplicate(
        repo: &Repository,
        record: &Self,
        matching: NameMatch,
    ) -> AppResult<Option<Self>> {
        repo.store.genres_find_by_name(&record.name, matching).await
    }
}
