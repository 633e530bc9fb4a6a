//! Book instance pages

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::resource::{FormMode, Resource};
use crate::{
    error::AppResult,
    models::{BookInstance, BookInstanceForm, BookStatus, BookSummary, PopulatedInstance},
    repository::Repository,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInstanceFormData {
    pub books: Vec<BookSummary>,
    pub book_instance: Option<BookInstanceForm>,
    pub selected_book_id: Option<String>,
    pub statuses: [BookStatus; 4],
}

#[async_trait]
impl Resource for BookInstance {
    type Form = BookInstanceForm;
    type Listing = PopulatedInstance;
    type Detail = PopulatedInstance;
    type FormData = BookInstanceFormData;
    /// Nothing references a copy, so deletes are never blocked
    type Dependent = ();

    const VIEW: &'static str = "bookInstance";
    const SEGMENT: &'static str = "bookinstance";
    const PLURAL: &'static str = "bookinstances";
    const LABEL: &'static str = "Book copy";
    const LIST_TITLE: &'static str = "Book Instance List";
    const DELETE_TITLE: &'static str = "Delete book instance";

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_form(form: &BookInstanceForm, id: Uuid) -> Self {
        form.to_record(id)
    }

    fn to_form(&self) -> BookInstanceForm {
        BookInstanceForm::from(self)
    }

    async fn list(repo: &Repository) -> AppResult<Vec<PopulatedInstance>> {
        repo.instances_with_books().await
    }

    async fn find(repo: &Repository, id: Uuid) -> AppResult<Option<Self>> {
        repo.store.instances_get(id).await
    }

    async fn detail(repo: &Repository, id: Uuid) -> AppResult<Option<(String, PopulatedInstance)>> {
        let instance = repo.instance_populated(id).await?;
        Ok(instance.map(|instance| (format!("Copy: {}", instance.book_title()), instance)))
    }

    async fn form_page(
        repo: &Repository,
        mode: FormMode,
        entry: Option<&BookInstanceForm>,
    ) -> AppResult<(String, BookInstanceFormData)> {
        let books: Vec<BookSummary> = repo
            .store
            .books_list()
            .await?
            .iter()
            .map(BookSummary::from)
            .collect();
        let selected_book_id = entry.map(|form| form.book.clone()).filter(|id| !id.is_empty());

        let title = match mode {
            FormMode::Create => "Create BookInstance".to_string(),
            FormMode::Update => {
                let book_title = selected_book_id
                    .as_deref()
                    .and_then(|id| books.iter().find(|b| b.id.to_string() == id))
                    .map(|b| b.title.as_str())
                    .unwrap_or_default();
                format!("Update Copy: {}", book_title)
            }
        };

        Ok((
            title,
            BookInstanceFormData {
                books,
                book_instance: entry.cloned(),
                selected_book_id,
                statuses: BookStatus::ALL,
            },
        ))
    }

    async fn insert(repo: &Repository, record: &Self) -> AppResult<()> {
        repo.store.instances_insert(record).await
    }

    async fn replace(repo: &Repository, record: &Self) -> AppResult<bool> {
        repo.store.instances_replace(record).await
    }

    async fn remove(repo: &Repository, id: Uuid) -> AppResult<bool> {
        repo.store.instances_delete(id).await
    }
}
