//! Author pages

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::resource::{FormMode, Resource};
use crate::{
    error::AppResult,
    models::{Author, AuthorForm, BookSummary},
    repository::Repository,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDetail {
    pub author: Author,
    pub authors_books: Vec<BookSummary>,
}

#[async_trait]
impl Resource for Author {
    type Form = AuthorForm;
    type Listing = Author;
    type Detail = AuthorDetail;
    type FormData = Option<AuthorForm>;
    type Dependent = BookSummary;

    const VIEW: &'static str = "author";
    const SEGMENT: &'static str = "author";
    const PLURAL: &'static str = "authors";
    const LABEL: &'static str = "Author";
    const LIST_TITLE: &'static str = "Author List";
    const DELETE_TITLE: &'static str = "Delete Author";

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_form(form: &AuthorForm, id: Uuid) -> Self {
        form.to_record(id)
    }

    fn to_form(&self) -> AuthorForm {
        AuthorForm::from(self)
    }

    async fn list(repo: &Repository) -> AppResult<Vec<Author>> {
        repo.store.authors_list().await
    }

    async fn find(repo: &Repository, id: Uuid) -> AppResult<Option<Self>> {
        repo.store.authors_get(id).await
    }

    async fn detail(repo: &Repository, id: Uuid) -> AppResult<Option<(String, AuthorDetail)>> {
        let (author, authors_books) =
            tokio::try_join!(repo.store.authors_get(id), repo.store.books_by_author(id))?;
        Ok(author.map(|author| {
            (
                "Author Detail".to_string(),
                AuthorDetail {
                    author,
                    authors_books,
                },
            )
        }))
    }

    async fn form_page(
        _repo: &Repository,
        mode: FormMode,
        entry: Option<&AuthorForm>,
    ) -> AppResult<(String, Option<AuthorForm>)> {
        let title = match (mode, entry) {
            (FormMode::Update, Some(form)) => {
                format!("Update author: {}, {}", form.family_name, form.first_name)
            }
            (FormMode::Update, None) => "Update author".to_string(),
            (FormMode::Create, _) => "Create Author".to_string(),
        };
        Ok((title, entry.cloned()))
    }

    async fn insert(repo: &Repository, record: &Self) -> AppResult<()> {
        repo.store.authors_insert(record).await
    }

    async fn replace(repo: &Repository, record: &Self) -> AppResult<bool> {
        repo.store.authors_replace(record).await
    }

    async fn remove(repo: &Repository, id: Uuid) -> AppResult<bool> {
        repo.store.authors_delete(id).await
    }

    async fn dependents(repo: &Repository, id: Uuid) -> AppResult<Vec<BookSummary>> {
        repo.store.books_by_author(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Book, services::CatalogService, config::CatalogConfig};

    fn ada() -> Author {
        Author {
            id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            family_name: "Lovelace".to_string(),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1815, 12, 10),
            date_of_death: None,
        }
    }

    #[tokio::test]
    async fn test_detail_lists_authors_books() {
        let repo = Repository::in_memory();
        let author = ada();
        repo.store.authors_insert(&author).await.unwrap();
        repo.store
            .books_insert(&Book {
                id: Uuid::new_v4(),
                title: "Notes".to_string(),
                author_id: author.id,
                summary: "On the Analytical Engine".to_string(),
                isbn: "0000".to_string(),
                genre_ids: vec![],
            })
            .await
            .unwrap();

        let (title, detail) = Author::detail(&repo, author.id).await.unwrap().unwrap();
        assert_eq!(title, "Author Detail");
        assert_eq!(detail.author, author);
        assert_eq!(detail.authors_books.len(), 1);
        assert_eq!(detail.authors_books[0].title, "Notes");
    }

    #[tokio::test]
    async fn test_update_form_title_and_prefill() {
        let service = CatalogService::new(Repository::in_memory(), &CatalogConfig::default());
        let author = ada();
        service.repository().store.authors_insert(&author).await.unwrap();

        let view = service
            .update_form::<Author>(&author.id.to_string())
            .await
            .unwrap();
        assert_eq!(view.view, "authorForm");
        assert_eq!(view.title, "Update author: Lovelace, Ada");
        assert_eq!(view.data["date_of_birth"], "1815-12-10");
        assert!(view.error.is_none());
    }

    #[test]
    fn test_urls() {
        let author = ada();
        assert_eq!(Resource::url(&author), format!("/catalog/author/{}", author.id));
        assert_eq!(Resource::url(&author), author.url());
        assert_eq!(Author::list_url(), "/catalog/authors");
    }
}
