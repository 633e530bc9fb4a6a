//! Catalog service: the list, detail, create, update and guarded delete
//! flows shared by every [`Resource`]

use serde::Serialize;
use uuid::Uuid;

use super::resource::{FormMode, Resource};
use crate::{
    config::{CatalogConfig, NameMatch},
    error::{AppError, AppResult},
    models::BookStatus,
    repository::Repository,
    validation::{sanitize, FieldError},
    views::{Page, View},
};

/// Home page counts
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexCounts {
    pub num_books: i64,
    pub num_book_instances: i64,
    pub num_available_book_instances: i64,
    pub num_authors: i64,
    pub num_genres: i64,
}

/// Payload of the delete confirmation page
#[derive(Debug, Serialize)]
pub struct DeletePage<'a, R, D> {
    pub target: &'a R,
    pub dependents: &'a [D],
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    genre_name_match: NameMatch,
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

fn not_found<R: Resource>() -> AppError {
    AppError::NotFound(format!("{} not found", R::LABEL))
}

impl CatalogService {
    pub fn new(repository: Repository, config: &CatalogConfig) -> Self {
        Self {
            repository,
            genre_name_match: config.genre_name_match,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Home page with record counts
    pub async fn index(&self) -> AppResult<View> {
        let store = &self.repository.store;
        let (
            num_books,
            num_book_instances,
            num_available_book_instances,
            num_authors,
            num_genres,
        ) = tokio::try_join!(
            store.books_count(),
            store.instances_count(None),
            store.instances_count(Some(BookStatus::Available)),
            store.authors_count(),
            store.genres_count(),
        )?;

        View::render(
            "index",
            "Local Library Home",
            &IndexCounts {
                num_books,
                num_book_instances,
                num_available_book_instances,
                num_authors,
                num_genres,
            },
        )
    }

    pub async fn list<R: Resource>(&self) -> AppResult<View> {
        let entries = R::list(&self.repository).await?;
        View::render(format!("{}List", R::VIEW), R::LIST_TITLE, &entries)
    }

    /// Detail page; unknown or malformed ids are not found
    pub async fn detail<R: Resource>(&self, raw_id: &str) -> AppResult<View> {
        let id = parse_id(raw_id).ok_or_else(not_found::<R>)?;
        let (title, detail) = R::detail(&self.repository, id)
            .await?
            .ok_or_else(not_found::<R>)?;
        View::render(format!("{}Detail", R::VIEW), title, &detail)
    }

    pub async fn create_form<R: Resource>(&self) -> AppResult<View> {
        self.form_view::<R>(FormMode::Create, None, Vec::new()).await
    }

    pub async fn create<R: Resource>(&self, mut form: R::Form) -> AppResult<Page> {
        let errors = sanitize(&mut form);
        if !errors.is_empty() {
            tracing::debug!("{} form rejected: {} error(s)", R::LABEL, errors.len());
            return Ok(self
                .form_view::<R>(FormMode::Create, Some(&form), errors)
                .await?
                .into());
        }

        let record = R::from_form(&form, Uuid::new_v4());
        if let Some(existing) =
            R::find_duplicate(&self.repository, &record, self.genre_name_match).await?
        {
            tracing::info!("{} already exists as {}", R::LABEL, existing.id());
            return Ok(Page::redirect(existing.url()));
        }

        R::insert(&self.repository, &record).await?;
        tracing::info!("Created {} {}", R::LABEL, record.id());
        Ok(Page::redirect(record.url()))
    }

    pub async fn update_form<R: Resource>(&self, raw_id: &str) -> AppResult<View> {
        let id = parse_id(raw_id).ok_or_else(not_found::<R>)?;
        let record = R::find(&self.repository, id)
            .await?
            .ok_or_else(not_found::<R>)?;
        let form = record.to_form();
        self.form_view::<R>(FormMode::Update, Some(&form), Vec::new())
            .await
    }

    /// Replace the editable fields of an existing record, keeping its id
    pub async fn update<R: Resource>(&self, raw_id: &str, mut form: R::Form) -> AppResult<Page> {
        let id = parse_id(raw_id).ok_or_else(not_found::<R>)?;
        let errors = sanitize(&mut form);
        if !errors.is_empty() {
            tracing::debug!("{} form rejected: {} error(s)", R::LABEL, errors.len());
            return Ok(self
                .form_view::<R>(FormMode::Update, Some(&form), errors)
                .await?
                .into());
        }

        let record = R::from_form(&form, id);
        if let Some(existing) =
            R::find_duplicate(&self.repository, &record, self.genre_name_match).await?
        {
            if existing.id() != id {
                tracing::info!("{} already exists as {}", R::LABEL, existing.id());
                return Ok(Page::redirect(existing.url()));
            }
        }

        if !R::replace(&self.repository, &record).await? {
            return Err(not_found::<R>());
        }
        tracing::info!("Updated {} {}", R::LABEL, id);
        Ok(Page::redirect(record.url()))
    }

    /// Confirmation page listing what blocks the delete
    pub async fn delete_form<R: Resource>(&self, raw_id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(raw_id) else {
            return Ok(Page::redirect(R::list_url()));
        };
        let (target, dependents) = tokio::try_join!(
            R::find(&self.repository, id),
            R::dependents(&self.repository, id),
        )?;
        let Some(target) = target else {
            return Ok(Page::redirect(R::list_url()));
        };
        Ok(Self::delete_view(&target, &dependents)?.into())
    }

    /// Delete unless dependents exist, in which case the confirmation page
    /// is shown again
    pub async fn delete<R: Resource>(&self, raw_id: &str) -> AppResult<Page> {
        let Some(id) = parse_id(raw_id) else {
            return Ok(Page::redirect(R::list_url()));
        };
        let (target, dependents) = tokio::try_join!(
            R::find(&self.repository, id),
            R::dependents(&self.repository, id),
        )?;
        let Some(target) = target else {
            return Ok(Page::redirect(R::list_url()));
        };

        if !dependents.is_empty() {
            tracing::info!(
                "Not deleting {} {}: {} dependent record(s)",
                R::LABEL,
                id,
                dependents.len()
            );
            return Ok(Self::delete_view(&target, &dependents)?.into());
        }

        R::remove(&self.repository, id).await?;
        tracing::info!("Deleted {} {}", R::LABEL, id);
        Ok(Page::redirect(R::list_url()))
    }

    async fn form_view<R: Resource>(
        &self,
        mode: FormMode,
        entry: Option<&R::Form>,
        errors: Vec<FieldError>,
    ) -> AppResult<View> {
        let (title, data) = R::form_page(&self.repository, mode, entry).await?;
        Ok(View::render(format!("{}Form", R::VIEW), title, &data)?.with_errors(errors))
    }

    fn delete_view<R: Resource>(target: &R, dependents: &[R::Dependent]) -> AppResult<View> {
        View::render(
            format!("{}Delete", R::VIEW),
            R::DELETE_TITLE,
            &DeletePage { target, dependents },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        models::{Author, AuthorForm, Book, BookInstance, Genre, GenreForm},
        repository::MockCatalogStore,
    };

    fn service() -> CatalogService {
        CatalogService::new(Repository::in_memory(), &CatalogConfig::default())
    }

    fn author_form(first: &str, family: &str) -> AuthorForm {
        AuthorForm {
            first_name: first.to_string(),
            family_name: family.to_string(),
            ..Default::default()
        }
    }

    fn redirect_target(page: Page) -> String {
        match page {
            Page::Redirect(location) => location,
            Page::Render(view) => panic!("expected redirect, got view {}", view.view),
        }
    }

    fn rendered(page: Page) -> View {
        match page {
            Page::Render(view) => view,
            Page::Redirect(location) => panic!("expected view, got redirect to {}", location),
        }
    }

    fn id_from(location: &str) -> Uuid {
        Uuid::parse_str(location.rsplit('/').next().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_fetch_author() {
        let service = service();
        let location = redirect_target(
            service
                .create::<Author>(author_form("Ada", "Lovelace"))
                .await
                .unwrap(),
        );
        assert!(location.starts_with("/catalog/author/"));

        let stored = service
            .repository
            .store
            .authors_get(id_from(&location))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.first_name, "Ada");
        assert_eq!(stored.family_name, "Lovelace");
    }

    #[tokio::test]
    async fn test_invalid_create_rerenders_without_persisting() {
        let service = service();
        let view = rendered(
            service
                .create::<Author>(author_form("", "Lovelace"))
                .await
                .unwrap(),
        );
        assert_eq!(view.view, "authorForm");
        assert_eq!(view.data["family_name"], "Lovelace");
        assert!(!view.error.unwrap().is_empty());
        assert_eq!(service.repository.store.authors_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_genre_redirects_to_existing() {
        let service = service();
        let form = GenreForm {
            name: "Fantasy".to_string(),
        };
        let first = redirect_target(service.create::<Genre>(form.clone()).await.unwrap());
        let second = redirect_target(service.create::<Genre>(form).await.unwrap());
        assert_eq!(first, second);
        assert_eq!(service.repository.store.genres_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_case_insensitive_policy() {
        let config = CatalogConfig {
            genre_name_match: NameMatch::CaseInsensitive,
        };
        let service = CatalogService::new(Repository::in_memory(), &config);
        for name in ["Fantasy", "FANTASY"] {
            service
                .create::<Genre>(GenreForm {
                    name: name.to_string(),
                })
                .await
                .unwrap();
        }
        assert_eq!(service.repository.store.genres_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_genre_rename_onto_other_genre_redirects() {
        let service = service();
        let fantasy = redirect_target(
            service
                .create::<Genre>(GenreForm { name: "Fantasy".to_string() })
                .await
                .unwrap(),
        );
        let poetry = redirect_target(
            service
                .create::<Genre>(GenreForm { name: "Poetry".to_string() })
                .await
                .unwrap(),
        );

        let raw_id = id_from(&poetry).to_string();
        let page = service
            .update::<Genre>(&raw_id, GenreForm { name: "Fantasy".to_string() })
            .await
            .unwrap();
        assert_eq!(redirect_target(page), fantasy);
        let poetry_now = service
            .repository
            .store
            .genres_get(id_from(&poetry))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(poetry_now.name, "Poetry");

        // resubmitting its own name is a plain update
        let page = service
            .update::<Genre>(&raw_id, GenreForm { name: "Poetry".to_string() })
            .await
            .unwrap();
        assert_eq!(redirect_target(page), poetry);
    }

    #[tokio::test]
    async fn test_author_delete_guarded_by_books() {
        let service = service();
        let store = service.repository.store.clone();
        let location = redirect_target(
            service
                .create::<Author>(author_form("Patrick", "Rothfuss"))
                .await
                .unwrap(),
        );
        let author_id = id_from(&location);
        let book = Book {
            id: Uuid::new_v4(),
            title: "The Name of the Wind".to_string(),
            author_id,
            summary: "Kvothe".to_string(),
            isbn: "9780756404079".to_string(),
            genre_ids: vec![],
        };
        store.books_insert(&book).await.unwrap();

        let view = rendered(service.delete::<Author>(&author_id.to_string()).await.unwrap());
        assert_eq!(view.view, "authorDelete");
        assert_eq!(view.data["dependents"][0]["title"], "The Name of the Wind");
        assert!(store.authors_get(author_id).await.unwrap().is_some());

        store.books_delete(book.id).await.unwrap();
        let page = service.delete::<Author>(&author_id.to_string()).await.unwrap();
        assert_eq!(redirect_target(page), "/catalog/authors");
        assert!(store.authors_get(author_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_instance_delete_is_unconditional() {
        let service = service();
        let store = service.repository.store.clone();
        let copy = BookInstance {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            imprint: "Gollancz, 2008".to_string(),
            status: BookStatus::Loaned,
            due_back: None,
        };
        store.instances_insert(&copy).await.unwrap();

        let page = service
            .delete::<BookInstance>(&copy.id.to_string())
            .await
            .unwrap();
        assert_eq!(redirect_target(page), "/catalog/bookinstances");
        assert_eq!(store.instances_count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_targets() {
        let service = service();
        let missing = Uuid::new_v4().to_string();

        let err = service.detail::<Author>(&missing).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Author not found"));
        let err = service.detail::<BookInstance>("not-an-id").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Book copy not found"));

        let page = service.delete_form::<Genre>(&missing).await.unwrap();
        assert_eq!(redirect_target(page), "/catalog/genres");

        let err = service
            .update::<Author>(&missing, author_form("Ada", "Lovelace"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failed_insert_surfaces_once() {
        let mut store = MockCatalogStore::new();
        store
            .expect_authors_insert()
            .times(1)
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        let service = CatalogService::new(
            Repository::new(Arc::new(store)),
            &CatalogConfig::default(),
        );

        let err = service
            .create::<Author>(author_form("Ada", "Lovelace"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn test_record_urls_match_routes() {
        let id = Uuid::new_v4();
        let genre = Genre {
            id,
            name: "Poetry".to_string(),
        };
        let book = Book {
            id,
            title: "Notes".to_string(),
            author_id: Uuid::new_v4(),
            summary: "Engine".to_string(),
            isbn: "1".to_string(),
            genre_ids: vec![],
        };
        let copy = BookInstance {
            id,
            book_id: book.id,
            imprint: "Imprint".to_string(),
            status: BookStatus::Available,
            due_back: None,
        };
        assert_eq!(Resource::url(&genre), genre.url());
        assert_eq!(Resource::url(&book), book.url());
        assert_eq!(Resource::url(&copy), copy.url());
        assert_eq!(copy.url(), format!("/catalog/bookinstance/{}", id));
    }

    #[tokio::test]
    async fn test_index_counts() {
        let service = service();
        let store = service.repository.store.clone();
        for status in [BookStatus::Available, BookStatus::Loaned, BookStatus::Available] {
            store
                .instances_insert(&BookInstance {
                    id: Uuid::new_v4(),
                    book_id: Uuid::new_v4(),
                    imprint: "Imprint".to_string(),
                    status,
                    due_back: None,
                })
                .await
                .unwrap();
        }

        let view = service.index().await.unwrap();
        assert_eq!(view.view, "index");
        assert_eq!(view.data["numBookInstances"], 3);
        assert_eq!(view.data["numAvailableBookInstances"], 2);
        assert_eq!(view.data["numAuthors"], 0);
    }
}
