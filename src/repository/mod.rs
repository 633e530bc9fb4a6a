//! Repository layer for catalog storage
//!
//! [`CatalogStore`] is the document-style collection interface implemented
//! by each backend. [`Repository`] wraps a store and adds the populate step
//! that resolves stored identifiers into the referenced records.

pub mod memory;
pub mod postgres;

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use indexmap::IndexSet;
use uuid::Uuid;

use crate::{
    config::NameMatch,
    error::AppResult,
    models::{
        Author, Book, BookInstance, BookListing, BookStatus, BookSummary, Genre, PopulatedBook,
        PopulatedInstance,
    },
};

/// One collection per entity; references are plain identifiers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Check that the backend answers
    async fn ping(&self) -> AppResult<()>;

    /// All authors ordered by family name
    async fn authors_list(&self) -> AppResult<Vec<Author>>;
    async fn authors_get(&self, id: Uuid) -> AppResult<Option<Author>>;
    async fn authors_get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Author>>;
    async fn authors_insert(&self, author: &Author) -> AppResult<()>;
    /// Replace the editable fields; false when the id is unknown
    async fn authors_replace(&self, author: &Author) -> AppResult<bool>;
    async fn authors_delete(&self, id: Uuid) -> AppResult<bool>;
    async fn authors_count(&self) -> AppResult<i64>;

    /// All genres ordered by name
    async fn genres_list(&self) -> AppResult<Vec<Genre>>;
    async fn genres_get(&self, id: Uuid) -> AppResult<Option<Genre>>;
    async fn genres_get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Genre>>;
    async fn genres_find_by_name(&self, name: &str, matching: NameMatch) -> AppResult<Option<Genre>>;
    async fn genres_insert(&self, genre: &Genre) -> AppResult<()>;
    async fn genres_replace(&self, genre: &Genre) -> AppResult<bool>;
    async fn genres_delete(&self, id: Uuid) -> AppResult<bool>;
    async fn genres_count(&self) -> AppResult<i64>;

    /// All books ordered by title
    async fn books_list(&self) -> AppResult<Vec<Book>>;
    async fn books_get(&self, id: Uuid) -> AppResult<Option<Book>>;
    async fn books_get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Book>>;
    async fn books_by_author(&self, author_id: Uuid) -> AppResult<Vec<BookSummary>>;
    async fn books_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<BookSummary>>;
    async fn books_insert(&self, book: &Book) -> AppResult<()>;
    async fn books_replace(&self, book: &Book) -> AppResult<bool>;
    async fn books_delete(&self, id: Uuid) -> AppResult<bool>;
    async fn books_count(&self) -> AppResult<i64>;

    /// All copies in insertion order
    async fn instances_list(&self) -> AppResult<Vec<BookInstance>>;
    async fn instances_get(&self, id: Uuid) -> AppResult<Option<BookInstance>>;
    async fn instances_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>>;
    async fn instances_insert(&self, instance: &BookInstance) -> AppResult<()>;
    async fn instances_replace(&self, instance: &BookInstance) -> AppResult<bool>;
    async fn instances_delete(&self, id: Uuid) -> AppResult<bool>;
    /// Count copies, optionally only those with `status`
    async fn instances_count(&self, status: Option<BookStatus>) -> AppResult<i64>;
}

/// Main repository struct holding the catalog store
#[derive(Clone)]
pub struct Repository {
    pub store: Arc<dyn CatalogStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Repository backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(memory::MemoryStore::new()))
    }

    /// Books ordered by title, each with its author
    pub async fn books_with_authors(&self) -> AppResult<Vec<BookListing>> {
        let books = self.store.books_list().await?;
        let author_ids = distinct(books.iter().map(|b| b.author_id));
        let authors: HashMap<Uuid, Author> = self
            .store
            .authors_get_many(&author_ids)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        Ok(books
            .into_iter()
            .map(|book| BookListing {
                author: authors.get(&book.author_id).cloned(),
                id: book.id,
                title: book.title,
            })
            .collect())
    }

    /// A book with its author and genres, or `None` if the book is unknown
    pub async fn book_populated(&self, id: Uuid) -> AppResult<Option<PopulatedBook>> {
        let Some(book) = self.store.books_get(id).await? else {
            return Ok(None);
        };

        let (author, mut genres) = tokio::try_join!(
            self.store.authors_get(book.author_id),
            self.store.genres_get_many(&book.genre_ids),
        )?;
        genres.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Some(PopulatedBook {
            id: book.id,
            title: book.title,
            summary: book.summary,
            isbn: book.isbn,
            author,
            genres,
        }))
    }

    /// All copies, each with its book
    pub async fn instances_with_books(&self) -> AppResult<Vec<PopulatedInstance>> {
        let instances = self.store.instances_list().await?;
        let book_ids = distinct(instances.iter().map(|i| i.book_id));
        let books: HashMap<Uuid, BookSummary> = self
            .store
            .books_get_many(&book_ids)
            .await?
            .iter()
            .map(|b| (b.id, BookSummary::from(b)))
            .collect();

        Ok(instances
            .into_iter()
            .map(|instance| {
                let book = books.get(&instance.book_id).cloned();
                PopulatedInstance::new(instance, book)
            })
            .collect())
    }

    /// A copy with its book, or `None` if the copy is unknown
    pub async fn instance_populated(&self, id: Uuid) -> AppResult<Option<PopulatedInstance>> {
        let Some(instance) = self.store.instances_get(id).await? else {
            return Ok(None);
        };
        let book = self
            .store
            .books_get(instance.book_id)
            .await?
            .map(|b| BookSummary::from(&b));
        Ok(Some(PopulatedInstance::new(instance, book)))
    }
}

/// Unique ids in first-seen order
fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    ids.collect::<IndexSet<Uuid>>().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn author(family: &str) -> Author {
        Author {
            id: Uuid::new_v4(),
            first_name: "First".to_string(),
            family_name: family.to_string(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    fn book(title: &str, author_id: Uuid, genre_ids: Vec<Uuid>) -> Book {
        Book {
            id: Uuid::new_v4(),
            title: title.to_string(),
            author_id,
            summary: "Summary".to_string(),
            isbn: "isbn".to_string(),
            genre_ids,
        }
    }

    #[tokio::test]
    async fn test_book_populated_resolves_author_and_genres() {
        let repo = Repository::in_memory();
        let rothfuss = author("Rothfuss");
        let fantasy = Genre { id: Uuid::new_v4(), name: "Fantasy".to_string() };
        let adventure = Genre { id: Uuid::new_v4(), name: "Adventure".to_string() };
        repo.store.authors_insert(&rothfuss).await.unwrap();
        repo.store.genres_insert(&fantasy).await.unwrap();
        repo.store.genres_insert(&adventure).await.unwrap();
        let wind = book("Wind", rothfuss.id, vec![fantasy.id, adventure.id]);
        repo.store.books_insert(&wind).await.unwrap();

        let populated = repo.book_populated(wind.id).await.unwrap().unwrap();
        assert_eq!(populated.author, Some(rothfuss));
        let names: Vec<&str> = populated.genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Adventure", "Fantasy"]);

        assert!(repo.book_populated(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dangling_references_populate_as_none() {
        let repo = Repository::in_memory();
        let orphan = book("Orphan", Uuid::new_v4(), vec![]);
        repo.store.books_insert(&orphan).await.unwrap();
        let copy = BookInstance {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            imprint: "Nowhere, 1999".to_string(),
            status: BookStatus::Available,
            due_back: None,
        };
        repo.store.instances_insert(&copy).await.unwrap();

        let listing = repo.books_with_authors().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert!(listing[0].author.is_none());

        let copies = repo.instances_with_books().await.unwrap();
        assert!(copies[0].book.is_none());
        assert_eq!(copies[0].book_title(), "");
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_retried() {
        let mut store = MockCatalogStore::new();
        store
            .expect_books_get()
            .times(1)
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        let repo = Repository::new(Arc::new(store));

        let result = repo.book_populated(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(distinct([a, b, a].into_iter()), vec![a, b]);
    }
}
