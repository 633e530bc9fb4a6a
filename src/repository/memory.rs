//! In-memory catalog store
//!
//! Collections keep insertion order, which is the order of unsorted lists.

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::CatalogStore;
use crate::{
    config::NameMatch,
    error::AppResult,
    models::{Author, Book, BookInstance, BookStatus, BookSummary, Genre},
};

#[derive(Default)]
struct Collections {
    authors: IndexMap<Uuid, Author>,
    genres: IndexMap<Uuid, Genre>,
    books: IndexMap<Uuid, Book>,
    instances: IndexMap<Uuid, BookInstance>,
}

#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn get_many<T: Clone>(map: &IndexMap<Uuid, T>, ids: &[Uuid]) -> Vec<T> {
    ids.iter().filter_map(|id| map.get(id).cloned()).collect()
}

fn replace<T: Clone>(map: &mut IndexMap<Uuid, T>, id: Uuid, record: &T) -> bool {
    match map.get_mut(&id) {
        Some(slot) => {
            *slot = record.clone();
            true
        }
        None => false,
    }
}

fn summaries<'a>(books: impl Iterator<Item = &'a Book>) -> Vec<BookSummary> {
    let mut out: Vec<BookSummary> = books.map(BookSummary::from).collect();
    out.sort_by(|a, b| a.title.cmp(&b.title));
    out
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn authors_list(&self) -> AppResult<Vec<Author>> {
        let data = self.data.read().await;
        let mut authors: Vec<Author> = data.authors.values().cloned().collect();
        authors.sort_by(|a, b| a.family_name.cmp(&b.family_name));
        Ok(authors)
    }

    async fn authors_get(&self, id: Uuid) -> AppResult<Option<Author>> {
        Ok(self.data.read().await.authors.get(&id).cloned())
    }

    async fn authors_get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Author>> {
        Ok(get_many(&self.data.read().await.authors, ids))
    }

    async fn authors_insert(&self, author: &Author) -> AppResult<()> {
        self.data.write().await.authors.insert(author.id, author.clone());
        Ok(())
    }

    async fn authors_replace(&self, author: &Author) -> AppResult<bool> {
        Ok(replace(&mut self.data.write().await.authors, author.id, author))
    }

    async fn authors_delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.data.write().await.authors.shift_remove(&id).is_some())
    }

    async fn authors_count(&self) -> AppResult<i64> {
        Ok(self.data.read().await.authors.len() as i64)
    }

    async fn genres_list(&self) -> AppResult<Vec<Genre>> {
        let data = self.data.read().await;
        let mut genres: Vec<Genre> = data.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn genres_get(&self, id: Uuid) -> AppResult<Option<Genre>> {
        Ok(self.data.read().await.genres.get(&id).cloned())
    }

    async fn genres_get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Genre>> {
        Ok(get_many(&self.data.read().await.genres, ids))
    }

    async fn genres_find_by_name(&self, name: &str, matching: NameMatch) -> AppResult<Option<Genre>> {
        let data = self.data.read().await;
        let found = match matching {
            NameMatch::Exact => data.genres.values().find(|g| g.name == name),
            NameMatch::CaseInsensitive => {
                let wanted = name.to_lowercase();
                data.genres.values().find(|g| g.name.to_lowercase() == wanted)
            }
        };
        Ok(found.cloned())
    }

    async fn genres_insert(&self, genre: &Genre) -> AppResult<()> {
        self.data.write().await.genres.insert(genre.id, genre.clone());
        Ok(())
    }

    async fn genres_replace(&self, genre: &Genre) -> AppResult<bool> {
        Ok(replace(&mut self.data.write().await.genres, genre.id, genre))
    }

    async fn genres_delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.data.write().await.genres.shift_remove(&id).is_some())
    }

    async fn genres_count(&self) -> AppResult<i64> {
        Ok(self.data.read().await.genres.len() as i64)
    }

    async fn books_list(&self) -> AppResult<Vec<Book>> {
        let data = self.data.read().await;
        let mut books: Vec<Book> = data.books.values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    async fn books_get(&self, id: Uuid) -> AppResult<Option<Book>> {
        Ok(self.data.read().await.books.get(&id).cloned())
    }

    async fn books_get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Book>> {
        Ok(get_many(&self.data.read().await.books, ids))
    }

    async fn books_by_author(&self, author_id: Uuid) -> AppResult<Vec<BookSummary>> {
        let data = self.data.read().await;
        Ok(summaries(data.books.values().filter(|b| b.author_id == author_id)))
    }

    async fn books_by_genre(&self, genre_id: Uuid) -> AppResult<Vec<BookSummary>> {
        let data = self.data.read().await;
        Ok(summaries(
            data.books.values().filter(|b| b.genre_ids.contains(&genre_id)),
        ))
    }

    async fn books_insert(&self, book: &Book) -> AppResult<()> {
        self.data.write().await.books.insert(book.id, book.clone());
        Ok(())
    }

    async fn books_replace(&self, book: &Book) -> AppResult<bool> {
        Ok(replace(&mut self.data.write().await.books, book.id, book))
    }

    async fn books_delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.data.write().await.books.shift_remove(&id).is_some())
    }

    async fn books_count(&self) -> AppResult<i64> {
        Ok(self.data.read().await.books.len() as i64)
    }

    async fn instances_list(&self) -> AppResult<Vec<BookInstance>> {
        Ok(self.data.read().await.instances.values().cloned().collect())
    }

    async fn instances_get(&self, id: Uuid) -> AppResult<Option<BookInstance>> {
        Ok(self.data.read().await.instances.get(&id).cloned())
    }

    async fn instances_by_book(&self, book_id: Uuid) -> AppResult<Vec<BookInstance>> {
        let data = self.data.read().await;
        Ok(data
            .instances
            .values()
            .filter(|i| i.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn instances_insert(&self, instance: &BookInstance) -> AppResult<()> {
        self.data
            .write()
            .await
            .instances
            .insert(instance.id, instance.clone());
        Ok(())
    }

    async fn instances_replace(&self, instance: &BookInstance) -> AppResult<bool> {
        Ok(replace(
            &mut self.data.write().await.instances,
            instance.id,
            instance,
        ))
    }

    async fn instances_delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.data.write().await.instances.shift_remove(&id).is_some())
    }

    async fn instances_count(&self, status: Option<BookStatus>) -> AppResult<i64> {
        let data = self.data.read().await;
        let count = match status {
            Some(status) => data.instances.values().filter(|i| i.status == status).count(),
            None => data.instances.len(),
        };
        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    fn genre(name: &str) -> Genre {
        Genre {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_genres_sorted_by_name() {
        let store = MemoryStore::new();
        for name in ["Poetry", "Fantasy", "Horror"] {
            assert_ok!(store.genres_insert(&genre(name)).await);
        }
        let names: Vec<String> = store
            .genres_list()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["Fantasy", "Horror", "Poetry"]);
    }

    #[tokio::test]
    async fn test_find_by_name_policies() {
        let store = MemoryStore::new();
        let fantasy = genre("Fantasy");
        assert_ok!(store.genres_insert(&fantasy).await);

        let exact = store.genres_find_by_name("fantasy", NameMatch::Exact).await.unwrap();
        assert!(exact.is_none());
        let loose = store
            .genres_find_by_name("fantasy", NameMatch::CaseInsensitive)
            .await
            .unwrap();
        assert_eq!(loose, Some(fantasy.clone()));
        let same = store.genres_find_by_name("Fantasy", NameMatch::Exact).await.unwrap();
        assert_eq!(same, Some(fantasy));
    }

    #[tokio::test]
    async fn test_replace_and_delete_unknown_ids() {
        let store = MemoryStore::new();
        let missing = genre("Missing");
        assert!(!store.genres_replace(&missing).await.unwrap());
        assert!(!store.genres_delete(missing.id).await.unwrap());
        assert_eq!(store.genres_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_instances_keep_insertion_order_and_count_by_status() {
        let store = MemoryStore::new();
        let book_id = Uuid::new_v4();
        let mut ids = Vec::new();
        for (imprint, status) in [
            ("Zeta Press", BookStatus::Available),
            ("Alpha Press", BookStatus::Loaned),
            ("Mid Press", BookStatus::Available),
        ] {
            let instance = BookInstance {
                id: Uuid::new_v4(),
                book_id,
                imprint: imprint.to_string(),
                status,
                due_back: None,
            };
            ids.push(instance.id);
            assert_ok!(store.instances_insert(&instance).await);
        }

        assert_ok!(store.instances_delete(ids[1]).await);
        let listed: Vec<Uuid> = store
            .instances_list()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(listed, vec![ids[0], ids[2]]);
        assert_eq!(store.instances_count(None).await.unwrap(), 2);
        assert_eq!(
            store.instances_count(Some(BookStatus::Available)).await.unwrap(),
            2
        );
        assert_eq!(store.instances_by_book(book_id).await.unwrap().len(), 2);
    }
}
