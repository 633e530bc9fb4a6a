//! Per-entity description consumed by the generic catalog flows

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::{
    config::NameMatch, error::AppResult, models::catalog_url, repository::Repository,
    validation::FormInput,
};

/// Whether a form page creates a new record or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update,
}

/// A catalog entity with list, detail, create, update and guarded delete.
///
/// Implementors supply the storage calls, the page payloads and, when
/// records depend on them, the dependents that block deletion.
#[async_trait]
pub trait Resource: Clone + Serialize + Send + Sync + Sized + 'static {
    /// Raw form input for create and update
    type Form: FormInput + Serialize + DeserializeOwned + Clone + Send + Sync + 'static;
    /// Entry of the list page
    type Listing: Serialize + Send + Sync;
    /// Payload of the detail page
    type Detail: Serialize + Send + Sync;
    /// Payload of the form page: entered values plus reference data
    type FormData: Serialize + Send + Sync;
    /// Record whose presence forbids deletion
    type Dependent: Serialize + Send + Sync;

    /// View name prefix, e.g. `bookInstance`
    const VIEW: &'static str;
    /// Path segment of a single record, e.g. `bookinstance`
    const SEGMENT: &'static str;
    /// Path segment of the list, e.g. `bookinstances`
    const PLURAL: &'static str;
    /// Name used in messages, e.g. `Book copy`
    const LABEL: &'static str;
    const LIST_TITLE: &'static str;
    const DELETE_TITLE: &'static str;

    fn id(&self) -> Uuid;

    /// Build a record from a form that passed validation
    fn from_form(form: &Self::Form, id: Uuid) -> Self;

    /// Pre-populate a form with the stored values
    fn to_form(&self) -> Self::Form;

    fn url(&self) -> String {
        catalog_url(Self::SEGMENT, self.id())
    }

    fn list_url() -> String {
        format!("/catalog/{}", Self::PLURAL)
    }

    async fn list(repo: &Repository) -> AppResult<Vec<Self::Listing>>;

    async fn find(repo: &Repository, id: Uuid) -> AppResult<Option<Self>>;

    /// Page title and payload, or `None` when the record is unknown
    async fn detail(repo: &Repository, id: Uuid) -> AppResult<Option<(String, Self::Detail)>>;

    /// Page title and payload of the create or update form
    async fn form_page(
        repo: &Repository,
        mode: FormMode,
        entry: Option<&Self::Form>,
    ) -> AppResult<(String, Self::FormData)>;

    async fn insert(repo: &Repository, record: &Self) -> AppResult<()>;

    /// False when the record no longer exists
    async fn replace(repo: &Repository, record: &Self) -> AppResult<bool>;

    async fn remove(repo: &Repository, id: Uuid) -> AppResult<bool>;

    async fn dependents(_repo: &Repository, _id: Uuid) -> AppResult<Vec<Self::Dependent>> {
        Ok(Vec::new())
    }

    /// An existing record that `record` would duplicate
    async fn find_duplicate(
        _repo: &Repository,
        _record: &Self,
        _matching: NameMatch,
    ) -> AppResult<Option<Self>> {
        Ok(None)
    }
}
