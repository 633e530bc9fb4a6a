//! Rendered views and redirects
//!
//! A view is the JSON envelope `{view, title, data, error}` consumed by the
//! front end templates.

use axum::{
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, validation::FieldError};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct View {
    /// Symbolic view name, e.g. `authorList`
    pub view: String,
    pub title: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    /// Validation failures, null when there are none
    pub error: Option<Vec<FieldError>>,
}

impl View {
    pub fn render<T: Serialize>(view: impl Into<String>, title: impl Into<String>, data: &T) -> AppResult<Self> {
        Ok(Self {
            view: view.into(),
            title: title.into(),
            data: serde_json::to_value(data)?,
            error: None,
        })
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.error = if errors.is_empty() { None } else { Some(errors) };
        self
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Outcome of a page flow
#[derive(Debug)]
pub enum Page {
    Render(View),
    /// 303 to the given location
    Redirect(String),
}

impl Page {
    pub fn redirect(location: impl Into<String>) -> Self {
        Page::Redirect(location.into())
    }
}

impl From<View> for Page {
    fn from(view: View) -> Self {
        Page::Render(view)
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        match self {
            Page::Render(view) => view.into_response(),
            Page::Redirect(location) => Redirect::to(&location).into_response(),
        }
    }
}
