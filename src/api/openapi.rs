//! OpenAPI documentation
//!
//! Routes of the generic resource handlers cannot carry `#[utoipa::path]`,
//! so their operations are added to the document per resource.

use axum::Router;
use utoipa::{
    openapi::{
        path::{OperationBuilder, ParameterBuilder, ParameterIn, PathItemType},
        request_body::RequestBodyBuilder,
        schema::{ObjectBuilder, Schema, SchemaType},
        ContentBuilder, Ref, Required, ResponseBuilder,
    },
    OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    api::{catalog, health},
    models::{Author, Book, BookInstance, Genre},
    services::Resource,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Local Library API",
        version = "0.1.0",
        description = "Catalog of authors, genres, books and book copies"
    ),
    paths(
        health::health_check,
        health::readiness_check,
        catalog::index,
    ),
    components(
        schemas(
            crate::models::Author,
            crate::models::AuthorForm,
            crate::models::Genre,
            crate::models::GenreForm,
            crate::models::Book,
            crate::models::BookForm,
            crate::models::BookSummary,
            crate::models::BookListing,
            crate::models::PopulatedBook,
            crate::models::BookInstance,
            crate::models::BookInstanceForm,
            crate::models::BookStatus,
            crate::models::PopulatedInstance,
            crate::views::View,
            crate::validation::FieldError,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Catalog home page"),
        (name = "authors", description = "Author pages"),
        (name = "genres", description = "Genre pages"),
        (name = "books", description = "Book pages"),
        (name = "bookinstances", description = "Book copy pages")
    )
)]
pub struct ApiDoc;

/// Full document: annotated handlers plus every resource's routes
pub fn openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    add_resource_paths::<Author>(&mut doc, "AuthorForm");
    add_resource_paths::<Genre>(&mut doc, "GenreForm");
    add_resource_paths::<Book>(&mut doc, "BookForm");
    add_resource_paths::<BookInstance>(&mut doc, "BookInstanceForm");
    doc
}

fn view_response(description: &str) -> utoipa::openapi::Response {
    ResponseBuilder::new()
        .description(description)
        .content(
            "application/json",
            ContentBuilder::new()
                .schema(Ref::from_schema_name("View"))
                .build(),
        )
        .build()
}

fn add_resource_paths<R: Resource>(doc: &mut utoipa::openapi::OpenApi, form_schema: &str) {
    let id_param = || {
        ParameterBuilder::new()
            .name("id")
            .parameter_in(ParameterIn::Path)
            .required(Required::True)
            .schema(Some(Schema::Object(
                ObjectBuilder::new().schema_type(SchemaType::String).build(),
            )))
            .build()
    };
    let form_body = || {
        RequestBodyBuilder::new()
            .content(
                "application/x-www-form-urlencoded",
                ContentBuilder::new()
                    .schema(Ref::from_schema_name(form_schema))
                    .build(),
            )
            .required(Some(Required::True))
            .build()
    };
    let operation = |id: String, summary: String| {
        OperationBuilder::new()
            .tag(R::PLURAL)
            .operation_id(Some(id))
            .summary(Some(summary))
    };
    let not_found = || {
        ResponseBuilder::new()
            .description(format!("{} not found", R::LABEL))
            .build()
    };
    let redirect = |to: &str| ResponseBuilder::new().description(to).build();

    let record = format!("/catalog/{}", R::SEGMENT);
    let mut add = |path: String, method: PathItemType, op: OperationBuilder| {
        doc.paths
            .paths
            .entry(path)
            .or_default()
            .operations
            .insert(method, op.build());
    };

    add(
        format!("/catalog/{}", R::PLURAL),
        PathItemType::Get,
        operation(format!("list_{}", R::PLURAL), R::LIST_TITLE.to_string())
            .response("200", view_response("List view")),
    );
    add(
        format!("{}/create", record),
        PathItemType::Get,
        operation(format!("create_{}_form", R::SEGMENT), format!("{} create form", R::LABEL))
            .response("200", view_response("Empty form view")),
    );
    add(
        format!("{}/create", record),
        PathItemType::Post,
        operation(format!("create_{}", R::SEGMENT), format!("Create {}", R::LABEL))
            .request_body(Some(form_body()))
            .response("200", view_response("Form view with validation errors"))
            .response("303", redirect("Redirect to the created or existing record")),
    );
    add(
        format!("{}/{{id}}", record),
        PathItemType::Get,
        operation(format!("get_{}", R::SEGMENT), format!("{} detail", R::LABEL))
            .parameter(id_param())
            .response("200", view_response("Detail view"))
            .response("404", not_found()),
    );
    add(
        format!("{}/{{id}}/update", record),
        PathItemType::Get,
        operation(format!("update_{}_form", R::SEGMENT), format!("{} update form", R::LABEL))
            .parameter(id_param())
            .response("200", view_response("Pre-populated form view"))
            .response("404", not_found()),
    );
    add(
        format!("{}/{{id}}/update", record),
        PathItemType::Post,
        operation(format!("update_{}", R::SEGMENT), format!("Update {}", R::LABEL))
            .parameter(id_param())
            .request_body(Some(form_body()))
            .response("200", view_response("Form view with validation errors"))
            .response("303", redirect("Redirect to the record"))
            .response("404", not_found()),
    );
    add(
        format!("{}/{{id}}/delete", record),
        PathItemType::Get,
        operation(format!("delete_{}_form", R::SEGMENT), R::DELETE_TITLE.to_string())
            .parameter(id_param())
            .response("200", view_response("Delete confirmation with dependents"))
            .response("303", redirect("Unknown record, redirect to the list")),
    );
    add(
        format!("{}/{{id}}/delete", record),
        PathItemType::Post,
        operation(format!("delete_{}", R::SEGMENT), format!("Delete {}", R::LABEL))
            .parameter(id_param())
            .response("200", view_response("Dependents block the delete"))
            .response("303", redirect("Deleted or unknown, redirect to the list")),
    );
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi()))
}
