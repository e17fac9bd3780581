use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use models::student::Student;
use service::errors::ServiceError;
use tracing::{info, warn};

use crate::errors::JsonApiError;
use crate::routes::AppState;
use crate::views::{EditQuery, IndexView, SearchForm, SearchView, StudentForm, StudentFormView};

/// `/edit/{id}` carrying the validation message in the query string.
fn edit_location(id: i32, error: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("error", error)
        .finish();
    format!("/edit/{id}?{query}")
}

#[utoipa::path(get, path = "/", tag = "students", responses((status = 200, description = "All students", body = crate::openapi::IndexViewDoc)))]
pub async fn index(State(state): State<AppState>) -> Result<Json<IndexView>, JsonApiError> {
    let students = state.students.list_all().await?;
    info!(count = students.len(), "list students");
    Ok(Json(IndexView { students }))
}

#[utoipa::path(
    post, path = "/searchByName", tag = "students",
    request_body(content = crate::openapi::SearchFormDoc, content_type = "application/x-www-form-urlencoded"),
    responses((status = 200, description = "Students whose name contains the fragment", body = crate::openapi::SearchViewDoc))
)]
pub async fn search(State(state): State<AppState>, Form(form): Form<SearchForm>) -> Result<Json<SearchView>, JsonApiError> {
    let students = state.students.search_by_name(&form.name).await?;
    info!(query = %form.name, count = students.len(), "search students");
    Ok(Json(SearchView { query: form.name, students }))
}

#[utoipa::path(get, path = "/addStudent", tag = "students", responses((status = 200, description = "Empty create form", body = crate::openapi::StudentFormViewDoc)))]
pub async fn add_form() -> Json<StudentFormView> {
    Json(StudentFormView { student: Student::blank(), error_message: None })
}

/// Valid: redirect to the list. Invalid: re-display the form with the message.
#[utoipa::path(
    post, path = "/save", tag = "students",
    request_body(content = crate::openapi::StudentFormDoc, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Saved, redirect to /"),
        (status = 422, description = "Validation failed", body = crate::openapi::StudentFormViewDoc),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn save(State(state): State<AppState>, Form(form): Form<StudentForm>) -> Result<Response, JsonApiError> {
    let student = Student::from(form);
    match state.students.create(student.clone()).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(ServiceError::Validation(msg)) => {
            let view = StudentFormView { student, error_message: Some(msg) };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(view)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Valid: redirect to the list. Invalid: redirect back to the edit form with the message.
#[utoipa::path(
    post, path = "/saveEdit", tag = "students",
    request_body(content = crate::openapi::StudentFormDoc, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Saved, or redirect back to /edit/{id} with an error"),
        (status = 400, description = "Missing id"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn save_edit(State(state): State<AppState>, Form(form): Form<StudentForm>) -> Result<Redirect, JsonApiError> {
    let Some(id) = form.id else {
        return Err(JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(service::student::service::ID_REQUIRED.into())));
    };
    match state.students.update(Student::from(form)).await {
        Ok(_) => Ok(Redirect::to("/")),
        Err(ServiceError::Validation(msg)) => {
            warn!(id, reason = %msg, "edit rejected");
            Ok(Redirect::to(&edit_location(id, &msg)))
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get, path = "/edit/{id}", tag = "students",
    params(("id" = i32, Path, description = "Student ID"), EditQuery),
    responses(
        (status = 200, description = "Edit form", body = crate::openapi::StudentFormViewDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(q): Query<EditQuery>,
) -> Result<Json<StudentFormView>, JsonApiError> {
    let student = state.students.get(id).await?;
    Ok(Json(StudentFormView { student, error_message: q.error }))
}

#[utoipa::path(
    get, path = "/delete/{id}", tag = "students",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 303, description = "Deleted, redirect to /"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Redirect, JsonApiError> {
    state.students.delete(id).await?;
    info!(id, "deleted student");
    Ok(Redirect::to("/"))
}
