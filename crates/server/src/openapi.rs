use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct StudentDoc {
    pub id: Option<i32>,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub address: Option<String>,
}

#[derive(ToSchema)]
pub struct StudentFormDoc {
    pub id: Option<i32>,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub address: Option<String>,
}

#[derive(ToSchema)]
pub struct SearchFormDoc { pub name: String }

#[derive(ToSchema)]
pub struct IndexViewDoc { pub students: Vec<StudentDoc> }

#[derive(ToSchema)]
pub struct SearchViewDoc { pub query: String, pub students: Vec<StudentDoc> }

#[derive(ToSchema)]
pub struct StudentFormViewDoc { pub student: StudentDoc, pub error_message: Option<String> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::students::index,
        crate::routes::students::search,
        crate::routes::students::add_form,
        crate::routes::students::save,
        crate::routes::students::save_edit,
        crate::routes::students::edit_form,
        crate::routes::students::delete,
    ),
    components(
        schemas(
            HealthResponse,
            StudentDoc,
            StudentFormDoc,
            SearchFormDoc,
            IndexViewDoc,
            SearchViewDoc,
            StudentFormViewDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "students")
    )
)]
pub struct ApiDoc;
