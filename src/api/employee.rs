use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::model::{CreateEmployee, Employee, UpdateEmployee};
use crate::store::{self, StoreError};
use crate::validation;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    #[schema(example = true)]
    pub ok: bool,
}

/// Route ids arrive as raw text. Anything that is not a positive integer
/// is rejected before the store ever sees it.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

fn invalid_id() -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "message": "Invalid ID" }))
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({ "message": "Internal Server Error" }))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/employees",
    responses(
        (status = 200, description = "Every employee, newest first", body = Vec<Employee>),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Internal Server Error"
        }))
    ),
    tag = "Employee"
)]
pub async fn list_employees(pool: web::Data<SqlitePool>) -> impl Responder {
    match store::list_all(pool.get_ref()).await {
        Ok(employees) => HttpResponse::Ok().json(employees),
        Err(e) => {
            error!(error = %e, "Failed to list employees");
            internal_error()
        }
    }
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "errors": {
                "formErrors": [],
                "fieldErrors": { "name": ["Name must be at least 2 characters"] }
            }
        })),
        (status = 409, description = "Email already in use", body = Object, example = json!({
            "message": "Email already exists"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<SqlitePool>,
    body: web::Json<Value>,
) -> impl Responder {
    let data = match validation::validate_create(&body) {
        Ok(data) => data,
        Err(errors) => return HttpResponse::BadRequest().json(json!({ "errors": errors })),
    };

    match store::create(pool.get_ref(), &data).await {
        Ok(employee) => HttpResponse::Created().json(employee),
        Err(StoreError::Conflict) => {
            HttpResponse::Conflict().json(json!({ "message": "Email already exists" }))
        }
        Err(e) => {
            error!(error = %e, "Failed to create employee");
            internal_error()
        }
    }
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/employees/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 400, description = "Malformed id", body = Object, example = json!({
            "message": "Invalid ID"
        })),
        (status = 404, description = "No such employee", body = Object, example = json!({
            "message": "Not Found"
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> impl Responder {
    let raw = path.into_inner();
    let Some(id) = parse_id(&raw) else {
        return invalid_id();
    };

    match store::get_by_id(pool.get_ref(), id).await {
        Ok(employee) => HttpResponse::Ok().json(employee),
        Err(StoreError::NotFound) => {
            HttpResponse::NotFound().json(json!({ "message": "Not Found" }))
        }
        Err(e) => {
            error!(error = %e, id, "Failed to fetch employee");
            internal_error()
        }
    }
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/employees/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Malformed id or invalid patch"),
        (status = 409, description = "Email already in use", body = Object, example = json!({
            "message": "Email already exists"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> impl Responder {
    let raw = path.into_inner();
    let Some(id) = parse_id(&raw) else {
        return invalid_id();
    };

    let patch = match validation::validate_update(&body) {
        Ok(patch) => patch,
        Err(errors) => return HttpResponse::BadRequest().json(json!({ "errors": errors })),
    };

    match store::update(pool.get_ref(), id, &patch).await {
        Ok(employee) => HttpResponse::Ok().json(employee),
        Err(StoreError::Conflict) => {
            HttpResponse::Conflict().json(json!({ "message": "Email already exists" }))
        }
        // Updates of unknown ids report a plain failure; only GET answers 404.
        Err(StoreError::NotFound) => {
            warn!(id, "Update for unknown employee");
            internal_error()
        }
        Err(e) => {
            error!(error = %e, id, "Failed to update employee");
            internal_error()
        }
    }
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    params(
        ("id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee deleted", body = DeleteResponse),
        (status = 400, description = "Malformed id", body = Object, example = json!({
            "message": "Invalid ID"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> impl Responder {
    let raw = path.into_inner();
    let Some(id) = parse_id(&raw) else {
        return invalid_id();
    };

    match store::delete(pool.get_ref(), id).await {
        Ok(()) => HttpResponse::Ok().json(DeleteResponse { ok: true }),
        Err(StoreError::NotFound) => {
            warn!(id, "Delete for unknown employee");
            internal_error()
        }
        Err(e) => {
            error!(error = %e, id, "Failed to delete employee");
            internal_error()
        }
    }
}
