use crate::api::employee::DeleteResponse;
use crate::model::employee::{CreateEmployee, Employee, UpdateEmployee};
use crate::validation::ValidationErrors;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Employee Directory API",
        version = "1.0.0",
        description = r#"
## Employee Directory

A small REST service for keeping an employee roster.

### Key Features
- **List** every employee, newest first
- **Create** employees with validated name, email, and position
- **Fetch**, **update**, and **delete** a single employee by id

### Validation
Request bodies are checked rule by rule. A rejected body answers `400`
with an `errors` object listing every broken rule per field, so one
request is enough to see everything that needs fixing.

### Response Format
JSON-based RESTful responses. Duplicate emails answer `409`, unknown
ids answer `404` on reads.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            UpdateEmployee,
            ValidationErrors,
            DeleteResponse
        )
    ),
    tags(
        (name = "Employee", description = "Employee directory APIs"),
    )
)]
pub struct ApiDoc;
