use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One employee record as stored and served.
///
/// JSON uses the camelCase field names of the public contract; the SQL
/// columns carry the snake_case Rust names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1,
        "name": "Jane Doe",
        "email": "jane@example.com",
        "position": "Software Engineer",
        "createdAt": "2026-01-15T09:30:00Z",
        "updatedAt": "2026-01-15T09:30:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Jane Doe")]
    pub name: String,

    #[schema(example = "jane@example.com")]
    pub email: String,

    #[schema(example = "Software Engineer")]
    pub position: String,

    #[schema(example = "2026-01-15T09:30:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(example = "2026-01-15T09:30:00Z", value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

/// Validated input for the create operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Jane Doe")]
    pub name: String,

    #[schema(example = "jane@example.com", format = "email")]
    pub email: String,

    #[schema(example = "Software Engineer")]
    pub position: String,
}

/// Validated input for the update operation. Absent fields keep their
/// stored values; at least one must be supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UpdateEmployee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(format = "email")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}
