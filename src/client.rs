//! HTTP client and data-table state for the employee endpoints.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;

use crate::api::employee::DeleteResponse;
use crate::model::{CreateEmployee, Employee, UpdateEmployee};
use crate::validation::{self, ValidationErrors};

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The payload was rejected before it was ever sent
    #[error("Validation failed")]
    Validation(ValidationErrors),

    /// The server answered with a non-success status
    #[error("{}", .message.as_deref().unwrap_or("Request failed"))]
    Api {
        status: StatusCode,
        message: Option<String>,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Fills in an operation-specific message when the server body had none.
    fn with_fallback(self, fallback: &str) -> Self {
        match self {
            ClientError::Api {
                status,
                message: None,
            } => ClientError::Api {
                status,
                message: Some(fallback.to_string()),
            },
            other => other,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Typed HTTP client for the employee API
#[derive(Debug, Clone)]
pub struct EmployeeClient {
    client: Client,
    base_url: String,
}

impl EmployeeClient {
    /// Create a new client against a base url such as `http://127.0.0.1:8080`
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// All employees, newest first
    pub async fn list(&self) -> ClientResult<Vec<Employee>> {
        let response = self.client.get(self.url("employees")).send().await?;
        Self::handle(response).await
    }

    /// One employee by id
    pub async fn get(&self, id: i64) -> ClientResult<Employee> {
        let response = self
            .client
            .get(self.url(&format!("employees/{}", id)))
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Create an employee
    pub async fn create(&self, data: &CreateEmployee) -> ClientResult<Employee> {
        let response = self
            .client
            .post(self.url("employees"))
            .json(data)
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Apply a partial update to one employee
    pub async fn update(&self, id: i64, patch: &UpdateEmployee) -> ClientResult<Employee> {
        let response = self
            .client
            .put(self.url(&format!("employees/{}", id)))
            .json(patch)
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Delete an employee
    pub async fn delete(&self, id: i64) -> ClientResult<DeleteResponse> {
        let response = self
            .client
            .delete(self.url(&format!("employees/{}", id)))
            .send()
            .await?;
        Self::handle(response).await
    }

    /// Handle the HTTP response. Non-success statuses keep whatever
    /// `message` the server put in the body; callers fill in a fallback.
    async fn handle<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();

        if !status.is_success() {
            let message = response.json::<Value>().await.ok().and_then(|body| {
                body.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });
            return Err(ClientError::Api { status, message });
        }

        response.json().await.map_err(Into::into)
    }
}

/// Client-side roster view: a cached employee list, a name filter, and
/// mutations that validate locally and re-fetch the list after every
/// successful write.
pub struct EmployeeTable {
    client: EmployeeClient,
    employees: Vec<Employee>,
    query: String,
}

impl EmployeeTable {
    pub fn new(client: EmployeeClient) -> Self {
        Self {
            client,
            employees: Vec::new(),
            query: String::new(),
        }
    }

    /// Reload the cached list from the server.
    pub async fn refresh(&mut self) -> ClientResult<()> {
        self.employees = self.client.list().await?;
        Ok(())
    }

    /// The cached list, in server order (newest first).
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Case-insensitive substring filter on the employee name. A blank
    /// query keeps every row.
    pub fn filtered(&self) -> Vec<&Employee> {
        let q = self.query.trim().to_lowercase();
        if q.is_empty() {
            return self.employees.iter().collect();
        }
        self.employees
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&q))
            .collect()
    }

    /// Validate locally, create the employee, then re-fetch the list.
    pub async fn create(
        &mut self,
        name: &str,
        email: &str,
        position: &str,
    ) -> ClientResult<Employee> {
        let body = json!({ "name": name, "email": email, "position": position });
        let data = validation::validate_create(&body).map_err(ClientError::Validation)?;

        let employee = self
            .client
            .create(&data)
            .await
            .map_err(|e| e.with_fallback("Failed to create employee"))?;
        self.refresh().await?;
        Ok(employee)
    }

    /// Validate the patch locally, send it, then re-fetch the list.
    pub async fn update(&mut self, id: i64, patch: &UpdateEmployee) -> ClientResult<Employee> {
        let body = serde_json::to_value(patch)?;
        let patch = validation::validate_update(&body).map_err(ClientError::Validation)?;

        let employee = self
            .client
            .update(id, &patch)
            .await
            .map_err(|e| e.with_fallback("Failed to update employee"))?;
        self.refresh().await?;
        Ok(employee)
    }

    /// Delete the employee and re-fetch the list.
    pub async fn delete(&mut self, id: i64) -> ClientResult<()> {
        self.client
            .delete(id)
            .await
            .map_err(|e| e.with_fallback("Failed to delete employee"))?;
        self.refresh().await?;
        Ok(())
    }
}
