use std::sync::Arc;

use entity::employees;
use platform_api::{ApiError, ApiResult};
use platform_db::{EmployeeStore, StoreError};
use serde_json::Value;
use tracing::info;

use crate::request::{NewEmployee, changes_from_json};

/// CRUD over employee records. Holds no state besides the injected store.
#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> ApiResult<Vec<employees::Model>> {
        self.store.list().await.map_err(ApiError::internal)
    }

    pub async fn create(&self, body: &Value) -> ApiResult<employees::Model> {
        let new = NewEmployee::from_json(body)?;
        if self
            .store
            .get(new.id)
            .await
            .map_err(ApiError::internal)?
            .is_some()
        {
            return Err(ApiError::DuplicateId);
        }

        let created = self
            .store
            .insert(new.into())
            .await
            .map_err(|err| match err {
                // lost a race with a concurrent create of the same id
                StoreError::ConstraintViolation(_) => ApiError::DuplicateId,
                other => ApiError::internal(other),
            })?;
        info!(employee_id = created.id, "employee created");
        Ok(created)
    }

    /// The record must exist before the body is looked at.
    pub async fn update(&self, id: i64, body: Option<&Value>) -> ApiResult<employees::Model> {
        let key = stored_key(id)?;
        if self
            .store
            .get(key)
            .await
            .map_err(ApiError::internal)?
            .is_none()
        {
            return Err(ApiError::NotFound(id));
        }

        let changes = match body {
            Some(body) => changes_from_json(body)?,
            None => {
                return Err(ApiError::InvalidBody(
                    "Request body must be a JSON object".into(),
                ));
            }
        };
        let updated = self
            .store
            .update(key, changes)
            .await
            .map_err(|err| not_found_or_internal(id, err))?;
        info!(employee_id = id, "employee updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let key = stored_key(id)?;
        self.store
            .delete(key)
            .await
            .map_err(|err| not_found_or_internal(id, err))?;
        info!(employee_id = id, "employee deleted");
        Ok(())
    }
}

/// Ids outside the column's range cannot name a stored record.
fn stored_key(id: i64) -> ApiResult<i32> {
    i32::try_from(id).map_err(|_| ApiError::NotFound(id))
}

fn not_found_or_internal(id: i64, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(_) => ApiError::NotFound(id),
        other => ApiError::internal(other),
    }
}
