use async_trait::async_trait;
use entity::employees;
use sea_orm::{
    ActiveModelTrait, DbErr, EntityTrait, QueryOrder, Set, SqlErr, TransactionTrait,
};
use thiserror::Error;

use crate::DbPool;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("employee {0} not found")]
    NotFound(i32),
    #[error("{0}")]
    ConstraintViolation(String),
    #[error("{0}")]
    Connection(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                return Self::ConstraintViolation(msg);
            }
            _ => {}
        }
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::Connection(err.to_string()),
            other => Self::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Partial replacement of an employee's mutable columns. `None` keeps the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.department.is_none()
    }
}

/// Persistence for employee records.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<employees::Model>>;

    async fn get(&self, id: i32) -> StoreResult<Option<employees::Model>>;

    /// Insert a new record. A taken id surfaces as `ConstraintViolation`.
    async fn insert(&self, employee: employees::Model) -> StoreResult<employees::Model>;

    /// Returns the stored record after the update, or `NotFound`.
    async fn update(&self, id: i32, changes: EmployeeChanges) -> StoreResult<employees::Model>;

    async fn delete(&self, id: i32) -> StoreResult<()>;
}

/// `EmployeeStore` over a sea-orm connection pool.
#[derive(Clone, Debug)]
pub struct SeaOrmEmployeeStore {
    pool: DbPool,
}

impl SeaOrmEmployeeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for SeaOrmEmployeeStore {
    async fn list(&self) -> StoreResult<Vec<employees::Model>> {
        let rows = employees::Entity::find()
            .order_by_asc(employees::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> StoreResult<Option<employees::Model>> {
        let row = employees::Entity::find_by_id(id).one(&self.pool).await?;
        Ok(row)
    }

    async fn insert(&self, employee: employees::Model) -> StoreResult<employees::Model> {
        let active = employees::ActiveModel {
            id: Set(employee.id),
            name: Set(employee.name.clone()),
            role: Set(employee.role.clone()),
            department: Set(employee.department.clone()),
        };
        employees::Entity::insert(active)
            .exec_without_returning(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn update(&self, id: i32, changes: EmployeeChanges) -> StoreResult<employees::Model> {
        let txn = self.pool.begin().await?;
        let current = employees::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        if changes.is_empty() {
            return Ok(current);
        }

        let mut active: employees::ActiveModel = current.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }
        if let Some(department) = changes.department {
            active.department = Set(department);
        }
        let updated = active.update(&txn).await.map_err(|err| match err {
            DbErr::RecordNotUpdated => StoreError::NotFound(id),
            other => other.into(),
        })?;
        txn.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        let result = employees::Entity::delete_by_id(id).exec(&self.pool).await?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_changes() {
        assert!(EmployeeChanges::default().is_empty());
        let changes = EmployeeChanges {
            department: Some("Ops".into()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }

    #[test]
    fn connection_errors_are_classified() {
        let err = StoreError::from(DbErr::Conn(sea_orm::RuntimeErr::Internal(
            "connection refused".into(),
        )));
        assert!(matches!(err, StoreError::Connection(_)));

        let err = StoreError::from(DbErr::Custom("boom".into()));
        assert!(matches!(err, StoreError::Database(_)));
    }
}
