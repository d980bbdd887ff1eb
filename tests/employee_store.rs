use anyhow::Result;
use entity::employees;
use migration::{Migrator, MigratorTrait};
use platform_db::{
    DatabaseSettings, DbPool, EmployeeChanges, EmployeeStore, SeaOrmEmployeeStore, StoreError,
    connect,
};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

async fn migrated_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::new("sqlite::memory:")
        .with_max_connections(1)
        .with_min_connections(1);
    let pool = connect(&settings).await?;
    Migrator::up(&pool, None).await?;
    Ok(pool)
}

fn employee(id: i32, name: &str, role: &str, department: &str) -> employees::Model {
    employees::Model {
        id,
        name: name.into(),
        role: role.into(),
        department: department.into(),
    }
}

#[tokio::test]
async fn insert_then_list_in_id_order() -> Result<()> {
    let store = SeaOrmEmployeeStore::new(migrated_pool().await?);
    store.insert(employee(20, "Zoe", "Designer", "Product")).await?;
    store.insert(employee(3, "Ann", "Engineer", "R&D")).await?;

    let listed = store.list().await?;
    assert_eq!(
        listed,
        vec![
            employee(3, "Ann", "Engineer", "R&D"),
            employee(20, "Zoe", "Designer", "Product"),
        ]
    );
    assert_eq!(store.get(3).await?, Some(employee(3, "Ann", "Engineer", "R&D")));
    assert_eq!(store.get(4).await?, None);
    Ok(())
}

#[tokio::test]
async fn duplicate_insert_fails_and_keeps_first_row() -> Result<()> {
    let store = SeaOrmEmployeeStore::new(migrated_pool().await?);
    store.insert(employee(1, "Ann", "Engineer", "R&D")).await?;
    let err = store
        .insert(employee(1, "Impostor", "None", "None"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ConstraintViolation(_)));
    assert_eq!(store.get(1).await?.map(|e| e.name), Some("Ann".into()));
    Ok(())
}

#[tokio::test]
async fn update_replaces_only_given_columns() -> Result<()> {
    let store = SeaOrmEmployeeStore::new(migrated_pool().await?);
    store.insert(employee(5, "Ben", "Analyst", "Finance")).await?;

    let updated = store
        .update(
            5,
            EmployeeChanges {
                role: Some("Manager".into()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated, employee(5, "Ben", "Manager", "Finance"));
    assert_eq!(store.get(5).await?, Some(updated));

    let unchanged = store.update(5, EmployeeChanges::default()).await?;
    assert_eq!(unchanged, employee(5, "Ben", "Manager", "Finance"));
    Ok(())
}

#[tokio::test]
async fn update_and_delete_report_missing_rows() -> Result<()> {
    let store = SeaOrmEmployeeStore::new(migrated_pool().await?);
    let err = store
        .update(
            9999,
            EmployeeChanges {
                name: Some("Ghost".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(9999)));
    assert!(store.list().await?.is_empty());

    let err = store.delete(9999).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(9999)));
    Ok(())
}

#[tokio::test]
async fn delete_removes_the_row() -> Result<()> {
    let store = SeaOrmEmployeeStore::new(migrated_pool().await?);
    store.insert(employee(7, "Cy", "Support", "Ops")).await?;
    store.delete(7).await?;
    assert_eq!(store.get(7).await?, None);
    assert!(matches!(store.delete(7).await, Err(StoreError::NotFound(7))));
    Ok(())
}

#[tokio::test]
async fn missing_table_surfaces_as_database_error() -> Result<()> {
    let pool = migrated_pool().await?;
    pool.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "DROP TABLE employees".to_string(),
    ))
    .await?;
    let store = SeaOrmEmployeeStore::new(pool);
    let err = store.list().await.unwrap_err();
    assert!(matches!(err, StoreError::Database(_)));
    assert!(err.to_string().contains("employees"));
    Ok(())
}

#[tokio::test]
async fn migrations_are_idempotent_and_reversible() -> Result<()> {
    let pool = migrated_pool().await?;
    Migrator::up(&pool, None).await?;
    assert!(Migrator::get_pending_migrations(&pool).await?.is_empty());

    Migrator::down(&pool, Some(1)).await?;
    assert_eq!(Migrator::get_pending_migrations(&pool).await?.len(), 1);
    let store = SeaOrmEmployeeStore::new(pool);
    assert!(store.list().await.is_err());
    Ok(())
}
