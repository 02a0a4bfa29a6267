use chrono::{TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, ExpenseCmd, ExpenseQuery, Tz};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, DatabaseConnection, String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    (engine, db, url, path)
}

async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

#[tokio::test]
async fn register_then_authenticate() {
    let (engine, _db) = engine_with_db().await;

    let user = engine
        .register("  alice@example.com ", "s3cret-pass", Utc::now())
        .await
        .unwrap();
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(engine.user(user.id).await.unwrap(), user);

    let id = engine
        .authenticate("alice@example.com", "s3cret-pass")
        .await
        .unwrap();
    assert_eq!(id, user.id);

    let wrong_password = engine
        .authenticate("alice@example.com", "not-the-pass")
        .await
        .unwrap_err();
    let unknown_user = engine
        .authenticate("nobody@example.com", "s3cret-pass")
        .await
        .unwrap_err();
    assert_eq!(wrong_password, unknown_user);
    assert!(matches!(wrong_password, EngineError::Unauthorized(_)));
}

#[tokio::test]
async fn passwords_are_not_stored_in_clear() {
    let (engine, db) = engine_with_db().await;
    engine
        .register("alice@example.com", "s3cret-pass", Utc::now())
        .await
        .unwrap();

    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            "SELECT password_hash FROM users".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    let stored: String = row.try_get("", "password_hash").unwrap();
    assert!(stored.starts_with("$argon2"));
    assert!(!stored.contains("s3cret-pass"));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine
        .register("alice@example.com", "s3cret-pass", Utc::now())
        .await
        .unwrap();

    let err = engine
        .register("alice@example.com", "another-pass", Utc::now())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey("alice@example.com".to_string())
    );
}

#[tokio::test]
async fn register_validates_credentials() {
    let (engine, db) = engine_with_db().await;

    for email in ["", "alice", "a@b@c", "@example.com", "alice@", "al ice@example.com"] {
        let err = engine
            .register(email, "s3cret-pass", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidName(_)), "{email:?}");
    }

    let err = engine
        .register("alice@example.com", "short", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));

    assert_eq!(count_rows(&db, "users").await, 0);
}

#[tokio::test]
async fn deleting_a_user_removes_their_expenses() {
    let (engine, db) = engine_with_db().await;
    let alice = engine
        .register("alice@example.com", "s3cret-pass", Utc::now())
        .await
        .unwrap()
        .id;
    let bob = engine
        .register("bob@example.com", "s3cret-pass", Utc::now())
        .await
        .unwrap()
        .id;
    let when = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    for owner in [alice, alice, bob] {
        engine
            .create_expense(ExpenseCmd::new(owner, "food", 500, when))
            .await
            .unwrap();
    }

    engine.delete_user(alice).await.unwrap();

    assert_eq!(count_rows(&db, "expenses").await, 1);
    assert!(matches!(
        engine.user(alice).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.authenticate("alice@example.com", "s3cret-pass").await,
        Err(EngineError::Unauthorized(_))
    ));
    assert!(matches!(
        engine.delete_user(alice).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert_eq!(
        engine
            .list_expenses(bob, &ExpenseQuery::default())
            .await
            .unwrap()
            .total,
        1
    );
}

#[tokio::test]
async fn data_survives_reconnect() {
    let (engine, db, url, path) = engine_with_file_db().await;
    let alice = engine
        .register("alice@example.com", "s3cret-pass", Utc::now())
        .await
        .unwrap()
        .id;
    let when = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let expense = engine
        .create_expense(ExpenseCmd::new(alice, "books", 4200, when).note("Rust book"))
        .await
        .unwrap();
    drop(engine);
    db.close().await.unwrap();

    let db = Database::connect(&url).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .timezone(Tz::UTC)
        .build()
        .await
        .unwrap();
    assert_eq!(engine.expense(alice, expense.id).await.unwrap(), expense);
    assert_eq!(
        engine
            .authenticate("alice@example.com", "s3cret-pass")
            .await
            .unwrap(),
        alice
    );

    db.close().await.unwrap();
    let _ = std::fs::remove_file(path);
}
