use roster_core::db::schema::SCHEMA_VERSION;
use roster_core::db::open_db_in_memory;
use roster_core::{SqliteUserStore, StoreError, User, UserRepository, UserStore};
use rusqlite::Connection;
use std::collections::HashSet;

fn memory_repo() -> UserRepository<SqliteUserStore> {
    UserRepository::new(SqliteUserStore::open_in_memory().unwrap())
}

fn new_user(first: &str, last: &str, age: i32) -> User {
    User::new(first, last, age).unwrap()
}

#[test]
fn insert_assigns_fresh_positive_ids() {
    let repo = memory_repo();

    let mut seen = HashSet::new();
    for age in 0..5 {
        let before: HashSet<_> = repo.get_all().unwrap().into_iter().map(|u| u.id).collect();
        let stored = repo.insert(&new_user("Ana", "Diaz", age)).unwrap();

        assert!(stored.id > 0);
        assert!(!before.contains(&stored.id));
        assert!(seen.insert(stored.id));
    }
}

#[test]
fn ids_of_deleted_rows_are_not_reused() {
    let repo = memory_repo();

    let first = repo.insert(&new_user("Ana", "Diaz", 30)).unwrap();
    assert_eq!(repo.delete_by_id(first.id).unwrap(), 1);

    let second = repo.insert(&new_user("Luis", "Perez", 41)).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn put_with_existing_id_replaces_and_is_idempotent() {
    let repo = memory_repo();
    let stored = repo.insert(&new_user("Ana", "Diaz", 30)).unwrap();

    let replacement = User::with_id(stored.id, "Maria", "Lopez", 52).unwrap();
    repo.insert(&replacement).unwrap();
    let once = repo.get_all().unwrap();
    repo.insert(&replacement).unwrap();
    let twice = repo.get_all().unwrap();

    assert_eq!(once, vec![replacement.clone()]);
    assert_eq!(twice, once);
}

#[test]
fn put_with_unknown_explicit_id_creates_row() {
    let repo = memory_repo();

    let explicit = User::with_id(42, "Ana", "Diaz", 30).unwrap();
    let stored = repo.insert(&explicit).unwrap();
    assert_eq!(stored, explicit);
    assert_eq!(repo.get(42).unwrap(), Some(explicit));

    let next = repo.insert(&new_user("Luis", "Perez", 41)).unwrap();
    assert!(next.id > 42);
}

#[test]
fn delete_then_list_excludes_target() {
    let repo = memory_repo();
    let keep = repo.insert(&new_user("Ana", "Diaz", 30)).unwrap();
    let target = repo.insert(&new_user("Luis", "Perez", 41)).unwrap();

    assert_eq!(repo.delete_by_id(target.id).unwrap(), 1);
    let remaining = repo.get_all().unwrap();
    assert!(remaining.iter().all(|user| user.id != target.id));
    assert_eq!(remaining, vec![keep]);

    assert_eq!(repo.delete_by_id(target.id).unwrap(), 0);
}

#[test]
fn delete_missing_id_returns_zero() {
    let repo = memory_repo();
    assert_eq!(repo.delete_by_id(7).unwrap(), 0);
    assert_eq!(repo.delete_by_id(0).unwrap(), 0);
}

#[test]
fn update_replaces_all_fields() {
    let repo = memory_repo();
    let stored = repo.insert(&new_user("Ana", "Diaz", 30)).unwrap();
    repo.insert(&new_user("Luis", "Perez", 41)).unwrap();

    let edited = User {
        id: stored.id,
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        age: 5,
    };
    repo.update(&edited).unwrap();

    let matching: Vec<_> = repo
        .get_all()
        .unwrap()
        .into_iter()
        .filter(|user| user.id == stored.id)
        .collect();
    assert_eq!(matching, vec![edited]);
}

#[test]
fn update_missing_id_is_silent_noop() {
    let repo = memory_repo();
    let stored = repo.insert(&new_user("Ana", "Diaz", 30)).unwrap();

    let ghost = User::with_id(stored.id + 100, "Ghost", "User", 1).unwrap();
    repo.update(&ghost).unwrap();

    assert_eq!(repo.get_all().unwrap(), vec![stored]);
    assert_eq!(repo.get(ghost.id).unwrap(), None);
}

#[test]
fn insert_then_list_round_trips() {
    let repo = memory_repo();
    let stored = repo.insert(&new_user("Ana", "Diaz", 30)).unwrap();

    let all = repo.get_all().unwrap();
    assert!(all.contains(&stored));
    assert_eq!(repo.get(stored.id).unwrap(), Some(stored));
}

#[test]
fn store_persists_unvalidated_values() {
    let store = SqliteUserStore::open_in_memory().unwrap();
    let raw = User {
        id: 0,
        first_name: String::new(),
        last_name: String::new(),
        age: -3,
    };

    let stored = store.put(&raw).unwrap();
    assert_eq!(store.get_by_id(stored.id).unwrap(), Some(stored));
}

#[test]
fn concrete_scenario() {
    let repo = memory_repo();
    assert!(repo.get_all().unwrap().is_empty());

    let stored = repo.insert(&new_user("Ana", "Diaz", 30)).unwrap();
    let expected = User::with_id(1, "Ana", "Diaz", 30).unwrap();
    assert_eq!(stored, expected);
    assert_eq!(repo.get_all().unwrap(), vec![expected]);

    let older = User::with_id(1, "Ana", "Diaz", 31).unwrap();
    repo.update(&older).unwrap();
    assert_eq!(repo.get_all().unwrap(), vec![older]);

    assert_eq!(repo.delete_by_id(1).unwrap(), 1);
    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.sqlite3");

    let stored = {
        let repo = UserRepository::new(SqliteUserStore::open(&path).unwrap());
        repo.insert(&new_user("Ana", "Diaz", 30)).unwrap()
    };

    let reopened = UserRepository::new(SqliteUserStore::open(&path).unwrap());
    assert_eq!(reopened.get_all().unwrap(), vec![stored]);
}

#[test]
fn store_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteUserStore::try_new(conn) {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, SCHEMA_VERSION),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn store_rejects_connection_without_users_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))
        .unwrap();

    let result = SqliteUserStore::try_new(conn);
    assert!(matches!(
        result,
        Err(StoreError::MissingRequiredTable("users"))
    ));
}

#[test]
fn store_rejects_connection_missing_users_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            firstName TEXT NOT NULL,
            lastName TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))
        .unwrap();

    let result = SqliteUserStore::try_new(conn);
    assert!(matches!(
        result,
        Err(StoreError::MissingRequiredColumn {
            table: "users",
            column: "age"
        })
    ));
}

#[test]
fn store_accepts_bootstrapped_connection() {
    let store = SqliteUserStore::try_new(open_db_in_memory().unwrap()).unwrap();
    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn reserved_id_in_table_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users (id, firstName, lastName, age) VALUES (0, 'Bad', 'Row', 1);",
        [],
    )
    .unwrap();
    let store = SqliteUserStore::try_new(conn).unwrap();

    assert!(matches!(
        store.list_all().unwrap_err(),
        StoreError::InvalidData(_)
    ));
}

#[test]
fn concurrent_inserts_never_share_ids() {
    let dir = tempfile::tempdir().unwrap();
    let repo = std::sync::Arc::new(UserRepository::new(
        SqliteUserStore::open(dir.path().join("roster.sqlite3")).unwrap(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let repo = std::sync::Arc::clone(&repo);
            std::thread::spawn(move || {
                (0..10)
                    .map(|age| {
                        repo.insert(&new_user("Worker", "Thread", worker * 10 + age))
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(ids.len(), 80);
    assert_eq!(repo.get_all().unwrap().len(), 80);
}
