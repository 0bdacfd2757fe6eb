use tickoff_db::{create_pool, run_migrations, DbRuntimeSettings};

#[test]
fn db_initialization_works() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("todo.db");
    let path = path.to_str().expect("utf-8 path");

    let pool = create_pool(path, DbRuntimeSettings::default()).expect("failed to create pool");
    let conn = pool.get().expect("failed to get connection");
    let applied = run_migrations(&conn).expect("failed to run migrations");
    assert_eq!(applied, 1);

    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master
             WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .expect("failed to prepare table query");
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("failed to execute table query")
        .map(|r| r.expect("failed to read table name"))
        .collect();

    assert_eq!(tables, ["_tickoff_migrations", "todos"]);
}

#[test]
fn schema_survives_reopen() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("todo.db");
    let path = path.to_str().expect("utf-8 path");

    {
        let pool = create_pool(path, DbRuntimeSettings::default()).expect("first open");
        let conn = pool.get().expect("connection");
        assert_eq!(run_migrations(&conn).expect("first migrate"), 1);
        conn.execute(
            "INSERT INTO todos (title, description, isCompleted, completedDate)
             VALUES ('kept', '', 0, '')",
            [],
        )
        .expect("insert");
    }

    let pool = create_pool(path, DbRuntimeSettings::default()).expect("second open");
    let conn = pool.get().expect("connection");
    assert_eq!(run_migrations(&conn).expect("second migrate"), 0);

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM todos", [], |row| row.get(0))
        .expect("count");
    assert_eq!(count, 1);
}
