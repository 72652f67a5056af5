use sqlx::{Pool, Postgres, Row, Sqlite};

/// Validates that a database table schema matches what we expect
pub(crate) async fn validate_postgres_table_schema<E>(
    pool: &Pool<Postgres>,
    table_name: &str,
    expected_columns: &[(&str, &str)],
    error_mapper: impl Fn(String) -> E,
) -> Result<(), E> {
    // Check if table exists
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)",
    )
    .bind(table_name)
    .fetch_one(pool)
    .await
    .map_err(|e| error_mapper(e.to_string()))?;

    if !table_exists {
        return Err(error_mapper(format!(
            "Schema validation failed: Table '{table_name}' does not exist"
        )));
    }

    // Query actual schema from database
    let rows = sqlx::query(
        "SELECT column_name, data_type FROM information_schema.columns
         WHERE table_name = $1 ORDER BY column_name",
    )
    .bind(table_name)
    .fetch_all(pool)
    .await
    .map_err(|e| error_mapper(e.to_string()))?;

    let actual_columns: Vec<(String, String)> = rows
        .iter()
        .map(|row| {
            let name: String = row.get("column_name");
            let type_: String = row.get("data_type");
            (name, type_)
        })
        .collect();

    compare_columns(table_name, expected_columns, &actual_columns).map_err(error_mapper)
}

/// Validates that a SQLite table schema matches what we expect
pub(crate) async fn validate_sqlite_table_schema<E>(
    pool: &Pool<Sqlite>,
    table_name: &str,
    expected_columns: &[(&str, &str)],
    error_mapper: impl Fn(String) -> E,
) -> Result<(), E> {
    let table_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table_name)
            .fetch_one(pool)
            .await
            .map_err(|e| error_mapper(e.to_string()))?;

    if table_count == 0 {
        return Err(error_mapper(format!(
            "Schema validation failed: Table '{table_name}' does not exist"
        )));
    }

    let rows = sqlx::query("SELECT name, type FROM pragma_table_info(?) ORDER BY name")
        .bind(table_name)
        .fetch_all(pool)
        .await
        .map_err(|e| error_mapper(e.to_string()))?;

    let actual_columns: Vec<(String, String)> = rows
        .iter()
        .map(|row| {
            let name: String = row.get("name");
            let type_: String = row.get("type");
            (name, type_)
        })
        .collect();

    compare_columns(table_name, expected_columns, &actual_columns).map_err(error_mapper)
}

/// Checks that `index_name` exists on `table_name`, is unique and covers exactly `column`
pub(crate) async fn validate_postgres_unique_index<E>(
    pool: &Pool<Postgres>,
    table_name: &str,
    index_name: &str,
    column: &str,
    error_mapper: impl Fn(String) -> E,
) -> Result<(), E> {
    let indexdef: Option<String> = sqlx::query_scalar(
        "SELECT indexdef FROM pg_indexes WHERE tablename = $1 AND indexname = $2",
    )
    .bind(table_name)
    .bind(index_name)
    .fetch_optional(pool)
    .await
    .map_err(|e| error_mapper(e.to_string()))?;

    match indexdef {
        Some(def) if def.starts_with("CREATE UNIQUE INDEX") && def.ends_with(&format!("({column})")) => {
            Ok(())
        }
        Some(def) => Err(error_mapper(format!(
            "Schema validation failed: Index '{index_name}' is not a unique index on '{column}': {def}"
        ))),
        None => Err(error_mapper(format!(
            "Schema validation failed: Missing index '{index_name}' on table '{table_name}'"
        ))),
    }
}

/// Checks that `index_name` exists on `table_name`, is unique and covers exactly `column`
pub(crate) async fn validate_sqlite_unique_index<E>(
    pool: &Pool<Sqlite>,
    table_name: &str,
    index_name: &str,
    column: &str,
    error_mapper: impl Fn(String) -> E,
) -> Result<(), E> {
    let is_unique: Option<i64> =
        sqlx::query_scalar(r#"SELECT "unique" FROM pragma_index_list(?) WHERE name = ?"#)
            .bind(table_name)
            .bind(index_name)
            .fetch_optional(pool)
            .await
            .map_err(|e| error_mapper(e.to_string()))?;

    match is_unique {
        None => {
            return Err(error_mapper(format!(
                "Schema validation failed: Missing index '{index_name}' on table '{table_name}'"
            )));
        }
        Some(0) => {
            return Err(error_mapper(format!(
                "Schema validation failed: Index '{index_name}' is not unique"
            )));
        }
        Some(_) => {}
    }

    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_index_info(?)")
        .bind(index_name)
        .fetch_all(pool)
        .await
        .map_err(|e| error_mapper(e.to_string()))?;

    if columns != [column] {
        return Err(error_mapper(format!(
            "Schema validation failed: Index '{index_name}' covers {columns:?}, expected ['{column}']"
        )));
    }

    Ok(())
}

fn compare_columns(
    table_name: &str,
    expected_columns: &[(&str, &str)],
    actual_columns: &[(String, String)],
) -> Result<(), String> {
    for (expected_name, expected_type) in expected_columns {
        let found = actual_columns
            .iter()
            .find(|(name, _)| name == expected_name);

        match found {
            Some((_, actual_type)) if actual_type.eq_ignore_ascii_case(expected_type) => {
                // Column exists with correct type, all good
            }
            Some((_, actual_type)) => {
                return Err(format!(
                    "Schema validation failed: Column '{expected_name}' has type '{actual_type}' but expected '{expected_type}'"
                ));
            }
            None => {
                return Err(format!(
                    "Schema validation failed: Missing column '{expected_name}'"
                ));
            }
        }
    }

    // Check for extra columns (just log a warning)
    for (actual_name, _) in actual_columns {
        if !expected_columns
            .iter()
            .any(|(name, _)| *name == actual_name)
        {
            tracing::warn!(
                "Extra column '{}' found in table '{}'",
                actual_name,
                table_name
            );
        }
    }

    Ok(())
}
