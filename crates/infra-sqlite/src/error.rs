// sqlx::Error -> AppError
//
// Orphan rules keep `From<sqlx::Error>` out of core, so every query maps
// through this helper.

use smartq_core::error::AppError;

// SQLite result codes: https://www.sqlite.org/rescode.html
const SQLITE_BUSY: &str = "5";
const SQLITE_LOCKED: &str = "6";
const SQLITE_BUSY_RECOVERY: &str = "261";
const SQLITE_LOCKED_SHAREDCACHE: &str = "262";
const SQLITE_BUSY_SNAPSHOT: &str = "517";
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";
const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";
const SQLITE_CONSTRAINT_CHECK: &str = "275";
const SQLITE_FULL: &str = "13";

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            let Some(code) = db_err.code() else {
                return AppError::Database(format!("Database error: {}", db_err.message()));
            };

            match code.as_ref() {
                // Lost a race for the write lock: callers may retry
                SQLITE_BUSY | SQLITE_LOCKED | SQLITE_BUSY_RECOVERY | SQLITE_LOCKED_SHAREDCACHE
                | SQLITE_BUSY_SNAPSHOT => {
                    AppError::Conflict(format!("Database busy: {}", db_err.message()))
                }
                SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => AppError::Conflict(
                    format!("Unique constraint violation: {}", db_err.message()),
                ),
                SQLITE_CONSTRAINT_FOREIGNKEY => AppError::NotFound(format!(
                    "Foreign key constraint violation: {}",
                    db_err.message()
                )),
                SQLITE_CONSTRAINT_CHECK => {
                    AppError::Validation(format!("Check constraint failed: {}", db_err.message()))
                }
                SQLITE_FULL => AppError::Database(format!("Database full: {}", db_err.message())),
                other => AppError::Database(format!(
                    "Database error [{}]: {}",
                    other,
                    db_err.message()
                )),
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => AppError::Database(format!("Column not found: {}", col)),
        _ => AppError::Database(err.to_string()),
    }
}
