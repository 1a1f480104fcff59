use crate::modules::common::responses::{internal_error_res, SimpleError};
use convert_case::{Case, Casing};
use http::StatusCode;
use sea_orm::{DbErr, RuntimeErr, SqlxError};
use tracing::error;

/// Wrapper for seaorm errors.
///
/// This is useful for wrapping database errors and safely returning them from
/// axum route handlers without worrying about leaking sensitive information,
/// as it implements `Into<(StatusCode, SimpleError)>`
#[derive(Debug)]
pub struct DbError(pub DbErr);

impl From<DbErr> for DbError {
    fn from(err: DbErr) -> Self {
        DbError(err)
    }
}

impl From<DbError> for (StatusCode, SimpleError) {
    fn from(err: DbError) -> Self {
        match err.0 {
            DbErr::RecordNotFound(_) => {
                (StatusCode::NOT_FOUND, SimpleError::from("entity not found"))
            }

            DbErr::Exec(RuntimeErr::SqlxError(error)) => handle_sqlx_error(error),
            DbErr::Query(RuntimeErr::SqlxError(error)) => handle_sqlx_error(error),

            other => {
                error!("[DB] {other}");
                internal_error_res()
            }
        }
    }
}

fn handle_sqlx_error(sqlx_error: SqlxError) -> (StatusCode, SimpleError) {
    match sqlx_error {
        SqlxError::Database(e) => {
            if !e.is_unique_violation() {
                error!("[DB] {e}");
                return internal_error_res();
            }

            let column_name = match e.constraint() {
                Some(constraint) => get_column_name_from_unique_constraint_name(constraint),
                // sqlite does not report the constraint name, only the message
                None => get_column_name_from_unique_violation_message(e.message()),
            };

            if let Some(column_name) = column_name {
                let error_msg = format!("{}_IN_USE", column_name.to_case(Case::ScreamingSnake));

                return (StatusCode::BAD_REQUEST, SimpleError::from(error_msg));
            }

            internal_error_res()
        }
        other => {
            error!("[DB] {other}");
            internal_error_res()
        }
    }
}

/// Extracts the column name from the name of a database unique constraint.
/// assuming the naming pattern: `<table_name>_<column>_unique`.
///
/// returns `Some(<column>)` if the pattern is ok otherwise `None`.
fn get_column_name_from_unique_constraint_name(unique_constraint_name: &str) -> Option<String> {
    let non_suffixed = unique_constraint_name.strip_suffix("_unique")?;

    let known_tables = ["chat_message", "ai_prediction", "chat_log", "user", "car"];

    // tables with underscores on their names would break a naive split
    for table in known_tables {
        if let Some(column) = non_suffixed.strip_prefix(&format!("{table}_")) {
            return Some(column.to_string());
        }
    }

    non_suffixed.split_once('_').map(|(_, col)| col.to_string())
}

/// Extracts the column from a sqlite unique violation message,
/// eg: `UNIQUE constraint failed: user.email`
fn get_column_name_from_unique_violation_message(msg: &str) -> Option<String> {
    let (_, table_and_column) = msg.split_once("UNIQUE constraint failed: ")?;
    let first = table_and_column.split(',').next()?;
    let (_, column) = first.trim().split_once('.')?;

    Some(column.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_column_from_constraint_name() {
        assert_eq!(
            get_column_name_from_unique_constraint_name("user_email_unique"),
            Some(String::from("email"))
        );

        assert_eq!(
            get_column_name_from_unique_constraint_name("user_google_id_unique"),
            Some(String::from("google_id"))
        );

        assert_eq!(
            get_column_name_from_unique_constraint_name("booking_slot_idx"),
            None
        );
    }

    #[test]
    fn parses_column_from_sqlite_message() {
        assert_eq!(
            get_column_name_from_unique_violation_message(
                "UNIQUE constraint failed: user.email"
            ),
            Some(String::from("email"))
        );

        assert_eq!(
            get_column_name_from_unique_violation_message("no such table: car"),
            None
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        let (status, _) = <(StatusCode, SimpleError)>::from(DbError(DbErr::RecordNotFound(
            String::from("car"),
        )));

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn other_errors_map_to_generic_500() {
        let (status, body) = <(StatusCode, SimpleError)>::from(DbError(DbErr::Custom(
            String::from("connection refused at 10.0.0.3:5432"),
        )));

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error(), "internal server error");
    }
}
