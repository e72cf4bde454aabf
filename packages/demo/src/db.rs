//! Demo request storage.
//!
//! One `SQLite` table, `demo_requests`, accessed through
//! `switchy_database`. Analysis results are stored as a JSON document in a
//! `TEXT` column. Every status change goes through [`update_status`], which
//! enforces the [`DemoRequestStatus`] transition rules.

use std::path::Path;

use compete_intel_demo_models::{
    AnalysisResults, DemoRequest, DemoRequestStatus, DemoRequestSummary, NewDemoRequest,
};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use switchy_database_connection::init_sqlite_rusqlite;

use crate::DemoError;

// ---------------------------------------------------------------------------
// Database lifecycle
// ---------------------------------------------------------------------------

/// Opens (or creates) the demo request database at `path` and ensures the
/// table exists.
///
/// # Errors
///
/// Returns [`DemoError`] if the database file cannot be created or the
/// schema DDL fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>, DemoError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DemoError::Database(e.to_string()))?;

    ensure_schema(db.as_ref()).await?;

    Ok(db)
}

/// Creates the `demo_requests` table if it doesn't already exist.
///
/// # Errors
///
/// Returns [`DemoError::Database`] if the DDL fails.
pub async fn ensure_schema(db: &dyn Database) -> Result<(), DemoError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS demo_requests (
            id TEXT PRIMARY KEY,
            business_name TEXT NOT NULL,
            email TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT,
            category TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            analysis_results TEXT,
            error_message TEXT
        )",
    )
    .await
    .map_err(|e| DemoError::Database(e.to_string()))?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_demo_requests_created_at
            ON demo_requests (created_at)",
    )
    .await
    .map_err(|e| DemoError::Database(e.to_string()))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Converts an `Option<&str>` to a [`DatabaseValue`], using `Null` for `None`.
fn opt_str(value: Option<&str>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |s| {
        DatabaseValue::String(s.to_string())
    })
}

fn row_status(row: &switchy_database::Row) -> DemoRequestStatus {
    row.to_value::<String>("status")
        .unwrap_or_default()
        .parse()
        .unwrap_or(DemoRequestStatus::Pending)
}

/// Converts a database row into a [`DemoRequest`].
///
/// A stored JSON document that no longer parses is logged and dropped.
fn row_to_demo_request(row: &switchy_database::Row) -> DemoRequest {
    let id: String = row.to_value("id").unwrap_or_default();
    let analysis_results = row
        .to_value::<Option<String>>("analysis_results")
        .unwrap_or(None)
        .and_then(|json| match serde_json::from_str::<AnalysisResults>(&json) {
            Ok(results) => Some(results),
            Err(e) => {
                log::warn!("row_to_demo_request: unreadable analysis_results for {id}: {e}");
                None
            }
        });

    DemoRequest {
        business_name: row.to_value("business_name").unwrap_or_default(),
        email: row.to_value("email").unwrap_or_default(),
        city: row.to_value("city").unwrap_or_default(),
        state: row.to_value("state").unwrap_or(None),
        category: row.to_value("category").unwrap_or_default(),
        status: row_status(row),
        created_at: row.to_value("created_at").unwrap_or_default(),
        updated_at: row.to_value("updated_at").unwrap_or_default(),
        analysis_results,
        error_message: row.to_value("error_message").unwrap_or(None),
        id,
    }
}

fn row_to_summary(row: &switchy_database::Row) -> DemoRequestSummary {
    DemoRequestSummary {
        id: row.to_value("id").unwrap_or_default(),
        business_name: row.to_value("business_name").unwrap_or_default(),
        email: row.to_value("email").unwrap_or_default(),
        city: row.to_value("city").unwrap_or_default(),
        category: row.to_value("category").unwrap_or_default(),
        status: row_status(row),
        created_at: row.to_value("created_at").unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Stores a new request with status `pending` and a fresh UUID v4 id.
///
/// # Errors
///
/// Returns [`DemoError::Database`] if the insert fails.
pub async fn insert_pending(
    db: &dyn Database,
    input: &NewDemoRequest,
) -> Result<DemoRequest, DemoError> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let category = input.category.to_string();

    db.exec_raw_params(
        "INSERT INTO demo_requests (id, business_name, email, city, state, category,
             status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        &[
            DatabaseValue::String(id.clone()),
            DatabaseValue::String(input.business_name.clone()),
            DatabaseValue::String(input.email.clone()),
            DatabaseValue::String(input.city.clone()),
            opt_str(input.state.as_deref()),
            DatabaseValue::String(category.clone()),
            DatabaseValue::String(DemoRequestStatus::Pending.as_str().to_string()),
            DatabaseValue::String(now.clone()),
            DatabaseValue::String(now.clone()),
        ],
    )
    .await
    .map_err(|e| DemoError::Database(e.to_string()))?;

    Ok(DemoRequest {
        id,
        business_name: input.business_name.clone(),
        email: input.email.clone(),
        city: input.city.clone(),
        state: input.state.clone(),
        category,
        status: DemoRequestStatus::Pending,
        created_at: now.clone(),
        updated_at: now,
        analysis_results: None,
        error_message: None,
    })
}

async fn current_status(db: &dyn Database, id: &str) -> Result<DemoRequestStatus, DemoError> {
    let rows = db
        .query_raw_params(
            "SELECT status FROM demo_requests WHERE id = ?",
            &[DatabaseValue::String(id.to_string())],
        )
        .await
        .map_err(|e| DemoError::Database(e.to_string()))?;

    rows.first()
        .map(row_status)
        .ok_or_else(|| DemoError::NotFound { id: id.to_string() })
}

/// Moves request `id` to `next`, setting the optional result columns in the
/// same statement.
async fn transition(
    db: &dyn Database,
    id: &str,
    next: DemoRequestStatus,
    analysis_results: Option<String>,
    error_message: Option<&str>,
) -> Result<(), DemoError> {
    let from = current_status(db, id).await?;
    if !from.can_transition_to(next) {
        return Err(DemoError::InvalidTransition { from, to: next });
    }

    let now = chrono::Utc::now().to_rfc3339();

    db.exec_raw_params(
        "UPDATE demo_requests
         SET status = ?, updated_at = ?,
             analysis_results = COALESCE(?, analysis_results),
             error_message = COALESCE(?, error_message)
         WHERE id = ?",
        &[
            DatabaseValue::String(next.as_str().to_string()),
            DatabaseValue::String(now),
            opt_str(analysis_results.as_deref()),
            opt_str(error_message),
            DatabaseValue::String(id.to_string()),
        ],
    )
    .await
    .map_err(|e| DemoError::Database(e.to_string()))?;

    log::debug!("transition: demo request {id} {from} -> {next}");

    Ok(())
}

/// Changes the status of request `id`.
///
/// # Errors
///
/// * [`DemoError::NotFound`] if no such request exists
/// * [`DemoError::InvalidTransition`] if the move is not allowed
/// * [`DemoError::Database`] if the update fails
pub async fn update_status(
    db: &dyn Database,
    id: &str,
    next: DemoRequestStatus,
) -> Result<(), DemoError> {
    transition(db, id, next, None, None).await
}

/// Stores the analysis of request `id` and marks it `completed`.
///
/// # Errors
///
/// * [`DemoError::Json`] if the results cannot be serialized
/// * otherwise as [`update_status`]
pub async fn store_results(
    db: &dyn Database,
    id: &str,
    results: &AnalysisResults,
) -> Result<(), DemoError> {
    let json = serde_json::to_string(results)?;
    transition(db, id, DemoRequestStatus::Completed, Some(json), None).await
}

/// Marks request `id` as `failed` with `message`.
///
/// # Errors
///
/// As [`update_status`].
pub async fn mark_failed(db: &dyn Database, id: &str, message: &str) -> Result<(), DemoError> {
    transition(db, id, DemoRequestStatus::Failed, None, Some(message)).await
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Retrieves a single request by id.
///
/// # Errors
///
/// Returns [`DemoError::Database`] if the query fails.
pub async fn get_demo_request(db: &dyn Database, id: &str) -> Result<Option<DemoRequest>, DemoError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM demo_requests WHERE id = ?",
            &[DatabaseValue::String(id.to_string())],
        )
        .await
        .map_err(|e| DemoError::Database(e.to_string()))?;

    Ok(rows.first().map(row_to_demo_request))
}

/// Lists up to `limit` requests, newest first.
///
/// # Errors
///
/// Returns [`DemoError::Database`] if the query fails.
pub async fn list_demo_requests(
    db: &dyn Database,
    limit: u32,
) -> Result<Vec<DemoRequestSummary>, DemoError> {
    let rows = db
        .query_raw_params(
            "SELECT id, business_name, email, city, category, status, created_at
             FROM demo_requests
             ORDER BY created_at DESC
             LIMIT ?",
            &[DatabaseValue::Int64(i64::from(limit))],
        )
        .await
        .map_err(|e| DemoError::Database(e.to_string()))?;

    Ok(rows.iter().map(row_to_summary).collect())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use compete_intel_competitor_models::BusinessCategory;

    use super::*;
    use crate::test_support::empty_results;

    fn temp_db_path() -> PathBuf {
        std::env::temp_dir()
            .join("compete_intel_demo_tests")
            .join(format!("{}.db", uuid::Uuid::new_v4()))
    }

    fn new_request(name: &str) -> NewDemoRequest {
        NewDemoRequest {
            business_name: name.to_string(),
            email: "dono@padaria.com.br".to_string(),
            city: "Recife".to_string(),
            state: Some("PE".to_string()),
            category: BusinessCategory::Padaria,
        }
    }

    #[tokio::test]
    async fn pending_request_round_trips() {
        let db = open_db(&temp_db_path()).await.unwrap();
        let inserted = insert_pending(db.as_ref(), &new_request("Padaria Sol"))
            .await
            .unwrap();

        let loaded = get_demo_request(db.as_ref(), &inserted.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, inserted);
        assert_eq!(loaded.status, DemoRequestStatus::Pending);
        assert_eq!(loaded.category, "Padaria");

        assert!(get_demo_request(db.as_ref(), "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn completed_request_keeps_results() {
        let db = open_db(&temp_db_path()).await.unwrap();
        let req = insert_pending(db.as_ref(), &new_request("Padaria Lua"))
            .await
            .unwrap();

        update_status(db.as_ref(), &req.id, DemoRequestStatus::Processing)
            .await
            .unwrap();
        let results = empty_results();
        store_results(db.as_ref(), &req.id, &results).await.unwrap();

        let loaded = get_demo_request(db.as_ref(), &req.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, DemoRequestStatus::Completed);
        assert_eq!(loaded.analysis_results, Some(results));
        assert!(loaded.error_message.is_none());
    }

    #[tokio::test]
    async fn invalid_transitions_are_rejected() {
        let db = open_db(&temp_db_path()).await.unwrap();
        let req = insert_pending(db.as_ref(), &new_request("Padaria Mar"))
            .await
            .unwrap();

        let err = store_results(db.as_ref(), &req.id, &empty_results())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DemoError::InvalidTransition {
                from: DemoRequestStatus::Pending,
                to: DemoRequestStatus::Completed,
            }
        ));

        mark_failed(db.as_ref(), &req.id, "boom").await.unwrap();
        let err = update_status(db.as_ref(), &req.id, DemoRequestStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, DemoError::InvalidTransition { .. }));

        let loaded = get_demo_request(db.as_ref(), &req.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, DemoRequestStatus::Failed);
        assert_eq!(loaded.error_message.as_deref(), Some("boom"));

        let err = update_status(db.as_ref(), "missing", DemoRequestStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, DemoError::NotFound { .. }));
    }

    #[tokio::test]
    async fn listing_respects_limit() {
        let db = open_db(&temp_db_path()).await.unwrap();
        for name in ["A", "B", "C"] {
            insert_pending(db.as_ref(), &new_request(name)).await.unwrap();
        }

        assert_eq!(list_demo_requests(db.as_ref(), 2).await.unwrap().len(), 2);
        let all = list_demo_requests(db.as_ref(), 50).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
