//! PostgreSQL-backed `CaseRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{CasePersistenceError, CaseRepository};
use crate::domain::{Case, CaseId, CaseOverview, CaseStatus, NewCase, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CaseRow, NewCaseRow};
use super::pool::DbPool;
use super::schema::{cases, reports};

/// Diesel-backed implementation of the `CaseRepository` port.
#[derive(Clone)]
pub struct DieselCaseRepository {
    pool: DbPool,
}

impl DieselCaseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> CasePersistenceError {
    map_diesel_error(
        error,
        CasePersistenceError::query,
        CasePersistenceError::connection,
    )
}

/// Convert a case row into the domain model.
///
/// Rows carrying an id or status the domain does not recognise fail with a
/// query error rather than being coerced.
pub(super) fn row_to_case(row: CaseRow) -> Result<Case, String> {
    let id = CaseId::new(row.id).map_err(|e| e.to_string())?;
    let user_id = UserId::new(row.user_id).map_err(|e| e.to_string())?;
    let status = row.status.parse::<CaseStatus>().map_err(|e| {
        warn!(case_id = row.id, status = %row.status, "unrecognised case status");
        e.to_string()
    })?;
    Ok(Case {
        id,
        user_id,
        image_filename: row.image_filename,
        image_path: row.image_path,
        clinical_notes: row.clinical_notes,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl CaseRepository for DieselCaseRepository {
    async fn create(&self, case: &NewCase) -> Result<Case, CasePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, CasePersistenceError::connection))?;

        let new_row = NewCaseRow {
            user_id: case.user_id.get(),
            image_filename: &case.image_filename,
            image_path: &case.image_path,
            clinical_notes: case.clinical_notes.as_ref(),
            status: CaseStatus::Uploaded.as_str(),
        };

        let row: CaseRow = diesel::insert_into(cases::table)
            .values(&new_row)
            .returning(CaseRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_error)?;

        row_to_case(row).map_err(CasePersistenceError::query)
    }

    async fn find_owned(
        &self,
        owner: UserId,
        id: CaseId,
    ) -> Result<Option<Case>, CasePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, CasePersistenceError::connection))?;

        let row: Option<CaseRow> = cases::table
            .filter(cases::id.eq(id.get()))
            .filter(cases::user_id.eq(owner.get()))
            .select(CaseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.map(row_to_case)
            .transpose()
            .map_err(CasePersistenceError::query)
    }

    async fn list_for_user(
        &self,
        owner: UserId,
    ) -> Result<Vec<CaseOverview>, CasePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, CasePersistenceError::connection))?;

        let rows: Vec<(CaseRow, Option<bool>)> = cases::table
            .left_join(reports::table)
            .filter(cases::user_id.eq(owner.get()))
            .order((cases::created_at.desc(), cases::id.desc()))
            .select((CaseRow::as_select(), reports::is_finalized.nullable()))
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        rows.into_iter()
            .map(|(row, finalized)| {
                Ok(CaseOverview {
                    case: row_to_case(row).map_err(CasePersistenceError::query)?,
                    has_report: finalized.is_some(),
                    report_finalized: finalized.unwrap_or(false),
                })
            })
            .collect()
    }

    async fn update_status(
        &self,
        id: CaseId,
        status: CaseStatus,
    ) -> Result<(), CasePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, CasePersistenceError::connection))?;

        let updated = diesel::update(cases::table.find(id.get()))
            .set((
                cases::status.eq(status.as_str()),
                cases::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_error)?;

        if updated == 0 {
            return Err(CasePersistenceError::not_found(id.get()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage.
    use super::*;
    use chrono::Utc;
    use rstest::{fixture, rstest};

    #[fixture]
    fn row() -> CaseRow {
        let now = Utc::now();
        CaseRow {
            id: 3,
            user_id: 1,
            image_filename: "scan.png".to_owned(),
            image_path: "1/scan.png".to_owned(),
            clinical_notes: "Right upper quadrant pain".to_owned(),
            status: "draft_ready".to_owned(),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn known_status_converts(row: CaseRow) {
        let case = row_to_case(row).expect("valid row");
        assert_eq!(case.status, CaseStatus::DraftReady);
        assert_eq!(case.id.get(), 3);
    }

    #[rstest]
    fn unknown_status_is_rejected(mut row: CaseRow) {
        row.status = "archived".to_owned();
        let error = row_to_case(row).expect_err("unknown status");
        assert!(error.contains("archived"));
    }
}
