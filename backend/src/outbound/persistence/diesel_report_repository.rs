//! PostgreSQL-backed `ReportRepository` implementation using Diesel ORM.
//!
//! Every write touches both the report row and the owning case's status, so
//! each one runs inside a single transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{ReportPersistenceError, ReportRepository};
use crate::domain::{CaseId, CaseStatus, Report, ReportDraft, ReportEditAction, ReportText};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewReportRow, ReportRow};
use super::pool::DbPool;
use super::schema::{cases, reports};

/// Diesel-backed implementation of the `ReportRepository` port.
#[derive(Clone)]
pub struct DieselReportRepository {
    pool: DbPool,
}

impl DieselReportRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure raised inside a report transaction.
#[derive(Debug)]
enum TransactionError {
    Diesel(diesel::result::Error),
    NotFound,
    AlreadyFinalized,
}

impl From<diesel::result::Error> for TransactionError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_error(error: diesel::result::Error) -> ReportPersistenceError {
    map_diesel_error(
        error,
        ReportPersistenceError::query,
        ReportPersistenceError::connection,
    )
}

fn map_transaction_error(error: TransactionError, case_id: CaseId) -> ReportPersistenceError {
    match error {
        TransactionError::Diesel(inner) => map_error(inner),
        TransactionError::NotFound => ReportPersistenceError::not_found(case_id.get()),
        TransactionError::AlreadyFinalized => {
            ReportPersistenceError::already_finalized(case_id.get())
        }
    }
}

fn row_to_report(row: ReportRow) -> Result<Report, ReportPersistenceError> {
    let case_id = CaseId::new(row.case_id)
        .map_err(|_| ReportPersistenceError::query("stored report references an invalid case"))?;
    Ok(Report {
        id: row.id,
        case_id,
        draft_json: row.draft_json,
        draft_text: row.draft_text,
        final_text: row.final_text,
        is_finalized: row.is_finalized,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn status_after(action: ReportEditAction) -> CaseStatus {
    match action {
        ReportEditAction::SaveDraft => CaseStatus::DraftEdited,
        ReportEditAction::Finalize => CaseStatus::Completed,
    }
}

#[async_trait]
impl ReportRepository for DieselReportRepository {
    async fn attach_draft(
        &self,
        case_id: CaseId,
        draft: &ReportDraft,
    ) -> Result<Report, ReportPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, ReportPersistenceError::connection))?;

        let new_row = NewReportRow {
            case_id: case_id.get(),
            draft_json: &draft.raw,
            draft_text: &draft.text,
        };

        let row = conn
            .transaction::<ReportRow, TransactionError, _>(|conn| {
                async move {
                    let row = diesel::insert_into(reports::table)
                        .values(&new_row)
                        .returning(ReportRow::as_returning())
                        .get_result(conn)
                        .await?;

                    let updated = diesel::update(cases::table.find(case_id.get()))
                        .set((
                            cases::status.eq(CaseStatus::DraftReady.as_str()),
                            cases::updated_at.eq(diesel::dsl::now),
                        ))
                        .execute(conn)
                        .await?;

                    if updated == 0 {
                        return Err(TransactionError::NotFound);
                    }
                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|e| map_transaction_error(e, case_id))?;

        row_to_report(row)
    }

    async fn find_by_case(&self, case_id: CaseId) -> Result<Option<Report>, ReportPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, ReportPersistenceError::connection))?;

        let row: Option<ReportRow> = reports::table
            .filter(reports::case_id.eq(case_id.get()))
            .select(ReportRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;

        row.map(row_to_report).transpose()
    }

    async fn save_edit(
        &self,
        case_id: CaseId,
        text: &ReportText,
        action: ReportEditAction,
    ) -> Result<Report, ReportPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, ReportPersistenceError::connection))?;

        let body = text.as_ref();
        let finalize = matches!(action, ReportEditAction::Finalize);

        let row = conn
            .transaction::<ReportRow, TransactionError, _>(|conn| {
                async move {
                    let locked: Option<bool> = reports::table
                        .filter(reports::case_id.eq(case_id.get()))
                        .select(reports::is_finalized)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;

                    match locked {
                        None => return Err(TransactionError::NotFound),
                        Some(true) => return Err(TransactionError::AlreadyFinalized),
                        Some(false) => {}
                    }

                    let row = diesel::update(reports::table.filter(reports::case_id.eq(case_id.get())))
                        .set((
                            reports::final_text.eq(Some(body)),
                            reports::is_finalized.eq(finalize),
                            reports::updated_at.eq(diesel::dsl::now),
                        ))
                        .returning(ReportRow::as_returning())
                        .get_result(conn)
                        .await?;

                    diesel::update(cases::table.find(case_id.get()))
                        .set((
                            cases::status.eq(status_after(action).as_str()),
                            cases::updated_at.eq(diesel::dsl::now),
                        ))
                        .execute(conn)
                        .await?;

                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(|e| map_transaction_error(e, case_id))?;

        row_to_report(row)
    }
}
