//! In-memory repositories for development runs and HTTP tests.
//!
//! One [`InMemoryStore`] implements the user, case, and report ports over a
//! single mutex, so report writes and the case status they imply change
//! together the same way the Diesel adapters commit them in one transaction.
//! Data lives only as long as the process.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::ports::{
    CasePersistenceError, CaseRepository, ReportPersistenceError, ReportRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Case, CaseId, CaseOverview, CaseStatus, NewCase, NewUser, PasswordHash, Report, ReportDraft,
    ReportEditAction, ReportText, User, UserCredentials, UserId,
};

#[derive(Default)]
struct State {
    users: BTreeMap<i32, (User, PasswordHash)>,
    cases: BTreeMap<i32, Case>,
    reports: BTreeMap<i32, Report>,
    next_user_id: i32,
    next_case_id: i32,
    next_report_id: i32,
}

impl State {
    fn next_id(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }
}

/// Process-local store implementing every repository port.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// Create an empty store stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let now = self.now();
        let mut state = self.lock().map_err(UserPersistenceError::query)?;
        if state
            .users
            .values()
            .any(|(existing, _)| existing.username == user.username)
        {
            return Err(UserPersistenceError::duplicate_username(
                user.username.as_ref(),
            ));
        }
        if state
            .users
            .values()
            .any(|(existing, _)| existing.email == user.email)
        {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }

        let raw_id = State::next_id(&mut state.next_user_id);
        let id = UserId::new(raw_id).map_err(|e| UserPersistenceError::query(e.to_string()))?;
        let stored = User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: now,
        };
        state
            .users
            .insert(raw_id, (stored.clone(), user.password_hash.clone()));
        Ok(stored)
    }

    async fn find_credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state
            .users
            .values()
            .find(|(user, _)| user.username.as_ref() == username)
            .map(|(user, hash)| UserCredentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.get(&id.get()).map(|(user, _)| user.clone()))
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        let state = self.lock().map_err(UserPersistenceError::query)?;
        Ok(state.users.len() as u64)
    }
}

#[async_trait]
impl CaseRepository for InMemoryStore {
    async fn create(&self, case: &NewCase) -> Result<Case, CasePersistenceError> {
        let now = self.now();
        let mut state = self.lock().map_err(CasePersistenceError::query)?;
        let raw_id = State::next_id(&mut state.next_case_id);
        let id = CaseId::new(raw_id).map_err(|e| CasePersistenceError::query(e.to_string()))?;
        let stored = Case {
            id,
            user_id: case.user_id,
            image_filename: case.image_filename.clone(),
            image_path: case.image_path.clone(),
            clinical_notes: case.clinical_notes.as_ref().to_owned(),
            status: CaseStatus::Uploaded,
            created_at: now,
            updated_at: now,
        };
        state.cases.insert(raw_id, stored.clone());
        Ok(stored)
    }

    async fn find_owned(
        &self,
        owner: UserId,
        id: CaseId,
    ) -> Result<Option<Case>, CasePersistenceError> {
        let state = self.lock().map_err(CasePersistenceError::query)?;
        Ok(state
            .cases
            .get(&id.get())
            .filter(|case| case.user_id == owner)
            .cloned())
    }

    async fn list_for_user(
        &self,
        owner: UserId,
    ) -> Result<Vec<CaseOverview>, CasePersistenceError> {
        let state = self.lock().map_err(CasePersistenceError::query)?;
        let mut overviews: Vec<CaseOverview> = state
            .cases
            .values()
            .filter(|case| case.user_id == owner)
            .map(|case| {
                let report = state.reports.get(&case.id.get());
                CaseOverview {
                    case: case.clone(),
                    has_report: report.is_some(),
                    report_finalized: report.is_some_and(|r| r.is_finalized),
                }
            })
            .collect();
        overviews.sort_by(|a, b| {
            b.case
                .created_at
                .cmp(&a.case.created_at)
                .then_with(|| b.case.id.cmp(&a.case.id))
        });
        Ok(overviews)
    }

    async fn update_status(
        &self,
        id: CaseId,
        status: CaseStatus,
    ) -> Result<(), CasePersistenceError> {
        let now = self.now();
        let mut state = self.lock().map_err(CasePersistenceError::query)?;
        let case = state
            .cases
            .get_mut(&id.get())
            .ok_or_else(|| CasePersistenceError::not_found(id.get()))?;
        case.status = status;
        case.updated_at = now;
        Ok(())
    }
}

#[async_trait]
impl ReportRepository for InMemoryStore {
    async fn attach_draft(
        &self,
        case_id: CaseId,
        draft: &ReportDraft,
    ) -> Result<Report, ReportPersistenceError> {
        let now = self.now();
        let mut guard = self.lock().map_err(ReportPersistenceError::query)?;
        let state = &mut *guard;
        if state.reports.contains_key(&case_id.get()) {
            return Err(ReportPersistenceError::query("report already exists for case"));
        }
        let case = state
            .cases
            .get_mut(&case_id.get())
            .ok_or_else(|| ReportPersistenceError::not_found(case_id.get()))?;
        case.status = CaseStatus::DraftReady;
        case.updated_at = now;

        let report = Report {
            id: State::next_id(&mut state.next_report_id),
            case_id,
            draft_json: Some(draft.raw.clone()),
            draft_text: Some(draft.text.clone()),
            final_text: None,
            is_finalized: false,
            created_at: now,
            updated_at: now,
        };
        state.reports.insert(case_id.get(), report.clone());
        Ok(report)
    }

    async fn find_by_case(&self, case_id: CaseId) -> Result<Option<Report>, ReportPersistenceError> {
        let state = self.lock().map_err(ReportPersistenceError::query)?;
        Ok(state.reports.get(&case_id.get()).cloned())
    }

    async fn save_edit(
        &self,
        case_id: CaseId,
        text: &ReportText,
        action: ReportEditAction,
    ) -> Result<Report, ReportPersistenceError> {
        let now = self.now();
        let mut guard = self.lock().map_err(ReportPersistenceError::query)?;
        let state = &mut *guard;
        let report = state
            .reports
            .get_mut(&case_id.get())
            .ok_or_else(|| ReportPersistenceError::not_found(case_id.get()))?;
        if report.is_finalized {
            return Err(ReportPersistenceError::already_finalized(case_id.get()));
        }
        let case = state
            .cases
            .get_mut(&case_id.get())
            .ok_or_else(|| ReportPersistenceError::not_found(case_id.get()))?;

        report.final_text = Some(text.as_ref().to_owned());
        report.updated_at = now;
        case.updated_at = now;
        match action {
            ReportEditAction::SaveDraft => case.status = CaseStatus::DraftEdited,
            ReportEditAction::Finalize => {
                report.is_finalized = true;
                case.status = CaseStatus::Completed;
            }
        }
        Ok(report.clone())
    }
}
