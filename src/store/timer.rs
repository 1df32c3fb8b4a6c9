use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use super::{Collection, Patch, Record};
use crate::models::{NewSession, TimeSession};
use crate::query::{self, SessionFilter};
use crate::storage::{Storage, keys};
use crate::utils;

impl Record for TimeSession {
    const KEY: &'static str = keys::TIME_SESSIONS;

    fn id(&self) -> &str {
        &self.id
    }
}

/// At most one session runs at a time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum TimerState {
    #[default]
    Idle,
    Active {
        session: TimeSession,
        /// Seconds, as last reported by the tick
        elapsed: u64,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub task_id: Option<Option<String>>,
    pub project_id: Option<Option<String>>,
}

impl Patch<TimeSession> for SessionUpdate {
    fn apply(self, session: &mut TimeSession) {
        if let Some(description) = self.description {
            session.description = description;
        }
        if let Some(tags) = self.tags {
            session.tags = tags;
        }
        if let Some(task_id) = self.task_id {
            session.task_id = task_id;
        }
        if let Some(project_id) = self.project_id {
            session.project_id = project_id;
        }
    }
}

/// Finished sessions plus the one currently running.
///
/// The running session lives outside the collection until `stop` and is
/// mirrored to its own slot so a later process can finish it.
pub struct TimerStore {
    records: Collection<TimeSession>,
    state: TimerState,
    filters: SessionFilter,
}

impl TimerStore {
    pub fn load(storage: Rc<Storage>) -> Self {
        let state = storage.load(keys::ACTIVE_SESSION, TimerState::Idle);
        Self {
            records: Collection::load(storage),
            state,
            filters: SessionFilter::default(),
        }
    }

    pub fn reload(&mut self) {
        self.records.reload();
        self.state = self
            .records
            .storage()
            .load(keys::ACTIVE_SESSION, TimerState::Idle);
    }

    /// Begin a new session, finishing any running one first
    pub fn start(&mut self, fields: NewSession) -> String {
        if let Some(previous) = self.stop() {
            tracing::info!(id = %previous.id, duration = previous.duration, "stopped running session before starting a new one");
        }

        let session = TimeSession::start(fields);
        let id = session.id.clone();
        self.state = TimerState::Active {
            session,
            elapsed: 0,
        };
        self.persist_active();
        tracing::debug!(%id, "session started");
        id
    }

    /// Finish the running session with the last ticked elapsed time and
    /// add it to the collection. `None` when idle.
    pub fn stop(&mut self) -> Option<TimeSession> {
        let TimerState::Active {
            mut session,
            elapsed,
        } = std::mem::take(&mut self.state)
        else {
            return None;
        };

        session.end_time = Some(utils::stamp_after(session.start_time));
        session.duration = elapsed;
        self.records.insert(session.clone());
        self.persist_active();
        Some(session)
    }

    /// Record the running session's elapsed seconds; ignored when idle
    pub fn tick(&mut self, seconds: u64) {
        if let TimerState::Active { elapsed, .. } = &mut self.state {
            *elapsed = seconds;
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn active(&self) -> Option<&TimeSession> {
        match &self.state {
            TimerState::Active { session, .. } => Some(session),
            TimerState::Idle => None,
        }
    }

    pub fn elapsed(&self) -> u64 {
        match &self.state {
            TimerState::Active { elapsed, .. } => *elapsed,
            TimerState::Idle => 0,
        }
    }

    pub fn update(&mut self, id: &str, update: SessionUpdate) -> bool {
        self.records.update(id, update)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.records.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&TimeSession> {
        self.records.get(id)
    }

    pub fn all(&self) -> &[TimeSession] {
        self.records.all()
    }

    pub fn filters(&self) -> &SessionFilter {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: SessionFilter) {
        self.filters.merge(filters);
    }

    pub fn clear_filters(&mut self) {
        self.filters = SessionFilter::default();
    }

    /// Finished sessions passing the current filters, newest first
    pub fn filtered(&self) -> Vec<&TimeSession> {
        query::filter_sessions(self.records.all(), &self.filters)
    }

    pub fn total_time_for_task(&self, task_id: &str) -> u64 {
        query::total_time_for_task(self.records.all(), task_id)
    }

    pub fn total_time_for_project(&self, project_id: &str) -> u64 {
        query::total_time_for_project(self.records.all(), project_id)
    }

    pub fn total_time(&self) -> u64 {
        query::total_time(self.records.all())
    }

    fn persist_active(&self) {
        let storage = self.records.storage();
        let result = match &self.state {
            TimerState::Idle => storage.remove(keys::ACTIVE_SESSION),
            TimerState::Active { .. } => storage.save(keys::ACTIVE_SESSION, &self.state),
        };
        if let Err(e) = result {
            tracing::error!(error = %e, "failed to persist running session");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running(u64),
    /// The session this ticker was acquired for is no longer running
    Stopped,
}

/// Subscription to the running session's clock.
///
/// Acquired only while a session runs. Each tick derives elapsed seconds
/// from the session's start time and forwards them to the store while that
/// same session is still active; afterwards it reports `Stopped` and never
/// touches the store again. Dropping it ends the subscription.
#[derive(Debug)]
pub struct Ticker {
    session_id: String,
    started_at: DateTime<Utc>,
    stopped: bool,
}

impl Ticker {
    pub fn acquire(timer: &TimerStore) -> Option<Ticker> {
        timer.active().map(|session| Ticker {
            session_id: session.id.clone(),
            started_at: session.start_time,
            stopped: false,
        })
    }

    pub fn tick(&mut self, timer: &mut TimerStore, now: DateTime<Utc>) -> TickOutcome {
        if self.stopped {
            return TickOutcome::Stopped;
        }
        let current = timer
            .active()
            .is_some_and(|session| session.id == self.session_id);
        if !current {
            self.stopped = true;
            return TickOutcome::Stopped;
        }

        let elapsed = (now - self.started_at).num_seconds().max(0) as u64;
        timer.tick(elapsed);
        TickOutcome::Running(elapsed)
    }
}
