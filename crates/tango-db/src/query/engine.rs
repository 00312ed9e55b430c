use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use tango_core::QuerySpec;
use tango_types::{DictionaryId, EntryRef, FetchError, QueryEvent};
use tracing::{debug, error, warn};

use super::sql::{self, Catalog, PreparedQuery};
use crate::connection::Connection;
use crate::error::{ErrorInfo, QueryBuildError, is_interrupt};
use crate::worker::{Database, JobContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Preparing,
    Fetching,
    Aborting,
}

struct Status {
    state: EngineState,
    /// Bumped on every transition so a finishing job only resets the state
    /// it set up itself
    generation: u64,
}

/// Runs prepared searches on the database worker and posts their results
/// as [`QueryEvent`]s.
///
/// Callers should [`abort`](Self::abort) before starting a new fetch while
/// another may still be running; once `abort` returns no event of the
/// aborted fetch is left to be received except its single `Aborted`.
pub struct QueryEngine {
    db: Arc<Database>,
    events: kanal::Sender<QueryEvent>,
    /// Same channel as the caller's receiver, used to drain stale events
    backlog: kanal::Receiver<QueryEvent>,
    status: Arc<Mutex<Status>>,
    prepared: Option<Arc<PreparedQuery>>,
}

impl QueryEngine {
    pub fn new(db: Arc<Database>) -> (Self, kanal::Receiver<QueryEvent>) {
        let (events, receiver) = kanal::unbounded();
        let engine = Self {
            db,
            events,
            backlog: receiver.clone(),
            status: Arc::new(Mutex::new(Status {
                state: EngineState::Idle,
                generation: 0,
            })),
            prepared: None,
        };
        (engine, receiver)
    }

    pub fn state(&self) -> EngineState {
        self.status.lock().state
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared.is_some()
    }

    fn transition(&self, state: EngineState) -> u64 {
        let mut status = self.status.lock();
        status.state = state;
        status.generation += 1;
        status.generation
    }

    /// Builds the SQL for `spec` against the dictionaries attached right now.
    pub fn prepare(&mut self, spec: &QuerySpec) -> Result<(), QueryBuildError> {
        let generation = self.transition(EngineState::Preparing);
        let result = match self.db.call(|conn| Catalog::load(conn)) {
            Ok(Ok(catalog)) => sql::build(spec, &catalog),
            Ok(Err(e)) | Err(e) => Err(e.into()),
        };
        finish(&self.status, generation);

        match result {
            Ok(query) => {
                debug!(sql = %query.select_sql, params = query.params.len(), "Prepared search");
                self.prepared = Some(Arc::new(query));
                Ok(())
            }
            Err(e) => {
                warn!("Could not prepare search: {e}");
                self.prepared = None;
                Err(e)
            }
        }
    }

    /// Queues the prepared select for rows `offset..offset + limit`.
    pub fn fetch(&self, offset: u64, limit: u64) -> Result<(), QueryBuildError> {
        let query = self.prepared.clone().ok_or(QueryBuildError::NotPrepared)?;
        let generation = self.transition(EngineState::Fetching);
        let events = self.events.clone();
        let status = self.status.clone();

        let submitted = self.db.submit_query(move |conn, ctx| {
            run_fetch(conn, ctx, &query, offset, limit, &events);
            finish(&status, generation);
        });
        if let Err(e) = submitted {
            finish(&self.status, generation);
            return Err(e.into());
        }
        Ok(())
    }

    /// Queues the count variant of the prepared query. Delivers
    /// `Count` or `CountFailed`; an interrupted count delivers nothing.
    pub fn fetch_count(&self) -> Result<(), QueryBuildError> {
        let query = self.prepared.clone().ok_or(QueryBuildError::NotPrepared)?;
        let events = self.events.clone();

        self.db.submit_query(move |conn, ctx| {
            if ctx.is_cancelled() {
                return;
            }
            let result = conn.inner().prepare_cached(&query.count_sql).and_then(|mut stmt| {
                stmt.query_row(params_from_iter(query.params.iter()), |row| {
                    row.get::<_, i64>(0)
                })
            });
            let event = match result {
                Ok(count) => QueryEvent::Count(count.max(0) as u64),
                Err(e) if is_interrupt(&e) => return,
                Err(e) => {
                    error!("Count failed: {e}");
                    conn.set_last_error(ErrorInfo::from_sqlite(&e));
                    QueryEvent::CountFailed(FetchError::ExecutionFailed(e.to_string()))
                }
            };
            let _ = events.send(event);
        })?;
        Ok(())
    }

    /// Stops every queued or running job and replaces the undelivered
    /// events of interrupted fetches by one `Aborted` each. Undelivered
    /// counts are dropped.
    pub fn abort(&self) {
        let generation = self.transition(EngineState::Aborting);
        self.db.interrupt_current_query();

        let mut fetches = 0usize;
        let mut dropped = 0usize;
        while let Ok(Some(event)) = self.backlog.try_recv() {
            if event.is_terminal() {
                fetches += 1;
            } else {
                dropped += 1;
            }
        }
        for _ in 0..fetches {
            let _ = self.events.send(QueryEvent::Aborted);
        }
        debug!(fetches, dropped, "Aborted pending searches");

        finish(&self.status, generation);
    }
}

fn finish(status: &Mutex<Status>, generation: u64) {
    let mut status = status.lock();
    if status.generation == generation {
        status.state = EngineState::Idle;
    }
}

fn run_fetch(
    conn: &mut Connection,
    ctx: &JobContext,
    query: &PreparedQuery,
    offset: u64,
    limit: u64,
    events: &kanal::Sender<QueryEvent>,
) {
    if ctx.is_cancelled() {
        let _ = events.send(QueryEvent::Aborted);
        return;
    }
    let _ = events.send(QueryEvent::FirstResult);

    let terminal = match stream_rows(conn.inner(), ctx, query, offset, limit, events) {
        Ok(true) => QueryEvent::LastResult,
        Ok(false) => QueryEvent::Aborted,
        Err(e) if is_interrupt(&e) => QueryEvent::Aborted,
        Err(e) => {
            error!("Fetch failed: {e}");
            conn.set_last_error(ErrorInfo::from_sqlite(&e));
            QueryEvent::Error(FetchError::ExecutionFailed(e.to_string()))
        }
    };
    let _ = events.send(terminal);
}

/// Posts one `Row` per result. `Ok(false)` when cancelled between rows.
fn stream_rows(
    conn: &rusqlite::Connection,
    ctx: &JobContext,
    query: &PreparedQuery,
    offset: u64,
    limit: u64,
    events: &kanal::Sender<QueryEvent>,
) -> rusqlite::Result<bool> {
    let mut params = query.params.clone();
    params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    params.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));

    let mut stmt = conn.prepare_cached(&format!("{} LIMIT ? OFFSET ?", query.select_sql))?;
    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut delivered = 0usize;
    while let Some(row) = rows.next()? {
        if ctx.is_cancelled() {
            return Ok(false);
        }
        let dictionary: u8 = row.get(0)?;
        let id: u32 = row.get(1)?;
        let Some(dictionary) = DictionaryId::from_u8(dictionary) else {
            warn!(dictionary, id, "Skipping row of unknown dictionary");
            continue;
        };
        if events.send(QueryEvent::Row(EntryRef::new(dictionary, id))).is_err() {
            return Ok(false);
        }
        delivered += 1;
    }
    debug!(delivered, offset, limit, "Fetch complete");
    Ok(true)
}
