use kanal::AsyncReceiver;
use tango_types::{EntryRef, QueryEvent};
use tokio_util::sync::CancellationToken;

/// How a fetch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Complete,
    /// The engine aborted the fetch
    Aborted,
    /// Shutdown was requested before the fetch finished
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub rows: Vec<EntryRef>,
    /// Total number of matches, when the count arrived
    pub total: Option<u64>,
    pub outcome: Outcome,
}

/// Collects the events of one fetch until its terminal event.
///
/// The count job is queued before the fetch, so its `Count` arrives first
/// when it succeeds.
pub async fn collect_page(
    events: &AsyncReceiver<QueryEvent>,
    cancel: &CancellationToken,
) -> anyhow::Result<SearchPage> {
    let mut rows = Vec::new();
    let mut total = None;

    let outcome = loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break Outcome::Cancelled,
            event = events.recv() => event?,
        };

        match event {
            QueryEvent::Count(count) => total = Some(count),
            QueryEvent::CountFailed(e) => tracing::warn!("result count unavailable: {e}"),
            QueryEvent::FirstResult => tracing::debug!("first result"),
            QueryEvent::Row(entry) => rows.push(entry),
            QueryEvent::LastResult => break Outcome::Complete,
            QueryEvent::Aborted => break Outcome::Aborted,
            QueryEvent::Error(e) => return Err(e.into()),
        }
    };

    Ok(SearchPage {
        rows,
        total,
        outcome,
    })
}
