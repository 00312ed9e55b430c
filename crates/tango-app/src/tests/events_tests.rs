use std::time::Duration;

use tango_types::{EntryRef, FetchError, QueryEvent};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::events::{Outcome, collect_page};

#[tokio::test]
async fn test_page_with_count() {
    let (tx, rx) = kanal::unbounded_async::<QueryEvent>();
    for event in [
        QueryEvent::Count(12),
        QueryEvent::FirstResult,
        QueryEvent::Row(EntryRef::word(1)),
        QueryEvent::Row(EntryRef::kanji(0x732B)),
        QueryEvent::LastResult,
    ] {
        tx.send(event).await.unwrap();
    }

    let page = collect_page(&rx, &CancellationToken::new()).await.unwrap();
    assert_eq!(page.outcome, Outcome::Complete);
    assert_eq!(page.total, Some(12));
    assert_eq!(
        page.rows,
        vec![EntryRef::word(1), EntryRef::kanji(0x732B)]
    );
}

#[tokio::test]
async fn test_page_stops_at_the_terminal_event() {
    let (tx, rx) = kanal::unbounded_async::<QueryEvent>();
    for event in [
        QueryEvent::CountFailed(FetchError::ExecutionFailed("busy".into())),
        QueryEvent::FirstResult,
        QueryEvent::Aborted,
        QueryEvent::FirstResult,
        QueryEvent::Row(EntryRef::word(2)),
        QueryEvent::LastResult,
    ] {
        tx.send(event).await.unwrap();
    }

    let page = collect_page(&rx, &CancellationToken::new()).await.unwrap();
    assert_eq!(page.outcome, Outcome::Aborted);
    assert_eq!(page.total, None);
    assert!(page.rows.is_empty());

    // The next fetch's events are still queued
    let next = collect_page(&rx, &CancellationToken::new()).await.unwrap();
    assert_eq!(next.rows, vec![EntryRef::word(2)]);
}

#[tokio::test]
async fn test_fetch_error_is_returned() {
    let (tx, rx) = kanal::unbounded_async::<QueryEvent>();
    tx.send(QueryEvent::FirstResult).await.unwrap();
    tx.send(QueryEvent::Error(FetchError::ExecutionFailed("disk I/O error".into())))
        .await
        .unwrap();

    let err = collect_page(&rx, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("disk I/O error"));
}

#[tokio::test]
async fn test_cancel_while_waiting() {
    let (_tx, rx) = kanal::unbounded_async::<QueryEvent>();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let page = timeout(Duration::from_secs(2), collect_page(&rx, &cancel))
        .await
        .expect("cancellation was not observed")
        .unwrap();
    assert_eq!(page.outcome, Outcome::Cancelled);
}

#[tokio::test]
async fn test_closed_channel_is_an_error() {
    let (tx, rx) = kanal::unbounded_async::<QueryEvent>();
    drop(tx);
    assert!(collect_page(&rx, &CancellationToken::new()).await.is_err());
}
