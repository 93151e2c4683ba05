// Result broadcaster.
//
// Fan-out of completed answers (and failure notifications) to every
// subscriber connected at publish time. Built on tokio's broadcast
// channel: the receiver set is snapshotted at send, so subscribers
// connecting and disconnecting concurrently with job processing is safe.
// Best effort only; late joiners backfill from the record store and slow
// readers may observe a lag error instead of old events.

use tokio::sync::broadcast;
use tracing::debug;

use crate::models::ResultEvent;

pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct ResultBroadcaster {
    tx: broadcast::Sender<ResultEvent>,
}

impl Default for ResultBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ResultBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Deliver an event to all current subscribers. Having no subscribers
    /// is not an error; the event is simply dropped.
    pub fn publish(&self, event: ResultEvent) {
        match self.tx.send(event) {
            Ok(n) => debug!(subscribers = n, "result event published"),
            Err(_) => debug!("result event dropped, no subscribers"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ResultEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Answer, Job};

    fn event() -> ResultEvent {
        let job = Job::new("alice", "What is this?", vec![]);
        ResultEvent::Answer(Answer::fresh(&job, "an answer".into(), "gpt-4o-mini".into()))
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let broadcaster = ResultBroadcaster::new(8);
        let mut rx = broadcaster.subscribe();

        broadcaster.publish(event());

        match rx.recv().await.unwrap() {
            ResultEvent::Answer(answer) => assert_eq!(answer.user, "alice"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_all_subscribers_receive_the_event() {
        let broadcaster = ResultBroadcaster::new(8);
        let mut a = broadcaster.subscribe();
        let mut b = broadcaster.subscribe();

        broadcaster.publish(event());

        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let broadcaster = ResultBroadcaster::new(8);
        let mut early = broadcaster.subscribe();

        broadcaster.publish(event());
        let mut late = broadcaster.subscribe();
        broadcaster.publish(event());

        // early sees both, late only the one published after subscribing
        assert!(early.recv().await.is_ok());
        assert!(early.recv().await.is_ok());
        assert!(late.recv().await.is_ok());
        assert!(late.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_panic() {
        let broadcaster = ResultBroadcaster::new(8);
        broadcaster.publish(event());
        assert_eq!(broadcaster.subscriber_count(), 0);
    }
}
