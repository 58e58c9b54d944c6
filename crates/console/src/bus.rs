use tokio::sync::broadcast;

/// Session-wide notifications.
///
/// These replace the source's process-global ad-hoc broadcasts with typed
/// messages on an injected channel. Anything panel-local (fetch outcomes,
/// modal transitions) stays off the bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A 401-class response was seen. The session collaborator decides what
    /// happens next; the core only reports it.
    SessionExpired,
    /// A ledger mutation succeeded; every cached view of this account is now
    /// stale and must re-read from the server.
    BalanceChanged { account_id: String },
    /// Ask the panel owning `resource` to re-run its current query.
    RefreshRequested { resource: &'static str },
}

const BUS_CAPACITY: usize = 64;

/// Cloneable sender half of the session bus.
#[derive(Clone, Debug)]
pub struct SessionBus {
    tx: broadcast::Sender<Event>,
}

impl SessionBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Delivers to every live subscriber. A bus with no subscribers is fine;
    /// the event is simply dropped.
    pub fn emit(&self, event: Event) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(?event, "session event dropped, no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_fan_out_to_all_subscribers() {
        let bus = SessionBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.emit(Event::BalanceChanged {
            account_id: "u1".to_string(),
        });

        let expected = Event::BalanceChanged {
            account_id: "u1".to_string(),
        };
        assert_eq!(first.recv().await.unwrap(), expected);
        assert_eq!(second.recv().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_a_no_op() {
        let bus = SessionBus::new();
        bus.emit(Event::SessionExpired);
    }
}
