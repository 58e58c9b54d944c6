use std::marker::PhantomData;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{
    bus::{Event, SessionBus},
    client::Api,
    error::ClientError,
    page::ResourcePage,
    query::QueryDescriptor,
    resources::Resource,
};

/// Message delivered to the panel loop by a fetch task or the poll timer.
#[derive(Debug)]
pub enum FetchMessage<T> {
    Outcome {
        /// Sequence number of the request this response answers.
        seq: u64,
        result: Result<ResourcePage<T>, ClientError>,
    },
    /// The poll timer fired; re-fetch with the *current* descriptor.
    PollTick,
}

/// What applying a message means for the panel.
#[derive(Debug)]
pub enum Applied<T> {
    Page(ResourcePage<T>),
    /// Fetch failed: show the message, fall back to an empty page rather
    /// than leaving stale rows displayed as current.
    Failed { message: String },
    SessionExpired,
    /// Response answered a superseded request; nothing changes.
    Stale,
    Poll,
}

/// Executes list queries for one resource, with polling and stale-response
/// suppression.
///
/// Every `refresh` bumps a sequence number and spawns the request; the task
/// reports back over an internal channel and `apply` discards any outcome
/// whose sequence is no longer current. Requests are therefore applied
/// last-issued-wins no matter the arrival order. Dropping the fetcher aborts
/// the in-flight task and the poll timer.
#[derive(Debug)]
pub struct ResourceFetcher<R: Resource, A: Api> {
    api: A,
    session: SessionBus,
    tx: mpsc::UnboundedSender<FetchMessage<R::Summary>>,
    rx: mpsc::UnboundedReceiver<FetchMessage<R::Summary>>,
    seq: u64,
    loading: bool,
    in_flight: Option<JoinHandle<()>>,
    poll_task: Option<JoinHandle<()>>,
    _resource: PhantomData<R>,
}

impl<R: Resource, A: Api> ResourceFetcher<R, A> {
    pub fn new(api: A, session: SessionBus) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            session,
            tx,
            rx,
            seq: 0,
            loading: false,
            in_flight: None,
            poll_task: None,
            _resource: PhantomData,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Sequence number of the most recently issued request.
    pub fn current_seq(&self) -> u64 {
        self.seq
    }

    /// Issues a fetch for `descriptor`, superseding any request still in
    /// flight (its response will be discarded on arrival).
    pub fn refresh(&mut self, descriptor: &QueryDescriptor) {
        self.seq += 1;
        let seq = self.seq;
        self.loading = true;

        if let Some(task) = self.in_flight.take() {
            task.abort();
        }

        let api = self.api.clone();
        let tx = self.tx.clone();
        let query = descriptor.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = api.list::<R>(&query).await;
            let _ = tx.send(FetchMessage::Outcome { seq, result });
        }));
    }

    /// Starts (or restarts) the poll timer; `None` stops it. Ticks carry no
    /// descriptor on purpose: the panel re-reads its current query state, so
    /// a filter change mid-interval is picked up by the next tick.
    pub fn set_poll_interval(&mut self, every: Option<Duration>) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        let Some(every) = every else {
            return;
        };

        let tx = self.tx.clone();
        self.poll_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; swallow it so the timer
            // only fires after a full interval.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.send(FetchMessage::PollTick).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn is_polling(&self) -> bool {
        self.poll_task.is_some()
    }

    /// Next message from the fetch tasks or the poll timer. Cancel-safe.
    pub async fn next_message(&mut self) -> Option<FetchMessage<R::Summary>> {
        self.rx.recv().await
    }

    pub fn apply(&mut self, message: FetchMessage<R::Summary>) -> Applied<R::Summary> {
        match message {
            FetchMessage::PollTick => Applied::Poll,
            FetchMessage::Outcome { seq, result } => {
                if seq != self.seq {
                    // A newer request was issued after this one; `loading`
                    // stays set for it.
                    tracing::debug!(
                        resource = R::PATH,
                        got = seq,
                        current = self.seq,
                        "discarding stale response"
                    );
                    return Applied::Stale;
                }

                self.loading = false;
                self.in_flight = None;

                match result {
                    Ok(page) => Applied::Page(page),
                    Err(ClientError::Unauthorized) => {
                        self.session.emit(Event::SessionExpired);
                        Applied::SessionExpired
                    }
                    Err(err) => {
                        tracing::warn!(resource = R::PATH, error = %err, "fetch failed");
                        Applied::Failed {
                            message: err.to_string(),
                        }
                    }
                }
            }
        }
    }
}

impl<R: Resource, A: Api> Drop for ResourceFetcher<R, A> {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }
}
