use api_types::bulk::BulkOutcome;
use api_types::ledger::LedgerBalance;

use crate::{
    bulk::{BulkAction, BulkActionDispatcher},
    bus::{Event, SessionBus},
    client::Api,
    error::{ClientError, ConsoleError},
    fetcher::{Applied, FetchMessage, ResourceFetcher},
    ledger::{BalanceMutationGuard, Direction, MutationForm},
    modal::{Closed, ModalStack},
    page::ResourcePage,
    query::{QueryState, SortOrder},
    resources::{PanelSpec, Resource},
    selection::SelectionSet,
};

/// Dialogs a panel can stack: a record detail, a credit/debit form opened on
/// top of it, or a destructive-bulk confirmation.
#[derive(Clone, Debug)]
pub enum PanelModal<D> {
    Detail { id: String, detail: D },
    Ledger { form: MutationForm },
    ConfirmBulk { action: BulkAction, count: usize, reason: Option<String> },
}

/// One management panel: the generic console controller every entity view
/// (users, transactions, services, settlements) instantiates instead of
/// re-implementing query/selection/bulk/ledger plumbing per entity.
///
/// Panels are independent of each other. Each owns its fetch tasks and poll
/// timer (torn down on drop) and its own `loading`/`error`/`notice`
/// indicators; a session-wide [`SessionBus`] carries the few cross-panel
/// signals.
pub struct Panel<R: Resource, A: Api> {
    spec: PanelSpec,
    api: A,
    session: SessionBus,
    query: QueryState,
    fetcher: ResourceFetcher<R, A>,
    dispatcher: BulkActionDispatcher<A>,
    guard: BalanceMutationGuard<A>,
    pub selection: SelectionSet,
    pub modals: ModalStack<PanelModal<R::Detail>>,
    pub page: ResourcePage<R::Summary>,
    pub error: Option<String>,
    pub notice: Option<String>,
    session_expired: bool,
}

impl<R: Resource, A: Api> Panel<R, A> {
    pub fn new(api: A, session: SessionBus) -> Self {
        let spec = R::panel_spec();
        Self {
            query: QueryState::new(spec.default_query()),
            fetcher: ResourceFetcher::new(api.clone(), session.clone()),
            dispatcher: BulkActionDispatcher::new(api.clone()),
            guard: BalanceMutationGuard::new(api.clone(), session.clone()),
            selection: SelectionSet::default(),
            modals: ModalStack::default(),
            page: ResourcePage::empty(),
            error: None,
            notice: None,
            session_expired: false,
            spec,
            api,
            session,
        }
    }

    /// Issues the initial fetch and starts the panel's poll timer.
    pub fn start(&mut self) {
        self.fetcher.refresh(self.query.descriptor());
        self.fetcher.set_poll_interval(self.spec.poll_interval);
    }

    /// Overrides the spec's poll cadence; `None` stops polling.
    pub fn set_poll_interval(&mut self, every: Option<std::time::Duration>) {
        self.fetcher.set_poll_interval(every);
    }

    pub fn spec(&self) -> &PanelSpec {
        &self.spec
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.fetcher.is_loading()
    }

    pub fn is_session_expired(&self) -> bool {
        self.session_expired
    }

    // --- query mutations -------------------------------------------------
    //
    // Any descriptor change invalidates the selection outright, even if some
    // IDs would reappear in the new result set.

    pub fn set_search(&mut self, search: &str) {
        self.query.set_search(search);
        self.changed_query();
    }

    pub fn set_filter(&mut self, key: &str, value: &str) {
        self.query.set_filter(key, value);
        self.changed_query();
    }

    pub fn clear_filter(&mut self, key: &str) {
        self.query.clear_filter(key);
        self.changed_query();
    }

    pub fn set_sort(&mut self, field: &str, order: SortOrder) {
        self.query.set_sort(field, order);
        self.changed_query();
    }

    pub fn set_page(&mut self, page: u32) {
        self.query.set_page(page);
        self.changed_query();
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.query.set_page_size(page_size);
        self.changed_query();
    }

    pub fn reset_query(&mut self) {
        self.query.reset();
        self.changed_query();
    }

    fn changed_query(&mut self) {
        self.selection.clear();
        self.fetcher.refresh(self.query.descriptor());
    }

    /// Re-runs the current query without touching the selection; IDs that
    /// disappear from the result are dropped when the page lands.
    pub fn refresh(&mut self) {
        self.fetcher.refresh(self.query.descriptor());
    }

    // --- selection --------------------------------------------------------

    pub fn toggle_selected(&mut self, id: &str) {
        self.selection.toggle(id);
    }

    pub fn select_all(&mut self) {
        let ids: Vec<&str> = self.page.items.iter().map(|item| R::id(item)).collect();
        self.selection.select_all(ids);
    }

    // --- fetch plumbing ---------------------------------------------------

    /// Next fetch-task or poll-timer message; the owning loop feeds it back
    /// into [`Panel::handle_message`].
    pub async fn next_message(&mut self) -> Option<FetchMessage<R::Summary>> {
        self.fetcher.next_message().await
    }

    pub fn handle_message(&mut self, message: FetchMessage<R::Summary>) {
        match self.fetcher.apply(message) {
            Applied::Page(page) => {
                self.selection
                    .retain_present(page.items.iter().map(|item| R::id(item)));
                self.page = page;
                self.error = None;
            }
            Applied::Failed { message } => {
                self.page = ResourcePage::empty();
                self.selection.clear();
                self.error = Some(message);
            }
            Applied::SessionExpired => {
                self.session_expired = true;
                self.error = Some("session expired".to_string());
            }
            Applied::Stale => {}
            Applied::Poll => {
                // A manual fetch already in flight wins over the timer.
                if !self.fetcher.is_loading() && !self.session_expired {
                    self.fetcher.refresh(self.query.descriptor());
                }
            }
        }
    }

    /// Reacts to session-wide events. The owning loop forwards everything;
    /// the panel picks what concerns it.
    pub async fn handle_event(&mut self, event: &Event) {
        match event {
            Event::SessionExpired => {
                self.session_expired = true;
                self.fetcher.set_poll_interval(None);
            }
            Event::BalanceChanged { account_id } => {
                if self.spec.tracks_balances {
                    self.refresh_detail_if_open(account_id).await;
                    self.fetcher.refresh(self.query.descriptor());
                }
            }
            Event::RefreshRequested { resource } => {
                if *resource == R::PATH {
                    self.fetcher.refresh(self.query.descriptor());
                }
            }
        }
    }

    // --- bulk actions -----------------------------------------------------

    /// Dispatches `action` against the current selection.
    ///
    /// A destructive action without a prior confirmation opens the
    /// confirmation dialog and returns `ConfirmationRequired`; call
    /// [`Panel::confirm_pending_bulk`] to proceed. After any dispatch the
    /// selection is cleared and the list re-fetched so it reflects
    /// server-side truth.
    pub async fn dispatch_bulk(
        &mut self,
        action: BulkAction,
        reason: Option<String>,
    ) -> Result<BulkOutcome, ConsoleError> {
        if !self.spec.allows(action) {
            return Err(ConsoleError::Validation(format!(
                "action '{}' is not available for {}",
                action.as_str(),
                R::PATH
            )));
        }

        self.notice = None;
        let ids = self.selection.ids();
        match self.dispatcher.dispatch::<R>(action, &ids, reason.clone()).await {
            Ok(outcome) => {
                self.notice = Some(describe_outcome(action, ids.len(), &outcome));
                self.selection.clear();
                self.fetcher.refresh(self.query.descriptor());
                Ok(outcome)
            }
            Err(ConsoleError::ConfirmationRequired(name)) => {
                self.modals.push(PanelModal::ConfirmBulk {
                    action,
                    count: ids.len(),
                    reason,
                });
                Err(ConsoleError::ConfirmationRequired(name))
            }
            Err(ConsoleError::SessionExpired) => {
                self.session_expired = true;
                self.error = Some("session expired".to_string());
                Err(ConsoleError::SessionExpired)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Confirms and re-dispatches the action held by the open confirmation
    /// dialog.
    pub async fn confirm_pending_bulk(&mut self) -> Result<BulkOutcome, ConsoleError> {
        let Some(PanelModal::ConfirmBulk { action, reason, .. }) = self.modals.current() else {
            return Err(ConsoleError::Validation(
                "no bulk confirmation pending".to_string(),
            ));
        };
        let action = *action;
        let reason = reason.clone();

        // The confirmation dialog closes either way; a failed dispatch
        // reports through error, not through a lingering dialog.
        self.modals.cancel();
        self.dispatcher.confirm(action);
        self.dispatch_bulk(action, reason).await
    }

    // --- detail / ledger dialogs -----------------------------------------

    /// Fetches the full record and opens it as the top dialog.
    pub async fn open_detail(&mut self, id: &str) -> Result<(), ConsoleError> {
        match self.api.detail::<R>(id).await {
            Ok(detail) => {
                self.modals.push(PanelModal::Detail {
                    id: id.to_string(),
                    detail,
                });
                Ok(())
            }
            Err(ClientError::Unauthorized) => {
                self.session_expired = true;
                self.session.emit(Event::SessionExpired);
                Err(ConsoleError::SessionExpired)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Opens a credit/debit form on top of the currently open detail dialog.
    pub fn open_ledger_form(&mut self, direction: Direction) -> Result<(), ConsoleError> {
        let Some(PanelModal::Detail { id, .. }) = self.modals.current() else {
            return Err(ConsoleError::Validation(
                "open an account detail before mutating its balance".to_string(),
            ));
        };
        let form = MutationForm::new(id, direction);
        self.modals.push(PanelModal::Ledger { form });
        Ok(())
    }

    /// The open form, for the dialog to bind its inputs to.
    pub fn ledger_form_mut(&mut self) -> Option<&mut MutationForm> {
        match self.modals.current_mut() {
            Some(PanelModal::Ledger { form }) => Some(form),
            _ => None,
        }
    }

    /// Submits the open credit/debit form.
    ///
    /// On success the form closes and both the restored detail dialog and
    /// the list are re-read from the server; the returned balance is the
    /// server's, not a local computation. On failure the form stays open
    /// with the error surfaced — nothing is retried automatically.
    pub async fn submit_ledger(
        &mut self,
        current_balance_minor: i64,
    ) -> Result<LedgerBalance, ConsoleError> {
        let Some(PanelModal::Ledger { form }) = self.modals.current() else {
            return Err(ConsoleError::Validation(
                "no credit/debit form open".to_string(),
            ));
        };
        let form = form.clone();

        match self.guard.submit(&form, current_balance_minor).await {
            Ok(balance) => {
                let refresh_parent = matches!(
                    self.modals.submit(),
                    Some(Closed::Restored { refresh: true, .. })
                );
                if refresh_parent {
                    self.refresh_detail_if_open(&form.account_id).await;
                }
                self.fetcher.refresh(self.query.descriptor());
                self.notice = Some(format!(
                    "{} of {} applied to {}",
                    form.direction.as_str(),
                    form.amount.trim(),
                    form.account_id
                ));
                Ok(balance)
            }
            Err(ConsoleError::SessionExpired) => {
                self.session_expired = true;
                self.error = Some("session expired".to_string());
                Err(ConsoleError::SessionExpired)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Closes the top dialog without completing it.
    pub fn cancel_modal(&mut self) {
        self.modals.cancel();
    }

    async fn refresh_detail_if_open(&mut self, account_id: &str) {
        let showing = matches!(
            self.modals.current(),
            Some(PanelModal::Detail { id, .. }) if id == account_id
        );
        if !showing {
            return;
        }
        match self.api.detail::<R>(account_id).await {
            Ok(fresh) => {
                if let Some(PanelModal::Detail { detail, .. }) = self.modals.current_mut() {
                    *detail = fresh;
                }
            }
            Err(err) => {
                tracing::warn!(resource = R::PATH, error = %err, "detail refresh failed");
                self.error = Some(err.to_string());
            }
        }
    }
}

fn describe_outcome(action: BulkAction, total: usize, outcome: &BulkOutcome) -> String {
    if outcome.error_count == 0 {
        format!("{}: {} of {total} succeeded", action.as_str(), outcome.success_count)
    } else {
        format!(
            "{}: {} of {total} succeeded, {} failed",
            action.as_str(),
            outcome.success_count,
            outcome.error_count
        )
    }
}
