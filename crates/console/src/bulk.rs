use api_types::bulk::{BulkOutcome, BulkRequest};

use crate::{
    client::Api,
    error::{ClientError, ConsoleError},
    resources::Resource,
};

/// Every bulk operation the backend understands, across all panels.
///
/// Which subset a panel offers comes from its [`PanelSpec`]; which ones need
/// an explicit confirmation is fixed policy here, not per call site.
///
/// [`PanelSpec`]: crate::resources::PanelSpec
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulkAction {
    Activate,
    Deactivate,
    Suspend,
    Delete,
    Retry,
    Reconcile,
    MarkSettled,
    Dispute,
}

impl BulkAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Suspend => "suspend",
            Self::Delete => "delete",
            Self::Retry => "retry",
            Self::Reconcile => "reconcile",
            Self::MarkSettled => "mark_settled",
            Self::Dispute => "dispute",
        }
    }

    /// Destructive actions must be confirmed before dispatch.
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::Delete | Self::Suspend | Self::Deactivate)
    }
}

impl std::str::FromStr for BulkAction {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activate" => Ok(Self::Activate),
            "deactivate" => Ok(Self::Deactivate),
            "suspend" => Ok(Self::Suspend),
            "delete" => Ok(Self::Delete),
            "retry" => Ok(Self::Retry),
            "reconcile" => Ok(Self::Reconcile),
            "mark_settled" => Ok(Self::MarkSettled),
            "dispute" => Ok(Self::Dispute),
            other => Err(ConsoleError::Validation(format!(
                "unknown bulk action: '{other}'"
            ))),
        }
    }
}

/// Applies one action to a set of IDs and reports per-item outcomes.
///
/// The remote call is non-atomic across items: a dispatch that partially
/// fails is still a *successful* dispatch whose outcome carries
/// `error_count > 0`. Callers clear the selection and re-fetch afterwards
/// regardless; the optimistic view is never authoritative.
#[derive(Debug)]
pub struct BulkActionDispatcher<A: Api> {
    api: A,
    confirmed: Option<BulkAction>,
    dispatching: bool,
}

impl<A: Api> BulkActionDispatcher<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            confirmed: None,
            dispatching: false,
        }
    }

    /// Records the operator's confirmation for one destructive action. The
    /// confirmation is consumed by the next dispatch of that same action.
    pub fn confirm(&mut self, action: BulkAction) {
        self.confirmed = Some(action);
    }

    pub fn is_dispatching(&self) -> bool {
        self.dispatching
    }

    pub async fn dispatch<R: Resource>(
        &mut self,
        action: BulkAction,
        ids: &[String],
        reason: Option<String>,
    ) -> Result<BulkOutcome, ConsoleError> {
        if self.dispatching {
            return Err(ConsoleError::Busy("bulk dispatch"));
        }
        if ids.is_empty() {
            return Err(ConsoleError::Validation("nothing selected".to_string()));
        }
        if action.is_destructive() && self.confirmed.take() != Some(action) {
            return Err(ConsoleError::ConfirmationRequired(action.as_str()));
        }

        let request = BulkRequest {
            action: action.as_str().to_string(),
            ids: ids.to_vec(),
            reason,
        };

        self.dispatching = true;
        let result = self.api.bulk::<R>(&request).await;
        self.dispatching = false;

        match result {
            Ok(outcome) => {
                if outcome.error_count > 0 {
                    tracing::warn!(
                        resource = R::PATH,
                        action = action.as_str(),
                        failed = outcome.error_count,
                        "bulk dispatch partially failed"
                    );
                }
                Ok(outcome)
            }
            Err(ClientError::Unauthorized) => Err(ConsoleError::SessionExpired),
            Err(err) => Err(err.into()),
        }
    }
}
