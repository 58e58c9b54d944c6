use std::time::Duration;

use serde::de::DeserializeOwned;

use api_types::{service, settlement, transaction, user};

use crate::{
    bulk::BulkAction,
    query::{QueryDescriptor, SortOrder},
};

/// One entity type exposed by the admin backend.
///
/// A panel is generic over its resource; everything entity-specific (wire
/// types, endpoint path, filter schema, permitted actions, poll cadence)
/// lives in the implementation.
pub trait Resource: Send + Sync + 'static {
    /// List row.
    type Summary: DeserializeOwned + Clone + Send + 'static;
    /// Full record behind a detail dialog, richer than the list row.
    type Detail: DeserializeOwned + Clone + Send + 'static;

    /// Path segment under the API base URL.
    const PATH: &'static str;

    fn id(summary: &Self::Summary) -> &str;

    fn panel_spec() -> PanelSpec;
}

/// Static panel parameterization: filter schema, default sort, permitted
/// bulk actions, poll cadence.
#[derive(Clone, Copy, Debug)]
pub struct PanelSpec {
    pub sort_field: &'static str,
    pub sort_order: SortOrder,
    pub page_size: u32,
    pub filter_keys: &'static [&'static str],
    pub actions: &'static [BulkAction],
    /// `None` disables polling for the panel.
    pub poll_interval: Option<Duration>,
    /// Panels that display wallet balances re-fetch when one changes.
    pub tracks_balances: bool,
}

impl PanelSpec {
    pub fn default_query(&self) -> QueryDescriptor {
        QueryDescriptor::new(self.sort_field, self.sort_order, self.page_size)
    }

    pub fn allows(&self, action: BulkAction) -> bool {
        self.actions.contains(&action)
    }
}

pub struct Users;

impl Resource for Users {
    type Summary = user::UserSummary;
    type Detail = user::UserDetail;

    const PATH: &'static str = "users";

    fn id(summary: &Self::Summary) -> &str {
        &summary.id
    }

    fn panel_spec() -> PanelSpec {
        PanelSpec {
            sort_field: "createdAt",
            sort_order: SortOrder::Desc,
            page_size: 20,
            filter_keys: &["status", "kycLevel"],
            actions: &[BulkAction::Activate, BulkAction::Suspend, BulkAction::Delete],
            poll_interval: Some(Duration::from_secs(120)),
            tracks_balances: true,
        }
    }
}

pub struct Transactions;

impl Resource for Transactions {
    type Summary = transaction::TransactionSummary;
    type Detail = transaction::TransactionDetail;

    const PATH: &'static str = "transactions";

    fn id(summary: &Self::Summary) -> &str {
        &summary.id
    }

    fn panel_spec() -> PanelSpec {
        PanelSpec {
            sort_field: "createdAt",
            sort_order: SortOrder::Desc,
            page_size: 50,
            filter_keys: &["status", "kind", "serviceCode"],
            actions: &[BulkAction::Retry],
            // The activity feed is the most volatile view.
            poll_interval: Some(Duration::from_secs(30)),
            tracks_balances: false,
        }
    }
}

pub struct Services;

impl Resource for Services {
    type Summary = service::ServiceSummary;
    type Detail = service::ServiceDetail;

    const PATH: &'static str = "services";

    fn id(summary: &Self::Summary) -> &str {
        &summary.id
    }

    fn panel_spec() -> PanelSpec {
        PanelSpec {
            sort_field: "name",
            sort_order: SortOrder::Asc,
            page_size: 25,
            filter_keys: &["status", "category"],
            actions: &[
                BulkAction::Activate,
                BulkAction::Deactivate,
                BulkAction::Delete,
            ],
            // The catalog barely moves.
            poll_interval: Some(Duration::from_secs(300)),
            tracks_balances: false,
        }
    }
}

pub struct Settlements;

impl Resource for Settlements {
    type Summary = settlement::SettlementSummary;
    type Detail = settlement::SettlementDetail;

    const PATH: &'static str = "settlements";

    fn id(summary: &Self::Summary) -> &str {
        &summary.id
    }

    fn panel_spec() -> PanelSpec {
        PanelSpec {
            sort_field: "periodEnd",
            sort_order: SortOrder::Desc,
            page_size: 20,
            filter_keys: &["status", "provider"],
            actions: &[
                BulkAction::Reconcile,
                BulkAction::MarkSettled,
                BulkAction::Dispute,
            ],
            poll_interval: Some(Duration::from_secs(60)),
            tracks_balances: false,
        }
    }
}
