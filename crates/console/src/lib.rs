pub use bulk::{BulkAction, BulkActionDispatcher};
pub use bus::{Event, SessionBus};
pub use client::{Api, Client};
pub use error::{ClientError, ConsoleError, Result};
pub use fetcher::{Applied, FetchMessage, ResourceFetcher};
pub use ledger::{BalanceMutationGuard, Direction, MutationForm};
pub use modal::{Closed, ModalStack};
pub use money::Amount;
pub use page::ResourcePage;
pub use panel::{Panel, PanelModal};
pub use query::{QueryDescriptor, QueryState, SortOrder};
pub use resources::{PanelSpec, Resource, Services, Settlements, Transactions, Users};
pub use selection::SelectionSet;

mod bulk;
mod bus;
mod client;
mod error;
mod fetcher;
mod ledger;
mod modal;
mod money;
mod page;
mod panel;
mod query;
mod resources;
mod selection;
