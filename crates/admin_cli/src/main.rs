use std::{error::Error, io::Write, time::Duration};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use uuid::Uuid;

use api_types::{
    service::ServiceSummary, settlement::SettlementSummary, transaction::TransactionSummary,
    user::UserSummary,
};
use console::{
    Api, BalanceMutationGuard, BulkAction, BulkActionDispatcher, Client, Direction, FetchMessage,
    MutationForm, Panel, QueryState, Resource, ResourcePage, Services, SessionBus, Settlements,
    SortOrder, Transactions, Users,
};

const DEFAULT_CONFIG_PATH: &str = "config/admin.toml";

type CliResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct AppConfig {
    base_url: String,
    token: String,
    level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            token: String::new(),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ricarica_admin")]
#[command(about = "Operations console for the Ricarica admin backend")]
struct Cli {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long)]
    base_url: Option<String>,
    /// Bearer token (never logged).
    #[arg(long, env = "RICARICA_ADMIN_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List a page of a resource.
    List(ListArgs),
    /// Show one record in full.
    Show(ShowArgs),
    /// Apply a bulk action to explicit ids.
    Bulk(BulkArgs),
    /// Credit an account wallet.
    Credit(LedgerArgs),
    /// Debit an account wallet.
    Debit(LedgerArgs),
    /// Follow a resource, re-fetching on its poll cadence.
    Watch(WatchArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ResourceArg {
    Users,
    Transactions,
    Services,
    Settlements,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(value_enum)]
    resource: ResourceArg,
    #[arg(long)]
    search: Option<String>,
    /// Filter as key=value; repeatable.
    #[arg(long = "filter")]
    filters: Vec<String>,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    page_size: Option<u32>,
    #[arg(long)]
    sort: Option<String>,
    #[arg(long, value_enum, default_value = "desc")]
    order: OrderArg,
}

#[derive(Debug, Args)]
struct ShowArgs {
    #[arg(value_enum)]
    resource: ResourceArg,
    id: String,
}

#[derive(Debug, Args)]
struct BulkArgs {
    #[arg(value_enum)]
    resource: ResourceArg,
    /// Action name as the backend knows it (e.g. suspend, retry).
    action: String,
    #[arg(long, value_delimiter = ',', required = true)]
    ids: Vec<String>,
    #[arg(long)]
    reason: Option<String>,
    /// Skip the interactive confirmation for destructive actions.
    #[arg(long)]
    yes: bool,
}

#[derive(Debug, Args)]
struct LedgerArgs {
    /// Account (user) id.
    account: String,
    /// Amount in major units, e.g. 10.50.
    #[arg(long)]
    amount: String,
    #[arg(long)]
    reason: String,
    #[arg(long)]
    reference: Option<Uuid>,
}

#[derive(Debug, Args)]
struct WatchArgs {
    #[arg(value_enum)]
    resource: ResourceArg,
    /// Override the poll interval, in seconds.
    #[arg(long)]
    every: Option<u64>,
}

macro_rules! with_resource {
    ($resource:expr, $R:ident, $body:expr) => {
        match $resource {
            ResourceArg::Users => {
                type $R = Users;
                $body
            }
            ResourceArg::Transactions => {
                type $R = Transactions;
                $body
            }
            ResourceArg::Services => {
                type $R = Services;
                $body
            }
            ResourceArg::Settlements => {
                type $R = Settlements;
                $body
            }
        }
    };
}

fn load_config(cli: &Cli) -> Result<AppConfig, config::ConfigError> {
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("RICARICA_ADMIN"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(token) = &cli.token {
        settings.token = token.clone();
    }

    Ok(settings)
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let settings = load_config(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "admin_cli={level},console={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    if settings.token.is_empty() {
        return Err("missing bearer token (use --token or RICARICA_ADMIN_TOKEN)".into());
    }
    let client = Client::new(&settings.base_url, &settings.token)?;

    match cli.command {
        Command::List(args) => {
            with_resource!(args.resource, R, run_list::<R>(client, &args).await)?;
        }
        Command::Show(args) => {
            with_resource!(args.resource, R, run_show::<R>(client, &args.id).await)?;
        }
        Command::Bulk(args) => {
            with_resource!(args.resource, R, run_bulk::<R>(client, &args).await)?;
        }
        Command::Credit(args) => run_ledger(client, Direction::Credit, &args).await?,
        Command::Debit(args) => run_ledger(client, Direction::Debit, &args).await?,
        Command::Watch(args) => {
            with_resource!(args.resource, R, run_watch::<R>(client, &args).await)?;
        }
    }

    Ok(())
}

async fn run_list<R: Resource>(client: Client, args: &ListArgs) -> CliResult<()>
where
    R::Summary: Row,
{
    let mut query = QueryState::new(R::panel_spec().default_query());
    if let Some(search) = &args.search {
        query.set_search(search);
    }
    for raw in &args.filters {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| format!("invalid filter '{raw}', expected key=value"))?;
        query.set_filter(key, value);
    }
    if let Some(sort) = &args.sort {
        query.set_sort(sort, args.order.into());
    }
    if let Some(page_size) = args.page_size {
        query.set_page_size(page_size);
    }
    // Last: everything above resets the page.
    if let Some(page) = args.page {
        query.set_page(page);
    }

    let page = client.list::<R>(query.descriptor()).await?;
    print_page::<R>(&page);
    Ok(())
}

async fn run_show<R: Resource>(client: Client, id: &str) -> CliResult<()>
where
    R::Detail: serde::Serialize,
{
    let detail = client.detail::<R>(id).await?;
    println!("{}", serde_json::to_string_pretty(&detail)?);
    Ok(())
}

async fn run_bulk<R: Resource>(client: Client, args: &BulkArgs) -> CliResult<()> {
    let action: BulkAction = args.action.parse()?;
    if !R::panel_spec().allows(action) {
        return Err(format!("action '{}' is not available for {}", args.action, R::PATH).into());
    }

    let mut dispatcher = BulkActionDispatcher::new(client);
    if action.is_destructive() {
        if !args.yes && !confirm_on_stdin(action, args.ids.len())? {
            eprintln!("aborted");
            std::process::exit(1);
        }
        dispatcher.confirm(action);
    }

    let outcome = dispatcher
        .dispatch::<R>(action, &args.ids, args.reason.clone())
        .await?;

    println!(
        "{}: {} succeeded, {} failed",
        action.as_str(),
        outcome.success_count,
        outcome.error_count
    );
    for (id, error) in &outcome.per_item_errors {
        eprintln!("  {id}: {error}");
    }
    if outcome.error_count > 0 {
        std::process::exit(3);
    }
    Ok(())
}

async fn run_ledger(client: Client, direction: Direction, args: &LedgerArgs) -> CliResult<()> {
    // The debit guard needs the live balance; read it from the server of
    // record rather than trusting the caller.
    let account = client.detail::<Users>(&args.account).await?;

    let mut guard = BalanceMutationGuard::new(client, SessionBus::new());
    let form = MutationForm {
        account_id: args.account.clone(),
        direction,
        amount: args.amount.clone(),
        reason: args.reason.clone(),
        reference: args.reference,
    };

    let balance = guard.submit(&form, account.wallet_balance_minor).await?;
    println!(
        "{} applied to {}; balance now {}",
        direction.as_str(),
        balance.account_id,
        fmt_minor(balance.balance_minor)
    );
    Ok(())
}

async fn run_watch<R: Resource>(client: Client, args: &WatchArgs) -> CliResult<()>
where
    R::Summary: Row,
{
    let bus = SessionBus::new();
    let mut events = bus.subscribe();
    let mut panel: Panel<R, Client> = Panel::new(client, bus);
    panel.start();
    if let Some(secs) = args.every {
        panel.set_poll_interval(Some(Duration::from_secs(secs.max(1))));
    }
    tracing::info!(resource = R::PATH, "watching; Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            maybe = panel.next_message() => {
                let Some(message) = maybe else { break };
                let applied_fetch = matches!(message, FetchMessage::Outcome { .. });
                panel.handle_message(message);
                if applied_fetch {
                    match &panel.error {
                        Some(error) => eprintln!("fetch failed: {error}"),
                        None => print_page::<R>(&panel.page),
                    }
                }
                if panel.is_session_expired() {
                    return Err("session expired".into());
                }
            }
            event = events.recv() => {
                if let Ok(event) = event {
                    panel.handle_event(&event).await;
                    if panel.is_session_expired() {
                        return Err("session expired".into());
                    }
                }
            }
        }
    }

    Ok(())
}

fn confirm_on_stdin(action: BulkAction, count: usize) -> CliResult<bool> {
    let mut out = std::io::stderr();
    write!(
        out,
        "{} {count} item(s)? Type '{}' to proceed: ",
        action.as_str(),
        action.as_str()
    )?;
    out.flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim() == action.as_str())
}

fn print_page<R: Resource>(page: &ResourcePage<R::Summary>)
where
    R::Summary: Row,
{
    println!("{}", <R::Summary as Row>::header());
    for item in &page.items {
        println!("{}", item.row());
    }
    println!(
        "page {}/{} ({} total)",
        page.page, page.total_pages, page.total_count
    );
}

fn fmt_minor(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Fixed-width table row for a list summary.
trait Row {
    fn header() -> String;
    fn row(&self) -> String;
}

impl Row for UserSummary {
    fn header() -> String {
        format!(
            "{:<14} {:<16} {:<14} {:<10} {:>12}  created",
            "id", "username", "phone", "status", "balance"
        )
    }

    fn row(&self) -> String {
        format!(
            "{:<14} {:<16} {:<14} {:<10} {:>12}  {}",
            self.id,
            self.username,
            self.phone,
            self.status.as_str(),
            fmt_minor(self.wallet_balance_minor),
            self.created_at.format("%Y-%m-%d")
        )
    }
}

impl Row for TransactionSummary {
    fn header() -> String {
        format!(
            "{:<14} {:<14} {:<12} {:<12} {:<10} {:>12}  created",
            "id", "user", "service", "kind", "status", "amount"
        )
    }

    fn row(&self) -> String {
        format!(
            "{:<14} {:<14} {:<12} {:<12} {:<10} {:>12}  {}",
            self.id,
            self.user_id,
            self.service_code,
            self.kind.as_str(),
            self.status.as_str(),
            fmt_minor(self.amount_minor),
            self.created_at.format("%Y-%m-%d %H:%M")
        )
    }
}

impl Row for ServiceSummary {
    fn header() -> String {
        format!(
            "{:<14} {:<12} {:<24} {:<12} {:<12} provider",
            "id", "code", "name", "category", "status"
        )
    }

    fn row(&self) -> String {
        format!(
            "{:<14} {:<12} {:<24} {:<12} {:<12} {}",
            self.id,
            self.code,
            self.name,
            self.category.as_str(),
            self.status.as_str(),
            self.provider
        )
    }
}

impl Row for SettlementSummary {
    fn header() -> String {
        format!(
            "{:<14} {:<12} {:<12} {:>12} {:>12} {:>12}  period",
            "id", "provider", "status", "gross", "fees", "net"
        )
    }

    fn row(&self) -> String {
        format!(
            "{:<14} {:<12} {:<12} {:>12} {:>12} {:>12}  {}..{}",
            self.id,
            self.provider,
            self.status.as_str(),
            fmt_minor(self.gross_minor),
            fmt_minor(self.fees_minor),
            fmt_minor(self.net_minor),
            self.period_start.format("%Y-%m-%d"),
            self.period_end.format("%Y-%m-%d")
        )
    }
}
