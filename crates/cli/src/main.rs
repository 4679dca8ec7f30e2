//! CLI entry point for barber-queue.
//!
//! A terminal client for the walk-in barbershop queue service.

mod config;
mod logging;
mod prompt;
mod session;
mod view;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use queue_client::{HttpClient, QueueApi};
use queue_sync::{ActionDispatcher, ActionError, Page, Prompter, Snapshot, SnapshotStore};
use queue_types::{BarberForm, JoinForm};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use crate::config::AppConfig;
use crate::prompt::TerminalPrompter;
use crate::session::{SessionPrompter, ViewCommand};

/// barber-queue: walk-in queue client for a barbershop
#[derive(Parser)]
#[command(name = "barber-queue")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the queue service (overrides the config file)
    #[arg(long, global = true, env = "BARBER_QUEUE_API_URL")]
    api_url: Option<String>,

    /// Config file path (default: ~/.barber-queue/config.toml)
    #[arg(long, global = true, env = "BARBER_QUEUE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the customer page, refreshing every few seconds; type `help` for commands
    Customer {
        /// Fetch and render once, then exit
        #[arg(long)]
        once: bool,
    },

    /// Show the shop dashboard, refreshing every few seconds; type `help` for commands
    Dashboard {
        /// Fetch and render once, then exit
        #[arg(long)]
        once: bool,
    },

    /// Open a page by route ("/" or "/dashboard"); unknown routes show the customer page
    View {
        /// Route path
        #[arg(default_value = "/")]
        path: String,

        /// Fetch and render once, then exit
        #[arg(long)]
        once: bool,
    },

    /// Join the queue
    Join {
        /// Customer name
        #[arg(short, long)]
        name: String,

        /// Service type (Haircut, Shave, "Haircut & Shave", "Hair Coloring", Styling)
        #[arg(short, long, default_value = "Haircut")]
        service: String,
    },

    /// List the available service types
    Services,

    /// List all barbers
    Barbers,

    /// Add, edit or delete a barber
    Barber {
        #[command(subcommand)]
        action: BarberCommand,
    },

    /// Assign the next waiting customer to a barber
    CallNext {
        /// Barber ID
        barber_id: String,
    },

    /// Finish the service for a customer in progress
    Complete {
        /// Queue entry ID
        entry_id: String,
    },

    /// Remove a customer from the queue
    Remove {
        /// Queue entry ID
        entry_id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Populate the shop with demo barbers and customers
    Seed,

    /// Delete every queue entry and every barber
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum BarberCommand {
    /// Add a new barber
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        /// Chair number
        #[arg(long)]
        chair: String,
    },

    /// Edit an existing barber; omitted fields keep their current value
    Edit {
        /// Barber ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Chair number
        #[arg(long)]
        chair: Option<String>,
    },

    /// Delete a barber
    Delete {
        /// Barber ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(start());
    // A pending stdin read would otherwise hold shutdown open after Ctrl-C
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn start() -> Result<()> {
    logging::init_tracing()?;
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&config_path)?.with_api_url(cli.api_url);
    info!(api_url = %config.api_url, "Using queue service");

    let api = Arc::new(HttpClient::new(config.client_config()).context("Invalid API URL")?);
    run(cli.command, api, &config).await
}

async fn run<A>(command: Commands, api: Arc<A>, config: &AppConfig) -> Result<()>
where
    A: QueueApi + ?Sized + 'static,
{
    match command {
        Commands::Customer { once } => open_page(api, Page::Customer, config, once).await?,
        Commands::Dashboard { once } => open_page(api, Page::Dashboard, config, once).await?,
        Commands::View { path, once } => {
            open_page(api, Page::from_path(&path), config, once).await?;
        }
        Commands::Join { name, service } => {
            let dispatcher = dispatcher(api, false);
            let entry = finish(dispatcher.join_queue(&JoinForm::new(name, service)).await)?;
            if let Some(entry) = entry {
                println!(
                    "{} joined the queue at position {} (ID: {})",
                    entry.customer_name, entry.position, entry.id
                );
            }
        }
        Commands::Services => {
            println!("{}", view::render_services());
        }
        Commands::Barbers => {
            list_barbers(api.as_ref()).await?;
        }
        Commands::Barber { action } => {
            run_barber(api, action).await?;
        }
        Commands::CallNext { barber_id } => {
            let dispatcher = dispatcher(api, false);
            load(&dispatcher).await?;
            if let Some(entry) = finish(dispatcher.call_next(&barber_id).await)? {
                println!("Now serving {} ({})", entry.customer_name, entry.service_type);
            }
        }
        Commands::Complete { entry_id } => {
            let dispatcher = dispatcher(api, false);
            load(&dispatcher).await?;
            if let Some(entry) = finish(dispatcher.complete_service(&entry_id).await)? {
                println!("Completed service for {}", entry.customer_name);
            }
        }
        Commands::Remove { entry_id, yes } => {
            let dispatcher = dispatcher(api, yes);
            if finish(dispatcher.remove_from_queue(&entry_id).await)?.is_some() {
                println!("Removed {entry_id} from the queue");
            }
        }
        Commands::Seed => {
            let summary = demo_seed::seed_demo_data(api.as_ref())
                .await
                .context("Error seeding demo data")?;
            println!("Demo data seeded successfully!");
            println!("  Barbers: {}", summary.barbers);
            println!("  Customers in queue: {}", summary.customers);
        }
        Commands::Clear { yes } => {
            let prompter = TerminalPrompter::new(yes);
            match demo_seed::clear_all_data(api.as_ref(), &prompter).await {
                Ok(summary) => {
                    println!("All data cleared successfully!");
                    println!("  Deleted queue entries: {}", summary.queue_entries);
                    println!("  Deleted barbers: {}", summary.barbers);
                }
                Err(demo_seed::SeedError::Cancelled) => println!("Cancelled by user"),
                Err(e) => return Err(e).context("Error clearing data"),
            }
        }
    }

    Ok(())
}

async fn run_barber<A>(api: Arc<A>, action: BarberCommand) -> Result<()>
where
    A: QueueApi + ?Sized + 'static,
{
    match action {
        BarberCommand::Add { name, phone, chair } => {
            let dispatcher = dispatcher(api, false);
            let form = BarberForm::new(name, phone, chair);
            if let Some(barber) = finish(dispatcher.save_barber(None, &form).await)? {
                println!("Added barber {} (ID: {})", barber.name, barber.id);
            }
        }
        BarberCommand::Edit {
            id,
            name,
            phone,
            chair,
        } => {
            let existing = api
                .get_barber(&id)
                .await
                .with_context(|| format!("Failed to load barber {id}"))?;
            let mut form = BarberForm::from_barber(&existing);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(phone) = phone {
                form.phone = phone;
            }
            if let Some(chair) = chair {
                form.chair_no = chair;
            }

            let dispatcher = dispatcher(api, false);
            if let Some(barber) = finish(dispatcher.save_barber(Some(&id), &form).await)? {
                println!("Updated barber {} (ID: {})", barber.name, barber.id);
            }
        }
        BarberCommand::Delete { id, yes } => {
            let dispatcher = dispatcher(api, yes);
            if finish(dispatcher.delete_barber(&id).await)?.is_some() {
                println!("Deleted barber {id}");
            }
        }
    }
    Ok(())
}

fn dispatcher<A>(api: Arc<A>, assume_yes: bool) -> ActionDispatcher<A>
where
    A: QueueApi + ?Sized + 'static,
{
    let store = Arc::new(SnapshotStore::new(api));
    let prompter: Arc<dyn Prompter> = Arc::new(TerminalPrompter::new(assume_yes));
    ActionDispatcher::new(store, prompter)
}

/// Fetch the snapshot that call-next and complete check against.
async fn load<A>(dispatcher: &ActionDispatcher<A>) -> Result<()>
where
    A: QueueApi + ?Sized + 'static,
{
    dispatcher
        .store()
        .try_refresh()
        .await
        .context("Failed to fetch queue state")?;
    Ok(())
}

/// Map an action outcome for the command line; a declined confirmation is not an error.
fn finish<T>(result: std::result::Result<T, ActionError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ActionError::Cancelled) => {
            println!("Cancelled by user");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

async fn list_barbers<A: QueueApi + ?Sized>(api: &A) -> Result<()> {
    let barbers = api.list_barbers().await.context("Failed to fetch barbers")?;
    if barbers.is_empty() {
        println!("No barbers added yet");
        return Ok(());
    }

    println!("Barbers ({} total):", barbers.len());
    for barber in &barbers {
        println!(
            "  [{}] {} | {} | Chair #{} | {}",
            barber.id, barber.name, barber.phone, barber.chair_no, barber.status
        );
    }
    Ok(())
}

fn render(page: Page, snapshot: &Snapshot) -> String {
    match page {
        Page::Customer => view::render_customer(snapshot),
        Page::Dashboard => view::render_dashboard(snapshot),
    }
}

async fn open_page<A>(api: Arc<A>, page: Page, config: &AppConfig, once: bool) -> Result<()>
where
    A: QueueApi + ?Sized + 'static,
{
    let input = BufReader::new(tokio::io::stdin());
    run_view(
        api,
        page,
        config.poll_interval(page),
        once,
        input,
        &mut std::io::stdout(),
    )
    .await
}

/// Draw the page with any notices and the command hint below it.
fn draw<W: Write>(out: &mut W, page: Page, snapshot: &Snapshot, notices: &[String]) -> Result<()> {
    // Clear screen and home the cursor before redrawing
    write!(out, "\x1B[2J\x1B[H{}", render(page, snapshot))?;
    if !snapshot.is_loaded() {
        writeln!(out, "\nLoading...")?;
    }
    for notice in notices {
        writeln!(out, "\n{notice}")?;
    }
    write!(out, "\n(type help for commands, q to quit) > ")?;
    out.flush()?;
    Ok(())
}

/// Show a page until Ctrl-C or `q`, redrawing on every applied snapshot and
/// running typed commands against the page's own store.
async fn run_view<A, R, W>(
    api: Arc<A>,
    page: Page,
    interval: Duration,
    once: bool,
    input: R,
    out: &mut W,
) -> Result<()>
where
    A: QueueApi + ?Sized + 'static,
    R: AsyncBufRead + Unpin + Send + 'static,
    W: Write,
{
    info!(path = page.path(), page = %page, "opening page");
    let store = Arc::new(SnapshotStore::new(api));

    if once {
        store
            .try_refresh()
            .await
            .context("Failed to fetch queue state")?;
        writeln!(out, "{}", render(page, &store.current()))?;
        return Ok(());
    }

    let input = Arc::new(tokio::sync::Mutex::new(input.lines()));
    let prompter = Arc::new(SessionPrompter::new(Arc::clone(&input)));
    let dispatcher = ActionDispatcher::new(
        Arc::clone(&store),
        Arc::clone(&prompter) as Arc<dyn Prompter>,
    );

    let mut rx = store.subscribe();
    let initial = rx.borrow_and_update().clone();
    draw(out, page, &initial, &prompter.notices())?;

    let handle = store.activate(interval);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut reading = true;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                draw(out, page, &snapshot, &prompter.notices())?;
            }
            line = session::read_line(&input), if reading => {
                let Some(line) = line else {
                    // End of input; keep showing the page until Ctrl-C
                    reading = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }

                prompter.clear_notices();
                match ViewCommand::parse(&line, page) {
                    Ok(ViewCommand::Quit) => break,
                    Ok(command) => {
                        tokio::select! {
                            _ = &mut ctrl_c => break,
                            () = session::execute(&dispatcher, prompter.as_ref(), page, command) => {}
                        }
                    }
                    Err(e) => prompter.notify(e.to_string()),
                }
                let snapshot = rx.borrow_and_update().clone();
                draw(out, page, &snapshot, &prompter.notices())?;
            }
        }
    }

    handle.stop().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use queue_client::FakeShop;
    use queue_types::{NewQueueEntry, ServiceType};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_views() {
        let cli = parse(&["barber-queue", "dashboard", "--once"]);
        assert!(matches!(cli.command, Commands::Dashboard { once: true }));

        let cli = parse(&["barber-queue", "customer"]);
        assert!(matches!(cli.command, Commands::Customer { once: false }));

        let cli = parse(&["barber-queue", "view", "/dashboard", "--once"]);
        match cli.command {
            Commands::View { path, once } => {
                assert_eq!(Page::from_path(&path), Page::Dashboard);
                assert!(once);
            }
            _ => panic!("Expected View command"),
        }

        let cli = parse(&["barber-queue", "view"]);
        assert!(matches!(cli.command, Commands::View { ref path, once: false } if path == "/"));
    }

    #[test]
    fn test_parse_join_defaults_to_haircut() {
        let cli = parse(&["barber-queue", "join", "--name", "John Doe"]);
        match cli.command {
            Commands::Join { name, service } => {
                assert_eq!(name, "John Doe");
                assert_eq!(service, "Haircut");
            }
            _ => panic!("Expected Join command"),
        }
    }

    #[test]
    fn test_parse_global_api_url() {
        let cli = parse(&["barber-queue", "barbers", "--api-url", "http://shop/api"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://shop/api"));
    }

    #[test]
    fn test_parse_barber_subcommands() {
        let cli = parse(&["barber-queue", "barber", "edit", "b1", "--chair", "4"]);
        match cli.command {
            Commands::Barber {
                action: BarberCommand::Edit { id, chair, name, .. },
            } => {
                assert_eq!(id, "b1");
                assert_eq!(chair.as_deref(), Some("4"));
                assert!(name.is_none());
            }
            _ => panic!("Expected Barber Edit command"),
        }

        let cli = parse(&["barber-queue", "barber", "delete", "b1", "--yes"]);
        assert!(matches!(
            cli.command,
            Commands::Barber {
                action: BarberCommand::Delete { yes: true, .. }
            }
        ));
    }

    #[test]
    fn test_parse_rejects_missing_args() {
        assert!(Cli::try_parse_from(["barber-queue", "call-next"]).is_err());
        assert!(Cli::try_parse_from(["barber-queue", "barber", "add", "--name", "Mike"]).is_err());
    }

    #[test]
    fn test_finish_treats_cancel_as_success() {
        let result: std::result::Result<(), ActionError> = Err(ActionError::Cancelled);
        assert!(finish(result).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_call_next_command_updates_shop() {
        let shop = Arc::new(FakeShop::new());
        let barber = shop.add_barber("Mike Johnson", "555-0101", 1);
        shop.add_customer(&NewQueueEntry::new("John Doe", ServiceType::Haircut));

        run(
            Commands::CallNext {
                barber_id: barber.id.clone(),
            },
            Arc::clone(&shop),
            &AppConfig::default(),
        )
        .await
        .unwrap();

        assert!(shop.barbers()[0].is_busy());
    }

    #[tokio::test]
    async fn test_call_next_command_fails_on_empty_queue() {
        let shop = Arc::new(FakeShop::new());
        let barber = shop.add_barber("Mike Johnson", "555-0101", 1);

        let result = run(
            Commands::CallNext {
                barber_id: barber.id,
            },
            Arc::clone(&shop),
            &AppConfig::default(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(shop.count_requests("POST"), 0);
    }

    #[tokio::test]
    async fn test_edit_keeps_unchanged_fields() {
        let shop = Arc::new(FakeShop::new());
        let barber = shop.add_barber("Mike Johnson", "555-0101", 1);

        run(
            Commands::Barber {
                action: BarberCommand::Edit {
                    id: barber.id.clone(),
                    name: None,
                    phone: None,
                    chair: Some("4".to_string()),
                },
            },
            Arc::clone(&shop),
            &AppConfig::default(),
        )
        .await
        .unwrap();

        let updated = &shop.barbers()[0];
        assert_eq!(updated.name, "Mike Johnson");
        assert_eq!(updated.chair_no, 4);
    }

    #[tokio::test]
    async fn test_seed_then_clear_with_yes() {
        let shop = Arc::new(FakeShop::new());
        let config = AppConfig::default();

        run(Commands::Seed, Arc::clone(&shop), &config).await.unwrap();
        assert_eq!(shop.barbers().len(), 3);

        run(Commands::Clear { yes: true }, Arc::clone(&shop), &config)
            .await
            .unwrap();
        assert!(shop.barbers().is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_once_fetches_once() {
        let shop = Arc::new(FakeShop::new());
        run(
            Commands::Dashboard { once: true },
            Arc::clone(&shop),
            &AppConfig::default(),
        )
        .await
        .unwrap();
        assert_eq!(shop.count_requests("GET"), 3);
    }

    fn typed(text: &str) -> std::io::Cursor<Vec<u8>> {
        std::io::Cursor::new(text.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_view_route_opens_dashboard() {
        let shop = Arc::new(FakeShop::new());
        let mut out = Vec::new();
        run_view(
            Arc::clone(&shop),
            Page::from_path("/dashboard"),
            Duration::from_secs(3),
            true,
            typed(""),
            &mut out,
        )
        .await
        .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("=== Shop Dashboard ==="));
        assert_eq!(shop.count_requests("GET"), 3);
    }

    #[tokio::test]
    async fn test_live_dashboard_calls_next_customer() {
        let shop = Arc::new(FakeShop::new());
        let barber = shop.add_barber("Mike Johnson", "555-0101", 1);
        shop.add_customer(&NewQueueEntry::new("John Doe", ServiceType::Haircut));

        let mut out = Vec::new();
        run_view(
            Arc::clone(&shop),
            Page::Dashboard,
            Duration::from_secs(3),
            false,
            typed(&format!("call {}\nq\n", barber.id)),
            &mut out,
        )
        .await
        .unwrap();

        assert!(shop.barbers()[0].is_busy());
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Now serving John Doe (Haircut)"));
        assert!(out.contains("Barber: Mike Johnson (Chair #1)"));
    }

    #[tokio::test]
    async fn test_live_view_draws_before_first_fetch() {
        let shop = Arc::new(FakeShop::new());
        shop.set_offline(true);

        let mut out = Vec::new();
        run_view(
            Arc::clone(&shop),
            Page::Customer,
            Duration::from_secs(5),
            false,
            typed("q\n"),
            &mut out,
        )
        .await
        .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("=== Welcome to Color Cut and More ==="));
        assert!(out.contains("Loading..."));
    }

    #[tokio::test]
    async fn test_live_view_rejects_commands_from_other_page() {
        let shop = Arc::new(FakeShop::new());
        shop.add_barber("Mike Johnson", "555-0101", 1);

        let mut out = Vec::new();
        run_view(
            Arc::clone(&shop),
            Page::Customer,
            Duration::from_secs(5),
            false,
            typed("call b1\nq\n"),
            &mut out,
        )
        .await
        .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("call is not available on this page"));
        assert_eq!(shop.count_requests("POST"), 0);
    }
}
