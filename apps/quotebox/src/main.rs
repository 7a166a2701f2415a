use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, view::QuoteListView, HttpQuoteApi, ListRefresh, PresentationSurface,
    PresentationSync,
};
use storage::{HistoryStore, KeyValueStore, MemoryStore, Storage, ThemeStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::TerminalSurface;

#[derive(Parser, Debug)]
#[command(name = "quotebox", about = "Generate, browse and keep quotes")]
struct Args {
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a quote for a known tag or a custom one.
    Generate {
        #[arg(long, conflicts_with = "custom")]
        tag: Option<String>,
        #[arg(long)]
        custom: Option<String>,
        #[arg(long)]
        requestor: Option<String>,
    },
    /// List the tags the service knows about.
    Tags,
    /// List recently generated quotes, optionally filtered by tag.
    List {
        #[arg(long)]
        tag: Option<String>,
    },
    /// Show the local history and lifetime counter.
    History,
    /// Clear the local history.
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Show the theme, or switch it with --toggle.
    Theme {
        #[arg(long)]
        toggle: bool,
    },
    /// Print the latest quote in copy format.
    Copy,
    /// Print the latest quote in share format.
    Share,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_base_url = api_url;
    }
    if let Some(database_url) = args.database_url {
        settings.database_url = database_url;
    }

    let kv: Arc<dyn KeyValueStore> = match open_storage(&settings.database_url).await {
        Ok(storage) => Arc::new(storage),
        Err(err) => {
            warn!(database_url = %settings.database_url, error = %err, "storage unavailable, state will not persist");
            Arc::new(MemoryStore::new())
        }
    };
    let history = Arc::new(HistoryStore::open(Arc::clone(&kv)).await);
    let theme = ThemeStore::open(kv).await;
    let api = Arc::new(HttpQuoteApi::new(
        &settings.api_base_url,
        settings.request_timeout(),
    )?);
    info!(api = api.api_base(), "quotebox starting");

    // Each run is one command, so nothing would ever show a delayed refresh.
    let mut options = settings.sync_options();
    options.refresh_after_generate = false;

    let surface = Arc::new(TerminalSurface::default());
    let sync = PresentationSync::new(surface.clone(), api, history, theme, options);
    sync.restore().await;
    surface.set_echo(true);

    let ok = match args.command {
        Command::Generate {
            tag,
            custom,
            requestor,
        } => {
            if let Some(requestor) = requestor.or(settings.requestor.clone()) {
                surface.set_requestor(&requestor);
            }
            if let Some(tag) = tag {
                surface.set_selected_tag(&tag);
                sync.on_tag_selected();
            }
            if let Some(custom) = custom {
                surface.set_free_text_tag(&custom);
                sync.on_free_text_changed();
            }
            sync.on_generate().await.is_ok()
        }
        Command::Tags => {
            sync.on_refresh_tags().await;
            surface.print_tags();
            true
        }
        Command::List { tag } => {
            surface.set_filter(tag.as_deref().unwrap_or_default());
            matches!(
                sync.on_refresh().await,
                ListRefresh::Applied(view) if view != QuoteListView::Failed
            )
        }
        Command::History => {
            surface.print_history();
            true
        }
        Command::Clear { yes } => {
            if sync.on_clear_history(yes).await {
                println!("History cleared");
            } else {
                println!("Pass --yes to clear the history");
            }
            true
        }
        Command::Theme { toggle } => {
            if toggle {
                sync.on_toggle_theme().await;
            }
            surface.print_theme();
            true
        }
        Command::Copy => report_missing(sync.on_copy_quote().await),
        Command::Share => report_missing(sync.on_share_quote().await),
    };

    sync.teardown();
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn open_storage(database_url: &str) -> Result<Storage> {
    let storage = Storage::new(database_url).await?;
    storage.health_check().await?;
    Ok(storage)
}

fn report_missing(text: Option<String>) -> bool {
    if text.is_none() {
        println!("No quote to show yet");
    }
    text.is_some()
}
