use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use book_catalog::api::{BookApi, HttpBookApi};
use book_catalog::config::{ClientConfig, ConfigError};
use book_catalog::confirm::{AssumeYes, Confirm, PromptConfirm};
use book_catalog::memory::MemoryBookApi;
use book_catalog::render::{render_list, render_view};
use book_catalog::session::{FileSessionStore, MemorySessionStore, SessionStore};
use book_catalog::shell::run_shell;
use book_catalog::{BookId, Catalog, CatalogError, DraftField, Target, View};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("io failed: {0}")]
    Io(#[from] io::Error),
    #[error("not logged in; run `book-catalog login --email <email> --password <password>` first")]
    LoginRequired,
    #[error("{0}")]
    Refused(String),
}

#[derive(Parser, Debug)]
#[command(name = "book-catalog", about = "Manage a book list backed by a REST service")]
struct Cli {
    /// Service origin, e.g. http://127.0.0.1:8000 (overrides BOOKS_API_URL).
    #[arg(long)]
    base_url: Option<String>,

    /// Where the session token is kept (overrides BOOKS_SESSION_FILE).
    #[arg(long)]
    session_file: Option<PathBuf>,

    /// Skip the login gate (overrides BOOKS_REQUIRE_AUTH).
    #[arg(long, default_value_t = false)]
    no_auth: bool,

    /// Use a throwaway in-process catalog instead of the service.
    #[arg(long, default_value_t = false)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "BOOKS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    List,
    Add(BookFields),
    Edit {
        id: BookId,
        #[command(flatten)]
        fields: BookFields,
    },
    Delete {
        id: BookId,
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    /// Interactive mode.
    Shell,
}

#[derive(Args, Debug)]
struct BookFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    genre: Option<String>,
}

impl BookFields {
    fn entries(self) -> impl Iterator<Item = (DraftField, String)> {
        [
            (DraftField::Title, self.title),
            (DraftField::Author, self.author),
            (DraftField::Year, self.year),
            (DraftField::Genre, self.genre),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(path) = cli.session_file.clone() {
        config.session_file = path;
    }
    if cli.no_auth || cli.offline {
        config.require_auth = false;
    }

    let mut catalog = build_catalog(&config, cli.offline)?;
    run(&mut catalog, cli.command).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn build_catalog(config: &ClientConfig, offline: bool) -> Result<Catalog, CliError> {
    let (api, store): (Arc<dyn BookApi>, Box<dyn SessionStore>) = if offline {
        tracing::info!("using in-process catalog");
        (Arc::new(MemoryBookApi::new()), Box::new(MemorySessionStore::new()))
    } else {
        tracing::info!(base_url = %config.base_url, session_file = %config.session_file.display(), "using book service");
        (
            Arc::new(HttpBookApi::new(config.base_url.clone(), config.timeouts)?),
            Box::new(FileSessionStore::new(config.session_file.clone())),
        )
    };
    Ok(Catalog::new(api, store, config.require_auth))
}

async fn run(catalog: &mut Catalog, command: Command) -> Result<(), CliError> {
    match command {
        Command::Shell => {
            if let Err(e) = catalog.start().await {
                tracing::warn!(error = %e, "initial load failed");
            }
            let stdin = io::stdin();
            return Ok(run_shell(catalog, stdin.lock(), io::stdout()).await?);
        }
        Command::Login { email, password } => {
            catalog.login(&email, &password).await?;
            println!("{}", catalog.take_notice().unwrap_or_default());
            print!("{}", render_list(catalog.books()));
            return Ok(());
        }
        Command::Logout => {
            catalog.logout();
            println!("{}", catalog.take_notice().unwrap_or_default());
            return Ok(());
        }
        Command::List => {
            ensure_started(catalog).await?;
        }
        Command::Add(fields) => {
            ensure_started(catalog).await?;
            open(catalog, Target::Add, None)?;
            for (field, value) in fields.entries() {
                catalog.set_new_field(field, value);
            }
            catalog.submit_new_book().await?;
        }
        Command::Edit { id, fields } => {
            ensure_started(catalog).await?;
            open(catalog, Target::Edit, Some(id))?;
            for (field, value) in fields.entries() {
                catalog.set_edit_field(field, value).map_err(CatalogError::from)?;
            }
            catalog.submit_edited_book().await?;
        }
        Command::Delete { id, yes } => {
            ensure_started(catalog).await?;
            let mut assume_yes = AssumeYes;
            let mut prompt;
            let confirm: &mut dyn Confirm = if yes {
                &mut assume_yes
            } else {
                prompt = PromptConfirm::new(BufReader::new(io::stdin()), io::stderr());
                &mut prompt
            };
            if !catalog.delete_book(id, confirm).await? {
                println!("Cancelled.");
                return Ok(());
            }
        }
    }

    if let Some(notice) = catalog.take_notice() {
        println!("{notice}");
    }
    print!("{}", render_view(catalog));
    Ok(())
}

async fn ensure_started(catalog: &mut Catalog) -> Result<(), CliError> {
    if catalog.start().await? == View::LoggedOut {
        return Err(CliError::LoginRequired);
    }
    Ok(())
}

fn open(catalog: &mut Catalog, target: Target, id: Option<BookId>) -> Result<(), CliError> {
    if catalog.navigate(target, id) {
        return Ok(());
    }
    Err(CliError::Refused(catalog.take_notice().unwrap_or_default()))
}
