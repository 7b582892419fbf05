use std::{io::BufRead, path::PathBuf, process::ExitCode, time::Duration};

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use portfolio_catalog::{
    auth::password::hash_password,
    catalog::{CatalogReconciler, HttpCatalogClient, JsonFileStore, Source},
    entities::{
        option_fields::PatchString,
        project::{MediaSlot, NewProject, ProjectRecord, ProjectUpdate},
    },
    settings::ClientConfig,
};

type Catalog = CatalogReconciler<JsonFileStore, HttpCatalogClient>;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Manage the portfolio project catalog from the command line")]
struct Cli {
    /// Print records as JSON instead of a table.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Overrides `api_base_url` from the client configuration.
    #[arg(long, global = true, env = "CATALOG_API_BASE_URL")]
    api: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every project, cache first.
    List,
    Show {
        id: i64,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        short_description: String,
        #[arg(long, default_value = "")]
        long_description: String,
        #[arg(long)]
        readme: Option<PathBuf>,
        /// Comma separated, e.g. `Rust,Postgres`.
        #[arg(long, value_delimiter = ',')]
        technologies: Vec<String>,
        #[arg(long)]
        github_url: Option<String>,
        #[arg(long)]
        live_url: Option<String>,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value_t = false)]
        featured: bool,
    },
    /// Change selected fields. An empty URL clears it.
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        short_description: Option<String>,
        #[arg(long)]
        long_description: Option<String>,
        #[arg(long)]
        readme: Option<PathBuf>,
        #[arg(long, value_delimiter = ',')]
        technologies: Option<Vec<String>>,
        #[arg(long)]
        github_url: Option<String>,
        #[arg(long)]
        live_url: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        featured: Option<bool>,
    },
    Delete {
        id: i64,
    },
    /// Merge the server catalog into the local cache.
    Refresh,
    /// Exchange admin credentials for a token to put in `CATALOG_API_TOKEN`.
    Login {
        #[arg(long, env = "CATALOG_ADMIN_EMAIL")]
        email: String,
        /// Read from stdin when omitted.
        #[arg(long, env = "CATALOG_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Print the Argon2 PHC string for `APP_ADMIN_PASSWORD_HASH`.
    HashPassword {
        #[arg(long, env = "CATALOG_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Upload a file and store its URL on a project.
    AttachMedia {
        id: i64,
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = SlotArg::Thumbnail)]
        slot: SlotArg,
        #[arg(long)]
        folder: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SlotArg {
    Thumbnail,
    Video,
}

impl From<SlotArg> for MediaSlot {
    fn from(slot: SlotArg) -> Self {
        match slot {
            SlotArg::Thumbnail => MediaSlot::Thumbnail,
            SlotArg::Video => MediaSlot::Video,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Command::HashPassword { password } = cli.command {
        let password = password_or_stdin(password)?;
        println!("{}", hash_password(&password)?);
        return Ok(());
    }

    let mut config = ClientConfig::new().context("loading client configuration")?;
    if let Some(api) = cli.api {
        config.api_base_url = api;
    }

    let remote = HttpCatalogClient::new(
        &config.api_base_url,
        config.api_token.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    if let Command::Login { email, password } = cli.command {
        let password = password_or_stdin(password)?;
        let auth = remote.login(&email, &password).await?;
        eprintln!("token expires in {}s", auth.expires_in);
        println!("export CATALOG_API_TOKEN={}", auth.access_token);
        return Ok(());
    }

    let catalog = CatalogReconciler::new(JsonFileStore::new(&config.cache_dir, &config.cache_key), remote.clone());
    let outcome = execute(&catalog, &remote, cli.command, cli.json).await;

    catalog.flush().await?;
    for notice in catalog.take_notices() {
        eprintln!("warning: {notice}");
    }
    outcome
}

async fn execute(catalog: &Catalog, remote: &HttpCatalogClient, command: Command, json: bool) -> anyhow::Result<()> {
    match command {
        Command::List => {
            let source = catalog.load().await;
            print_records(&catalog.projects(), json)?;
            eprintln!("{} projects ({})", catalog.projects().len(), source_label(source));
        }
        Command::Show { id } => {
            catalog.load().await;
            let Some(project) = catalog.get(id) else {
                bail!("no project with id {id}");
            };
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        Command::Add {
            name,
            short_description,
            long_description,
            readme,
            technologies,
            github_url,
            live_url,
            category,
            featured,
        } => {
            let draft = NewProject {
                name,
                short_description,
                long_description,
                readme_content: read_optional(readme).await?,
                technologies,
                github_url,
                live_url,
                category,
                is_featured: featured,
                ..Default::default()
            };
            let added = catalog.add(draft).await?;
            print_records(std::slice::from_ref(&added), json)?;
        }
        Command::Update {
            id,
            name,
            short_description,
            long_description,
            readme,
            technologies,
            github_url,
            live_url,
            category,
            featured,
        } => {
            let changes = ProjectUpdate {
                name,
                short_description,
                long_description,
                readme_content: read_optional(readme).await?,
                technologies,
                github_url: url_patch(github_url),
                live_url: url_patch(live_url),
                category,
                is_featured: featured,
                ..Default::default()
            };
            if changes.is_empty() {
                bail!("nothing to update");
            }
            let Some(updated) = catalog.update(id, changes).await? else {
                bail!("no project with id {id}");
            };
            print_records(std::slice::from_ref(&updated), json)?;
        }
        Command::Delete { id } => {
            if !catalog.delete(id).await {
                eprintln!("project {id} was not in the local catalog");
            }
        }
        Command::Refresh => {
            let source = catalog.refresh().await;
            eprintln!("{} projects ({})", catalog.projects().len(), source_label(source));
        }
        Command::AttachMedia { id, file, slot, folder } => {
            catalog.load().await;
            if catalog.get(id).is_none() {
                bail!("no project with id {id}");
            }
            let uploaded = remote
                .upload_media(&file, folder.as_deref())
                .await
                .with_context(|| format!("uploading {}", file.display()))?;
            if let Some(updated) = catalog.attach_media(id, slot.into(), uploaded.url).await? {
                print_records(std::slice::from_ref(&updated), json)?;
            }
        }
        Command::Login { .. } | Command::HashPassword { .. } => {}
    }
    Ok(())
}

fn url_patch(value: Option<String>) -> PatchString {
    match value {
        None => PatchString::Unchanged,
        Some(url) if url.trim().is_empty() => PatchString::SetToNull,
        Some(url) => PatchString::SetToValue(url),
    }
}

async fn read_optional(path: Option<PathBuf>) -> anyhow::Result<Option<String>> {
    match path {
        Some(path) => Ok(Some(
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?,
        )),
        None => Ok(None),
    }
}

fn password_or_stdin(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("password: ");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

fn source_label(source: Source) -> &'static str {
    match source {
        Source::Local => "local cache",
        Source::Remote => "server",
        Source::Seed => "built-in seed",
    }
}

fn print_records(records: &[ProjectRecord], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }
    for p in records {
        let featured = if p.is_featured { "*" } else { " " };
        println!(
            "{:>16} {} {:<32} {:<28} {}",
            p.id,
            featured,
            p.name,
            p.category,
            p.technologies.join(", ")
        );
    }
    Ok(())
}
