use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

use crate::api::Client;
use crate::comments::CollapseState;
use crate::config;
use crate::credentials::{CredentialStore, FileCredentials};
use crate::error::{ApiError, Remedy};
use crate::models::Destination;
use crate::orchestrator::{
    FeedOrchestrator, PostOrchestrator, ProfileOrchestrator, SearchOrchestrator, SearchSnapshot,
    SubmoltOrchestrator,
};
use crate::render;
use crate::state::FetchState;
use crate::transport::{HttpTransport, TransportConfig};

pub const LOG_ENV: &str = "MOLT_LOG";
const DEFAULT_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Feed,
    Post { id: String, collapsed: Vec<String> },
    Community { name: String },
    Search { query: String },
    Profile { name: String },
    Login { token: String },
    Logout,
}

impl Command {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Command> {
        let args: Vec<&str> = args.iter().map(|arg| arg.as_ref()).collect();
        let (name, rest) = match args.split_first() {
            Some((name, rest)) => (*name, rest),
            None => return Ok(Command::Feed),
        };
        match name {
            "feed" => Ok(Command::Feed),
            "post" => {
                let (id, flags) = rest
                    .split_first()
                    .ok_or_else(|| anyhow!("usage: molt post <id> [--collapse <comment-id>]..."))?;
                let mut collapsed = Vec::new();
                let mut flags = flags.iter();
                while let Some(flag) = flags.next() {
                    match (*flag, flags.next()) {
                        ("--collapse", Some(comment)) => collapsed.push(comment.to_string()),
                        (other, _) => bail!("post: unexpected argument `{other}`"),
                    }
                }
                Ok(Command::Post {
                    id: id.to_string(),
                    collapsed,
                })
            }
            "community" | "m" => Ok(Command::Community {
                name: single(rest, "usage: molt community <name>")?,
            }),
            "search" => {
                let query = rest.join(" ");
                if query.trim().is_empty() {
                    bail!("usage: molt search <query>");
                }
                Ok(Command::Search { query })
            }
            "profile" | "u" => Ok(Command::Profile {
                name: single(rest, "usage: molt profile <name>")?,
            }),
            "login" => Ok(Command::Login {
                token: single(rest, "usage: molt login <token>")?,
            }),
            "logout" => Ok(Command::Logout),
            other => bail!("unknown command `{other}`; try --help"),
        }
    }
}

fn single(rest: &[&str], usage: &str) -> Result<String> {
    match rest {
        [value] if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => bail!("{usage}"),
    }
}

pub fn run(command: Command) -> Result<()> {
    init_logging();

    let cfg = config::load(config::LoadOptions::default()).context("load config")?;
    debug!(config_path = ?config::default_path(), "app: configuration loaded");
    let credentials = Arc::new(FileCredentials::open_default().context("open credential store")?);

    match &command {
        Command::Login { token } => {
            credentials.set_token(Some(token.as_str()))?;
            println!("Saved token to {}", credentials.path().display());
            return Ok(());
        }
        Command::Logout => {
            credentials.set_token(None)?;
            println!("Logged out");
            return Ok(());
        }
        _ => {}
    }

    let transport = HttpTransport::new(
        credentials,
        TransportConfig {
            base_url: Some(cfg.api.base_url.clone()),
            user_agent: cfg.api.user_agent.clone(),
            timeout: Some(cfg.api.timeout),
            http_client: None,
        },
    )
    .map_err(ApiError::from)
    .map_err(into_report)?;
    info!(base_url = %transport.base_url(), "app: using api");
    let client = Arc::new(Client::new(Arc::new(transport)));
    let width = terminal_width();
    let now = Utc::now();

    let lines = match command {
        Command::Feed => {
            let home = settle(
                FeedOrchestrator::new(client)
                    .with_listing(cfg.feed.sort, cfg.feed.limit)
                    .load(),
            )?;
            let mut lines = vec!["Communities".to_string()];
            lines.extend(render::community_list(&home.communities));
            lines.push(String::new());
            lines.push(format!("Posts ({})", cfg.feed.sort.as_str()));
            lines.extend(render::post_list(&home.posts, now, width));
            lines
        }
        Command::Post { id, collapsed } => {
            let detail = settle(PostOrchestrator::new(client, id).load())?;
            let mut collapse = CollapseState::new();
            for comment in &collapsed {
                collapse.toggle(comment);
            }
            render::post_detail(&detail, &collapse, now, width)
        }
        Command::Community { name } => {
            let communities = client.submolts().map_err(into_report)?;
            let community = communities
                .into_iter()
                .find(|c| c.name.eq_ignore_ascii_case(&name))
                .ok_or_else(|| anyhow!("no community named `{name}`"))?;
            let screen = SubmoltOrchestrator::new(client, community);
            let posts = settle(screen.load())?;
            let community = screen.community();
            let mut lines = vec![format!("m/{} · {}", community.name, community.title())];
            if let Some(description) = community.description.as_deref() {
                lines.push(description.to_string());
            }
            lines.push(String::new());
            lines.extend(render::post_list(&posts, now, width));
            lines
        }
        Command::Search { query } => {
            let snapshot = run_search(client, cfg.search.debounce, query)?;
            let outcome = settle(snapshot.results)?;
            if outcome.results.is_empty() {
                vec![format!("No results for \"{}\"", snapshot.query.trim())]
            } else {
                let mut lines = render::search_rows(&outcome.results, now, width);
                lines.push(String::new());
                for result in &outcome.results {
                    lines.push(match result.destination() {
                        Destination::Post(id) => format!("{} -> molt post {id}", result.id),
                        Destination::Community(community) => {
                            format!("{} -> molt community {}", result.id, community.name)
                        }
                        Destination::Unroutable => format!("{} -> (no destination)", result.id),
                    });
                }
                lines
            }
        }
        Command::Profile { name } => {
            let page = settle(ProfileOrchestrator::new(client, name).load())?;
            render::profile(&page, now, width)
        }
        Command::Login { .. } | Command::Logout => Vec::new(),
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn run_search(client: Arc<Client>, debounce: Duration, query: String) -> Result<SearchSnapshot> {
    let search = SearchOrchestrator::with_debounce(client, debounce);
    let updates = search.subscribe();
    search.set_query(query);
    loop {
        let snapshot = updates
            .recv()
            .context("search ended without publishing results")?;
        if snapshot.results.is_settled() {
            return Ok(snapshot);
        }
    }
}

fn settle<T>(state: FetchState<T>) -> Result<T> {
    match state {
        FetchState::Loaded(value) => Ok(value),
        FetchState::Failed(err) => Err(into_report(err)),
        FetchState::Idle | FetchState::Loading => bail!("load did not finish"),
    }
}

fn into_report(err: ApiError) -> anyhow::Error {
    let message = match err.remedy() {
        Remedy::Authenticate => format!("{} (run `molt login <token>`)", err.user_message()),
        Remedy::Retry | Remedy::Report => err.user_message(),
    };
    anyhow::Error::new(err).context(message)
}

fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(DEFAULT_WIDTH)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
