use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fitwise_core::time::parse_local_due_to_utc;
use fitwise_core::{FitwiseEngine, InMemoryStore, Priority, TaskDraft, TaskId, UserId};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod render;
mod state;

#[derive(Parser, Debug)]
#[command(name = "fitwise", version, about = "Task assignment scoring and drafting")]
struct Cli {
    /// Data snapshot (default: ~/.fitwise/snapshot.json)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Config file (default: ~/.fitwise/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct DraftArgs {
    #[arg(long)]
    title: String,

    #[arg(long)]
    description: String,

    /// low | medium | high
    #[arg(long)]
    priority: Option<Priority>,

    /// Local due date, "YYYY-MM-DD HH:MM" or "YYYY-MM-DD"
    #[arg(long)]
    due: Option<String>,

    /// IANA timezone for --due (default: display.timezone from config)
    #[arg(long)]
    tz: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank candidates for a prospective task
    Score {
        #[command(flatten)]
        draft: DraftArgs,

        /// Candidates to show (default: display.limit from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Suggest priority, effort, due date and assignment checks for a draft
    Draft {
        #[command(flatten)]
        draft: DraftArgs,

        /// Already chosen assignees, comma separated
        #[arg(long, value_delimiter = ',')]
        assign: Vec<UserId>,
    },

    /// Mark a task completed and record its efficiency
    Complete {
        task_id: TaskId,

        #[arg(long)]
        user: UserId,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Completion statistics for one user
    Analytics { user_id: UserId },

    /// Write the default config file
    InitConfig,
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("invalid log filter")?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("failed to initialize tracing")?;
    Ok(())
}

fn build_draft(args: &DraftArgs, default_tz: &str, assign: Vec<UserId>) -> Result<TaskDraft> {
    let mut draft = TaskDraft::new(args.title.clone(), args.description.clone()).with_assignees(assign);
    if let Some(p) = args.priority {
        draft = draft.with_priority(p);
    }
    if let Some(due) = &args.due {
        let tz = args.tz.as_deref().unwrap_or(default_tz);
        draft = draft.with_due_date(parse_local_due_to_utc(due, tz)?);
    }
    Ok(draft)
}

fn print<T: serde::Serialize + ?Sized>(as_json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if as_json {
        println!("{}", render::json(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    if let Command::InitConfig = cli.command {
        return config::init_config(cli.config.as_deref());
    }

    let cfg = config::load_config(cli.config.as_deref())?;
    let data_path = match &cli.data {
        Some(p) => p.clone(),
        None => state::default_snapshot_path()?,
    };
    let snapshot = state::read_snapshot(&data_path)?;
    debug!(
        path = %data_path.display(),
        users = snapshot.users.len(),
        tasks = snapshot.tasks.len(),
        "snapshot loaded"
    );

    let store = Arc::new(InMemoryStore::from_snapshot(snapshot));
    let engine = FitwiseEngine::new(store.clone(), cfg.engine.clone()).context("invalid engine config")?;

    match cli.command {
        Command::Score { draft, limit } => {
            let draft = build_draft(&draft, &cfg.display.timezone, Vec::new())?;
            let mut ranked = engine.score_candidates(&draft).await?;
            ranked.truncate(limit.unwrap_or(cfg.display.limit));
            print(cli.json, &ranked, || render::scores(&ranked))?;
        }

        Command::Draft { draft, assign } => {
            let draft = build_draft(&draft, &cfg.display.timezone, assign)?;
            let recs = engine.draft_suggestions(&draft).await?;
            print(cli.json, &recs, || render::recommendations(&recs))?;
        }

        Command::Complete { task_id, user, notes } => {
            let record = engine
                .complete_task(task_id, user, notes)
                .await
                .with_context(|| format!("complete task #{task_id}"))?;
            state::write_snapshot(&data_path, &store.snapshot()?)?;
            print(cli.json, &record, || render::completion(&record))?;
        }

        Command::Analytics { user_id } => {
            let summary = engine.performance_analytics(user_id).await;
            print(cli.json, &summary, || render::analytics(user_id, &summary))?;
        }

        Command::InitConfig => {}
    }

    Ok(())
}
