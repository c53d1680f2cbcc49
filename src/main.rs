use std::path::PathBuf;

use clap::{Parser, Subcommand};

use braid_core::ids::TopicId;
use braid_core::message::Role;
use braid_engine::TrajectoryService;
use braid_store::groups::GroupRepo;
use braid_store::messages::MessageRepo;
use braid_store::topics::TopicRepo;
use braid_store::Database;
use braid_telemetry::{init_telemetry, TelemetryConfig};

/// Inspect braid conversation topics and their compacted trajectories.
#[derive(Parser)]
#[command(name = "braid")]
struct Cli {
    /// Database path. Defaults to ~/.braid/database/braid.db
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List topics, most recently updated first
    Topics,
    /// Print a topic's trajectory as JSON
    Show { topic_id: String },
    /// Create a small demo topic and print its id
    Seed,
}

fn main() {
    init_telemetry(&TelemetryConfig::default());

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(default_db_path);
    let db = Database::open(&db_path).expect("failed to open database");
    tracing::info!(path = %db_path.display(), "database opened");

    match cli.command {
        Command::Topics => {
            let topics = TopicRepo::new(db).list().expect("failed to list topics");
            for topic in topics {
                println!(
                    "{}  {}",
                    topic.id,
                    topic.title.as_deref().unwrap_or("(untitled)")
                );
            }
        }
        Command::Show { topic_id } => {
            let service = TrajectoryService::new(db);
            let trajectory = service
                .build(&TopicId::from_raw(topic_id))
                .expect("failed to build trajectory");
            println!(
                "{}",
                serde_json::to_string_pretty(&trajectory).expect("failed to serialize")
            );
        }
        Command::Seed => {
            let topic_id = seed_demo_topic(&db).expect("failed to seed demo topic");
            println!("{topic_id}");
        }
    }
}

/// A demo topic exercising both group mechanisms: a compressed opening
/// exchange and a parallel pair of replies with a follow-up.
fn seed_demo_topic(db: &Database) -> Result<TopicId, braid_store::StoreError> {
    let topics = TopicRepo::new(db.clone());
    let messages = MessageRepo::new(db.clone());
    let groups = GroupRepo::new(db.clone());

    let topic = topics.create(Some("Demo: compacted trajectory"))?;

    let m1 = messages.append(&topic.id, None, Role::User, "What is a monad?")?;
    let m2 = messages.append(
        &topic.id,
        Some(&m1.id),
        Role::Assistant,
        "A monad is a monoid in the category of endofunctors.",
    )?;
    messages.set_favorite(&m2.id, true)?;
    groups.compress(
        &topic.id,
        "User asked for a definition of monads; one was given.",
        &[m1.id.clone(), m2.id.clone()],
    )?;

    let prompt = messages.append(&topic.id, Some(&m2.id), Role::User, "Give me an analogy.")?;
    let alt_a = messages.append(
        &topic.id,
        Some(&prompt.id),
        Role::Assistant,
        "A monad is like a burrito.",
    )?;
    let alt_b = messages.append(
        &topic.id,
        Some(&prompt.id),
        Role::Assistant,
        "A monad is like an assembly line.",
    )?;
    groups.parallelize(&topic.id, &prompt.id, &[alt_a.id, alt_b.id.clone()])?;

    messages.append(
        &topic.id,
        Some(&alt_b.id),
        Role::User,
        "The assembly line one clicks. Go on.",
    )?;

    Ok(topic.id)
}

fn default_db_path() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
        .join(".braid")
        .join("database")
        .join("braid.db")
}
