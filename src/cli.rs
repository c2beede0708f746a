use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::sync::broadcast::error::RecvError;

use crate::{
    analytics::ProfileOverview,
    camera::{SimulatedCamera, SimulatedCameraMode},
    catalog::{PoseCatalog, PoseDefinition},
    db::{models::ProfileRecord, Database},
    session::{
        CompletedSession, RandomSource, SessionController, SessionEvent, SessionStatus, StdRandom,
    },
    settings::{SettingsStore, SETTINGS_FILE_NAME},
    store::SessionStore,
    utils::logging::debug_enabled,
};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub const DATABASE_FILE_NAME: &str = "deha.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "deha", version, about = "Guided posture practice with live feedback")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the session database and settings
    #[arg(long, global = true, env = "DEHA_DATA_DIR", default_value = "./deha-data")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the poses available for practice
    Poses,

    /// Run a simulated live session
    Practice(PracticeArgs),

    /// Show totals, streak, patterns and history
    Stats {
        /// Print the overview as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or update the stored profile
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Debug, Args)]
pub struct PracticeArgs {
    /// Pose id, see `deha poses`
    pub pose: String,

    /// Stop automatically after this many seconds
    #[arg(long, default_value = "30")]
    pub seconds: u64,

    /// Seed for reproducible feedback and scores
    #[arg(long)]
    pub seed: Option<u64>,

    /// Behaviour of the simulated camera
    #[arg(long, value_enum, default_value = "available")]
    pub camera: CameraArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CameraArg {
    Available,
    Denied,
    Unavailable,
}

impl From<CameraArg> for SimulatedCameraMode {
    fn from(arg: CameraArg) -> Self {
        match arg {
            CameraArg::Available => SimulatedCameraMode::Available,
            CameraArg::Denied => SimulatedCameraMode::Denied,
            CameraArg::Unavailable => SimulatedCameraMode::Unavailable,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Print the stored profile
    Show,
    /// Save the profile, replacing any previous one
    Set {
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "prefer_not")]
        gender: String,
        #[arg(long, default_value = "")]
        height: String,
    },
}

pub async fn execute(cli: Cli) -> Result<()> {
    let catalog = Arc::new(PoseCatalog::builtin());

    match cli.command {
        Commands::Poses => {
            print_poses(&catalog);
            Ok(())
        }
        Commands::Practice(args) => practice(&cli.data_dir, catalog, args).await,
        Commands::Stats { json } => {
            let db = open_database(&cli.data_dir)?;
            let history = db.list_sessions().await?;
            let overview = ProfileOverview::build(&history, &catalog, Local::now());
            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                print_overview(&overview);
            }
            Ok(())
        }
        Commands::Profile(ProfileCommand::Show) => {
            let db = open_database(&cli.data_dir)?;
            match db.get_profile().await? {
                Some(profile) => {
                    println!("username: {}", profile.username);
                    println!("email:    {}", or_dash(&profile.email));
                    println!("gender:   {}", profile.gender);
                    println!("height:   {}", or_dash(&profile.height));
                }
                None => println!("No profile saved yet."),
            }
            Ok(())
        }
        Commands::Profile(ProfileCommand::Set {
            username,
            email,
            gender,
            height,
        }) => {
            let db = open_database(&cli.data_dir)?;
            let profile = ProfileRecord {
                username,
                email,
                gender,
                height,
            };
            db.set_profile(&profile).await?;
            println!("Profile saved.");
            Ok(())
        }
    }
}

fn open_database(data_dir: &Path) -> Result<Database> {
    Database::new(data_dir.join(DATABASE_FILE_NAME))
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))
}

async fn practice(data_dir: &Path, catalog: Arc<PoseCatalog>, args: PracticeArgs) -> Result<()> {
    let db = open_database(data_dir)?;
    let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE_NAME))?.practice();

    let mut timings = settings.timings.to_timings();
    if debug_enabled() {
        timings.heartbeat_every_ticks = 1;
    }

    let rng: Box<dyn RandomSource> = match args.seed {
        Some(seed) => Box::new(StdRandom::seeded(seed)),
        None => Box::new(StdRandom::from_entropy()),
    };

    let camera = Arc::new(SimulatedCamera::new(args.camera.into()));
    let controller = SessionController::new(catalog.clone(), camera, Arc::new(db))
        .with_random(rng)
        .with_timings(timings)
        .with_constraints(settings.camera);

    let mut events = controller.subscribe();
    if let Err(err) = controller.start(&args.pose).await {
        bail!("could not start session: {err}");
    }
    println!(
        "Practising {} for up to {}s. Press Ctrl-C to finish early.",
        catalog.display_name(&args.pose),
        args.seconds
    );
    if let Some(pose) = catalog.get(&args.pose) {
        println!("{}", pose.briefing);
    }

    let deadline = tokio::time::sleep(Duration::from_secs(args.seconds));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            received = events.recv() => match received {
                Ok(SessionEvent::Completed(completed)) => {
                    print_completed(&completed);
                    return Ok(());
                }
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    log_warn!("Display fell behind, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    if controller.status().await == SessionStatus::Live {
        controller.stop().await?;
    }
    match controller.completed().await {
        Some(completed) => print_completed(&completed),
        None => println!("Session ended without a summary."),
    }
    Ok(())
}

fn print_poses(catalog: &PoseCatalog) {
    for pose in catalog.iter() {
        println!("{}", describe_pose(pose));
    }
}

/// Heading line plus the indented briefing.
fn describe_pose(pose: &PoseDefinition) -> String {
    format!(
        "{:<10} {} ({})\n           {}",
        pose.id, pose.display_name, pose.alternate_name, pose.briefing
    )
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::StateChanged { status } => println!("[{}]", status),
        SessionEvent::Feedback { areas, .. } => {
            for correction in areas {
                println!(
                    "  {:<7} {}: {}",
                    correction.severity.as_str(),
                    correction.area,
                    correction.message
                );
            }
        }
        SessionEvent::Score { score, tier } => println!("score {}% ({})", score, tier.label()),
        SessionEvent::Heartbeat { elapsed_seconds } => println!("elapsed {}s", elapsed_seconds),
        SessionEvent::Completed(completed) => print_completed(completed),
    }
}

fn print_completed(completed: &CompletedSession) {
    let record = &completed.record;
    println!();
    println!("Accuracy:  {}%", record.score);
    println!("Stability: {}%", record.stability);
    println!("Duration:  {}", completed.duration_label);
    println!();
    println!("{}", record.feedback_summary);
    println!("{}", completed.highlight);
}

fn print_overview(overview: &ProfileOverview) {
    if overview.is_empty() {
        println!("No sessions yet. Run `deha practice <pose>` to record one.");
        return;
    }

    println!("Sessions:  {}", overview.total_sessions);
    if let Some(average) = overview.average_accuracy {
        println!("Average:   {}%", average);
    }
    if let Some(pose) = &overview.favourite_pose {
        println!("Favourite: {}", pose);
    }
    println!("Streak:    {} day(s)", overview.streak);

    if !overview.patterns.is_empty() {
        println!();
        for pattern in &overview.patterns {
            println!(
                "{} | {} ({}%)",
                pattern.badge(),
                pattern.subject,
                pattern.frequency_percent
            );
            println!("  {}", pattern.description);
        }
    }

    println!();
    for card in &overview.history {
        println!(
            "{:<12} {:<24} {:<16} {}",
            card.date_label,
            card.pose_name,
            card.score_label(),
            card.duration_label
        );
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn practice_parses_with_defaults() {
        let cli = Cli::try_parse_from(["deha", "practice", "tree", "--seed", "7"]).unwrap();
        match cli.command {
            Commands::Practice(args) => {
                assert_eq!(args.pose, "tree");
                assert_eq!(args.seconds, 30);
                assert_eq!(args.seed, Some(7));
                assert_eq!(args.camera, CameraArg::Available);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn profile_set_requires_username() {
        assert!(Cli::try_parse_from(["deha", "profile", "set"]).is_err());
        let cli = Cli::try_parse_from([
            "deha",
            "--data-dir",
            "/tmp/deha",
            "profile",
            "set",
            "--username",
            "asha",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/deha"));
        assert!(matches!(
            cli.command,
            Commands::Profile(ProfileCommand::Set { ref gender, .. }) if gender == "prefer_not"
        ));
    }

    #[test]
    fn pose_listing_includes_the_briefing() {
        let catalog = PoseCatalog::builtin();
        let tree = catalog.get("tree").unwrap();
        let text = describe_pose(&tree);

        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("tree "));
        assert_eq!(lines.next().unwrap().trim(), tree.briefing);
        assert!(!tree.briefing.is_empty());
    }

    #[tokio::test]
    async fn profile_round_trips_through_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();

        let set = Cli::try_parse_from([
            "deha",
            "profile",
            "set",
            "--username",
            " Asha ",
        ])
        .unwrap();
        execute(Cli { data_dir: data_dir.clone(), ..set }).await.unwrap();

        let db = open_database(&data_dir).unwrap();
        let profile = db.get_profile().await.unwrap().unwrap();
        assert_eq!(profile.username, "Asha");
    }
}
