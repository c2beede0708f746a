pub mod analytics;
pub mod camera;
pub mod catalog;
pub mod cli;
pub mod db;
pub mod session;
pub mod settings;
pub mod store;
pub mod utils;

use clap::Parser;

pub use analytics::{PatternConfig, ProfileOverview};
pub use camera::{CameraError, CameraProvider, CaptureConstraints, SimulatedCamera};
pub use catalog::{Correction, PoseCatalog, PoseDefinition, Severity};
pub use db::models::{sort_newest_first, ProfileRecord, SessionRecord};
pub use db::Database;
pub use session::{SessionController, SessionError, SessionEvent, SessionStatus, SessionTimings};
pub use settings::{PracticeSettings, SettingsStore};
pub use store::{CorruptPersistedData, MemoryStore, SessionStore};

/// Entry point for the `deha` binary.
pub fn run() {
    utils::logging::init_logging();

    let cli = cli::Cli::parse();
    log::debug!("deha starting with data dir {}", cli.data_dir.display());

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("Failed to start async runtime: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = runtime.block_on(cli::execute(cli)) {
        log::error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
