pub mod controller;
pub mod errors;
pub mod events;
pub mod feedback;
pub mod random;
pub mod scheduler;
pub mod score;
pub mod state;
pub mod summary;

pub use controller::SessionController;
pub use errors::SessionError;
pub use events::{CompletedSession, SessionEvent};
pub use feedback::FeedbackScheduler;
pub use random::{RandomSource, SequenceRandom, StdRandom};
pub use scheduler::{FirstTick, PeriodicTask, SessionTimings};
pub use score::{ScoreReading, ScoreScheduler, ScoreTier};
pub use state::{CorrectionTally, EndReason, LiveSessionState, SessionStatus};
pub use summary::SummaryBuilder;
