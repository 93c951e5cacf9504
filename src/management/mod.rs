mod auth;
mod state;

pub use auth::TokenManager;
pub use state::CommitOutcome;
pub use state::CommitRecord;
pub use state::DATE_FILENAME;
pub use state::PREVIOUS_TRACKS_FILENAME;
pub use state::STATE_FILENAMES;
pub use state::StateStore;
pub use state::StoredState;
