//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Multi-row writes run in a single
//! transaction.

pub mod card_repo;
pub mod deck_repo;
pub mod note_model_repo;
pub mod note_repo;
pub mod review_log_repo;
pub mod shared_deck_repo;
pub mod shared_deck_snapshot_repo;
pub mod stats_repo;
pub mod user_repo;

pub use card_repo::CardRepo;
pub use deck_repo::DeckRepo;
pub use note_model_repo::NoteModelRepo;
pub use note_repo::NoteRepo;
pub use review_log_repo::ReviewLogRepo;
pub use shared_deck_repo::SharedDeckRepo;
pub use shared_deck_snapshot_repo::SharedDeckSnapshotRepo;
pub use stats_repo::StatsRepo;
pub use user_repo::UserRepo;
