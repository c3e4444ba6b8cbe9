pub mod admin;
pub mod card;
pub mod deck;
pub mod note;
pub mod note_model;
pub mod review_log;
pub mod shared_deck;
