//! Domain logic for DeckHub with no I/O.
//!
//! Everything in this crate is a pure function of its inputs so it can be
//! shared by the repository layer, the HTTP handlers and tests.

pub mod content_hash;
pub mod deck;
pub mod error;
pub mod hashing;
pub mod note;
pub mod ownership;
pub mod publish;
pub mod review;
pub mod roles;
pub mod scheduler;
pub mod search;
pub mod types;
