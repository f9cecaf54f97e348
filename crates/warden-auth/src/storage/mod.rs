//! Storage traits for clients, authorization codes and tokens.
//!
//! The engine owns no persistent state. Everything it issues goes through
//! these traits, and implementations live in separate crates
//! (`warden-auth-memory` ships an in-memory one).

pub mod client;
pub mod grant;
pub mod token;

pub use client::ClientRegistry;
pub use grant::GrantStorage;
pub use token::TokenStorage;
