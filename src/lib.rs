#![doc = include_str!("../README.md")]

pub mod auth;
pub mod config;
pub mod counter;
pub mod directory;
pub mod error;
pub mod pages;
pub mod phone;
pub mod posts;
pub mod render;
pub mod server;
pub mod state;
pub mod traits;
pub mod types;

// Re-exports for convenient access
pub use auth::{AuthError, Authenticated, SessionContext};
pub use config::AppConfig;
pub use counter::{Caller, MemoryTally, VisitCounter};
pub use directory::{Identity, UserDirectory};
pub use error::Error;
pub use render::HtmlRenderer;
pub use server::build_router;
pub use state::AppState;
pub use traits::{Renderer, TallyStore};
pub use types::{Flash, FlashLevel, UserId};
