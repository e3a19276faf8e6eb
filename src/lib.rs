//! Local note-taking library
//!
//! This library keeps a collection of notes in durable key-value slots and
//! derives filtered views, category lists, exports and share links from it.

mod cli;
mod config;
mod errors;
mod export;
mod helper;
mod note;
mod session;
mod settings;
mod share;
mod sketch;
mod slot;
mod storage;
mod types;
mod upload;
mod view;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use errors::*;
pub use export::*;
pub use helper::*;
pub use note::*;
pub use session::*;
pub use settings::*;
pub use share::*;
pub use sketch::*;
pub use slot::*;
pub use storage::*;
pub use types::*;
pub use upload::*;
pub use view::*;
