//! Terminal front end for the notedeck application.
mod app;
mod args;

pub use app::*;
pub use args::*;
