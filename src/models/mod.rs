//! Data models for the reading list.

mod recommendation;
mod sample;

pub use recommendation::*;
pub use sample::*;
