pub mod cache_key;
pub mod scoring;
pub mod selection;
pub mod taxonomy;

pub use taxonomy::{ItemId, TermId};
