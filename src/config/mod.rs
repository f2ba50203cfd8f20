//! Schema-bound configuration documents.

mod document;
mod path;

pub use document::{Config, Format, RawData};
