pub mod config;
mod error;
mod merge;
pub mod schema;
pub mod storage;
mod value;

pub use config::{Config, Format, RawData};
pub use error::{Error, Result};
pub use merge::deep_merge;
pub use schema::Schema;
pub use storage::{FileStorage, Storage, StorageFactory};
pub use value::{Map, Value};
