//! Typed persistence for brandkit entities over a pluggable row backend.

pub mod backend;
pub mod entity;
pub mod error;
pub mod filter;
pub mod memory;
pub mod remote;
pub mod similarity;
pub mod store;

pub use backend::Backend;
pub use entity::{table_name, Entity};
pub use error::StoreError;
pub use filter::Filter;
pub use memory::MemoryBackend;
pub use remote::RowStoreBackend;
pub use similarity::cosine_similarity;
pub use store::Store;
