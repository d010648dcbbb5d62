//! Cache domain - byte-store abstraction shared by every wizard component

mod repository;

pub use repository::{CacheStore, CacheStoreExt};
