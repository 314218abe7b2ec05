//! Backend adapters, one per supported store kind.

mod memory;

#[cfg(feature = "document")]
mod document;
#[cfg(feature = "redb")]
mod embedded;
#[cfg(feature = "sqlite")]
mod relational;

pub use memory::MemoryBackend;

#[cfg(feature = "document")]
pub use document::DocumentBackend;
#[cfg(feature = "redb")]
pub use embedded::RedbBackend;
#[cfg(feature = "sqlite")]
pub use relational::SqliteBackend;
