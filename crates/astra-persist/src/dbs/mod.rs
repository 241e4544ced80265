pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use memory::InMemoryStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;
