pub mod memory;
pub mod poll;
pub mod store;
pub mod user;

pub use memory::MemoryStore;
pub use store::{PgStore, PollStore, UserStore};
