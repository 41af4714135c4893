pub mod schema;
pub mod store;
pub mod writer;

pub use store::SqliteHistoryStore;
pub use writer::HistoryWriter;
