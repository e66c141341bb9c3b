mod query;
mod store;

pub use query::GraphQuery;
pub use store::GraphStore;
