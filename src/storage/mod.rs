mod store;
mod types;

pub use store::DocumentStore;
pub use types::*;
