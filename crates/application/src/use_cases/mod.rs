//! Application use cases (business logic orchestration).

mod members;

pub use members::*;
