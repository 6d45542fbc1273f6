pub mod path;
mod schema;
mod types;

pub use schema::*;
pub use types::*;
