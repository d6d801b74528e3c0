pub mod corpus;
pub mod models;

mod error;

pub use corpus::{CorpusSnapshot, CorpusStore};
pub use error::{Error, Result};
pub use models::Restaurant;
