pub mod cuts;
pub mod error;
pub mod guillotine;
pub mod render;
pub mod solver;
pub mod types;

pub use error::{Error, Result};
