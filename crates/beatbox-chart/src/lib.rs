mod error;
mod loader;
mod model;
mod parser;
mod source;
mod tempo;

pub use error::*;
pub use loader::*;
pub use model::*;
pub use parser::*;
pub use source::*;
pub use tempo::*;
