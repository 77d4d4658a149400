mod recovery;
mod validation;

pub use recovery::*;
pub use validation::*;
