pub mod artifact;
pub mod definition;
pub mod plan;
pub mod variable;

pub use artifact::*;
pub use definition::*;
pub use plan::*;
pub use variable::*;
