pub mod node;
pub mod span;
