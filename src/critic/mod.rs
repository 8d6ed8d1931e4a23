pub mod critic;
pub mod model;

pub use critic::Critic;
pub use model::{CriticOutput, Presentation};
