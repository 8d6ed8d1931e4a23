pub mod model;
pub mod planner;

pub use model::{Plan, Task};
pub use planner::Planner;
