pub mod model;
pub mod planner;
