//! Session output layout: one timestamped directory per conversion.

mod planner;

pub use planner::{SessionPlan, SessionPlanner, chunk_filename};
