pub mod station_feedback;
pub mod transit;

pub use station_feedback::{STATION_FEEDBACK_JSON, station_feedback};
pub use transit::transit_satisfaction;
