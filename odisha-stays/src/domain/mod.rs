mod status;

pub use status::{Decision, StayStatus, TransitionPolicy};
