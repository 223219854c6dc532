pub mod classifier;
pub use classifier::*;

pub mod curve;
pub use curve::*;

pub mod stepper;
pub use stepper::*;
