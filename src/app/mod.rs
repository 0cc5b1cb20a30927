//! Background tasks and state for front-ends that drive copy runs.

pub mod events;
pub mod proxy;
pub mod state;
pub mod tasks;
