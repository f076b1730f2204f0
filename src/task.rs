//! Background tasks.

pub mod match_update_publisher;
