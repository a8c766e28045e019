//! Campus shuttle journey planner server.
//!
//! Answers "how do I get from this stop to that one?" over a network of
//! shuttle routes, ranking itineraries by travel time, fare and how
//! crowded the shuttles are.

pub mod domain;
pub mod planner;
pub mod provider;
pub mod web;
