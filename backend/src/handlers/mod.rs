//! HTTP handlers for the Food Logistics Management Platform

pub mod health;
pub mod inventory;
pub mod planning;
pub mod withdrawal;

pub use health::*;
pub use inventory::*;
pub use planning::*;
pub use withdrawal::*;
