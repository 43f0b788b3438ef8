//! MemberDesk Application - Ports and use cases
//!
//! This crate defines the boundaries the infrastructure layer implements
//! and the member use cases the web API drives.

pub mod error;
pub mod ports;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult};
