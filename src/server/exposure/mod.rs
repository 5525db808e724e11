//! API exposure modules
//!
//! Each exposure consumes a `ServerHost` and produces a router for its
//! protocol. The catalog is served over REST only.

pub mod rest;

pub use rest::RestExposure;
