//! Order-history analysis: pure aggregation over past orders plus a
//! recommender strategy that turns the numbers into advice.

pub mod aggregate;
pub mod dto;
pub mod handlers;
pub mod services;

pub use handlers::router;
