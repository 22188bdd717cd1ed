pub mod customer;
pub mod filter;
pub mod metrics;
pub mod owner;
pub mod segment;
