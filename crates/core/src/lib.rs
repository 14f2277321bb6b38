//! Domain logic shared by the repliq backend crates.
//!
//! Everything in this crate is pure: no I/O, no database, no HTTP. The
//! receipt-title heuristic, the request status machine, and the role model
//! live here so they can be tested without a running service.

pub mod error;
pub mod receipt;
pub mod roles;
pub mod status;
pub mod types;
