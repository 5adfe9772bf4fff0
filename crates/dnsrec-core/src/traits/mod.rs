//! Seams of the DNS record controller
//!
//! - [`Transport`]: HTTP exchange with the domain-hosting API
//! - [`StateStore`]: persistent state of managed records

pub mod state_store;
pub mod transport;

pub use state_store::{ResourceState, StateStore};
pub use transport::{ApiRequest, ApiResponse, Method, Transport};
