//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below exercises one protocol (or the socket path) against
//! the in-memory mock services in `mock_services`.

mod account_tests;
mod login_flow_tests;
mod mock_services;
mod notify_session_tests;
#[cfg(unix)]
mod socket_tests;
