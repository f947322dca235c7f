//! Router Module Index
//!
//! Splits the portal's routes by how the route guard treats them. Every
//! router is merged into one and then wrapped by the guard middleware in
//! `create_router`; the split only decides which guard branch applies.

/// Pages reachable without a session (sign-in, logout) plus the
/// identity-provider callback, which the guard excludes entirely.
pub mod public;

/// JSON session endpoints under `/api`. Excluded from the guard; handlers
/// inspect the session flags themselves.
pub mod api;
