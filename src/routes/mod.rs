//! Routers grouped by who may call them.
//!
//! The route guard in front of all of them handles page navigation (login and role
//! redirects); handlers still check roles themselves for direct API calls.

/// Reachable without a session: health, landing page, sign-up and sign-in.
pub mod public;

/// Any signed-in role.
pub mod authenticated;

/// Nested under `/user`; customers only.
pub mod user;

/// Nested under `/admin`; admins and super-admins.
pub mod admin;

/// Nested under `/super-admin`.
pub mod super_admin;
