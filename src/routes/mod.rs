//! Routers split by who may reach them. The authenticated and admin routers sit
//! behind the session layer; each handler then checks its own section.

/// Routes reachable without a session.
pub mod public;

/// Routes that require a resolved `Session`.
pub mod authenticated;

/// Routes under `/admin`, restricted to the admin sections.
pub mod admin;
