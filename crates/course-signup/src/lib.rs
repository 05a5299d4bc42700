//! Course signup service library.
//!
//! Two capabilities live here: a static course catalog (subject → topic →
//! timeslot) loaded once at startup, and a session-scoped signup workflow that
//! validates cascading selections and persists one student record per session.
//! The `workflows::signup` router exposes both over HTTP for the form
//! collaborator.

pub mod catalog;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
