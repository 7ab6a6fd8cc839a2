//! `BugTrackr` API Library
//!
//! A small bug-tracking backend: bug records with a three-state status
//! lifecycle, served over a JSON REST API and stored either in memory or in
//! `PostgreSQL`.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod service;
