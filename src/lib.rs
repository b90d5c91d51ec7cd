//! Video Studio
//!
//! Job service behind the video studio: validates processing requests
//! (AI enhance or editing tools), and drives each job through a
//! timer-driven progress controller that reports progress, phase labels,
//! and a result handle on completion.

pub mod app_state;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
