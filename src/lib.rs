//! repoglance keeps an eye on a list of local Git working copies: on a
//! timer it classifies each one as ahead, behind, diverged, up to date, or
//! unknown relative to its remote, counts modified files, and reports an
//! aggregate attention flag for a status display to render.

pub mod config;
pub mod poller;
pub mod provider;
pub mod render;
pub mod repo_status;
