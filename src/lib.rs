//! Log Dashboard - live-indexed log directory browser.

pub mod config;
pub mod dashboard;
pub mod index;
pub mod service;
pub mod watcher;
