//! Resilient transit feed poller.
//!
//! Keeps a fixed set of rail and TfL feeds fresh: each feed polls its
//! upstream on its own timer and always serves its last good snapshot,
//! even while the upstream is failing. Rail boards come from Darwin when
//! an API key is configured and fall back to Huxley otherwise.

pub mod cache;
pub mod config;
pub mod domain;
pub mod feeds;
pub mod providers;
pub mod train;
pub mod web;

#[cfg(test)]
mod testing;
