//! Email open tracking behind a 1x1 pixel.
//!
//! A pixel load for a (recipient, title) pair first arms a tracker, opens
//! after a short activation window are counted in a key-value store, and
//! activations and counted opens are pushed to an ntfy topic.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
