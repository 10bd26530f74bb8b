//! Lumin Grove: runtime state core of a top-down action-adventure quest.
//!
//! `sim::step::Session` is the entry point. It owns the world, takes one
//! `FrameInput` per tick and hands back the events the presentation side
//! should show.

pub mod config;
pub mod domain;
pub mod sim;
pub mod ui;
