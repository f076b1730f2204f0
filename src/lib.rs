//! liveball-bot - a WhatsApp soccer bot.
//!
//! Answers live score, fixture and result queries for the leagues a user
//! follows, and optionally pushes kickoff, goal and full time alerts by
//! polling the feed and diffing each match against its last seen state.

pub mod bot;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod feed;
pub mod football;
pub mod logging;
pub mod messenger;
pub mod repository;
pub mod service;
pub mod subscriber;
pub mod task;
