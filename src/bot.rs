//! WhatsApp chat front end: webhook endpoints, command parsing and replies.

pub mod command;
pub mod controller;
pub mod webhook;
