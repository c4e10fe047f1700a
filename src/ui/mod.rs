//! UI module - standalone UI primitives used by the card grid and the app

pub mod components;
pub mod messages;
