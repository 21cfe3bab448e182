//! Drives navigation states from a Bevy app.

pub mod component;
