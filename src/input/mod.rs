//! Input adapters: receive host input and translate it into domain events.

#[cfg(feature = "gui")]
pub mod gui;
