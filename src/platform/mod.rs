//! Platform abstraction layer
//!
//! The browser host drives the simulation through [`web::WebSession`]
//! (wasm32 only). Native hosts use [`crate::sim`] directly.

#[cfg(target_arch = "wasm32")]
pub mod web;
