//! Repo Market - storefront for reusable React components
//!
//! Sellers edit component source in an in-browser editor and buyers try a
//! live preview before checkout. Built with Leptos and WebAssembly; the
//! server binary also proxies the marketplace backend.

#![recursion_limit = "4096"]

pub mod app;
pub mod core;
pub mod ui;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
