/// Tab Time Grouper - Chrome Extension that groups tabs by age
/// Built with Rust + WASM + Yew

pub mod background;
pub mod bucket;
pub mod error;
pub mod host;
pub mod label;
pub mod messages;
pub mod operations;
pub mod orchestrator;
pub mod service;
pub mod storage;
pub mod tab_data;
pub mod tracker;
pub mod ui;

mod chrome;

#[cfg(test)]
mod test_support;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
