//! # Till Terminal Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till Terminal                                    │
//! │                                                                         │
//! │  stdin ──► main.rs ──► lib.rs::run ──► commands/ ──► state/             │
//! │                                                          │              │
//! │  stdout ◄── one JSON line per command ◄──────────────────┤              │
//! │                                                          ▼              │
//! │                              products.json • sales.json • returns.json  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `till [--config <path>]`

fn main() {
    // The actual setup is in lib.rs for better testability
    if let Err(err) = till_terminal::run() {
        eprintln!("till: {}", err);
        std::process::exit(1);
    }
}
