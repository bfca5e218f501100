//! # State Module
//!
//! Holds the terminal's session state.
//!
//! Instead of a single `AppState` struct, the terminal keeps separate state
//! types and each command borrows only the one it needs:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │  Register    │  │   ReturnsDesk    │  │   AppConfig      │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Cart        │  │  Option<Return   │  │  store name      │          │
//! │  │  Store ──────┼──┼─► Session>       │  │  currency        │          │
//! │  │              │  │  Store           │  │  data dir        │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  Both desks hold their own `Store` handle (paths only) and reload      │
//! │  the files they need on every operation.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A cart and a return can be open at the same time; they share nothing but
//! the files underneath.

mod register;
mod returns;

pub use register::Register;
pub use returns::{ReturnSummary, ReturnsDesk, StagedRefund};
