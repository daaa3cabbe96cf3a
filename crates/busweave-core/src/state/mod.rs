//! # Component State Module
//!
//! Structural diffing and the commit gate that decides whether a proposed
//! state is a real change.
//!
//! ```rust,ignore
//! use busweave_core::state::ComponentState;
//! use serde_json::json;
//!
//! let mut state = ComponentState::new();
//! let delta = state.commit(&json!({"count": 1}));   // Some({"count": 1})
//! let none = state.commit(&json!({}));              // None: omission is not deletion
//! ```

mod diff;
mod store;

pub use diff::*;
pub use store::*;
