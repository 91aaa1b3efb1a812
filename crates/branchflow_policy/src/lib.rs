//! BRANCHFLOW Policy
//!
//! Defence in depth for untrusted flow data:
//! a coarse gate that rejects whole payloads before parsing, and a
//! sanitizer plus highlighter applied to every string shown to a user.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod gate;
pub mod highlight;
pub mod pattern;
pub mod sanitize;

pub use gate::{DangerPattern, GateVerdict, SafetyGate};
pub use highlight::{HIGHLIGHT_CLASS, Highlighter, render_safe_html};
pub use sanitize::{Sanitizer, decode_entities, escape_html};
