//! Shared types for the Sigil compiler: spans, tokens, the diagnostic
//! envelope, effect sets, project configuration, and the module graph.
//! Every other crate in the workspace depends on this one.

pub mod config;
pub mod diagnostic;
pub mod effect;
pub mod module_graph;
pub mod span;
pub mod token;

pub use diagnostic::{Diagnostic, Envelope, Phase};
pub use effect::{Effect, EffectSet};
pub use span::{LineCol, LineIndex, Span};
pub use token::{Token, TokenKind};
