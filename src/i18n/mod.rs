//! Internationalization (i18n) module.
//!
//! Holds the language registry: the single source of truth for which
//! ISO 639-1 codes the relay accepts, and the human-readable names used
//! in outbound message headers and command replies.

mod registry;

pub use registry::{LanguageInfo, LanguageRegistry};
