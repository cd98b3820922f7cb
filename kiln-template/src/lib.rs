//! # kiln-template
//!
//! Tera-based path templates that derive a backend storage key from a release
//! [`Requirement`](kiln_core::Requirement).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kiln_core::Requirement;
//! use kiln_template::PathTemplate;
//!
//! fn key_for(req: &Requirement) -> Option<String> {
//!     let template = PathTemplate::parse(
//!         r#"{{ name | trim_suffix(suffix="-release") }}/{{ name }}-{{ version }}.tgz"#,
//!     )
//!     .ok()?;
//!     template.expand(req).ok()
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::TemplateContext;
pub use engine::{PathTemplate, DEFAULT_LOCAL_TEMPLATE};
pub use error::TemplateError;
