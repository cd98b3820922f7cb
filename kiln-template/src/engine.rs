//! Tera path-template engine — [`PathTemplate`].
//!
//! # Vocabulary
//!
//! | Reference                                  | Expands to                         |
//! |--------------------------------------------|------------------------------------|
//! | `{{ name }}`                               | release name                       |
//! | `{{ version }}`                            | release version                    |
//! | `{{ stemcell_os }}`                        | target stemcell OS                 |
//! | `{{ stemcell_version }}`                   | target stemcell version            |
//! | `{{ name \| trim_suffix(suffix="-x") }}`   | name with one trailing `-x` removed |
//!
//! Any other variable is an evaluation error naming that variable.

use std::collections::HashMap;
use std::fmt;

use tera::{Tera, Value};

use kiln_core::Requirement;

use crate::context::TemplateContext;
use crate::error::{describe, TemplateError};

const TEMPLATE_NAME: &str = "path_template";

/// Layout used by local-directory sources that do not configure a template.
pub const DEFAULT_LOCAL_TEMPLATE: &str = "{{ name }}-{{ version }}.tgz";

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// `trim_suffix(suffix="…")` — drop one trailing occurrence of `suffix`.
fn trim_suffix(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = tera::try_get_value!("trim_suffix", "value", String, value);
    let suffix = match args.get("suffix") {
        Some(arg) => tera::try_get_value!("trim_suffix", "suffix", String, arg),
        None => {
            return Err(tera::Error::msg(
                "Filter `trim_suffix` expected an arg called `suffix`",
            ))
        }
    };
    let trimmed = text.strip_suffix(suffix.as_str()).unwrap_or(text.as_str());
    Ok(Value::String(trimmed.to_owned()))
}

// ---------------------------------------------------------------------------
// PathTemplate
// ---------------------------------------------------------------------------

/// A parsed path template.
///
/// Parse once when the source is configured, then [`expand`](Self::expand)
/// per requirement. Expansion is pure: the same requirement always yields
/// the same key.
pub struct PathTemplate {
    source: String,
    tera: Tera,
}

impl PathTemplate {
    /// Parse `source` as a tera template.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.register_filter("trim_suffix", trim_suffix);
        tera.add_raw_template(TEMPLATE_NAME, source)
            .map_err(|e| TemplateError::Parse {
                template: source.to_owned(),
                message: describe(&e),
            })?;
        Ok(PathTemplate {
            source: source.to_owned(),
            tera,
        })
    }

    /// The template text as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render with a caller-provided [`TemplateContext`].
    pub fn render(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        let context = ctx
            .to_tera_context()
            .map_err(|e| self.evaluate_err(describe(&e)))?;
        let rendered = self
            .tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| self.evaluate_err(describe(&e)))?;
        if rendered.trim().is_empty() {
            return Err(self.evaluate_err("template rendered an empty path".to_owned()));
        }
        Ok(rendered)
    }

    /// Expand the template for `requirement`.
    pub fn expand(&self, requirement: &Requirement) -> Result<String, TemplateError> {
        self.render(&TemplateContext::from_requirement(requirement))
    }

    fn evaluate_err(&self, message: String) -> TemplateError {
        TemplateError::Evaluate {
            template: self.source.clone(),
            message,
        }
    }
}

impl fmt::Debug for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathTemplate")
            .field("source", &self.source)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
