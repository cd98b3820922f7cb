//! Kilnfile variables.
//!
//! A Kilnfile may reference `$( variable "name" )`; values come from YAML
//! variables files and `key=value` pairs, pairs winning over files and later
//! files over earlier ones. Substitution happens on the raw text before the
//! Kilnfile is parsed, so `{{ ... }}` path templates are left untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{io_err, KilnfileError};

const OPEN: &str = "$(";

/// Resolved variable values by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    /// Merge `files` in order, then `pairs` (`key=value`).
    pub fn load(files: &[PathBuf], pairs: &[String]) -> Result<Self, KilnfileError> {
        let mut vars = Self::default();
        for file in files {
            vars.merge_file(file)?;
        }
        for pair in pairs {
            let (key, value) = pair.split_once('=').ok_or_else(|| KilnfileError::Variable {
                message: format!("could not parse variable {pair:?}, expected key=value"),
            })?;
            vars.set(key.trim(), value);
        }
        Ok(vars)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), KilnfileError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let parsed: BTreeMap<String, Value> =
            serde_yaml::from_str(&contents).map_err(|e| KilnfileError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        for (key, value) in parsed {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(KilnfileError::Variable {
                        message: format!(
                            "variable {key:?} in {} must be a scalar",
                            path.display()
                        ),
                    })
                }
            };
            self.set(key, text);
        }
        Ok(())
    }

    /// Replace every `$( variable "name" )` in `text`.
    pub fn interpolate(&self, text: &str) -> Result<String, KilnfileError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(OPEN) {
            out.push_str(&rest[..start]);
            let after = &rest[start + OPEN.len()..];
            let end = after.find(')').ok_or_else(|| KilnfileError::Variable {
                message: "unterminated $( in Kilnfile".to_owned(),
            })?;
            let name = variable_name(&after[..end])?;
            let value = self.get(name).ok_or_else(|| KilnfileError::Variable {
                message: format!("could not find variable with key {name:?}"),
            })?;
            out.push_str(value);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// `variable "name"` → `name`.
fn variable_name(expr: &str) -> Result<&str, KilnfileError> {
    expr.trim()
        .strip_prefix("variable")
        .map(str::trim)
        .and_then(|quoted| quoted.strip_prefix('"'))
        .and_then(|quoted| quoted.strip_suffix('"'))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| KilnfileError::Variable {
            message: format!("unsupported expression $({expr}), expected $( variable \"name\" )"),
        })
}
