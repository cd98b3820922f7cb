//! Template context — the named fields a path template may reference.

use serde::Serialize;

use kiln_core::Requirement;

/// Flat rendering payload built from a [`Requirement`].
///
/// Field names are the template vocabulary: `name`, `version`, `stemcell_os`,
/// `stemcell_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateContext {
    pub name: String,
    pub version: String,
    pub stemcell_os: String,
    pub stemcell_version: String,
}

impl TemplateContext {
    pub fn from_requirement(requirement: &Requirement) -> Self {
        Self {
            name: requirement.name.clone(),
            version: requirement.version.clone(),
            stemcell_os: requirement.stemcell_os.clone(),
            stemcell_version: requirement.stemcell_version.clone(),
        }
    }

    pub(crate) fn to_tera_context(&self) -> Result<tera::Context, tera::Error> {
        tera::Context::from_serialize(self)
    }
}
