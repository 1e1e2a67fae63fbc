//! Output formatting for the module listing.

use earsmith::{Module, ModuleSet};
use serde::Serialize;

/// Format the module set for human-readable output.
#[must_use]
pub fn format_human(modules: &ModuleSet) -> String {
    if modules.is_empty() && modules.excluded().next().is_none() {
        return String::from("No modules: the project has no packageable dependencies.");
    }

    let mut output = String::new();
    push_section(&mut output, "Packaged modules", modules.runtime());
    push_section(&mut output, "Provided modules", modules.provided());
    push_section(&mut output, "Excluded modules", modules.excluded());
    output
}

fn push_section<'a>(output: &mut String, title: &str, modules: impl Iterator<Item = &'a Module>) {
    let mut modules = modules.peekable();
    if modules.peek().is_none() {
        return;
    }
    if !output.is_empty() {
        output.push('\n');
    }
    output.push_str(title);
    output.push_str(":\n");
    for module in modules {
        output.push_str(&format!(
            "  {:<40} {} [{}]\n",
            module.uri(),
            module.artifact(),
            module.kind().name()
        ));
    }
}

/// Format the module set as JSON.
///
/// # Errors
///
/// Returns the serializer error, which only occurs for writer failures.
pub fn format_json(modules: &ModuleSet) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ModuleListing::from_set(modules))
}

/// JSON-serializable view of a module set.
#[derive(Debug, Serialize)]
pub struct ModuleListing {
    /// Modules packaged into the archive.
    pub packaged: Vec<ModuleEntry>,
    /// Provided modules, referenced but not packaged.
    pub provided: Vec<ModuleEntry>,
    /// Modules excluded by their declaration.
    pub excluded: Vec<ModuleEntry>,
}

impl ModuleListing {
    fn from_set(modules: &ModuleSet) -> Self {
        Self {
            packaged: modules.runtime().map(ModuleEntry::from).collect(),
            provided: modules.provided().map(ModuleEntry::from).collect(),
            excluded: modules.excluded().map(ModuleEntry::from).collect(),
        }
    }
}

/// JSON entry for one module.
#[derive(Debug, Serialize)]
pub struct ModuleEntry {
    /// Full artifact identity.
    pub artifact: String,
    /// Module kind name.
    pub kind: &'static str,
    /// Standard artifact type.
    #[serde(rename = "type")]
    pub standard_type: &'static str,
    /// Dependency scope.
    pub scope: &'static str,
    /// Path inside the archive.
    pub uri: String,
    /// Web context root, for web applications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_root: Option<String>,
}

impl From<&Module> for ModuleEntry {
    fn from(module: &Module) -> Self {
        Self {
            artifact: module.artifact().to_string(),
            kind: module.kind().name(),
            standard_type: module.standard_type().as_str(),
            scope: module.artifact().scope.as_str(),
            uri: module.uri().to_owned(),
            context_root: module.kind().context_root().map(str::to_owned),
        }
    }
}
