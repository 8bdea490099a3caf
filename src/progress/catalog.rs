// src/progress/catalog.rs

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Static description of one subject module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDefinition {
    pub id: String,
    pub name: String,
    #[serde(default = "default_emoji")]
    pub emoji: String,
    pub total_questions: u32,
}

fn default_emoji() -> String {
    "📚".to_string()
}

/// Immutable list of the modules a user can take.
///
/// Built once at startup and shared through the application state.
/// Declaration order is the order used for listings and exploration hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleCatalog {
    modules: Vec<ModuleDefinition>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read module catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse module catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid module catalog: {0}")]
    Invalid(String),
}

impl ModuleCatalog {
    /// Builds a catalog, rejecting duplicate ids and empty modules.
    pub fn new(modules: Vec<ModuleDefinition>) -> Result<Self, CatalogError> {
        for (i, module) in modules.iter().enumerate() {
            if module.id.trim().is_empty() {
                return Err(CatalogError::Invalid("module id cannot be empty".to_string()));
            }
            if module.total_questions == 0 {
                return Err(CatalogError::Invalid(format!(
                    "module '{}' must have at least one question",
                    module.id
                )));
            }
            if modules[..i].iter().any(|m| m.id == module.id) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate module id '{}'",
                    module.id
                )));
            }
        }
        Ok(Self { modules })
    }

    /// Loads a catalog from a JSON array of module definitions.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let modules: Vec<ModuleDefinition> = serde_json::from_str(&raw)?;
        Self::new(modules)
    }

    pub fn get(&self, module_id: &str) -> Option<&ModuleDefinition> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    pub fn contains(&self, module_id: &str) -> bool {
        self.get(module_id).is_some()
    }

    pub fn modules(&self) -> &[ModuleDefinition] {
        &self.modules
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ModuleCatalog {
    /// The eight subjects offered by the application.
    fn default() -> Self {
        let module = |id: &str, name: &str, emoji: &str| ModuleDefinition {
            id: id.to_string(),
            name: name.to_string(),
            emoji: emoji.to_string(),
            total_questions: 10,
        };

        Self {
            modules: vec![
                module("math", "Mathématiques", "🔢"),
                module("physics", "Physique", "⚛️"),
                module("chemistry", "Chimie", "🧪"),
                module("biology", "Biologie", "🧬"),
                module("french", "Français", "📚"),
                module("english", "Anglais", "🇬🇧"),
                module("history", "Histoire", "🏛️"),
                module("geography", "Géographie", "🌍"),
            ],
        }
    }
}
