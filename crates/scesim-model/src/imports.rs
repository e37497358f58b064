//! Type imports of a document

use serde::{Deserialize, Serialize};

/// Imported type
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Import {
    #[serde(rename = "type", default)]
    type_name: String,
}

impl Import {
    /// Create import of a fully qualified type name
    #[inline]
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }

    /// Imported type name
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Import list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Imports {
    #[serde(rename = "Import", default)]
    items: Vec<Import>,
}

impl Imports {
    /// Add import unless already present
    pub fn add_import(&mut self, import: Import) {
        if !self.items.contains(&import) {
            self.items.push(import);
        }
    }

    /// Remove import by type name
    pub fn remove_import(&mut self, type_name: &str) {
        self.items.retain(|i| i.type_name != type_name);
    }

    /// All imports
    #[inline]
    #[must_use]
    pub fn imports(&self) -> &[Import] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_imports_ignored() {
        let mut imports = Imports::default();
        imports.add_import(Import::new("org.test.Test"));
        imports.add_import(Import::new("org.test.Test"));
        assert_eq!(imports.imports().len(), 1);

        imports.remove_import("org.test.Test");
        assert!(imports.imports().is_empty());
    }
}
