//! The recognized-decorator-name sets Define/Class Services consult.
//!
//! `spec.md` §9 is explicit that these sets are "effectively configuration"
//! and must be modeled as an injected collaborator rather than a
//! process-wide singleton. [`RecognizedNames`] is that collaborator: every
//! function that needs one of these sets takes `&RecognizedNames` as a
//! parameter.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

fn set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

/// Decorator and alias name sets used by Define/Class Services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedNames {
    /// Decorators that expose a class-level property (`spec.md` §4.1),
    /// e.g. `util.classproperty`.
    pub class_property_decorators: HashSet<String>,
    /// Decorators that expose an instance property beyond the built-in
    /// `property`, e.g. framework-specific cached-property helpers.
    pub instance_property_decorators: HashSet<String>,
    /// Decorators recognized as classmethod-equivalents beyond the
    /// built-in `classmethod`.
    pub classmethod_decorators: HashSet<String>,
    /// Method names treated as constructors when `in_test` is set, in
    /// addition to `__init__`.
    pub test_constructor_aliases: HashSet<String>,
}

impl Default for RecognizedNames {
    fn default() -> Self {
        Self {
            class_property_decorators: set(&[
                "util.classproperty",
                "util.etc.cached_classproperty",
                "util.etc.class_property",
            ]),
            instance_property_decorators: set(&["property", "cached_property", "functools.cached_property"]),
            classmethod_decorators: set(&["classmethod"]),
            test_constructor_aliases: set(&["setUp", "_setup", "_async_setup", "with_context"]),
        }
    }
}

impl RecognizedNames {
    /// Load an override from a JSON file. Any field absent from the file
    /// keeps its default value — the file only needs to list the sets a
    /// host wants to extend.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading recognized-names config at {}", path.display()))?;
        let overrides: PartialRecognizedNames = serde_json::from_str(&contents)
            .with_context(|| format!("parsing recognized-names config at {}", path.display()))?;
        Ok(overrides.apply_to(Self::default()))
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("serializing recognized-names config")
    }
}

/// The on-disk shape of a config override: every field optional, so a
/// config file can extend just one set without repeating the defaults for
/// the rest.
#[derive(Debug, Default, Deserialize)]
struct PartialRecognizedNames {
    class_property_decorators: Option<HashSet<String>>,
    instance_property_decorators: Option<HashSet<String>>,
    classmethod_decorators: Option<HashSet<String>>,
    test_constructor_aliases: Option<HashSet<String>>,
}

impl PartialRecognizedNames {
    fn apply_to(self, mut base: RecognizedNames) -> RecognizedNames {
        if let Some(v) = self.class_property_decorators {
            base.class_property_decorators = v;
        }
        if let Some(v) = self.instance_property_decorators {
            base.instance_property_decorators = v;
        }
        if let Some(v) = self.classmethod_decorators {
            base.classmethod_decorators = v;
        }
        if let Some(v) = self.test_constructor_aliases {
            base.test_constructor_aliases = v;
        }
        base
    }
}
