use serde::{Deserialize, Serialize};
use std::fmt;

/// A LaTeX package that has to be imported before some commands or
/// environments become available.
///
/// The empty name is reserved for [`Package::DEFAULT`], the sentinel for
/// everything the LaTeX kernel (or the document class) already provides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    /// Options to pass when importing, e.g. `utf8` for `inputenc`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Package {
    /// Always satisfied, never needs an import.
    pub const DEFAULT: Package = Package {
        name: String::new(),
        options: Vec::new(),
    };

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Returns a copy of this package that is imported with the given option.
    pub fn with(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn is_default(&self) -> bool {
        self.name.is_empty()
    }

    /// The `\usepackage` line importing this package.
    pub fn usepackage(&self) -> String {
        if self.options.is_empty() {
            format!("\\usepackage{{{}}}", self.name)
        } else {
            format!("\\usepackage[{}]{{{}}}", self.options.join(","), self.name)
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("<default>")
        } else {
            f.write_str(&self.name)
        }
    }
}
