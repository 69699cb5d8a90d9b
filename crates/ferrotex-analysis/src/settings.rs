use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Report commands and environments whose package is not imported.
    pub automatic_dependency_check: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            automatic_dependency_check: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: AnalysisSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.automatic_dependency_check);

        let settings: AnalysisSettings =
            serde_json::from_str(r#"{"automatic_dependency_check": false}"#).unwrap();
        assert!(!settings.automatic_dependency_check);
    }
}
