//! Pipeline definitions
//!
//! Named pipelines are described in YAML or JSON:
//!
//! ```yaml
//! default_prefix: item
//! pipelines:
//!   - name: intake
//!     steps:
//!       - processor: normalize
//!       - processor: enrich
//!         when: "item.amount > 100"
//!       - pipeline: audit
//! ```
//!
//! Processors are referenced by name and bound to caller-supplied
//! instances when the definitions are built.

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A set of pipeline definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelinesConfig {
    /// Prefix used by step conditions that do not set their own
    #[serde(default)]
    pub default_prefix: Option<String>,

    #[serde(default)]
    pub pipelines: Vec<PipelineDefinition>,
}

/// One named pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

/// One step: a catalog processor or another named pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,

    /// Condition expression; the step always runs when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// What a step runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTarget<'a> {
    Processor(&'a str),
    Pipeline(&'a str),
}

impl StepDefinition {
    pub fn processor(name: impl Into<String>) -> Self {
        Self {
            processor: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn pipeline(name: impl Into<String>) -> Self {
        Self {
            pipeline: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.when = Some(condition.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Exactly one of `processor` / `pipeline` must be set
    pub fn target(&self) -> Result<StepTarget<'_>> {
        match (&self.processor, &self.pipeline) {
            (Some(processor), None) => Ok(StepTarget::Processor(processor)),
            (None, Some(pipeline)) => Ok(StepTarget::Pipeline(pipeline)),
            (Some(_), Some(_)) => Err(SdkError::ConfigError(
                "a step sets both 'processor' and 'pipeline'".to_string(),
            )),
            (None, None) => Err(SdkError::ConfigError(
                "a step needs either 'processor' or 'pipeline'".to_string(),
            )),
        }
    }
}

impl PipelinesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") | None => Self::from_yaml_str(&content),
            Some(other) => Err(SdkError::ConfigError(format!(
                "unsupported definition file extension '{}' ({})",
                other,
                path.display()
            ))),
        }
    }

    pub fn with_default_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_prefix = Some(prefix.into());
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineDefinition) -> Self {
        self.pipelines.push(pipeline);
        self
    }
}

impl PipelineDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
default_prefix: item
pipelines:
  - name: intake
    steps:
      - processor: normalize
      - processor: enrich
        when: "item.amount > 100"
        prefix: order
      - pipeline: audit
"#;
        let config = PipelinesConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.default_prefix.as_deref(), Some("item"));
        assert_eq!(config.pipelines.len(), 1);

        let steps = &config.pipelines[0].steps;
        assert_eq!(steps[0].target().unwrap(), StepTarget::Processor("normalize"));
        assert_eq!(steps[1].when.as_deref(), Some("item.amount > 100"));
        assert_eq!(steps[1].prefix.as_deref(), Some("order"));
        assert_eq!(steps[2].target().unwrap(), StepTarget::Pipeline("audit"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"pipelines": [{"name": "p", "steps": [{"processor": "a"}]}]}"#;
        let config = PipelinesConfig::from_json_str(json).unwrap();
        assert!(config.default_prefix.is_none());
        assert_eq!(config.pipelines[0].name, "p");
    }

    #[test]
    fn test_step_target_must_be_unique() {
        let both = StepDefinition {
            processor: Some("a".to_string()),
            pipeline: Some("b".to_string()),
            ..StepDefinition::default()
        };
        assert!(both.target().is_err());
        assert!(StepDefinition::default().target().is_err());
    }

    #[test]
    fn test_builder_helpers_match_yaml() {
        let built = PipelinesConfig::new().with_default_prefix("item").with_pipeline(
            PipelineDefinition::new("intake")
                .step(StepDefinition::processor("normalize"))
                .step(StepDefinition::pipeline("audit").when("item.flagged = true")),
        );

        let yaml = serde_yaml::to_string(&built).unwrap();
        assert_eq!(PipelinesConfig::from_yaml_str(&yaml).unwrap(), built);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = PipelinesConfig::from_yaml_str("pipelines: [").unwrap_err();
        assert!(matches!(err, SdkError::YamlError(_)));
    }
}
