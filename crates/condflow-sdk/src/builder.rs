//! Builder for pipeline registries
//!
//! Definitions from any number of YAML/JSON sources are merged, checked for
//! unknown or cyclic pipeline references, and built in dependency order so
//! that every referenced pipeline exists before the pipelines that nest it.

use crate::catalog::ProcessorCatalog;
use crate::config::{PipelineDefinition, PipelinesConfig, StepTarget};
use crate::error::{Result, SdkError};
use crate::registry::PipelineRegistry;
use condflow_compiler::{Entity, EntityResolver, FieldResolver};
use condflow_runtime::{Pipeline, Processor};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

type BoxedResolver<T> = Box<dyn FieldResolver<T> + Send + Sync>;

/// Builds a [`PipelineRegistry`] from definitions and a processor catalog
///
/// # Example
///
/// ```rust,ignore
/// use condflow_sdk::{EngineBuilder, ProcessorCatalog};
///
/// let registry = EngineBuilder::new(catalog)
///     .add_yaml(include_str!("pipelines.yaml"))?
///     .build()?;
///
/// let response = registry.execute("intake", order, &context)?;
/// ```
pub struct EngineBuilder<T> {
    catalog: ProcessorCatalog<T>,
    resolver: BoxedResolver<T>,
    configs: Vec<PipelinesConfig>,
}

impl<T: Entity> EngineBuilder<T> {
    /// Conditions resolve fields through [`Entity::resolve_field`]
    pub fn new(catalog: ProcessorCatalog<T>) -> Self {
        Self::with_resolver(catalog, EntityResolver::<T>::new())
    }
}

impl<T: 'static> EngineBuilder<T> {
    /// Conditions resolve fields through `resolver`
    pub fn with_resolver<R>(catalog: ProcessorCatalog<T>, resolver: R) -> Self
    where
        R: FieldResolver<T> + Send + Sync + 'static,
    {
        Self {
            catalog,
            resolver: Box::new(resolver),
            configs: Vec::new(),
        }
    }

    /// Add parsed definitions
    pub fn with_config(mut self, config: PipelinesConfig) -> Self {
        self.configs.push(config);
        self
    }

    /// Add definitions from YAML text
    pub fn add_yaml(self, content: &str) -> Result<Self> {
        Ok(self.with_config(PipelinesConfig::from_yaml_str(content)?))
    }

    /// Add definitions from JSON text
    pub fn add_json(self, content: &str) -> Result<Self> {
        Ok(self.with_config(PipelinesConfig::from_json_str(content)?))
    }

    /// Add definitions from a file
    pub fn add_file(self, path: impl AsRef<Path>) -> Result<Self> {
        Ok(self.with_config(PipelinesConfig::from_file(path)?))
    }

    /// Compile every condition and assemble the pipelines
    pub fn build(self) -> Result<PipelineRegistry<T>> {
        let definitions = self.collect_definitions()?;
        let order = build_order(&definitions)?;

        let mut registry = PipelineRegistry::new();
        for name in order {
            let (definition, default_prefix) = definitions.get(name)?;
            let pipeline = self.build_pipeline(definition, default_prefix, &registry)?;
            registry.insert(pipeline);
        }

        tracing::info!(
            "Loaded {} pipeline(s): {}",
            registry.len(),
            registry.names().join(", ")
        );
        Ok(registry)
    }

    /// Name -> (definition, default prefix of its source)
    fn collect_definitions(&self) -> Result<Definitions<'_>> {
        let mut definitions = Definitions::new();
        for config in &self.configs {
            for definition in &config.pipelines {
                if definition.name.trim().is_empty() {
                    return Err(SdkError::ConfigError(
                        "pipeline name must not be empty".to_string(),
                    ));
                }
                if definitions.contains(&definition.name) {
                    return Err(SdkError::ConfigError(format!(
                        "pipeline '{}' is defined more than once",
                        definition.name
                    )));
                }
                definitions.push(definition, config.default_prefix.clone());
            }
        }
        Ok(definitions)
    }

    fn build_pipeline(
        &self,
        definition: &PipelineDefinition,
        default_prefix: Option<&str>,
        built: &PipelineRegistry<T>,
    ) -> Result<Pipeline<T>> {
        let mut pipeline = Pipeline::new(definition.name.clone());

        for step in &definition.steps {
            let processor: Arc<dyn Processor<T>> = match step.target()? {
                StepTarget::Processor(name) => {
                    self.catalog
                        .get(name)
                        .ok_or_else(|| SdkError::UnknownProcessor {
                            pipeline: definition.name.clone(),
                            processor: name.to_string(),
                        })?
                }
                StepTarget::Pipeline(name) => built
                    .get(name)
                    .ok_or_else(|| SdkError::UnknownPipeline(name.to_string()))?,
            };

            let prefix = step.prefix.as_deref().or(default_prefix);
            pipeline.add_with(processor, step.when.as_deref(), prefix, &self.resolver)?;
        }

        tracing::debug!(
            "Built pipeline '{}' with {} step(s)",
            pipeline.name(),
            pipeline.len()
        );
        Ok(pipeline)
    }
}

/// Definitions in declaration order, indexed by name
struct Definitions<'a> {
    order: Vec<&'a str>,
    by_name: HashMap<&'a str, (&'a PipelineDefinition, Option<String>)>,
}

impl<'a> Definitions<'a> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    fn push(&mut self, definition: &'a PipelineDefinition, default_prefix: Option<String>) {
        self.order.push(&definition.name);
        self.by_name
            .insert(&definition.name, (definition, default_prefix));
    }

    fn get(&self, name: &str) -> Result<(&'a PipelineDefinition, Option<&str>)> {
        self.by_name
            .get(name)
            .map(|(definition, prefix)| (*definition, prefix.as_deref()))
            .ok_or_else(|| SdkError::UnknownPipeline(name.to_string()))
    }
}

/// Dependencies first; fails on unknown references and cycles
fn build_order<'a>(definitions: &Definitions<'a>) -> Result<Vec<&'a str>> {
    let mut order = Vec::with_capacity(definitions.order.len());
    let mut done = HashSet::new();
    let mut stack = Vec::new();

    for &name in &definitions.order {
        visit(name, definitions, &mut stack, &mut done, &mut order)?;
    }
    Ok(order)
}

fn visit<'a>(
    name: &'a str,
    definitions: &Definitions<'a>,
    stack: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
    order: &mut Vec<&'a str>,
) -> Result<()> {
    if done.contains(name) {
        return Ok(());
    }
    if let Some(start) = stack.iter().position(|&n| n == name) {
        let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
        cycle.push(name.to_string());
        return Err(SdkError::CyclicReference(cycle));
    }

    let (definition, _) = definitions.get(name)?;

    stack.push(name);
    for step in &definition.steps {
        if let StepTarget::Pipeline(reference) = step.target()? {
            visit(reference, definitions, stack, done, order)?;
        }
    }
    stack.pop();

    done.insert(name);
    order.push(name);
    Ok(())
}
