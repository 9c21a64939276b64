//! Processor catalog
//!
//! Maps the processor names used in definitions to already-constructed
//! instances. Nothing is instantiated from a type name.

use condflow_runtime::{ExecutionContext, Processor, Response};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Named, ready-to-run processors
pub struct ProcessorCatalog<T> {
    processors: HashMap<String, Arc<dyn Processor<T>>>,
}

impl<T> ProcessorCatalog<T> {
    pub fn new() -> Self {
        Self {
            processors: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Processor<T>>> {
        self.processors.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.processors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.processors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<T: 'static> ProcessorCatalog<T> {
    /// Register under the processor's own name
    pub fn register(&mut self, processor: Arc<dyn Processor<T>>) -> &mut Self {
        let name = processor.name().to_string();
        self.register_as(name, processor)
    }

    /// Register under an alias.
    ///
    /// The processor reports the alias as its name, so one instance can be
    /// registered under several aliases and used as distinct steps of the
    /// same pipeline.
    pub fn register_as(&mut self, name: impl Into<String>, processor: Arc<dyn Processor<T>>) -> &mut Self {
        let name = name.into();
        let processor = if processor.name() == name {
            processor
        } else {
            Arc::new(Aliased {
                name: name.clone(),
                inner: processor,
            })
        };
        if self.processors.insert(name.clone(), processor).is_some() {
            tracing::warn!("Processor '{}' registered twice, keeping the latest", name);
        }
        self
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, processor: Arc<dyn Processor<T>>) -> Self {
        self.register(processor);
        self
    }
}

impl<T> Default for ProcessorCatalog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ProcessorCatalog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorCatalog")
            .field("processors", &self.names())
            .finish()
    }
}

struct Aliased<T> {
    name: String,
    inner: Arc<dyn Processor<T>>,
}

impl<T> Processor<T> for Aliased<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, item: T, context: &ExecutionContext) -> anyhow::Result<Response<T>> {
        self.inner.execute(item, context)
    }
}
