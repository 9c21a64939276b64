//! Field registries
//!
//! A predicate never inspects an item reflectively. Every field name an
//! expression may mention is bound, per entity type, to an accessor closure
//! that reads the field as a [`Value`]. Accessors are looked up once at
//! compile time; evaluation only calls them.
//!
//! Dotted paths (`customer.address.city`) are registered by nesting one
//! registry inside another. The empty path names the entity itself, which is
//! what a bare prefix resolves to.

use condflow_core::Value;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Reads one field of `T`
pub type FieldAccessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// A type whose fields can be referenced by expressions
pub trait Entity: Sized + Send + Sync + 'static {
    /// Resolve a field path relative to the entity (`""` is the entity itself).
    fn resolve_field(path: &str) -> Option<FieldAccessor<Self>>;
}

/// Anything that can resolve field paths for `T`
pub trait FieldResolver<T> {
    fn resolve(&self, path: &str) -> Option<FieldAccessor<T>>;
}

impl<T, R: FieldResolver<T> + ?Sized> FieldResolver<T> for Box<R> {
    fn resolve(&self, path: &str) -> Option<FieldAccessor<T>> {
        (**self).resolve(path)
    }
}

impl<T, R: FieldResolver<T> + ?Sized> FieldResolver<T> for Arc<R> {
    fn resolve(&self, path: &str) -> Option<FieldAccessor<T>> {
        (**self).resolve(path)
    }
}

/// Resolves through [`Entity::resolve_field`]
pub struct EntityResolver<T>(PhantomData<fn() -> T>);

impl<T> EntityResolver<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for EntityResolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> FieldResolver<T> for EntityResolver<T> {
    fn resolve(&self, path: &str) -> Option<FieldAccessor<T>> {
        T::resolve_field(path)
    }
}

/// Explicit name -> accessor table for one entity type
pub struct FieldRegistry<T> {
    fields: HashMap<String, FieldAccessor<T>>,
    this: Option<FieldAccessor<T>>,
}

impl<T: 'static> FieldRegistry<T> {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
            this: None,
        }
    }

    /// Register a field. An empty name registers the entity itself.
    pub fn field<V, F>(mut self, name: &str, get: F) -> Self
    where
        V: Into<Value>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        let accessor: FieldAccessor<T> = Arc::new(move |item: &T| get(item).into());
        if name.is_empty() {
            self.this = Some(accessor);
        } else {
            self.fields.insert(name.to_string(), accessor);
        }
        self
    }

    /// Register the value the bare prefix evaluates to
    pub fn this<V, F>(self, get: F) -> Self
    where
        V: Into<Value>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.field("", get)
    }

    /// Merge the fields of a nested entity under `name.`
    ///
    /// If the inner registry has a self accessor, `name` alone becomes a
    /// field too.
    pub fn nested<U, F>(mut self, name: &str, get: F, inner: FieldRegistry<U>) -> Self
    where
        U: 'static,
        F: Fn(&T) -> &U + Send + Sync + 'static,
    {
        let get = Arc::new(get);
        let FieldRegistry { fields, this } = inner;

        if let Some(accessor) = this {
            let get = Arc::clone(&get);
            let outer: FieldAccessor<T> = Arc::new(move |item: &T| accessor(get(item)));
            self.fields.insert(name.to_string(), outer);
        }

        for (path, accessor) in fields {
            let get = Arc::clone(&get);
            let outer: FieldAccessor<T> = Arc::new(move |item: &T| accessor(get(item)));
            self.fields.insert(format!("{}.{}", name, path), outer);
        }
        self
    }

    pub fn lookup(&self, path: &str) -> Option<FieldAccessor<T>> {
        if path.is_empty() {
            return self.this.clone();
        }
        self.fields.get(path).cloned()
    }

    /// Registered field paths, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.this.is_none()
    }
}

impl<T: 'static> Default for FieldRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for FieldRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("fields", &self.names())
            .field("has_self", &self.this.is_some())
            .finish()
    }
}

impl<T: 'static> FieldResolver<T> for FieldRegistry<T> {
    fn resolve(&self, path: &str) -> Option<FieldAccessor<T>> {
        self.lookup(path)
    }
}

/// JSON-like records: every path resolves, missing segments read as null
impl Entity for Value {
    fn resolve_field(path: &str) -> Option<FieldAccessor<Self>> {
        if path.is_empty() {
            return Some(Arc::new(|value: &Value| value.clone()));
        }
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        Some(Arc::new(move |value: &Value| value.get_path(&segments)))
    }
}

// Scalars only expose themselves, so `x = {1, 2, 3}` with prefix `x` works
// directly on a number or string.
macro_rules! scalar_entity {
    ($($ty:ty),*) => {
        $(
            impl Entity for $ty {
                fn resolve_field(path: &str) -> Option<FieldAccessor<Self>> {
                    if path.is_empty() {
                        Some(Arc::new(|item: &$ty| Value::from(item.clone())))
                    } else {
                        None
                    }
                }
            }
        )*
    };
}

scalar_entity!(bool, f64, i64, i32, u32, String);
