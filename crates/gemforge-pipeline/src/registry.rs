//! [`PluginRegistry`]: process-wide, priority-ordered plugin discovery.
//!
//! Three name -> instance maps (line, multiline, preprocessor). Registration
//! occurs at process startup: built-ins register first, then any caller-
//! supplied plugins are added on top. Duplicate names replace the earlier
//! entry in place; iteration order is always by ascending priority.

use std::collections::HashMap;
use std::sync::Arc;

use crate::plugin::{DocumentPreprocessor, LineFormatter, MultilineFormatter, PluginMeta};

/// A name-keyed map ordered by ascending plugin priority.
struct OrderedMap<T: ?Sized> {
    entries: HashMap<String, (u8, Arc<T>)>,
    order: Vec<String>,
}

impl<T: ?Sized> OrderedMap<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn register(&mut self, name: String, priority: u8, value: Arc<T>) {
        if self.entries.insert(name.clone(), (priority, value)).is_none() {
            self.order.push(name);
        }
        let entries = &self.entries;
        self.order.sort_by_key(|n| entries[n].0);
    }

    fn get(&self, name: &str) -> Option<&Arc<T>> {
        self.entries.get(name).map(|(_, v)| v)
    }

    fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        self.order.iter().map(move |name| &self.entries[name].1)
    }

    fn iter_named(&self) -> impl Iterator<Item = (&str, &Arc<T>)> {
        self.order
            .iter()
            .map(move |name| (name.as_str(), &self.entries[name].1))
    }
}

/// Process-wide registry of formatter plugins.
///
/// Cheaply cloneable: cloning shares the underlying plugin instances via
/// [`Arc`], not duplicates the registry contents.
#[derive(Clone)]
pub struct PluginRegistry {
    lines: Arc<OrderedMap<dyn LineFormatter>>,
    multilines: Arc<OrderedMap<dyn MultilineFormatter>>,
    preprocessors: Arc<OrderedMap<dyn DocumentPreprocessor>>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry {
    /// Creates an empty registry. Use [`PluginRegistry::builder`] or
    /// [`crate::builtin::register_all`] to populate one with built-ins.
    pub fn new() -> Self {
        Self {
            lines: Arc::new(OrderedMap::new()),
            multilines: Arc::new(OrderedMap::new()),
            preprocessors: Arc::new(OrderedMap::new()),
        }
    }

    /// Starts a [`PluginRegistryBuilder`] for fluent, mutable registration.
    pub fn builder() -> PluginRegistryBuilder {
        PluginRegistryBuilder::default()
    }

    pub fn line_formatter(&self, name: &str) -> Option<&Arc<dyn LineFormatter>> {
        self.lines.get(name)
    }

    pub fn multiline_formatter(&self, name: &str) -> Option<&Arc<dyn MultilineFormatter>> {
        self.multilines.get(name)
    }

    pub fn preprocessor(&self, name: &str) -> Option<&Arc<dyn DocumentPreprocessor>> {
        self.preprocessors.get(name)
    }

    /// All registered line formatters in priority order.
    pub fn line_formatters(&self) -> impl Iterator<Item = &Arc<dyn LineFormatter>> {
        self.lines.iter()
    }

    /// All registered multiline formatters in priority order.
    pub fn multiline_formatters(&self) -> impl Iterator<Item = &Arc<dyn MultilineFormatter>> {
        self.multilines.iter()
    }

    /// All registered document preprocessors in priority order.
    pub fn preprocessors(&self) -> impl Iterator<Item = &Arc<dyn DocumentPreprocessor>> {
        self.preprocessors.iter()
    }

    /// Returns the enabled line formatters named in `names`, in registry
    /// (priority) order rather than `names`' order.
    pub fn enabled_line_formatters(&self, names: &[String]) -> Vec<Arc<dyn LineFormatter>> {
        self.lines
            .iter_named()
            .filter(|(n, _)| names.iter().any(|e| e == n))
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Returns the enabled multiline formatters named in `names`, in
    /// registry (priority) order.
    pub fn enabled_multiline_formatters(&self, names: &[String]) -> Vec<Arc<dyn MultilineFormatter>> {
        self.multilines
            .iter_named()
            .filter(|(n, _)| names.iter().any(|e| e == n))
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Returns the enabled preprocessors named in `names`, in registry
    /// (priority) order.
    pub fn enabled_preprocessors(&self, names: &[String]) -> Vec<Arc<dyn DocumentPreprocessor>> {
        self.preprocessors
            .iter_named()
            .filter(|(n, _)| names.iter().any(|e| e == n))
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Names from `names` that aren't registered under any of the three
    /// plugin kinds. The pipeline logs these as warnings and skips them
    /// (§4.2: "Named plugin not found ⇒ warning log and skip").
    pub fn unknown_names<'a>(&self, names: &'a [String]) -> Vec<&'a str> {
        names
            .iter()
            .filter(|n| {
                !self.lines.contains(n)
                    && !self.multilines.contains(n)
                    && !self.preprocessors.contains(n)
            })
            .map(String::as_str)
            .collect()
    }

    /// Metadata for every registered plugin across all three kinds, in each
    /// kind's priority order (lines, then multilines, then preprocessors).
    /// Backs the CLI's `list-formatters`/`formatter-info` subcommands.
    pub fn all_meta(&self) -> Vec<&PluginMeta> {
        self.lines
            .iter()
            .map(|p| p.meta())
            .chain(self.multilines.iter().map(|p| p.meta()))
            .chain(self.preprocessors.iter().map(|p| p.meta()))
            .collect()
    }

    /// Metadata for a single plugin by name, searched across all three
    /// kinds.
    pub fn meta(&self, name: &str) -> Option<&PluginMeta> {
        if let Some(p) = self.lines.get(name) {
            return Some(p.meta());
        }
        if let Some(p) = self.multilines.get(name) {
            return Some(p.meta());
        }
        if let Some(p) = self.preprocessors.get(name) {
            return Some(p.meta());
        }
        None
    }
}

/// Fluent builder for assembling a [`PluginRegistry`].
#[derive(Default)]
pub struct PluginRegistryBuilder {
    lines: OrderedMapBuilder<dyn LineFormatter>,
    multilines: OrderedMapBuilder<dyn MultilineFormatter>,
    preprocessors: OrderedMapBuilder<dyn DocumentPreprocessor>,
}

/// Helper so the builder doesn't need `OrderedMap: Default` (trait objects
/// can't derive it).
struct OrderedMapBuilder<T: ?Sized>(OrderedMap<T>);

impl<T: ?Sized> Default for OrderedMapBuilder<T> {
    fn default() -> Self {
        Self(OrderedMap::new())
    }
}

impl PluginRegistryBuilder {
    /// Registers a line formatter under the name and priority from its
    /// [`PluginMeta`](crate::plugin::PluginMeta).
    pub fn line_formatter(mut self, plugin: Arc<dyn LineFormatter>) -> Self {
        let (name, priority) = (plugin.meta().name.clone(), plugin.meta().priority);
        self.lines.0.register(name, priority, plugin);
        self
    }

    /// Registers a multiline formatter under the name and priority from its
    /// [`PluginMeta`](crate::plugin::PluginMeta).
    pub fn multiline_formatter(mut self, plugin: Arc<dyn MultilineFormatter>) -> Self {
        let (name, priority) = (plugin.meta().name.clone(), plugin.meta().priority);
        self.multilines.0.register(name, priority, plugin);
        self
    }

    /// Registers a document preprocessor under the name and priority from
    /// its [`PluginMeta`](crate::plugin::PluginMeta).
    pub fn preprocessor(mut self, plugin: Arc<dyn DocumentPreprocessor>) -> Self {
        let (name, priority) = (plugin.meta().name.clone(), plugin.meta().priority);
        self.preprocessors.0.register(name, priority, plugin);
        self
    }

    pub fn build(self) -> PluginRegistry {
        PluginRegistry {
            lines: Arc::new(self.lines.0),
            multilines: Arc::new(self.multilines.0),
            preprocessors: Arc::new(self.preprocessors.0),
        }
    }
}
