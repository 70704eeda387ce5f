use std::collections::BTreeMap;

/// Raw template text of one namespace, keyed by logical name
///
/// A bundle only stores text; parsing happens when it is imported into a
/// [`TemplateSet`](crate::TemplateSet). Items are kept ordered so that
/// iteration and encoding are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateBundle {
    namespace: String,
    items: BTreeMap<String, String>,
}

impl TemplateBundle {
    /// Create an empty bundle for a namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            items: BTreeMap::new(),
        }
    }

    /// Create a bundle from existing items
    pub fn from_items<I, K, V>(namespace: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut bundle = Self::new(namespace);
        bundle.add_items(items);
        bundle
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// All items, ordered by logical name
    pub fn items(&self) -> &BTreeMap<String, String> {
        &self.items
    }

    pub fn into_items(self) -> BTreeMap<String, String> {
        self.items
    }

    /// Merge items into the bundle; incoming text replaces existing text
    pub fn add_items<I, K, V>(&mut self, items: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, text) in items {
            self.items.insert(name.into(), text.into());
        }
    }

    /// Add or replace a single item
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.items.insert(name.into(), text.into())
    }

    /// Add an item, consuming and returning the bundle
    pub fn with_item(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    /// Raw text of a single item
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Logical names of all items
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total size of all raw text in bytes
    pub fn total_size(&self) -> usize {
        self.items.values().map(String::len).sum()
    }
}
