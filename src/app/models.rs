//! Data models for Catalog Fetcher
//!
//! This module defines the core data structures used throughout the application:
//! the ordered work set driving the download engine, per-item outcomes, and the
//! product and image records derived from the remote catalog.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::FetchError;

/// One downloadable asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Catalog-assigned key (SKU, item number, document name)
    pub identifier: String,
    /// Where the asset is fetched from
    pub source_url: String,
}

impl WorkItem {
    /// Create a new work item
    pub fn new(identifier: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            source_url: source_url.into(),
        }
    }
}

/// Ordered identifier -> URL mapping
///
/// Identifiers are unique. Iteration follows insertion order, and the JSON
/// form is an object whose key order matches it, so a persisted set read back
/// resumes in the order it was written.
///
/// Lookups go through a hash index. Removal leaves a vacant slot that is
/// compacted away once vacant slots outnumber live items.
#[derive(Clone, Default)]
pub struct WorkSet {
    slots: Vec<Option<WorkItem>>,
    index: HashMap<String, usize>,
}

impl WorkSet {
    /// Create an empty work set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item, returning the URL it replaced
    ///
    /// An existing identifier keeps its position and takes the new URL.
    pub fn insert(
        &mut self,
        identifier: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Option<String> {
        let identifier = identifier.into();
        let source_url = source_url.into();
        match self.index.get(&identifier).and_then(|&slot| self.slots[slot].as_mut()) {
            Some(item) => Some(std::mem::replace(&mut item.source_url, source_url)),
            None => {
                self.push(WorkItem::new(identifier, source_url));
                None
            }
        }
    }

    /// Insert only if the identifier is not present yet
    ///
    /// Returns `true` when the item was added.
    pub fn insert_if_absent(
        &mut self,
        identifier: impl Into<String>,
        source_url: impl Into<String>,
    ) -> bool {
        let identifier = identifier.into();
        if self.contains(&identifier) {
            return false;
        }
        self.push(WorkItem::new(identifier, source_url));
        true
    }

    /// Remove an item, returning its URL
    pub fn remove(&mut self, identifier: &str) -> Option<String> {
        let slot = self.index.remove(identifier)?;
        let removed = self.slots[slot].take().map(|item| item.source_url);
        if self.slots.len() > 2 * self.index.len() {
            self.compact();
        }
        removed
    }

    /// Look up the URL for an identifier
    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.index
            .get(identifier)
            .and_then(|&slot| self.slots[slot].as_ref())
            .map(|item| item.source_url.as_str())
    }

    /// Whether the identifier is pending
    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    /// Number of pending items
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no items remain
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterate items in processing order
    pub fn iter(&self) -> impl Iterator<Item = &WorkItem> {
        self.slots.iter().flatten()
    }

    /// Identifiers in processing order
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|item| item.identifier.as_str())
    }

    /// Keep only the first `limit` items
    pub fn truncate(&mut self, limit: usize) {
        self.compact();
        for item in self.slots.drain(limit.min(self.slots.len())..).flatten() {
            self.index.remove(&item.identifier);
        }
    }

    fn push(&mut self, item: WorkItem) {
        self.index.insert(item.identifier.clone(), self.slots.len());
        self.slots.push(Some(item));
    }

    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        for (slot, item) in self.slots.iter().flatten().enumerate() {
            if let Some(position) = self.index.get_mut(&item.identifier) {
                *position = slot;
            }
        }
    }
}

impl PartialEq for WorkSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for WorkSet {}

impl fmt::Debug for WorkSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|item| (&item.identifier, &item.source_url)))
            .finish()
    }
}

impl IntoIterator for WorkSet {
    type Item = WorkItem;
    type IntoIter = std::iter::Flatten<std::vec::IntoIter<Option<WorkItem>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter().flatten()
    }
}

impl<'a> IntoIterator for &'a WorkSet {
    type Item = &'a WorkItem;
    type IntoIter = std::iter::Flatten<std::slice::Iter<'a, Option<WorkItem>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter().flatten()
    }
}

impl<K, V> FromIterator<(K, V)> for WorkSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = WorkSet::new();
        for (identifier, url) in iter {
            set.insert(identifier, url);
        }
        set
    }
}

impl Serialize for WorkSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for item in self {
            map.serialize_entry(&item.identifier, &item.source_url)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WorkSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WorkSetVisitor;

        impl<'de> Visitor<'de> for WorkSetVisitor {
            type Value = WorkSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping identifiers to URLs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<WorkSet, A::Error> {
                let mut set = WorkSet::new();
                while let Some((identifier, url)) = access.next_entry::<String, String>()? {
                    set.insert(identifier, url);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(WorkSetVisitor)
    }
}

/// Why an item was skipped without a network call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Destination file is already on disk
    AlreadyExists,
}

/// Result of processing one work item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Nothing fetched; item removed from the pending set
    Skipped(SkipReason),
    /// Asset written; item removed from the pending set
    Succeeded,
    /// Asset not written; item stays pending for the next run
    Failed(FetchError),
}

impl DownloadOutcome {
    /// Whether the item leaves the pending set
    pub fn is_complete(&self) -> bool {
        !matches!(self, DownloadOutcome::Failed(_))
    }
}

/// Category breadcrumb entry flattened from the detail record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPath {
    pub primary_category: String,
    pub sub_category: String,
    pub deeper_category: String,
}

/// Categories are either a list of breadcrumbs or the "N/A" placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Categories {
    List(Vec<CategoryPath>),
    NotAvailable(String),
}

/// Name/value attribute pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Product metadata record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub product_name: String,
    pub brand_name: String,
    pub sku: String,
    pub upc_code: String,
    pub global_product_type: String,
    pub full_description: String,
    pub list_price: String,
    pub categories: Categories,
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_number: Option<String>,
}

/// Reference to a remote image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

/// Image references for one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub sku: String,
    pub product_name: String,
    pub image: ImageRef,
    #[serde(default)]
    pub more_images: Vec<ImageRef>,
    pub category_number: String,
}

/// `product_data.json` layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDataset {
    pub total_items: usize,
    pub products: Vec<ProductRecord>,
}

impl ProductDataset {
    /// Build a dataset, counting its records
    pub fn new(products: Vec<ProductRecord>) -> Self {
        Self {
            total_items: products.len(),
            products,
        }
    }
}

/// `image_data.json` layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDataset {
    pub total_items: usize,
    pub images: Vec<ImageRecord>,
}

impl ImageDataset {
    /// Build a dataset, counting its records
    pub fn new(images: Vec<ImageRecord>) -> Self {
        Self {
            total_items: images.len(),
            images,
        }
    }
}

/// One line of the categories file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub category_number: String,
    pub total_products: u32,
}
