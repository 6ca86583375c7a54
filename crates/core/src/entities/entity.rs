use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A business-meaningful alternate identifier of an entity.
///
/// Every natural key has its own secondary cache entry
/// (`<kind>:<field>:<value>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub field: &'static str,
    pub value: String,
}

impl NaturalKey {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// A master-data record that can sit behind the cache layer.
pub trait Entity: Debug + Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Singular name used as the key prefix (e.g. `"color"`).
    const KIND: &'static str;

    /// Plural name used for the collection key (e.g. `"colors"`).
    const COLLECTION: &'static str;

    /// True for entities carrying a credential. Generic natural-key finders
    /// over such entities go to the source of truth, never to the cache.
    const CARRIES_SECRETS: bool = false;

    /// Primary surrogate identifier.
    fn id(&self) -> &str;

    /// All natural keys carried by this instance.
    fn natural_keys(&self) -> Vec<NaturalKey>;

    /// Case-insensitive text match over the display fields.
    fn matches(&self, needle: &str) -> bool;

    /// Returns the natural key value for `field`, if this entity has one.
    fn natural_key(&self, field: &str) -> Option<String> {
        self.natural_keys()
            .into_iter()
            .find(|key| key.field == field)
            .map(|key| key.value)
    }

    /// Returns this value without secret fields, as stored in the cache.
    fn redacted(self) -> Self {
        self
    }

    /// Copies secret fields from `stored` that this value left empty, so an
    /// update built from a redacted read keeps the stored credential.
    fn retain_secrets(&mut self, _stored: &Self) {}
}

/// Case-insensitive substring test. An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
