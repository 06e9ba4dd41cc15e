//! The wheel's item catalog.
//!
//! A catalog is built once at startup from configuration and never mutated.
//! Items keep their insertion order, which is also their segment order on
//! the wheel.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Stable identifier of an item.
pub type ItemId = u32;

/// One selectable entry on the wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique, stable id.
    pub id: ItemId,
    /// Logical path of the item's image, relative to the asset root.
    pub asset_ref: String,
    /// Human-readable description.
    pub label: String,
    /// Selection weight, must be positive.
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Item {
    /// Create an item with weight 1.
    pub fn new(id: ItemId, asset_ref: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id,
            asset_ref: asset_ref.into(),
            label: label.into(),
            weight: default_weight(),
        }
    }
}

/// Error type for catalog construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    /// Weight was zero, negative or not finite.
    #[error("Item {id} has invalid weight {weight} (must be a positive number)")]
    InvalidWeight {
        /// Offending item.
        id: ItemId,
        /// The rejected weight.
        weight: f64,
    },
    /// Two items share an id.
    #[error("Duplicate item id: {0}")]
    DuplicateId(ItemId),
    /// No item with that id.
    #[error("Unknown item id: {0}")]
    UnknownId(ItemId),
}

/// Immutable, ordered list of wheel items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    /// Build a catalog, validating weights and id uniqueness.
    pub fn new(items: Vec<Item>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !(item.weight.is_finite() && item.weight > 0.0) {
                return Err(CatalogError::InvalidWeight {
                    id: item.id,
                    weight: item.weight,
                });
            }
            if !seen.insert(item.id) {
                return Err(CatalogError::DuplicateId(item.id));
            }
        }
        Ok(Self { items })
    }

    /// The eight cats the game ships with.
    pub fn default_cats() -> Self {
        Self {
            items: default_cat_items(),
        }
    }

    /// All items in wheel order.
    pub fn all(&self) -> &[Item] {
        &self.items
    }

    /// Look up an item by id.
    pub fn by_id(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Item at a segment index.
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Number of items (and wheel segments).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Angular size of one segment in degrees, if the catalog is non-empty.
    pub fn segment_angle(&self) -> Option<f64> {
        (!self.is_empty()).then(|| 360.0 / self.items.len() as f64)
    }

    /// True when every item carries the same weight.
    ///
    /// Selection is always uniform over segments; an uneven catalog is
    /// accepted but logged.
    pub fn is_fairly_distributed(&self) -> bool {
        match self.items.first() {
            Some(first) => self.items.iter().all(|item| item.weight == first.weight),
            None => true,
        }
    }

    /// Return a copy of the catalog with one item's weight replaced.
    pub fn with_weight(&self, id: ItemId, weight: f64) -> Result<Self, CatalogError> {
        if self.by_id(id).is_none() {
            return Err(CatalogError::UnknownId(id));
        }
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id == id {
                    Item {
                        weight,
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Self::new(items)
    }
}

/// Item definitions for the default catalog.
pub fn default_cat_items() -> Vec<Item> {
    [
        (1, "cat1.svg", "Cute orange tabby cat sitting peacefully"),
        (2, "cat2.svg", "Playful teal cat with spots"),
        (3, "cat3.svg", "Fluffy Persian cat with blue eyes"),
        (4, "cat4.svg", "Sleepy gray cat curled up"),
        (5, "cat5.svg", "Energetic calico cat playing"),
        (6, "cat6.svg", "Majestic Maine Coon cat"),
        (7, "cat7.svg", "Adorable Siamese cat with bright eyes"),
        (8, "cat8.svg", "Curious Bengal cat exploring"),
    ]
    .into_iter()
    .map(|(id, asset_ref, label)| Item::new(id, asset_ref, label))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cats_are_eight_fair_items() {
        let catalog = ItemCatalog::default_cats();
        assert_eq!(catalog.len(), 8);
        assert!(catalog.is_fairly_distributed());
        assert_eq!(catalog.segment_angle(), Some(45.0));
        assert_eq!(catalog.all()[0].asset_ref, "cat1.svg");
        assert_eq!(catalog.all()[7].id, 8);
    }

    #[test]
    fn test_by_id_and_get() {
        let catalog = ItemCatalog::default_cats();
        assert_eq!(catalog.by_id(3).unwrap().label, "Fluffy Persian cat with blue eyes");
        assert!(catalog.by_id(42).is_none());
        assert_eq!(catalog.get(0).unwrap().id, 1);
        assert!(catalog.get(8).is_none());
    }

    #[test]
    fn test_rejects_non_positive_weight() {
        let mut items = default_cat_items();
        items[2].weight = 0.0;
        assert_eq!(
            ItemCatalog::new(items),
            Err(CatalogError::InvalidWeight { id: 3, weight: 0.0 })
        );
    }

    #[test]
    fn test_rejects_nan_weight() {
        let mut items = default_cat_items();
        items[0].weight = f64::NAN;
        assert!(matches!(
            ItemCatalog::new(items),
            Err(CatalogError::InvalidWeight { id: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let items = vec![Item::new(1, "a.svg", "a"), Item::new(1, "b.svg", "b")];
        assert_eq!(ItemCatalog::new(items), Err(CatalogError::DuplicateId(1)));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = ItemCatalog::new(Vec::new()).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.segment_angle(), None);
        assert!(catalog.is_fairly_distributed());
    }

    #[test]
    fn test_with_weight_returns_new_catalog() {
        let catalog = ItemCatalog::default_cats();
        let heavier = catalog.with_weight(2, 3.0).unwrap();
        assert_eq!(heavier.by_id(2).unwrap().weight, 3.0);
        assert!(!heavier.is_fairly_distributed());
        assert!(catalog.is_fairly_distributed());
        assert_eq!(catalog.with_weight(99, 1.0), Err(CatalogError::UnknownId(99)));
        assert!(catalog.with_weight(2, -1.0).is_err());
    }

    #[test]
    fn test_item_weight_defaults_when_deserialized() {
        let item: Item =
            serde_json::from_str(r#"{"id": 9, "asset_ref": "cat9.svg", "label": "Nine"}"#).unwrap();
        assert_eq!(item.weight, 1.0);
    }
}
