//! Cart contents: line items keyed by (product, size, colour).
//!
//! [`Cart`] is a plain value with the merge/clamp rules baked in. It does no
//! I/O; [`crate::store::CartStore`] wraps it with persistence.

use serde::{Deserialize, Serialize};

use crate::catalog::Selection;
use crate::types::{Color, Price, ProductId, Size};

/// Errors for carts rebuilt from untrusted data (e.g. a stored snapshot).
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("line item {0} has quantity 0")]
    ZeroQuantity(IdentityKey),
    #[error("line item {0} has a zero unit price")]
    ZeroPrice(IdentityKey),
    #[error("line item {0} appears more than once")]
    DuplicateItem(IdentityKey),
}

/// The (product, size, colour) tuple that decides whether two additions merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityKey {
    pub product_id: ProductId,
    pub size: Size,
    pub color: Color,
}

impl IdentityKey {
    #[must_use]
    pub const fn new(product_id: ProductId, size: Size, color: Color) -> Self {
        Self {
            product_id,
            size,
            color,
        }
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.product_id, self.size, self.color)
    }
}

/// One distinct (product, size, colour) entry in the cart.
///
/// The serialized field names are the snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub image_ref: String,
    pub size: Size,
    pub color: Color,
    pub quantity: u32,
}

impl LineItem {
    fn from_selection(selection: &Selection<'_>) -> Self {
        Self {
            product_id: selection.product.id(),
            name: selection.product.name().to_owned(),
            unit_price: selection.product.price(),
            image_ref: selection.product.image().to_owned(),
            size: selection.size,
            color: selection.color.clone(),
            quantity: 1,
        }
    }

    /// Identity key of this line.
    #[must_use]
    pub fn key(&self) -> IdentityKey {
        IdentityKey::new(self.product_id, self.size, self.color.clone())
    }

    fn matches(&self, key: &IdentityKey) -> bool {
        self.product_id == key.product_id && self.size == key.size && self.color == key.color
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Ordered line items with unique identity keys and quantities ≥ 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Rebuild a cart from items, checking every invariant.
    ///
    /// # Errors
    ///
    /// Returns an error if an item has quantity 0 or price 0, or if two items
    /// share an identity key.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, CartError> {
        for (index, item) in items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(CartError::ZeroQuantity(item.key()));
            }
            if item.unit_price.is_zero() {
                return Err(CartError::ZeroPrice(item.key()));
            }
            let key = item.key();
            if items.iter().skip(index + 1).any(|other| other.matches(&key)) {
                return Err(CartError::DuplicateItem(key));
            }
        }
        Ok(Self { items })
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    #[must_use]
    pub fn get(&self, key: &IdentityKey) -> Option<&LineItem> {
        self.items.iter().find(|i| i.matches(key))
    }

    /// Add one unit of a selection, merging into an existing line if present.
    ///
    /// Returns the line's new quantity.
    pub fn add(&mut self, selection: &Selection<'_>) -> u32 {
        let key = IdentityKey::new(
            selection.product.id(),
            selection.size,
            selection.color.clone(),
        );
        if let Some(item) = self.items.iter_mut().find(|i| i.matches(&key)) {
            item.quantity = item.quantity.saturating_add(1);
            return item.quantity;
        }
        self.items.push(LineItem::from_selection(selection));
        1
    }

    /// Apply a quantity delta, clamping the result to at least 1.
    ///
    /// Returns the new quantity, or `None` if no line matches.
    pub fn update_quantity(&mut self, key: &IdentityKey, delta: i64) -> Option<u32> {
        let item = self.items.iter_mut().find(|i| i.matches(key))?;
        let target = i64::from(item.quantity).saturating_add(delta).max(1);
        item.quantity = u32::try_from(target).unwrap_or(u32::MAX);
        Some(item.quantity)
    }

    /// Remove the matching line, if any.
    pub fn remove(&mut self, key: &IdentityKey) -> Option<LineItem> {
        let index = self.items.iter().position(|i| i.matches(key))?;
        Some(self.items.remove(index))
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let items = Vec::<LineItem>::deserialize(deserializer)?;
        Self::from_items(items).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    fn product(id: u32, price: u64, colors: &[&str]) -> Product {
        Product::new(
            ProductId::new(id),
            format!("Tee {id}"),
            Price::new(price),
            format!("/images/{id}.jpg"),
            colors.iter().map(|c| Color::parse(c).unwrap()).collect(),
            vec![],
        )
        .unwrap()
    }

    fn select(product: &Product, size: Size) -> Selection<'_> {
        Selection {
            product,
            size,
            color: product.default_color(),
        }
    }

    #[test]
    fn test_add_same_identity_merges() {
        let tee = product(1, 899, &["Black"]);
        let mut cart = Cart::new();
        assert_eq!(cart.add(&select(&tee, Size::Large)), 1);
        assert_eq!(cart.add(&select(&tee, Size::Large)), 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items().first().unwrap().quantity, 2);
    }

    #[test]
    fn test_add_different_size_or_color_appends() {
        let tee = product(1, 899, &["Black", "Charcoal"]);
        let mut cart = Cart::new();
        cart.add(&select(&tee, Size::Large));
        cart.add(&select(&tee, Size::Medium));
        cart.add(&Selection {
            product: &tee,
            size: Size::Large,
            color: tee.colors().last().unwrap(),
        });
        assert_eq!(cart.len(), 3);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_update_quantity_clamps_at_one() {
        let tee = product(1, 899, &["Black"]);
        let mut cart = Cart::new();
        cart.add(&select(&tee, Size::Small));
        let key = cart.items().first().unwrap().key();

        assert_eq!(cart.update_quantity(&key, 4), Some(5));
        assert_eq!(cart.update_quantity(&key, -100), Some(1));
        assert_eq!(cart.update_quantity(&key, i64::MIN), Some(1));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_update_quantity_missing_key() {
        let mut cart = Cart::new();
        let key = IdentityKey::new(ProductId::new(1), Size::Large, Color::parse("Black").unwrap());
        assert_eq!(cart.update_quantity(&key, 1), None);
    }

    #[test]
    fn test_remove_only_matching_line() {
        let a = product(1, 899, &["Black"]);
        let b = product(2, 799, &["White"]);
        let mut cart = Cart::new();
        cart.add(&select(&a, Size::Large));
        cart.add(&select(&b, Size::Large));
        cart.add(&select(&a, Size::ExtraLarge));

        let key = IdentityKey::new(ProductId::new(1), Size::Large, Color::parse("Black").unwrap());
        let removed = cart.remove(&key).unwrap();
        assert_eq!(removed.product_id, ProductId::new(1));
        assert_eq!(cart.len(), 2);
        assert!(cart.get(&key).is_none());
        assert!(cart.remove(&key).is_none());
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_from_items_rejects_duplicates_and_zeroes() {
        let tee = product(1, 899, &["Black"]);
        let mut cart = Cart::new();
        cart.add(&select(&tee, Size::Large));
        let item = cart.items().first().unwrap().clone();

        assert!(matches!(
            Cart::from_items(vec![item.clone(), item.clone()]),
            Err(CartError::DuplicateItem(_))
        ));
        assert!(matches!(
            Cart::from_items(vec![LineItem {
                quantity: 0,
                ..item.clone()
            }]),
            Err(CartError::ZeroQuantity(_))
        ));
        assert!(matches!(
            Cart::from_items(vec![LineItem {
                unit_price: Price::ZERO,
                ..item
            }]),
            Err(CartError::ZeroPrice(_))
        ));
    }

    #[test]
    fn test_snapshot_field_names() {
        let tee = product(3, 849, &["Black"]);
        let mut cart = Cart::new();
        cart.add(&select(&tee, Size::ExtraLarge));
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "productId": 3,
                "name": "Tee 3",
                "unitPrice": 849,
                "imageRef": "/images/3.jpg",
                "size": "XL",
                "color": "Black",
                "quantity": 1
            }])
        );
    }
}
