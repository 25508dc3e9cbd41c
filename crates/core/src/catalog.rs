//! Product catalog.
//!
//! Products are validated when the catalog is built, so everything downstream
//! (cart, pricing, checkout) can assume a product has a positive price and a
//! non-empty set of distinct colours.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{Color, Price, ProductId, Size};

/// Errors raised while building a product or catalog.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("product {0}: name cannot be empty")]
    EmptyName(ProductId),
    #[error("product {0}: price must be positive")]
    ZeroPrice(ProductId),
    #[error("product {0}: at least one color is required")]
    NoColors(ProductId),
    #[error("product {id}: duplicate color {color}")]
    DuplicateColor { id: ProductId, color: Color },
    #[error("duplicate product id {0}")]
    DuplicateProduct(ProductId),
    #[error("product {id}: color {color} is not offered")]
    ColorNotOffered { id: ProductId, color: Color },
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),
    #[error("invalid catalog JSON: {0}")]
    Json(String),
}

/// Catalog entry as written in JSON, before validation.
#[derive(Debug, Deserialize)]
struct RawProduct {
    id: ProductId,
    name: String,
    price: Price,
    image: String,
    colors: Vec<Color>,
    #[serde(default)]
    tags: Vec<String>,
}

/// A product that can be added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProduct")]
pub struct Product {
    id: ProductId,
    name: String,
    price: Price,
    image: String,
    colors: Vec<Color>,
    tags: Vec<String>,
}

impl Product {
    /// Build a validated product.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, the price is zero, or the colour
    /// list is empty or contains duplicates.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Price,
        image: impl Into<String>,
        colors: Vec<Color>,
        tags: Vec<String>,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CatalogError::EmptyName(id));
        }
        if price.is_zero() {
            return Err(CatalogError::ZeroPrice(id));
        }
        if colors.is_empty() {
            return Err(CatalogError::NoColors(id));
        }
        let mut seen = HashSet::new();
        for color in &colors {
            if !seen.insert(color) {
                return Err(CatalogError::DuplicateColor {
                    id,
                    color: color.clone(),
                });
            }
        }

        Ok(Self {
            id,
            name,
            price,
            image: image.into(),
            colors,
            tags,
        })
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The colour preselected for this product (its first colour).
    #[must_use]
    #[allow(clippy::indexing_slicing)] // non-empty by construction
    pub fn default_color(&self) -> &Color {
        &self.colors[0]
    }

    /// Whether `color` is one of this product's colours.
    #[must_use]
    pub fn offers(&self, color: &Color) -> bool {
        self.colors.contains(color)
    }
}

impl TryFrom<RawProduct> for Product {
    type Error = CatalogError;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.name, raw.price, raw.image, raw.colors, raw.tags)
    }
}

/// A concrete selection from the catalog: product, size and colour.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub product: &'a Product,
    pub size: Size,
    pub color: &'a Color,
}

/// Immutable, validated list of products in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate product IDs.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateProduct`] if two products share an ID.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateProduct(product.id));
            }
        }
        Ok(Self { products })
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] for malformed JSON or invalid products,
    /// and [`CatalogError::DuplicateProduct`] for repeated IDs.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> =
            serde_json::from_str(json).map_err(|e| CatalogError::Json(e.to_string()))?;
        Self::new(products)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Resolve a caller's choice into a validated selection.
    ///
    /// Size defaults to `L` and colour to the product's first colour, matching
    /// what the product card preselects.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownProduct`] or
    /// [`CatalogError::ColorNotOffered`].
    pub fn select(
        &self,
        id: ProductId,
        size: Option<Size>,
        color: Option<&Color>,
    ) -> Result<Selection<'_>, CatalogError> {
        let product = self.get(id).ok_or(CatalogError::UnknownProduct(id))?;
        let color = match color {
            Some(wanted) => product
                .colors
                .iter()
                .find(|c| *c == wanted)
                .ok_or_else(|| CatalogError::ColorNotOffered {
                    id,
                    color: wanted.clone(),
                })?,
            None => product.default_color(),
        };

        Ok(Selection {
            product,
            size: size.unwrap_or_default(),
            color,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn color(name: &str) -> Color {
        Color::parse(name).unwrap()
    }

    fn tee(id: u32, colors: &[&str]) -> Result<Product, CatalogError> {
        Product::new(
            ProductId::new(id),
            "Beast Mode Tee",
            Price::new(899),
            "/images/beastmode.jpg",
            colors.iter().map(|c| color(c)).collect(),
            vec![],
        )
    }

    #[test]
    fn test_product_rejects_empty_colors() {
        assert_eq!(tee(1, &[]), Err(CatalogError::NoColors(ProductId::new(1))));
    }

    #[test]
    fn test_product_rejects_duplicate_colors() {
        assert!(matches!(
            tee(1, &["Black", "Black"]),
            Err(CatalogError::DuplicateColor { .. })
        ));
    }

    #[test]
    fn test_product_rejects_zero_price() {
        let result = Product::new(
            ProductId::new(9),
            "Free Tee",
            Price::ZERO,
            "",
            vec![color("Black")],
            vec![],
        );
        assert_eq!(result, Err(CatalogError::ZeroPrice(ProductId::new(9))));
    }

    #[test]
    fn test_catalog_rejects_duplicate_ids() {
        let products = vec![tee(1, &["Black"]).unwrap(), tee(1, &["Grey"]).unwrap()];
        assert_eq!(
            Catalog::new(products),
            Err(CatalogError::DuplicateProduct(ProductId::new(1)))
        );
    }

    #[test]
    fn test_from_json_validates_entries() {
        let json = r#"[{"id": 1, "name": "Tee", "price": 899, "image": "/t.jpg", "colors": []}]"#;
        assert!(matches!(Catalog::from_json(json), Err(CatalogError::Json(_))));

        let json = r#"[{"id": 1, "name": "Tee", "price": 899, "image": "/t.jpg", "colors": ["Black"]}]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.products().first().unwrap().tags().is_empty());
    }

    #[test]
    fn test_select_defaults() {
        let catalog = Catalog::new(vec![tee(1, &["Black", "Charcoal"]).unwrap()]).unwrap();
        let selection = catalog.select(ProductId::new(1), None, None).unwrap();
        assert_eq!(selection.size, Size::Large);
        assert_eq!(selection.color.as_str(), "Black");
    }

    #[test]
    fn test_select_rejects_unknown_color_and_product() {
        let catalog = Catalog::new(vec![tee(1, &["Black"]).unwrap()]).unwrap();
        assert!(matches!(
            catalog.select(ProductId::new(1), None, Some(&color("Olive"))),
            Err(CatalogError::ColorNotOffered { .. })
        ));
        assert_eq!(
            catalog.select(ProductId::new(7), None, None).unwrap_err(),
            CatalogError::UnknownProduct(ProductId::new(7))
        );
    }
}
