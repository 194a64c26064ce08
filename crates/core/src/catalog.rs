//! Filtering and lookups over the in-memory catalog.
//!
//! The data gateway returns the whole catalog; all filtering happens here.

use crate::types::{Category, CategoryId, Gender, Product, ProductId};

/// Products of `gender`, optionally narrowed to one category.
///
/// Input order is preserved. Never fails; no match yields an empty list.
#[must_use]
pub fn filter_products<'a>(
    products: &'a [Product],
    gender: Gender,
    category: Option<&CategoryId>,
) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|p| p.gender == gender)
        .filter(|p| category.is_none_or(|id| &p.category_id == id))
        .collect()
}

/// Categories shown in the navigation of one gender.
#[must_use]
pub fn categories_for(categories: &[Category], gender: Gender) -> Vec<&Category> {
    categories.iter().filter(|c| c.gender == gender).collect()
}

#[must_use]
pub fn find_product<'a>(products: &'a [Product], id: &ProductId) -> Option<&'a Product> {
    products.iter().find(|p| &p.id == id)
}

/// Display name of a category, if it exists.
#[must_use]
pub fn category_name<'a>(categories: &'a [Category], id: &CategoryId) -> Option<&'a str> {
    categories
        .iter()
        .find(|c| &c.id == id)
        .map(|c| c.name.as_str())
}

/// Sort products by name, the order the catalog is listed in.
pub fn sort_products(products: &mut [Product]) {
    products.sort_by(|a, b| a.name.cmp(&b.name));
}

/// Sort categories by name.
pub fn sort_categories(categories: &mut [Category]) {
    categories.sort_by(|a, b| a.name.cmp(&b.name));
}
