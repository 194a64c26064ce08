//! Product image selection.
//!
//! A product carries two parallel image sets: general images and per-color
//! images. [`display_images`] decides which list is active for a color
//! selection and [`Gallery`] tracks the shopper's selection on a product page.
//!
//! The active list is never cached. It is derived from the product and the
//! selected color on every read, so a refreshed product record can't leave a
//! stale list behind.

use crate::types::{Color, ColorId, Product, ProductId};

/// Images to show for `product` given the selected color.
///
/// First matching rule wins:
/// 1. the selected color, if it has images;
/// 2. the general images, if there are any and no color is selected;
/// 3. the first color that has images;
/// 4. the first color's (empty) list, if the product has colors;
/// 5. the general images (possibly empty).
#[must_use]
pub fn display_images<'a>(product: &'a Product, selected: Option<&'a Color>) -> &'a [String] {
    if let Some(color) = selected
        && !color.image_urls.is_empty()
    {
        return &color.image_urls;
    }

    if selected.is_none() && !product.image_urls.is_empty() {
        return &product.image_urls;
    }

    if let Some(color) = product.colors.iter().find(|c| !c.image_urls.is_empty()) {
        return &color.image_urls;
    }

    if let Some(first) = product.colors.first() {
        return &first.image_urls;
    }

    &product.image_urls
}

/// Color preselected when a product page opens.
///
/// Products with general images open with no color selected. Otherwise the
/// first color with images is chosen, falling back to the first color.
#[must_use]
pub fn initial_color(product: &Product) -> Option<&Color> {
    if !product.image_urls.is_empty() {
        return None;
    }

    product
        .colors
        .iter()
        .find(|c| !c.image_urls.is_empty())
        .or_else(|| product.colors.first())
}

/// Every image of the product for the thumbnail strip.
///
/// General images come first, then each color's images in color order.
/// Duplicates keep their first position.
#[must_use]
pub fn thumbnails(product: &Product) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    product
        .image_urls
        .iter()
        .chain(product.colors.iter().flat_map(|c| c.image_urls.iter()))
        .map(String::as_str)
        .filter(|url| seen.insert(*url))
        .collect()
}

/// Selection state of a product page.
///
/// Holds only the selection (color and main image position). The product is
/// passed to every call so the displayed list always reflects the current
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    product_id: ProductId,
    selected_color: Option<ColorId>,
    main_index: usize,
}

impl Gallery {
    /// Open a product page with the initial color selection.
    #[must_use]
    pub fn open(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            selected_color: initial_color(product).map(|c| c.id.clone()),
            main_index: 0,
        }
    }

    /// Product this gallery was opened for.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Position of the main image within [`Self::display_images`].
    ///
    /// Meaningless when the display list is empty.
    #[must_use]
    pub const fn main_index(&self) -> usize {
        self.main_index
    }

    /// Currently selected color, if it still exists on the product.
    #[must_use]
    pub fn selected_color<'p>(&self, product: &'p Product) -> Option<&'p Color> {
        self.selected_color.as_ref().and_then(|id| product.color(id))
    }

    /// Active image list.
    #[must_use]
    pub fn display_images<'p>(&self, product: &'p Product) -> &'p [String] {
        display_images(product, self.selected_color(product))
    }

    /// Main image, or `None` when the product has nothing to show.
    #[must_use]
    pub fn main_image<'p>(&self, product: &'p Product) -> Option<&'p str> {
        let images = self.display_images(product);
        images
            .get(self.main_index)
            .or_else(|| images.first())
            .map(String::as_str)
    }

    /// Whether `url` is the image currently shown as main.
    #[must_use]
    pub fn is_active(&self, product: &Product, url: &str) -> bool {
        self.main_image(product) == Some(url)
    }

    /// Select one of the product's colors.
    ///
    /// Returns `false` and leaves the selection unchanged if the product has no
    /// such color.
    pub fn select_color(&mut self, product: &Product, color_id: &ColorId) -> bool {
        if product.color(color_id).is_none() {
            return false;
        }
        self.set_color(product, Some(color_id.clone()));
        true
    }

    /// Deselect the color, returning to the general images when there are any.
    pub fn clear_color(&mut self, product: &Product) {
        self.set_color(product, None);
    }

    /// Make the clicked thumbnail the main image.
    ///
    /// An image that belongs to a color selects that color first; a general
    /// image clears the color. The index is then taken within the new active
    /// list. Returns `false` if the product does not contain `url`.
    pub fn select_thumbnail(&mut self, product: &Product, url: &str) -> bool {
        let owner = product
            .colors
            .iter()
            .find(|c| c.image_urls.iter().any(|u| u == url));

        match owner {
            Some(color) => self.set_color(product, Some(color.id.clone())),
            None if product.image_urls.iter().any(|u| u == url) => self.set_color(product, None),
            None => return false,
        }

        self.main_index = self
            .display_images(product)
            .iter()
            .position(|u| u == url)
            .unwrap_or(0);
        true
    }

    /// Show the image at `index` of the active list.
    ///
    /// Out-of-range indices are ignored and return `false`.
    pub fn select_index(&mut self, product: &Product, index: usize) -> bool {
        if index < self.display_images(product).len() {
            self.main_index = index;
            true
        } else {
            false
        }
    }

    /// Bring the selection in line with a (possibly different) product record.
    ///
    /// A different product reopens the gallery. For the same product, a color
    /// that no longer exists or an index past the end of the list is reset.
    pub fn sync(&mut self, product: &Product) {
        if self.product_id != product.id {
            *self = Self::open(product);
            return;
        }

        if self.selected_color.is_some() && self.selected_color(product).is_none() {
            *self = Self::open(product);
            return;
        }

        if self.main_index >= self.display_images(product).len() {
            self.main_index = 0;
        }
    }

    fn set_color(&mut self, product: &Product, color: Option<ColorId>) {
        let before = self.display_images(product);
        self.selected_color = color;
        if before != self.display_images(product) {
            self.main_index = 0;
        }
    }
}
