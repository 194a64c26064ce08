//! Esther Core - Catalog types and storefront logic.
//!
//! This crate provides the types and pure logic shared by all Esther components:
//! - `storefront` - JSON storefront API and the gateway/image store adapters
//! - `cli` - Command-line admin tools
//!
//! # Architecture
//!
//! The core crate performs no network I/O. Persistence of the favorites set goes
//! through the [`favorites::FavoritesStorage`] port so callers decide where it lives.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, genders, sizes, prices and catalog records
//! - [`image_ref`] - Normalizes stored image references into loadable URLs
//! - [`gallery`] - Chooses the active image list and main image of a product
//! - [`favorites`] - Locally persisted set of favorite product ids
//! - [`catalog`] - Filtering and lookups over the in-memory catalog
//! - [`upload`] - Size and MIME checks applied before any upload
//! - [`drafts`] - Validation of admin input before it reaches the gateway
//! - [`order`] - Order message text for the chat checkout link

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod drafts;
pub mod favorites;
pub mod gallery;
pub mod image_ref;
pub mod order;
pub mod types;
pub mod upload;

pub use types::*;
