//! Core types for Esther.
//!
//! This module provides type-safe wrappers for the catalog's domain concepts.

pub mod gender;
pub mod id;
pub mod price;
pub mod product;
pub mod size;

pub use gender::{Gender, SectionKey, UnknownGender};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Category, Color, Product, SectionImage};
pub use size::{Size, SizeName, UnknownSize};
