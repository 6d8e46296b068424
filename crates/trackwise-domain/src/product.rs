//! Inventory vocabulary: product categories, units of measure, stock levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownVariant;

/// Quantity at or below which an in-stock product counts as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Electronics,
    Clothing,
    Food,
    Books,
    Home,
    Sports,
    Health,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Self::Electronics,
        Self::Clothing,
        Self::Food,
        Self::Books,
        Self::Home,
        Self::Sports,
        Self::Health,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Clothing => "clothing",
            Self::Food => "food",
            Self::Books => "books",
            Self::Home => "home",
            Self::Sports => "sports",
            Self::Health => "health",
            Self::Other => "other",
        }
    }

    /// Human-readable name used in listings and reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Clothing => "Clothing",
            Self::Food => "Food & Beverages",
            Self::Books => "Books",
            Self::Home => "Home & Garden",
            Self::Sports => "Sports & Outdoors",
            Self::Health => "Health & Beauty",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("category", s))
    }
}

/// Unit of measure for a stock quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    #[default]
    Pieces,
    Packs,
    Boxes,
    Kilograms,
    Grams,
    Liters,
    Meters,
    Units,
    Pairs,
    Sets,
    Bottles,
    Cartons,
    Bags,
}

impl Unit {
    pub const ALL: [Unit; 13] = [
        Self::Pieces,
        Self::Packs,
        Self::Boxes,
        Self::Kilograms,
        Self::Grams,
        Self::Liters,
        Self::Meters,
        Self::Units,
        Self::Pairs,
        Self::Sets,
        Self::Bottles,
        Self::Cartons,
        Self::Bags,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pieces => "pieces",
            Self::Packs => "packs",
            Self::Boxes => "boxes",
            Self::Kilograms => "kilograms",
            Self::Grams => "grams",
            Self::Liters => "liters",
            Self::Meters => "meters",
            Self::Units => "units",
            Self::Pairs => "pairs",
            Self::Sets => "sets",
            Self::Bottles => "bottles",
            Self::Cartons => "cartons",
            Self::Bags => "bags",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pieces => "Pieces",
            Self::Packs => "Packs",
            Self::Boxes => "Boxes",
            Self::Kilograms => "Kilograms",
            Self::Grams => "Grams",
            Self::Liters => "Liters",
            Self::Meters => "Meters",
            Self::Units => "Units",
            Self::Pairs => "Pairs",
            Self::Sets => "Sets",
            Self::Bottles => "Bottles",
            Self::Cartons => "Cartons",
            Self::Bags => "Bags",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("unit of measure", s))
    }
}

/// Stock level bucket derived from a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    InStock,
}

impl StockStatus {
    pub fn for_quantity(quantity: i32) -> Self {
        if quantity <= 0 {
            Self::OutOfStock
        } else if quantity <= LOW_STOCK_THRESHOLD {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OutOfStock => "Out of Stock",
            Self::LowStock => "Low Stock",
            Self::InStock => "In Stock",
        }
    }
}
