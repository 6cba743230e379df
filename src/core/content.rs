//! Static site content: products, gallery images and the home carousel
//!
//! The tables are authored in code and never change at runtime. Display
//! strings live in the message catalogs; records only carry catalog keys.

use super::messages::MessageCatalog;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookup failures that are recovered by navigation, not error pages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnknownSelection {
    #[error("unknown product '{slug}'")]
    Product { slug: String },
}

/// Per-100g nutritional facts shown on product pages
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Nutrition {
    pub calories_kcal: u32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fiber_g: f64,
}

/// Same for every variety
pub const NUTRITION: Nutrition = Nutrition {
    calories_kcal: 277,
    protein_g: 1.8,
    carbs_g: 75.0,
    fiber_g: 6.7,
};

/// A date variety in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub slug: &'static str,
    /// Price in whole US dollars per unit
    pub price: u32,
    pub image: &'static str,
    /// Gradient stops used behind the product image
    pub colors: (&'static str, &'static str),
}

impl Product {
    /// Catalog key for the product name
    pub fn name_key(&self) -> String {
        format!("ProductDetail.{}.name", self.slug)
    }

    pub fn description_key(&self) -> String {
        format!("ProductDetail.{}.description", self.slug)
    }

    pub fn long_description_key(&self) -> String {
        format!("ProductDetail.{}.longDescription", self.slug)
    }

    /// Catalog key for the unit the price applies to
    pub const UNIT_KEY: &'static str = "ProductDetail.unit";

    /// Resolve the display strings for one locale
    pub fn localize(&self, catalog: &MessageCatalog) -> LocalizedProduct {
        LocalizedProduct {
            slug: self.slug,
            name: catalog.lookup(&self.name_key()),
            description: catalog.lookup(&self.description_key()),
            long_description: catalog.lookup(&self.long_description_key()),
            price: self.price,
            unit: catalog.lookup(Self::UNIT_KEY),
            image: self.image,
            color_from: self.colors.0,
            color_to: self.colors.1,
        }
    }
}

/// A product with its strings resolved, ready for a template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedProduct {
    pub slug: &'static str,
    pub name: String,
    pub description: String,
    pub long_description: String,
    pub price: u32,
    pub unit: String,
    pub image: &'static str,
    pub color_from: &'static str,
    pub color_to: &'static str,
}

const PRODUCT_IMAGE: &str = "/static/placeholder.svg";

/// Every product, in display order
pub static PRODUCTS: [Product; 3] = [
    Product {
        slug: "medjool",
        price: 120,
        image: PRODUCT_IMAGE,
        colors: ("#b91c1c", "#d97706"),
    },
    Product {
        slug: "siwa",
        price: 90,
        image: PRODUCT_IMAGE,
        colors: ("#d97706", "#f59e0b"),
    },
    Product {
        slug: "mazaq",
        price: 100,
        image: PRODUCT_IMAGE,
        colors: ("#b45309", "#f59e0b"),
    },
];

/// Find a product by slug
pub fn select_product(slug: &str) -> Result<&'static Product, UnknownSelection> {
    PRODUCTS
        .iter()
        .find(|product| product.slug == slug)
        .ok_or_else(|| UnknownSelection::Product {
            slug: slug.to_string(),
        })
}

/// Products whose localized name or description contains `query`
///
/// Case-insensitive; a blank query matches everything.
pub fn search_products(catalog: &MessageCatalog, query: &str) -> Vec<LocalizedProduct> {
    let needle = query.trim().to_lowercase();
    PRODUCTS
        .iter()
        .map(|product| product.localize(catalog))
        .filter(|product| {
            needle.is_empty()
                || product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Gallery image category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryCategory {
    Farms,
    Products,
    Production,
}

impl GalleryCategory {
    pub const ALL: [GalleryCategory; 3] = [
        GalleryCategory::Farms,
        GalleryCategory::Products,
        GalleryCategory::Production,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            GalleryCategory::Farms => "farms",
            GalleryCategory::Products => "products",
            GalleryCategory::Production => "production",
        }
    }
}

impl fmt::Display for GalleryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GalleryCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or(())
    }
}

/// Filter name that selects every image
pub const ALL_CATEGORIES: &str = "all";

/// One photo in the gallery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub id: u32,
    pub image: &'static str,
    pub alt: &'static str,
    pub category: GalleryCategory,
}

const GALLERY_IMAGE: &str = "/static/placeholder.svg";

const fn image(id: u32, alt: &'static str, category: GalleryCategory) -> GalleryImage {
    GalleryImage {
        id,
        image: GALLERY_IMAGE,
        alt,
        category,
    }
}

/// Every gallery image, in authored order
pub static GALLERY: [GalleryImage; 9] = [
    image(1, "Date palm trees in Siwa Oasis", GalleryCategory::Farms),
    image(2, "Premium Medjool dates packaging", GalleryCategory::Products),
    image(3, "Date harvesting process", GalleryCategory::Production),
    image(4, "Siwa dates on display", GalleryCategory::Products),
    image(5, "Aerial view of date palm farm", GalleryCategory::Farms),
    image(6, "Date sorting and quality control", GalleryCategory::Production),
    image(7, "Mazaq dates close-up", GalleryCategory::Products),
    image(8, "Irrigation system in date farm", GalleryCategory::Farms),
    image(9, "Date packaging line", GalleryCategory::Production),
];

/// Images in `category`, in authored order
///
/// `"all"` yields every image; an unknown category yields nothing.
pub fn select_gallery_images(
    category: &str,
) -> impl Iterator<Item = &'static GalleryImage> + use<> {
    let filter = match category {
        ALL_CATEGORIES => Some(None),
        other => other.parse::<GalleryCategory>().ok().map(Some),
    };

    GALLERY.iter().filter(move |image| match filter {
        Some(None) => true,
        Some(Some(wanted)) => image.category == wanted,
        None => false,
    })
}

/// Index into the home page product carousel
///
/// Wraps in both directions. A carousel over zero slides stays at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    active: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { len, active: 0 }
    }

    /// Start at `index`, wrapped into range
    pub fn at(len: usize, index: usize) -> Self {
        let mut carousel = Self::new(len);
        carousel.select(index);
        carousel
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn select(&mut self, index: usize) {
        if self.len > 0 {
            self.active = index % self.len;
        }
    }

    pub fn next_index(&self) -> usize {
        if self.len == 0 { 0 } else { (self.active + 1) % self.len }
    }

    pub fn previous_index(&self) -> usize {
        if self.len == 0 {
            0
        } else {
            (self.active + self.len - 1) % self.len
        }
    }

    pub fn next(&mut self) {
        self.active = self.next_index();
    }

    pub fn previous(&mut self) {
        self.active = self.previous_index();
    }
}
