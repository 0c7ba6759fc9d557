//! Dataset module for cats-vs-dogs data handling
//!
//! This module provides:
//! - Scanning a `Cat/`/`Dog/` directory layout into labeled samples
//! - A seeded 80/20 train/test split
//! - Burn `Dataset`/`Batcher` integration for batched tensor training

pub mod burn_dataset;
pub mod loader;
pub mod split;

use std::str::FromStr;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

// Re-export main types for convenience
pub use burn_dataset::{
    load_image_chw, CatsDogsBatch, CatsDogsBatcher, CatsDogsBurnDataset, CatsDogsItem,
    Normalization,
};
pub use loader::{CatsDogsDataset, DatasetStats, ImageSample};
pub use split::{SplitConfig, SplitStats, TrainTestSplit};

/// Class names, indexed by label
pub const CLASS_NAMES: [&str; 2] = ["Cat", "Dog"];

/// The two classes of the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Cat = 0,
    Dog = 1,
}

impl Label {
    /// Convert a label index into a `Label`
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Label::Cat),
            1 => Some(Label::Dog),
            _ => None,
        }
    }

    /// Threshold a dog-probability at 0.5 into a class decision
    pub fn from_probability(probability: f32) -> Self {
        if probability >= crate::DECISION_THRESHOLD {
            Label::Dog
        } else {
            Label::Cat
        }
    }

    /// Label index (0 for Cat, 1 for Dog)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Class name as displayed to users
    pub fn as_str(&self) -> &'static str {
        CLASS_NAMES[self.index()]
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Interpolation method used when resizing images to the model resolution
///
/// The image crate has no dedicated area filter, so `Area` maps to bilinear
/// (Triangle), the closest averaging filter, and `Bicubic` to Catmull-Rom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResizeFilter {
    #[default]
    Nearest,
    Area,
    Bicubic,
}

impl ResizeFilter {
    /// All filters, in comparison order
    pub const ALL: [ResizeFilter; 3] = [
        ResizeFilter::Nearest,
        ResizeFilter::Area,
        ResizeFilter::Bicubic,
    ];

    /// Map to the image crate's filter type
    pub fn filter_type(&self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Area => FilterType::Triangle,
            ResizeFilter::Bicubic => FilterType::CatmullRom,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeFilter::Nearest => "nearest",
            ResizeFilter::Area => "area",
            ResizeFilter::Bicubic => "bicubic",
        }
    }
}

impl std::fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResizeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" | "nearest-neighbor" => Ok(ResizeFilter::Nearest),
            "area" => Ok(ResizeFilter::Area),
            "bicubic" => Ok(ResizeFilter::Bicubic),
            other => Err(format!(
                "unknown resize filter '{}' (expected nearest, area or bicubic)",
                other
            )),
        }
    }
}

/// Get the class name for a given label index
pub fn class_name(label: usize) -> Option<&'static str> {
    CLASS_NAMES.get(label).copied()
}

/// Get the label index for a given class name
pub fn class_index(name: &str) -> Option<usize> {
    CLASS_NAMES
        .iter()
        .position(|&n| n.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_mapping() {
        assert_eq!(Label::Cat.index(), 0);
        assert_eq!(Label::Dog.index(), 1);
        assert_eq!(Label::from_index(0), Some(Label::Cat));
        assert_eq!(Label::from_index(1), Some(Label::Dog));
        assert_eq!(Label::from_index(2), None);
    }

    #[test]
    fn test_label_from_probability() {
        assert_eq!(Label::from_probability(0.1), Label::Cat);
        assert_eq!(Label::from_probability(0.49), Label::Cat);
        assert_eq!(Label::from_probability(0.5), Label::Dog);
        assert_eq!(Label::from_probability(0.99), Label::Dog);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::Cat.to_string(), "Cat");
        assert_eq!(Label::Dog.to_string(), "Dog");
    }

    #[test]
    fn test_class_name_lookup() {
        assert_eq!(class_name(0), Some("Cat"));
        assert_eq!(class_name(1), Some("Dog"));
        assert_eq!(class_name(2), None);
        assert_eq!(class_index("dog"), Some(1));
        assert_eq!(class_index("Hamster"), None);
    }

    #[test]
    fn test_resize_filter_parse() {
        assert_eq!("nearest".parse::<ResizeFilter>(), Ok(ResizeFilter::Nearest));
        assert_eq!("AREA".parse::<ResizeFilter>(), Ok(ResizeFilter::Area));
        assert_eq!("bicubic".parse::<ResizeFilter>(), Ok(ResizeFilter::Bicubic));
        assert!("lanczos".parse::<ResizeFilter>().is_err());
    }
}
