//! Cats vs Dogs Dataset Loader
//!
//! Scans an on-disk dataset laid out as one directory per class and collects
//! labeled samples for splitting and training.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{Label, ResizeFilter, CLASS_NAMES};
use crate::IMAGE_SIZE;

/// File extensions accepted as images
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// A single image sample with its label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSample {
    /// Path to the image file
    pub path: PathBuf,
    /// Class label (Cat or Dog)
    pub label: Label,
    /// Unique sample ID
    pub id: usize,
}

/// Cats vs dogs dataset with lazy image loading
///
/// The directory should be structured as:
/// ```text
/// root_dir/
/// ├── Cat/
/// │   ├── 1.jpg
/// │   └── 2.jpg
/// └── Dog/
///     ├── 1.jpg
///     └── 2.jpg
/// ```
#[derive(Debug)]
pub struct CatsDogsDataset {
    /// Root directory of the dataset
    pub root_dir: PathBuf,
    /// All samples in the dataset
    pub samples: Vec<ImageSample>,
    /// Target image size (width, height)
    pub image_size: (u32, u32),
}

impl CatsDogsDataset {
    /// Load the dataset index from a directory containing `Cat/` and `Dog/`
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Result<Self> {
        let root_dir = root_dir.as_ref().to_path_buf();
        info!("Loading cats-vs-dogs dataset from: {:?}", root_dir);

        if !root_dir.exists() {
            anyhow::bail!("Dataset directory does not exist: {:?}", root_dir);
        }

        let mut samples = Vec::new();
        let mut sample_id: usize = 0;

        for class_name in CLASS_NAMES {
            let class_dir = Self::find_class_dir(&root_dir, class_name)
                .with_context(|| format!("Missing class directory '{}' in {:?}", class_name, root_dir))?;
            let label = match class_name {
                "Cat" => Label::Cat,
                _ => Label::Dog,
            };

            let mut class_count = 0usize;
            for entry in WalkDir::new(&class_dir)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path().to_path_buf();

                if let Some(ext) = path.extension() {
                    let ext = ext.to_string_lossy().to_lowercase();
                    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                        samples.push(ImageSample {
                            path,
                            label,
                            id: sample_id,
                        });
                        sample_id += 1;
                        class_count += 1;
                    }
                }
            }

            debug!("Class '{}': {} samples", class_name, class_count);
        }

        info!("Loaded {} total samples", samples.len());

        Ok(Self {
            root_dir,
            samples,
            image_size: (IMAGE_SIZE as u32, IMAGE_SIZE as u32),
        })
    }

    /// Locate a class subdirectory, tolerating case differences
    fn find_class_dir(root: &Path, class_name: &str) -> Option<PathBuf> {
        let exact = root.join(class_name);
        if exact.is_dir() {
            return Some(exact);
        }

        std::fs::read_dir(root)
            .ok()?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .find(|p| {
                p.is_dir()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| n.eq_ignore_ascii_case(class_name))
                        .unwrap_or(false)
            })
    }

    /// Get the number of samples in the dataset
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Load an image from disk and resize it to the model resolution
    pub fn load_image(&self, sample: &ImageSample, filter: ResizeFilter) -> Result<DynamicImage> {
        let img = ImageReader::open(&sample.path)
            .with_context(|| format!("Failed to open image: {:?}", sample.path))?
            .decode()
            .with_context(|| format!("Failed to decode image: {:?}", sample.path))?;

        Ok(img.resize_exact(self.image_size.0, self.image_size.1, filter.filter_type()))
    }

    /// Get statistics about the dataset
    pub fn stats(&self) -> DatasetStats {
        let mut class_counts = [0usize; 2];
        for sample in &self.samples {
            class_counts[sample.label.index()] += 1;
        }

        DatasetStats {
            total_samples: self.samples.len(),
            class_counts,
        }
    }
}

/// Statistics about the dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_samples: usize,
    pub class_counts: [usize; 2],
}

impl DatasetStats {
    /// Print statistics to console
    pub fn print(&self) {
        println!("\nDataset Statistics:");
        println!("  Total samples: {}", self.total_samples);
        for (idx, name) in CLASS_NAMES.iter().enumerate() {
            let count = self.class_counts[idx];
            let pct = if self.total_samples > 0 {
                100.0 * count as f64 / self.total_samples as f64
            } else {
                0.0
            };
            println!("  {:6} {:>7} ({:.1}%)", name, count, pct);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_sample_creation() {
        let sample = ImageSample {
            path: PathBuf::from("/data/Cat/1.jpg"),
            label: Label::Cat,
            id: 42,
        };

        assert_eq!(sample.label, Label::Cat);
        assert_eq!(sample.id, 42);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let result = CatsDogsDataset::new("/definitely/not/a/real/path");
        assert!(result.is_err());
    }

    #[test]
    fn test_scans_class_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Cat")).unwrap();
        std::fs::create_dir(dir.path().join("Dog")).unwrap();
        std::fs::write(dir.path().join("Cat/a.jpg"), b"stub").unwrap();
        std::fs::write(dir.path().join("Cat/b.png"), b"stub").unwrap();
        std::fs::write(dir.path().join("Dog/c.jpeg"), b"stub").unwrap();
        std::fs::write(dir.path().join("Dog/notes.txt"), b"skip me").unwrap();

        let dataset = CatsDogsDataset::new(dir.path()).unwrap();
        let stats = dataset.stats();

        assert_eq!(dataset.len(), 3);
        assert_eq!(stats.class_counts, [2, 1]);
    }

    #[test]
    fn test_class_dir_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("cat")).unwrap();
        std::fs::create_dir(dir.path().join("dog")).unwrap();
        std::fs::write(dir.path().join("cat/a.jpg"), b"stub").unwrap();

        let dataset = CatsDogsDataset::new(dir.path()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.samples[0].label, Label::Cat);
    }
}
