//! The fixed ImageNet class-label table the classifier was trained against.
//!
//! Labels are loaded from the Keras `imagenet_class_index.json` format,
//! which maps each output index to a (WordNet synset id, raw label) pair:
//! `{"0": ["n01440764", "tench"], "1": ["n01443537", "goldfish"], ...}`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const IMAGENET_CLASS_COUNT: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassLabel
{
    /// The WordNet synset id, e.g. "n02099601".
    pub class_id: String,
    /// The raw label with underscore separators, e.g. "golden_retriever".
    pub name: String,
}

impl ClassLabel
{
    pub fn new(class_id: impl Into<String>, name: impl Into<String>) -> Self
    {
        ClassLabel { class_id: class_id.into(), name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassLabels
{
    labels: Vec<ClassLabel>,
}

impl ClassLabels
{
    /// Labels are indexed by their position, matching the model's output order.
    pub fn new(labels: Vec<ClassLabel>) -> Self
    {
        ClassLabels { labels }
    }

    /// Parses a Keras class index document.
    /// Indices must be contiguous from 0; a gap would silently shift every label after it.
    pub fn from_json(json: &str) -> anyhow::Result<Self>
    {
        let index: BTreeMap<usize, (String, String)> = serde_json::from_str(json)
            .context("Error parsing class index")?;

        let mut labels = Vec::with_capacity(index.len());
        for (expected, (idx, (class_id, name))) in index.into_iter().enumerate()
        {
            if idx != expected {
                anyhow::bail!("Class index {} is missing from the label table", expected);
            }
            labels.push(ClassLabel { class_id, name });
        }

        Ok(ClassLabels { labels })
    }

    /// Loads the label table from disk and checks it holds exactly `expected_count` classes.
    pub fn load(path: &Path, expected_count: usize) -> anyhow::Result<Self>
    {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Error reading class labels from {:?}", path))?;
        let labels = Self::from_json(&json)
            .with_context(|| format!("Error loading class labels from {:?}", path))?;

        if labels.len() != expected_count {
            anyhow::bail!("Expected {} class labels in {:?}, found {}", expected_count, path, labels.len());
        }

        Ok(labels)
    }

    pub fn get(&self, index: usize) -> Option<&ClassLabel>
    {
        self.labels.get(index)
    }

    pub fn len(&self) -> usize
    {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.labels.is_empty()
    }
}

/// Turns a raw label into a display-friendly phrase, e.g. "golden_retriever" -> "Golden Retriever".
/// Underscores become spaces; a letter is upper-cased when it follows a non-letter
/// and lower-cased otherwise, so "jack-o'-lantern" becomes "Jack-O'-Lantern".
pub fn display_label(raw: &str) -> String
{
    let mut display = String::with_capacity(raw.len());
    let mut previous_is_letter = false;

    for c in raw.chars()
    {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if previous_is_letter {
                display.extend(c.to_lowercase());
            } else {
                display.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            display.push(c);
            previous_is_letter = false;
        }
    }

    display
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn display_label_replaces_underscores_and_title_cases()
    {
        assert_eq!(display_label("golden_retriever"), "Golden Retriever");
        assert_eq!(display_label("tabby"), "Tabby");
        assert_eq!(display_label("German_short-haired_pointer"), "German Short-Haired Pointer");
        assert_eq!(display_label("jack-o'-lantern"), "Jack-O'-Lantern");
        assert_eq!(display_label("CD_player"), "Cd Player");
        assert_eq!(display_label("3d_glasses"), "3D Glasses");
        assert_eq!(display_label(""), "");
    }

    #[test]
    fn parses_keras_class_index()
    {
        let json = r#"{
            "1": ["n01443537", "goldfish"],
            "0": ["n01440764", "tench"],
            "2": ["n02099601", "golden_retriever"]
        }"#;
        let labels = ClassLabels::from_json(json).unwrap();

        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get(0), Some(&ClassLabel::new("n01440764", "tench")));
        assert_eq!(labels.get(2), Some(&ClassLabel::new("n02099601", "golden_retriever")));
        assert_eq!(labels.get(3), None);
    }

    #[test]
    fn rejects_gaps_in_class_index()
    {
        let json = r#"{"0": ["n01440764", "tench"], "2": ["n02099601", "golden_retriever"]}"#;
        let err = ClassLabels::from_json(json).unwrap_err();
        assert!(err.to_string().contains("Class index 1"));
    }

    #[test]
    fn rejects_malformed_class_index()
    {
        assert!(ClassLabels::from_json(r#"{"zero": ["n01440764", "tench"]}"#).is_err());
        assert!(ClassLabels::from_json(r#"{"0": ["n01440764"]}"#).is_err());
        assert!(ClassLabels::from_json("not json").is_err());
    }

    #[test]
    fn load_checks_class_count()
    {
        let path = std::env::temp_dir().join(format!("petsy_labels_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"0": ["n01440764", "tench"], "1": ["n01443537", "goldfish"]}"#).unwrap();

        assert_eq!(ClassLabels::load(&path, 2).unwrap().len(), 2);
        let err = ClassLabels::load(&path, IMAGENET_CLASS_COUNT).unwrap_err();
        assert!(err.to_string().contains("Expected 1000 class labels"));

        std::fs::remove_file(&path).unwrap();
        assert!(ClassLabels::load(&path, 2).is_err());
    }
}
