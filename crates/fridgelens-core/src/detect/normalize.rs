//! Response normalization into a uniform ingredient list.
//!
//! Two shapes come back from the backends:
//!
//! - structured predictions (object detection): projected field by field
//! - free text from a generative model, expected to hold a fenced
//!   `{"ingredients": [...]}` block: the block is located, parsed and the
//!   array extracted
//!
//! Both paths return `Result` and never panic on malformed input.

use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

use crate::types::{BoundingBox, Prediction};

/// First fenced code block, optionally tagged `json`.
static FENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?i:json)?[ \t]*\r?\n?(.*?)\s*```").expect("Invalid fence regex")
});

/// Why a free-text response could not be normalized.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("top-level JSON value is not an object")]
    NotAnObject,

    #[error("missing \"ingredients\" field")]
    MissingIngredients,

    #[error("\"ingredients\" is not an array")]
    NotAnArray,

    #[error("\"ingredients\"[{0}] is not a string")]
    NonStringEntry(usize),
}

/// Return the body of the first fenced code block, or the whole text when
/// there is no fence.
pub fn extract_json_block(text: &str) -> &str {
    FENCE_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
        .trim()
}

/// Parse a generative model's reply into ingredient names, in given order.
///
/// Entries are trimmed; blank entries are dropped.
pub fn parse_ingredient_text(text: &str) -> Result<Vec<String>, ParseError> {
    let json: serde_json::Value = serde_json::from_str(extract_json_block(text))?;
    let object = json.as_object().ok_or(ParseError::NotAnObject)?;
    let entries = object
        .get("ingredients")
        .ok_or(ParseError::MissingIngredients)?
        .as_array()
        .ok_or(ParseError::NotAnArray)?;

    let mut ingredients = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let name = entry.as_str().ok_or(ParseError::NonStringEntry(i))?.trim();
        if !name.is_empty() {
            ingredients.push(name.to_string());
        }
    }
    Ok(ingredients)
}

/// Wire shape of one object-detection prediction (center-based box).
#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    #[serde(rename = "class")]
    pub class_name: String,
}

/// Project structured predictions onto the uniform shape.
pub fn project_predictions(raw: Vec<RawPrediction>) -> Vec<Prediction> {
    raw.into_iter()
        .map(|p| Prediction {
            label: p.class_name,
            confidence: Some(p.confidence.clamp(0.0, 1.0)),
            bbox: Some(BoundingBox::from_center(p.x, p.y, p.width, p.height)),
        })
        .collect()
}

static CANONICAL_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        // Eggs
        ("egg", "たまご"),
        ("eggs", "たまご"),
        ("卵", "たまご"),
        ("玉子", "たまご"),
        // Milk
        ("milk", "牛乳"),
        ("ミルク", "牛乳"),
        // Tomato
        ("tomato", "トマト"),
        ("tomatoes", "トマト"),
        ("とまと", "トマト"),
        // Chicken
        ("chicken", "鶏肉"),
        ("chicken breast", "鶏肉"),
        ("chicken thigh", "鶏もも肉"),
        ("とりにく", "鶏肉"),
        // Pork
        ("pork", "豚肉"),
        ("ぶたにく", "豚肉"),
        // Beef
        ("beef", "牛肉"),
        ("ぎゅうにく", "牛肉"),
        // Vegetables
        ("onion", "玉ねぎ"),
        ("onions", "玉ねぎ"),
        ("たまねぎ", "玉ねぎ"),
        ("carrot", "にんじん"),
        ("carrots", "にんじん"),
        ("人参", "にんじん"),
        ("potato", "じゃがいも"),
        ("potatoes", "じゃがいも"),
        ("ジャガイモ", "じゃがいも"),
        ("cabbage", "キャベツ"),
        ("きゃべつ", "キャベツ"),
        ("lettuce", "レタス"),
        ("れたす", "レタス"),
        // Other
        ("cheese", "チーズ"),
        ("butter", "バター"),
        ("bread", "パン"),
        ("rice", "米"),
        ("こめ", "米"),
    ])
});

/// Map common synonyms (English names, kana spellings) onto one canonical name.
///
/// Unknown names are returned unchanged.
pub fn canonical_name(name: &str) -> String {
    let key = name.trim().to_lowercase();
    CANONICAL_NAMES
        .get(key.as_str())
        .map(|c| c.to_string())
        .unwrap_or_else(|| name.to_string())
}
