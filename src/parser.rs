// ABOUTME: Parses raw provider output into validated recipe records
// ABOUTME: Ordered strategy chain - direct JSON, prose-embedded JSON, structured-text salvage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

//! # Response Parser
//!
//! Pure functions turning provider text into [`RecipeRecord`]s. No I/O.
//!
//! Generative models are asked for a JSON array but routinely wrap it in
//! prose, return a single object, or fall back to markdown. Strategies are
//! tried in order; the first that yields anything wins:
//!
//! 1. the whole body is a JSON array or object
//! 2. the first JSON array or object embedded in surrounding prose
//! 3. structured-text salvage of numbered/bold recipe sections
//!
//! A record without a title or at least one instruction step is dropped,
//! never emitted partially. Output is capped at three records. Input in
//! which no strategy finds anything is a [`GenerationError::Parse`];
//! valid-but-empty JSON is a successful parse of zero records (a content
//! issue, not a parse failure).

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::constants::limits;
use crate::errors::GenerationError;
use crate::models::{Difficulty, RecipeIngredient, RecipeRecord};

static EMBEDDED_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("static regex"));
static EMBEDDED_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("static regex"));
static STEP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d+[.)]\s+").expect("static regex"));
static SECTION_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Recipe \d+:|^\d+[.)]|^\*\*)\s*(.+?)\s*(?:\n|\*\*|$)").expect("static regex")
});

/// Minimum length for a text section to be considered a recipe
const MIN_SECTION_LEN: usize = 50;

// ============================================================================
// Raw Wire Shapes
// ============================================================================

/// Recipe as the model emits it; everything optional, validated on conversion
#[derive(Debug, Deserialize)]
struct RawRecipe {
    title: Option<String>,
    description: Option<String>,
    instructions: Option<RawInstructions>,
    #[serde(default)]
    ingredients: Vec<RawIngredient>,
    prep_time: Option<Value>,
    cook_time: Option<Value>,
    servings: Option<Value>,
    difficulty: Option<String>,
}

/// Models emit instructions as one string or as a list of steps
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawInstructions {
    Text(String),
    Steps(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawIngredient {
    name: Option<String>,
    amount: Option<Value>,
    unit: Option<String>,
}

// ============================================================================
// Entry Point
// ============================================================================

/// Parse raw provider output into at most three validated recipes
///
/// # Errors
///
/// Returns `GenerationError::Parse` when no strategy can extract anything
/// recipe-shaped from the input.
pub fn parse(raw: &str) -> Result<Vec<RecipeRecord>, GenerationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::Parse("empty response body".into()));
    }

    if let Some(records) = parse_direct_json(trimmed) {
        debug!(count = records.len(), "Parsed response as direct JSON");
        return Ok(records);
    }
    if let Some(records) = parse_embedded_json(trimmed) {
        debug!(count = records.len(), "Parsed JSON embedded in prose");
        return Ok(records);
    }
    if let Some(records) = salvage_structured_text(trimmed) {
        debug!(count = records.len(), "Salvaged recipes from structured text");
        return Ok(records);
    }

    Err(GenerationError::Parse(
        "no recipe-shaped content found in response".into(),
    ))
}

/// Strategy 1: the whole body is JSON
fn parse_direct_json(text: &str) -> Option<Vec<RecipeRecord>> {
    let value: Value = serde_json::from_str(text).ok()?;
    Some(records_from_value(value))
}

/// Strategy 2: JSON embedded in surrounding prose
fn parse_embedded_json(text: &str) -> Option<Vec<RecipeRecord>> {
    for pattern in [&*EMBEDDED_ARRAY, &*EMBEDDED_OBJECT] {
        if let Some(matched) = pattern.find(text) {
            if let Ok(value) = serde_json::from_str::<Value>(matched.as_str()) {
                return Some(records_from_value(value));
            }
        }
    }
    None
}

/// Convert a parsed JSON value (array, single object, or `{"recipes": [...]}`)
/// into validated records
fn records_from_value(value: Value) -> Vec<RecipeRecord> {
    let raw_list: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("recipes") {
            Some(Value::Array(items)) => items,
            _ => vec![Value::Object(map)],
        },
        _ => return Vec::new(),
    };

    raw_list
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value::<RawRecipe>(item)
                .ok()
                .and_then(validate_record)
        })
        .take(limits::MAX_RECIPES)
        .collect()
}

/// Strategy 3: salvage numbered/bold markdown sections
///
/// Stricter than lenient text parsing: a salvaged record must yield a real
/// title and at least one instruction step or it is dropped.
fn salvage_structured_text(text: &str) -> Option<Vec<RecipeRecord>> {
    let mut records = Vec::new();

    for section in split_sections(text) {
        if section.len() < MIN_SECTION_LEN {
            continue;
        }
        let Some(title) = SECTION_TITLE
            .captures(&section)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim_matches('*').trim().to_owned())
            .filter(|t| !t.is_empty())
        else {
            trace!("Skipping section without a recognizable title");
            continue;
        };

        // Steps come from the body; the header line is not a step
        let body = section
            .split_once('\n')
            .map_or("", |(_, rest)| rest);
        let instructions = split_instruction_text(body);
        if instructions.is_empty() {
            continue;
        }

        records.push(RecipeRecord {
            title,
            description: None,
            ingredients: Vec::new(),
            instructions,
            prep_time_minutes: None,
            cook_time_minutes: None,
            servings: None,
            difficulty: Difficulty::Medium,
            is_fallback: false,
        });
        if records.len() == limits::MAX_RECIPES {
            break;
        }
    }

    if records.is_empty() {
        None
    } else {
        Some(records)
    }
}

/// Split text into candidate recipe sections at bold or "Recipe N:" headers.
/// Bare numbered lines are steps, not section boundaries.
fn split_sections(text: &str) -> Vec<String> {
    let mut sections: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let t = line.trim_start();
        let starts_section = t.starts_with("**")
            || (t.starts_with("Recipe ") && t[7..].starts_with(|c: char| c.is_ascii_digit()));
        if starts_section && current.len() >= MIN_SECTION_LEN {
            sections.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        sections.push(current);
    }
    sections
}

// ============================================================================
// Record Validation
// ============================================================================

/// Enforce mandatory fields; returns `None` to drop the record
fn validate_record(raw: RawRecipe) -> Option<RecipeRecord> {
    let title = raw.title.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty())?;

    let instructions = match raw.instructions? {
        RawInstructions::Text(text) => split_instruction_text(&text),
        RawInstructions::Steps(steps) => steps
            .into_iter()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect(),
    };
    if instructions.is_empty() {
        return None;
    }

    let ingredients = raw
        .ingredients
        .into_iter()
        .filter_map(|line| {
            let name = line.name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty())?;
            Some(RecipeIngredient::new(
                name,
                line.amount.as_ref().map(value_to_text),
                line.unit.filter(|u| !u.trim().is_empty()),
            ))
        })
        .collect();

    let difficulty = raw
        .difficulty
        .as_deref()
        .and_then(|d| d.parse().ok())
        .unwrap_or_default();

    Some(RecipeRecord {
        title,
        description: raw.description.filter(|d| !d.trim().is_empty()),
        ingredients,
        instructions,
        prep_time_minutes: raw.prep_time.as_ref().and_then(value_to_minutes),
        cook_time_minutes: raw.cook_time.as_ref().and_then(value_to_minutes),
        servings: raw
            .servings
            .as_ref()
            .and_then(value_to_minutes)
            .filter(|s| *s >= 1),
        difficulty,
        is_fallback: false,
    })
}

/// Split an instruction blob into steps on newlines and numbered markers
fn split_instruction_text(text: &str) -> Vec<String> {
    text.lines()
        .flat_map(|line| STEP_MARKER.split(line))
        .map(|step| step.trim().trim_matches('*').trim().to_owned())
        .filter(|step| !step.is_empty())
        .collect()
}

/// Models emit amounts as numbers or strings; normalize to text
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerce a numeric-or-string JSON value into non-negative minutes
fn value_to_minutes(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
