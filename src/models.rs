// ABOUTME: Core data structures for recipe generation requests, records, and result envelopes
// ABOUTME: GenerationRequest validates on construction; invalid input never reaches the orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

//! # Generation Data Model
//!
//! Request and result types exchanged with the routing layer, plus the recipe
//! record shape produced by the parser and the fallback catalog.
//!
//! [`GenerationRequest`] is immutable once built: [`GenerationRequest::new`]
//! normalizes and validates every field, so downstream components can assume
//! well-formed input.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::limits;
use crate::errors::{ErrorInfo, GenerationError};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static INGREDIENT_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s\-'.()&,]+$").expect("static regex"));

// ============================================================================
// Closed Enumerations
// ============================================================================

/// Dietary preferences accepted by the generation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum DietaryPreference {
    Vegetarian,
    Vegan,
    GlutenFree,
    DairyFree,
    NutFree,
    LowCarb,
    Keto,
    Paleo,
    Mediterranean,
    Halal,
    Kosher,
    LowSodium,
    LowFat,
    HighProtein,
    DiabeticFriendly,
}

impl DietaryPreference {
    /// Canonical lowercase form used in prompts and filters
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vegetarian => "vegetarian",
            Self::Vegan => "vegan",
            Self::GlutenFree => "gluten-free",
            Self::DairyFree => "dairy-free",
            Self::NutFree => "nut-free",
            Self::LowCarb => "low-carb",
            Self::Keto => "keto",
            Self::Paleo => "paleo",
            Self::Mediterranean => "mediterranean",
            Self::Halal => "halal",
            Self::Kosher => "kosher",
            Self::LowSodium => "low-sodium",
            Self::LowFat => "low-fat",
            Self::HighProtein => "high-protein",
            Self::DiabeticFriendly => "diabetic-friendly",
        }
    }
}

impl FromStr for DietaryPreference {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vegetarian" => Ok(Self::Vegetarian),
            "vegan" => Ok(Self::Vegan),
            "gluten-free" => Ok(Self::GlutenFree),
            "dairy-free" => Ok(Self::DairyFree),
            "nut-free" => Ok(Self::NutFree),
            "low-carb" => Ok(Self::LowCarb),
            "keto" => Ok(Self::Keto),
            "paleo" => Ok(Self::Paleo),
            "mediterranean" => Ok(Self::Mediterranean),
            "halal" => Ok(Self::Halal),
            "kosher" => Ok(Self::Kosher),
            "low-sodium" => Ok(Self::LowSodium),
            "low-fat" => Ok(Self::LowFat),
            "high-protein" => Ok(Self::HighProtein),
            "diabetic-friendly" => Ok(Self::DiabeticFriendly),
            other => Err(GenerationError::validation(
                "dietary_preferences",
                format!("unknown dietary preference: {other}"),
            )),
        }
    }
}

impl fmt::Display for DietaryPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cuisine styles accepted by the generation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum CuisineType {
    Italian,
    Chinese,
    Mexican,
    Indian,
    French,
    Japanese,
    Thai,
    American,
    Mediterranean,
    Greek,
    Spanish,
    Korean,
    MiddleEastern,
    British,
    German,
    Vietnamese,
    Turkish,
    Moroccan,
    Brazilian,
    Caribbean,
    African,
    Fusion,
}

impl CuisineType {
    /// Canonical lowercase form used in prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Italian => "italian",
            Self::Chinese => "chinese",
            Self::Mexican => "mexican",
            Self::Indian => "indian",
            Self::French => "french",
            Self::Japanese => "japanese",
            Self::Thai => "thai",
            Self::American => "american",
            Self::Mediterranean => "mediterranean",
            Self::Greek => "greek",
            Self::Spanish => "spanish",
            Self::Korean => "korean",
            Self::MiddleEastern => "middle-eastern",
            Self::British => "british",
            Self::German => "german",
            Self::Vietnamese => "vietnamese",
            Self::Turkish => "turkish",
            Self::Moroccan => "moroccan",
            Self::Brazilian => "brazilian",
            Self::Caribbean => "caribbean",
            Self::African => "african",
            Self::Fusion => "fusion",
        }
    }
}

impl FromStr for CuisineType {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "italian" => Ok(Self::Italian),
            "chinese" => Ok(Self::Chinese),
            "mexican" => Ok(Self::Mexican),
            "indian" => Ok(Self::Indian),
            "french" => Ok(Self::French),
            "japanese" => Ok(Self::Japanese),
            "thai" => Ok(Self::Thai),
            "american" => Ok(Self::American),
            "mediterranean" => Ok(Self::Mediterranean),
            "greek" => Ok(Self::Greek),
            "spanish" => Ok(Self::Spanish),
            "korean" => Ok(Self::Korean),
            "middle-eastern" => Ok(Self::MiddleEastern),
            "british" => Ok(Self::British),
            "german" => Ok(Self::German),
            "vietnamese" => Ok(Self::Vietnamese),
            "turkish" => Ok(Self::Turkish),
            "moroccan" => Ok(Self::Moroccan),
            "brazilian" => Ok(Self::Brazilian),
            "caribbean" => Ok(Self::Caribbean),
            "african" => Ok(Self::African),
            "fusion" => Ok(Self::Fusion),
            other => Err(GenerationError::validation(
                "cuisine_type",
                format!("unknown cuisine type: {other}"),
            )),
        }
    }
}

impl fmt::Display for CuisineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meal types accepted by the generation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Dessert,
    Appetizer,
    MainCourse,
    SideDish,
    Soup,
    Salad,
    Drink,
    Brunch,
}

impl MealType {
    /// Canonical lowercase form used in prompts
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
            Self::Dessert => "dessert",
            Self::Appetizer => "appetizer",
            Self::MainCourse => "main-course",
            Self::SideDish => "side-dish",
            Self::Soup => "soup",
            Self::Salad => "salad",
            Self::Drink => "drink",
            Self::Brunch => "brunch",
        }
    }
}

impl FromStr for MealType {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            "dessert" => Ok(Self::Dessert),
            "appetizer" => Ok(Self::Appetizer),
            "main-course" => Ok(Self::MainCourse),
            "side-dish" => Ok(Self::SideDish),
            "soup" => Ok(Self::Soup),
            "salad" => Ok(Self::Salad),
            "drink" => Ok(Self::Drink),
            "brunch" => Ok(Self::Brunch),
            other => Err(GenerationError::validation(
                "meal_type",
                format!("unknown meal type: {other}"),
            )),
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipe difficulty rating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl FromStr for Difficulty {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "expert" => Ok(Self::Expert),
            other => Err(GenerationError::validation(
                "difficulty",
                format!("unknown difficulty: {other}"),
            )),
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// A validated recipe generation request
///
/// Construct through [`GenerationRequest::new`] or
/// [`GenerationRequest::from_raw`]; fields are normalized (trimmed, whitespace
/// collapsed, case-insensitively deduplicated) and validated before the value
/// exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGenerationRequest")]
pub struct GenerationRequest {
    ingredients: Vec<String>,
    dietary_preferences: Vec<DietaryPreference>,
    cuisine_type: Option<CuisineType>,
    meal_type: Option<MealType>,
}

/// Wire shape for deserialization; converted through the validating
/// constructor so a deserialized request is as trustworthy as a built one
#[derive(Debug, Deserialize)]
struct RawGenerationRequest {
    ingredients: Vec<String>,
    #[serde(default)]
    dietary_preferences: Vec<DietaryPreference>,
    #[serde(default)]
    cuisine_type: Option<CuisineType>,
    #[serde(default)]
    meal_type: Option<MealType>,
}

impl TryFrom<RawGenerationRequest> for GenerationRequest {
    type Error = GenerationError;

    fn try_from(raw: RawGenerationRequest) -> Result<Self, Self::Error> {
        Self::new(
            raw.ingredients,
            raw.dietary_preferences,
            raw.cuisine_type,
            raw.meal_type,
        )
    }
}

impl GenerationRequest {
    /// Create a request from typed parts, validating the ingredient list
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Validation` when the ingredient list is
    /// empty, oversized, or contains malformed names, or when too many
    /// dietary preferences are supplied.
    pub fn new(
        ingredients: Vec<String>,
        dietary_preferences: Vec<DietaryPreference>,
        cuisine_type: Option<CuisineType>,
        meal_type: Option<MealType>,
    ) -> Result<Self, GenerationError> {
        let ingredients = Self::normalize_ingredients(ingredients)?;

        if dietary_preferences.len() > limits::MAX_DIETARY_PREFERENCES {
            return Err(GenerationError::validation(
                "dietary_preferences",
                format!("at most {} preferences allowed", limits::MAX_DIETARY_PREFERENCES),
            ));
        }
        // Dedup preferences preserving order
        let mut seen = Vec::new();
        for pref in dietary_preferences {
            if !seen.contains(&pref) {
                seen.push(pref);
            }
        }

        Ok(Self {
            ingredients,
            dietary_preferences: seen,
            cuisine_type,
            meal_type,
        })
    }

    /// Create a request from untyped strings, as received from the routing layer
    ///
    /// Cuisine and meal values of `"any"` mean no preference, matching the
    /// upstream API contract.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Validation` for malformed ingredients or
    /// values outside the closed enumerations.
    pub fn from_raw(
        ingredients: Vec<String>,
        dietary_preferences: &[String],
        cuisine_type: Option<&str>,
        meal_type: Option<&str>,
    ) -> Result<Self, GenerationError> {
        let preferences = dietary_preferences
            .iter()
            .map(|p| p.parse())
            .collect::<Result<Vec<_>, _>>()?;

        let cuisine = match cuisine_type.map(str::trim) {
            None | Some("") => None,
            Some(c) if c.eq_ignore_ascii_case("any") => None,
            Some(c) => Some(c.parse()?),
        };
        let meal = match meal_type.map(str::trim) {
            None | Some("") => None,
            Some(m) if m.eq_ignore_ascii_case("any") => None,
            Some(m) => Some(m.parse()?),
        };

        Self::new(ingredients, preferences, cuisine, meal)
    }

    fn normalize_ingredients(raw: Vec<String>) -> Result<Vec<String>, GenerationError> {
        if raw.is_empty() {
            return Err(GenerationError::validation(
                "ingredients",
                "at least one ingredient is required",
            ));
        }
        if raw.len() > limits::MAX_INGREDIENTS {
            return Err(GenerationError::validation(
                "ingredients",
                format!("at most {} ingredients allowed", limits::MAX_INGREDIENTS),
            ));
        }

        let mut cleaned: Vec<String> = Vec::with_capacity(raw.len());
        for ingredient in &raw {
            let name = WHITESPACE.replace_all(ingredient.trim(), " ").into_owned();
            if name.len() < limits::MIN_INGREDIENT_LEN {
                return Err(GenerationError::validation(
                    "ingredients",
                    format!("ingredient name too short: {ingredient:?}"),
                ));
            }
            if name.len() > limits::MAX_INGREDIENT_LEN {
                return Err(GenerationError::validation(
                    "ingredients",
                    format!("ingredient name exceeds {} characters", limits::MAX_INGREDIENT_LEN),
                ));
            }
            if !INGREDIENT_CHARSET.is_match(&name) {
                return Err(GenerationError::validation(
                    "ingredients",
                    format!("invalid characters in ingredient: {name}"),
                ));
            }
            let duplicate = cleaned.iter().any(|seen| seen.eq_ignore_ascii_case(&name));
            if !duplicate {
                cleaned.push(name);
            }
        }
        Ok(cleaned)
    }

    /// Normalized ingredient names, in input order
    #[must_use]
    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    /// Dietary preferences, deduplicated, in input order
    #[must_use]
    pub fn dietary_preferences(&self) -> &[DietaryPreference] {
        &self.dietary_preferences
    }

    /// Requested cuisine style, if any
    #[must_use]
    pub const fn cuisine_type(&self) -> Option<CuisineType> {
        self.cuisine_type
    }

    /// Requested meal type, if any
    #[must_use]
    pub const fn meal_type(&self) -> Option<MealType> {
        self.meal_type
    }
}

// ============================================================================
// Recipe Records
// ============================================================================

/// One ingredient line within a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    /// Ingredient name
    pub name: String,
    /// Amount, kept as text ("200", "1/2", "to taste")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Unit of measurement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl RecipeIngredient {
    /// Create an ingredient line
    pub fn new(
        name: impl Into<String>,
        amount: Option<String>,
        unit: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            unit,
        }
    }
}

/// A structured recipe, produced by the parser or the fallback catalog
///
/// `title` and a non-empty `instructions` list are mandatory; the parser
/// drops records that cannot satisfy them rather than emitting partial data.
/// `is_fallback` is always set explicitly at the source, never inferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    /// Recipe title
    pub title: String,
    /// Short description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ingredient lines, in order
    pub ingredients: Vec<RecipeIngredient>,
    /// Instruction steps, in order
    pub instructions: Vec<String>,
    /// Preparation time in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time_minutes: Option<u32>,
    /// Cooking time in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook_time_minutes: Option<u32>,
    /// Number of servings (at least 1 when present)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    /// Difficulty rating
    pub difficulty: Difficulty,
    /// Whether this record came from the fallback catalog
    pub is_fallback: bool,
}

// ============================================================================
// Result Envelope
// ============================================================================

/// Where a generation result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    /// Recipes were generated by the AI provider
    Provider,
    /// Recipes came from the static fallback catalog
    Fallback,
}

/// Result of one logical generation request
///
/// Request-scoped; this layer never persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Generated or fallback recipes, at most three
    pub recipes: Vec<RecipeRecord>,
    /// Provenance of the recipes
    pub source: ResultSource,
    /// End-to-end latency for this request
    pub latency_ms: u64,
    /// The failure that forced a fallback, when any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}
