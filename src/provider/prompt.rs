// ABOUTME: Prompt construction for recipe generation requests
// ABOUTME: Assembles ingredient, dietary, cuisine, and output-format sections
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

//! Builds the chef prompt sent to the generation provider.
//!
//! The prompt asks for 2-3 recipes as a JSON array so the parser's primary
//! strategy applies; the parser still tolerates prose-wrapped output.

use std::fmt::Write as _;

use crate::models::{DietaryPreference, GenerationRequest};

const JSON_FORMAT_BLOCK: &str = r#"
Return your response as a JSON array with this exact structure:

[
  {
    "title": "Recipe Name",
    "description": "Short description of flavors and techniques",
    "instructions": "1. First step with timing. 2. Second step with temperature. 3. ...",
    "ingredients": [
      {"name": "main ingredient", "amount": "200", "unit": "g"},
      {"name": "seasoning", "amount": "1", "unit": "tsp"}
    ],
    "prep_time": 15,
    "cook_time": 25,
    "servings": 2,
    "difficulty": "Easy"
  }
]

Ensure perfect JSON formatting."#;

/// Build the generation prompt for a request
///
/// `ingredients` is the diet-filtered ingredient list (not necessarily the
/// request's raw list) and `protein_suggestions` the substitutes offered when
/// filtering removed proteins.
#[must_use]
pub fn build_prompt(
    request: &GenerationRequest,
    ingredients: &[String],
    protein_suggestions: &[&'static str],
) -> String {
    let mut prompt = format!(
        "You are a professional chef and recipe developer. Create 2-3 detailed, \
         restaurant-quality recipes using these ingredients: {}\n\n\
         Requirements:\n\
         - Use the provided ingredients creatively\n\
         - Include specific quantities and measurements\n\
         - Add complementary ingredients to make complete, balanced meals\n\
         - Include cooking times and temperatures\n\
         - Make instructions clear, numbered, and detailed\n",
        ingredients.join(", ")
    );

    if !protein_suggestions.is_empty() {
        let _ = writeln!(
            prompt,
            "- You may include these additional proteins: {}",
            protein_suggestions.join(", ")
        );
    }

    let preferences = request.dietary_preferences();
    if !preferences.is_empty() {
        let names: Vec<&str> = preferences.iter().map(DietaryPreference::as_str).collect();
        let _ = writeln!(
            prompt,
            "\nDietary restrictions - strictly enforce: {}",
            names.join(", ")
        );
        for pref in preferences {
            if let Some(rule) = restriction_rule(*pref) {
                let _ = writeln!(prompt, "- {rule}");
            }
        }
    }

    if let Some(cuisine) = request.cuisine_type() {
        let _ = writeln!(
            prompt,
            "- Style: {cuisine} cuisine with authentic flavors and techniques"
        );
    }
    if let Some(meal) = request.meal_type() {
        let _ = writeln!(prompt, "- Meal type: {meal}");
    }

    prompt.push_str(JSON_FORMAT_BLOCK);
    prompt
}

/// Explicit rule line for diets the model commonly violates
const fn restriction_rule(pref: DietaryPreference) -> Option<&'static str> {
    match pref {
        DietaryPreference::Vegetarian => Some("Vegetarian: NO meat, poultry, fish, or seafood"),
        DietaryPreference::Vegan => {
            Some("Vegan: NO animal products (meat, dairy, eggs, honey, etc.)")
        }
        DietaryPreference::GlutenFree => {
            Some("Gluten-free: NO wheat, barley, rye, or gluten-containing ingredients")
        }
        DietaryPreference::DairyFree => {
            Some("Dairy-free: NO milk, cheese, butter, yogurt, or dairy products")
        }
        _ => None,
    }
}
