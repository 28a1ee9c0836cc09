// ABOUTME: Integration tests for parsing realistic provider output shapes
// ABOUTME: Covers markdown fences, wrapper objects, and degraded text responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Plateful Kitchen Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use plateful_gen::errors::GenerationError;
use plateful_gen::models::Difficulty;
use plateful_gen::parser::parse;

#[test]
fn test_markdown_fenced_json_is_extracted() {
    let raw = "Sure! Here are your recipes:\n\n```json\n[\
               {\"title\": \"Miso Soup\", \"instructions\": \"1. Simmer dashi. 2. Whisk in miso. 3. Add tofu and serve.\", \
               \"ingredients\": [{\"name\": \"miso paste\", \"amount\": \"3\", \"unit\": \"tbsp\"}], \
               \"difficulty\": \"Easy\"}\
               ]\n```\n\nLet me know if you'd like variations!";

    let records = parse(raw).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Miso Soup");
    assert_eq!(records[0].instructions.len(), 3);
    assert_eq!(records[0].difficulty, Difficulty::Easy);
}

#[test]
fn test_recipes_wrapper_object_is_unwrapped() {
    let raw = r#"{"recipes": [
        {"title": "Tomato Pasta", "instructions": "1. Boil pasta. 2. Simmer sauce. 3. Combine."},
        {"title": "Bruschetta", "instructions": "1. Toast bread. 2. Top with tomatoes."}
    ]}"#;

    let records = parse(raw).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].title, "Bruschetta");
}

#[test]
fn test_instruction_step_lists_and_strings_both_work() {
    let raw = r#"[
        {"title": "As String", "instructions": "1. First. 2. Second. 3. Third."},
        {"title": "As List", "instructions": ["First", "Second", "Third"]}
    ]"#;

    let records = parse(raw).unwrap();
    assert_eq!(records[0].instructions.len(), 3);
    assert_eq!(records[1].instructions.len(), 3);
}

#[test]
fn test_numeric_fields_tolerate_strings_and_numbers() {
    let raw = r#"[{
        "title": "Flexible Fields",
        "instructions": "1. Cook.",
        "prep_time": "25",
        "cook_time": 40,
        "servings": "4",
        "ingredients": [{"name": "beans", "amount": 2, "unit": "cups"}]
    }]"#;

    let records = parse(raw).unwrap();
    let record = &records[0];
    assert_eq!(record.prep_time_minutes, Some(25));
    assert_eq!(record.cook_time_minutes, Some(40));
    assert_eq!(record.servings, Some(4));
    assert_eq!(record.ingredients[0].amount.as_deref(), Some("2"));
}

#[test]
fn test_unknown_difficulty_defaults_to_medium() {
    let raw = r#"[{"title": "Mystery", "instructions": "1. Cook.", "difficulty": "Impossible"}]"#;
    let records = parse(raw).unwrap();
    assert_eq!(records[0].difficulty, Difficulty::Medium);
}

#[test]
fn test_plain_text_recipe_sections_are_salvaged() {
    let raw = "I wasn't able to produce JSON this time, but here are two simple ideas you can try.\n\n\
               **Quick Veggie Omelette**\n\
               1. Whisk three eggs with a splash of water.\n\
               2. Pour into a hot buttered pan.\n\
               3. Add vegetables and fold when set.\n\n\
               **Simple Green Salad**\n\
               1. Tear the lettuce into a large bowl.\n\
               2. Whisk oil and vinegar, then toss everything together.";

    let records = parse(raw).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "Quick Veggie Omelette");
    assert_eq!(records[1].title, "Simple Green Salad");
    assert!(records.iter().all(|r| !r.instructions.is_empty()));
}

#[test]
fn test_refusal_text_is_a_parse_error() {
    let raw = "I'm sorry, I can't help with that request.";
    let err = parse(raw).unwrap_err();
    assert!(matches!(err, GenerationError::Parse(_)));
}

#[test]
fn test_empty_and_whitespace_bodies_are_parse_errors() {
    assert!(parse("").is_err());
    assert!(parse("\n\n   \t").is_err());
}

#[test]
fn test_valid_empty_array_is_zero_records_not_an_error() {
    let records = parse("Here you go: []").unwrap();
    assert!(records.is_empty());
}
