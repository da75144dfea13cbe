//! Built-in exercises so the service is useful without an external config.

use serde_json::json;

use crate::domain::{Card, Category, Exercise, ExerciseSource};

fn text_card(id: &str, index: u32, correct_category: Category, text: &str) -> Card {
  Card {
    id: id.into(),
    index,
    correct_category,
    content_data: json!({ "type": "text", "text": text }),
  }
}

pub fn seed_exercises() -> Vec<Exercise> {
  use Category::{Left, Right};
  vec![
    Exercise {
      id: "seed-fruit-or-vegetable".into(),
      title: "Fruit or vegetable?".into(),
      instructions: "Swipe left for fruit, right for vegetables.".into(),
      left_label: "Fruit".into(),
      right_label: "Vegetable".into(),
      randomize: true,
      source: ExerciseSource::Seed,
      cards: vec![
        text_card("apple", 0, Left, "Apple"),
        text_card("carrot", 1, Right, "Carrot"),
        text_card("banana", 2, Left, "Banana"),
        text_card("broccoli", 3, Right, "Broccoli"),
        text_card("cherry", 4, Left, "Cherry"),
        text_card("spinach", 5, Right, "Spinach"),
      ],
    },
    Exercise {
      id: "seed-true-or-false".into(),
      title: "True or false?".into(),
      instructions: "Swipe left if the statement is true, right if it is false.".into(),
      left_label: "True".into(),
      right_label: "False".into(),
      randomize: false,
      source: ExerciseSource::Seed,
      cards: vec![
        text_card("water-boils", 0, Left, "Water boils at 100 °C at sea level."),
        text_card("sun-planet", 1, Right, "The Sun is a planet."),
        text_card("spider-legs", 2, Left, "Spiders have eight legs."),
      ],
    },
  ]
}
