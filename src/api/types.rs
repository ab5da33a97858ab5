// Content API response types.
// Defines structs for deserializing the remote content API's JSON responses.

use serde::{Deserialize, Deserializer, Serialize};

/// Content category discriminator.
///
/// The backend assigns exactly one of these to every item; the value doubles
/// as the `type` query parameter and as the cache key suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Letter,
    Number,
    Animal,
    Fruit,
    Flower,
    Vegetable,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Bird,
    Insect,
}

impl Category {
    /// All categories, in menu display order.
    pub const ALL: [Category; 12] = [
        Category::Letter,
        Category::Number,
        Category::Animal,
        Category::Fruit,
        Category::Flower,
        Category::Vegetable,
        Category::Addition,
        Category::Subtraction,
        Category::Multiplication,
        Category::Division,
        Category::Bird,
        Category::Insect,
    ];

    /// The wire/query-parameter form of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Letter => "letter",
            Category::Number => "number",
            Category::Animal => "animal",
            Category::Fruit => "fruit",
            Category::Flower => "flower",
            Category::Vegetable => "vegetable",
            Category::Addition => "addition",
            Category::Subtraction => "subtraction",
            Category::Multiplication => "multiplication",
            Category::Division => "division",
            Category::Bird => "bird",
            Category::Insect => "insect",
        }
    }

    /// Whether items of this category carry quiz fields
    /// (`question`/`options`/`correct_answer`).
    pub fn is_quiz(&self) -> bool {
        matches!(
            self,
            Category::Addition
                | Category::Subtraction
                | Category::Multiplication
                | Category::Division
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric or textual value attached to countable items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemValue {
    Number(i64),
    Text(String),
}

/// A single piece of learning content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub title: String,
    /// Inline pictograph or a remote image reference.
    pub image_url: String,
    #[serde(default)]
    pub sound_url: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub value: Option<ItemValue>,
    #[serde(default)]
    pub value_name: Option<String>,
}

impl ContentItem {
    /// Whether this item is a quiz question.
    pub fn is_quiz(&self) -> bool {
        self.question.is_some() && self.correct_answer.is_some()
    }
}

/// Response wrapper for the content listing endpoint.
///
/// A missing or malformed `content` field deserializes to an empty list so a
/// sloppy backend response degrades to "no items" instead of an error.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponse {
    #[serde(default, deserialize_with = "content_or_empty")]
    pub content: Vec<ContentItem>,
}

fn content_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<ContentItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
