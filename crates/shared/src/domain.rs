use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Origin of a transcript message. Only affects presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub variant: Variant,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            variant: Variant::User,
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            variant: Variant::Bot,
        }
    }

    pub fn is_user(&self) -> bool {
        self.variant == Variant::User
    }

    pub fn is_bot(&self) -> bool {
        self.variant == Variant::Bot
    }
}

pub const MAX_RATING: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub poster: Option<String>,
    #[serde(default, deserialize_with = "bounded_rating")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
}

impl Movie {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            poster: None,
            rating: None,
            overview: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YearRepr {
    Number(i64),
    Float(f64),
    Text(String),
}

// The backend slices release dates to four characters, so the year arrives as
// "2015", "" or occasionally a bare number.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<YearRepr>::deserialize(deserializer)?;
    Ok(match raw {
        Some(YearRepr::Number(n)) => i32::try_from(n).ok(),
        Some(YearRepr::Float(n)) if n.fract() == 0.0 => Some(n as i32),
        Some(YearRepr::Float(_)) => None,
        Some(YearRepr::Text(text)) => text.trim().parse::<i32>().ok(),
        None => None,
    })
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

fn bounded_rating<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f32>::deserialize(deserializer)?;
    Ok(raw.filter(|rating| rating.is_finite() && (0.0..=MAX_RATING).contains(rating)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_movie_with_string_year() {
        let movie: Movie = serde_json::from_str(
            r#"{"title":"Arrival","year":"2016","rating":7.6,"overview":"Linguist","poster":"https://img/a.jpg"}"#,
        )
        .expect("movie");
        assert_eq!(movie.year, Some(2016));
        assert_eq!(movie.rating, Some(7.6));
        assert_eq!(movie.poster.as_deref(), Some("https://img/a.jpg"));
        assert_eq!(movie.overview.as_deref(), Some("Linguist"));
    }

    #[test]
    fn empty_year_and_poster_decode_to_none() {
        let movie: Movie =
            serde_json::from_str(r#"{"title":"Untitled","year":"","poster":""}"#).expect("movie");
        assert_eq!(movie.year, None);
        assert_eq!(movie.poster, None);
        assert_eq!(movie.rating, None);
    }

    #[test]
    fn numeric_year_and_missing_fields_are_accepted() {
        let movie: Movie = serde_json::from_str(r#"{"title":"Heat","year":1995}"#).expect("movie");
        assert_eq!(movie.year, Some(1995));
        assert_eq!(movie.overview, None);
    }

    #[test]
    fn out_of_range_rating_is_dropped() {
        let movie: Movie =
            serde_json::from_str(r#"{"title":"Overrated","rating":11.5}"#).expect("movie");
        assert_eq!(movie.rating, None);

        let movie: Movie =
            serde_json::from_str(r#"{"title":"Underrated","rating":-1}"#).expect("movie");
        assert_eq!(movie.rating, None);
    }

    #[test]
    fn message_constructors_tag_variant() {
        assert!(Message::user("hi").is_user());
        assert!(Message::bot("hello").is_bot());
        assert_eq!(
            serde_json::to_string(&Message::bot("x")).expect("json"),
            r#"{"content":"x","variant":"bot"}"#
        );
    }
}
