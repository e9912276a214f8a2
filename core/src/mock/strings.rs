//! String and placeholder synthesis.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{SecondsFormat, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;

const WORDS: &[&str] = &[
    "lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
];

/// Returns a value for a known `format`, or `None` for unknown formats.
pub(crate) fn format_value<R: Rng + ?Sized>(format: &str, rng: &mut R) -> Option<String> {
    let value = match format {
        "email" => format!("user{}@example.com", rng.gen_range(0..1000)),
        "date" => Utc::now().format("%Y-%m-%d").to_string(),
        "date-time" => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "uri" | "url" => format!("https://example.com/resource/{}", rng.gen_range(0..1000)),
        "uuid" => uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string(),
        "hostname" => format!("api{}.example.com", rng.gen_range(0..100)),
        "ipv4" => format!(
            "{}.{}.{}.{}",
            rng.gen_range(1..=254),
            rng.gen_range(0..=255),
            rng.gen_range(0..=255),
            rng.gen_range(1..=254)
        ),
        "byte" => STANDARD.encode(pick_word(rng)),
        "password" => "********".to_string(),
        _ => return None,
    };
    Some(value)
}

/// A 1-4 word phrase, adjusted toward `[min_len, max_len]` characters.
pub(crate) fn phrase<R: Rng + ?Sized>(
    rng: &mut R,
    min_len: Option<usize>,
    max_len: Option<usize>,
) -> String {
    let count = rng.gen_range(1..=4);
    let mut text = (0..count)
        .map(|_| pick_word(rng))
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(min) = min_len {
        while text.chars().count() < min {
            text.push(' ');
            text.push_str(pick_word(rng));
        }
    }
    if let Some(max) = max_len {
        if text.chars().count() > max {
            text = text.chars().take(max).collect();
        }
    }
    text
}

fn pick_word<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    WORDS.choose(rng).copied().unwrap_or("lorem")
}

/// Placeholder returned when expanding a schema would recurse into itself.
///
/// The shape is inferred from the referencing property name.
pub(crate) fn cycle_sentinel<R: Rng + ?Sized>(field: Option<&str>, rng: &mut R) -> Value {
    let name = field.unwrap_or_default().to_ascii_lowercase();
    if name.contains("count") {
        Value::from(rng.gen_range(0..=1000))
    } else if name.contains("sql") {
        Value::from("SELECT * FROM table")
    } else {
        Value::from("mock_value")
    }
}
