use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Derives a URL-safe slug from a title: lowercase ASCII letters and
/// digits separated by single hyphens.
///
/// ```
/// use devevent::normalization::slugify;
/// assert_eq!(slugify("  Hello World: Next.js & Mongo!  "), "hello-world-next-js-mongo");
/// assert_eq!(slugify("Café Crème"), "cafe-creme");
/// ```
pub fn slugify(title: impl AsRef<str>) -> String {
    use unicode_normalization::UnicodeNormalization;

    let decomposed = title
        .as_ref()
        .trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_diacritic(*c))
        .collect::<String>();

    let mut slug = String::with_capacity(decomposed.len());
    let mut pending_hyphen = false;

    for c in decomposed.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }

            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// The Combining Diacritical Marks block.
fn is_combining_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Trims every entry of a list, returning `None` if the list is empty
/// or any entry is blank.
pub fn trim_entries(entries: Vec<String>) -> Option<Vec<String>> {
    if entries.is_empty() {
        return None;
    }

    entries
        .into_iter()
        .map(|entry| {
            let trimmed = entry.trim();

            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawList {
    Entries(Vec<Value>),
    Text(String),
}

/// Deserializes a list submitted either as a sequence or as a single
/// string. A string is read as a JSON array when it looks like one and
/// as comma-separated entries otherwise; blank comma-separated entries
/// are dropped. Entries are left untrimmed for validation to handle.
pub fn deserialize_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where D: Deserializer<'de> {
    let raw: Option<RawList> = Deserialize::deserialize(deserializer)?;

    Ok(raw.map(|raw| match raw {
        RawList::Entries(entries) => entries.into_iter().map(entry_text).collect(),
        RawList::Text(text) => split_list(&text),
    }))
}

fn split_list(text: &str) -> Vec<String> {
    let text = text.trim();

    if text.starts_with('[') && text.ends_with(']') {
        // an unparseable array counts as no entries at all
        return serde_json::from_str::<Vec<Value>>(text)
            .map(|entries| entries.into_iter().map(entry_text).collect())
            .unwrap_or_default();
    }

    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Strings are taken as they are and `null` as a blank entry; numbers,
/// booleans and anything else become their JSON text.
fn entry_text(entry: Value) -> String {
    match entry {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
