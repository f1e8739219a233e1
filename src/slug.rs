use uuid::Uuid;

/// URL-safe identifier derived from a display name: lowercase, with every
/// character outside `[a-z0-9]` replaced by `-`.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Path segment that may hold either an id or a slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOrSlug {
    Id(Uuid),
    Slug(String),
}

impl IdOrSlug {
    pub fn parse(key: &str) -> Self {
        match Uuid::parse_str(key) {
            Ok(id) => IdOrSlug::Id(id),
            Err(_) => IdOrSlug::Slug(key.to_string()),
        }
    }
}
