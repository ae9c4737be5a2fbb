use super::interface::VoiceCatalogEntry;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Case-insensitive substring match on id, display name and the first
/// description line. An empty query returns the input unchanged.
pub fn filter(entries: &[VoiceCatalogEntry], query: &str) -> Vec<VoiceCatalogEntry> {
    if query.is_empty() {
        return entries.to_vec();
    }
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|v| matches(v, &needle))
        .cloned()
        .collect()
}

fn matches(voice: &VoiceCatalogEntry, needle: &str) -> bool {
    voice.id.to_lowercase().contains(needle)
        || voice.display_name.to_lowercase().contains(needle)
        || voice
            .primary_description()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedNewest,
    CreatedOldest,
    IdAsc,
    IdDesc,
    DescriptionAsc,
    DescriptionDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::CreatedNewest,
        SortKey::CreatedOldest,
        SortKey::IdAsc,
        SortKey::IdDesc,
        SortKey::DescriptionAsc,
        SortKey::DescriptionDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::CreatedNewest => "created-desc",
            SortKey::CreatedOldest => "created-asc",
            SortKey::IdAsc => "id-asc",
            SortKey::IdDesc => "id-desc",
            SortKey::DescriptionAsc => "description-asc",
            SortKey::DescriptionDesc => "description-desc",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| {
                let options: Vec<&str> = SortKey::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown sort key '{}'. Options: {}", s, options.join(", "))
            })
    }
}

/// Stable sort; a missing description sorts as the empty string.
pub fn sort(entries: &[VoiceCatalogEntry], key: SortKey) -> Vec<VoiceCatalogEntry> {
    let mut sorted = entries.to_vec();
    let by_description =
        |a: &VoiceCatalogEntry, b: &VoiceCatalogEntry| -> Ordering {
            a.primary_description()
                .unwrap_or("")
                .cmp(b.primary_description().unwrap_or(""))
        };
    match key {
        SortKey::CreatedNewest => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::CreatedOldest => sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::IdAsc => sorted.sort_by(|a, b| a.id.cmp(&b.id)),
        SortKey::IdDesc => sorted.sort_by(|a, b| b.id.cmp(&a.id)),
        SortKey::DescriptionAsc => sorted.sort_by(by_description),
        SortKey::DescriptionDesc => sorted.sort_by(|a, b| by_description(b, a)),
    }
    sorted
}
