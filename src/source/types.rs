use serde::{Deserialize, Deserializer};

/// One page of the repository listing API
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page {
    /// Total number of repositories reported by the server (informational)
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: i64,

    /// Absolute URL of the following page; `None` or empty on the last page
    #[serde(default)]
    pub next: Option<String>,

    #[serde(default)]
    pub previous: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Record>,
}

impl Page {
    /// The pagination cursor, taken verbatim; `None` marks the terminal page
    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref().filter(|next| !next.is_empty())
    }
}

/// Metadata of a single image repository
///
/// Missing and `null` attributes decode to their zero value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(deserialize_with = "null_as_default")]
    pub user: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub namespace: String,
    #[serde(deserialize_with = "null_as_default")]
    pub repository_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_private: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_automated: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub can_edit: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub star_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub pull_count: i64,
    /// Passed through verbatim, never parsed
    #[serde(deserialize_with = "null_as_default")]
    pub last_updated: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_migrated: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
