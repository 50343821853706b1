//! Model listing types decoded from the embedded page payload.

use serde::{Deserialize, Deserializer};

/// One downloadable file attached to a model listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileDescriptor {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    /// Folder within the listing; empty for top-level files.
    #[serde(default)]
    pub folder: String,
}

/// A model listing: its id and the ordered file list from the page payload.
/// Immutable once extracted.
#[derive(Debug, Clone)]
pub struct Model {
    pub id: String,
    pub files: Vec<FileDescriptor>,
}

/// GraphQL IDs arrive as either JSON strings or numbers; store both as text.
pub(crate) fn id_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }

    Ok(match Raw::deserialize(de)? {
        Raw::Num(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}
