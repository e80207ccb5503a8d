use std::{borrow::Borrow, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a node within a single template document.
///
/// Ids are only unique inside the document that owns them. Two instances of
/// the same template start out with identical ids and are only made disjoint
/// by the instantiator.
#[derive(Debug, PartialEq, Eq, Hash, Clone, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableId(Arc<str>);

impl StableId {
    #[inline]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh id that will not collide with any other generated id.
    pub fn generate() -> Self {
        Self(Arc::from(Uuid::new_v4().simple().to_string()))
    }

    /// The empty id, used by documents that were authored without ids.
    pub fn none() -> Self {
        Self(Arc::from(""))
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StableId {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, writer: &mut fmt::Formatter<'_>) -> fmt::Result {
        writer.write_str(&self.0)
    }
}

impl From<&str> for StableId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StableId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for StableId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
