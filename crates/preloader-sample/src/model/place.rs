use preloader::Resource;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaceId(pub u32);

impl From<u32> for PlaceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for PlaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "place_{}", self.0)
    }
}

/// Where a book is shelved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
}

impl Place {
    pub fn new(id: impl Into<PlaceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Resource for Place {
    type Id = PlaceId;

    fn resource_id(&self) -> PlaceId {
        self.id
    }
}
