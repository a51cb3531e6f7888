//! Type-safe, efficient identifiers for rail entities.
//!
//! All identifiers use Arc<str> for cheap cloning and minimal memory overhead.

use std::sync::Arc;
use std::fmt;
use std::hash::{Hash, Hasher};

macro_rules! impl_identifier {
    ($name:ident) => {
        #[derive(Clone, Debug)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

impl_identifier!(StationLabel);
impl_identifier!(TrainIdentifier);
impl_identifier!(LineIdentifier);
impl_identifier!(RouteIdentifier);

/// Label used by route files for samples that are not a station.
pub const THROUGH_MARKER: &str = "x";

impl StationLabel {
    /// Parse a route-file label column. The through marker (and an empty
    /// column) yields `None`.
    pub fn from_route_column(column: &str) -> Option<Self> {
        let column = column.trim();
        if column.is_empty() || column == THROUGH_MARKER {
            None
        } else {
            Some(Self::new(column))
        }
    }
}
