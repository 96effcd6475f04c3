use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::User;

/// Direction of the name sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// `needle` must already be lowercase.
fn matches(user: &User, needle: &str) -> bool {
    user.name.to_lowercase().contains(needle)
        || user.tech.iter().any(|tag| tag.to_lowercase().contains(needle))
}

/// Users whose name or any tech tag contains `filter` (case-insensitive),
/// sorted by name in `order`.
///
/// Pure and stable: the same inputs always produce the same sequence. An empty
/// filter keeps every user.
pub fn filtered_collection(items: &[User], filter: &str, order: SortOrder) -> Vec<User> {
    let needle = filter.to_lowercase();
    let mut filtered: Vec<User> = items
        .iter()
        .filter(|user| matches(user, &needle))
        .cloned()
        .collect();
    filtered.sort_by(|a, b| order.apply(a.name.cmp(&b.name)));
    filtered
}
