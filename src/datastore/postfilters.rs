//! Ways to filter microposts based on their fields. Filter semantics work just like SQL:
//! If a field is unset, its filter won't be applied.
//! If set, filter out microposts that don't match the filter.
use uuid::Uuid;

/// Filters that can be applied to micropost queries on the datastore.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PostFilters {
    /// Only microposts written by one of these users. An empty list matches nothing.
    pub user_ids: Option<Vec<Uuid>>,
    /// Maximum number of microposts to let match the filter. Ignored when counting.
    pub limit: u32,
    /// How many of the newest matches to skip. Ignored when counting.
    pub offset: u32,
}

impl Default for PostFilters {
    fn default() -> Self {
        Self {
            user_ids: None,
            limit: 30,
            offset: 0,
        }
    }
}

impl PostFilters {
    pub fn by_user(user_id: Uuid) -> Self {
        Self {
            user_ids: Some(vec![user_id]),
            ..Default::default()
        }
    }
}
