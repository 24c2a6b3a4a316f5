use crate::models::{ActionType, Equipment};

/// What the results box under the item field should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Empty query: the results box stays hidden.
    Hidden,
    /// Non-empty query with nothing to offer.
    NoMatches,
    /// Matches in directory order.
    Matches(Vec<Equipment>),
}

impl SearchOutcome {
    pub fn matches(&self) -> &[Equipment] {
        match self {
            SearchOutcome::Matches(items) => items,
            SearchOutcome::Hidden | SearchOutcome::NoMatches => &[],
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, SearchOutcome::Hidden)
    }
}

/// Linear filter over the directory. The primary name is compared
/// case-insensitively; the secondary name is checked against the lowercased
/// query. Return searches only list rows that still have units out.
pub fn search(items: &[Equipment], query: &str, direction: ActionType) -> SearchOutcome {
    if query.is_empty() {
        return SearchOutcome::Hidden;
    }

    let needle = query.to_lowercase();
    let found: Vec<Equipment> = items
        .iter()
        .filter(|item| {
            item.name_en.to_lowercase().contains(&needle)
                || item
                    .name_ar
                    .as_deref()
                    .is_some_and(|name| name.contains(&needle))
        })
        .filter(|item| direction == ActionType::Take || item.is_depleted())
        .cloned()
        .collect();

    if found.is_empty() {
        SearchOutcome::NoMatches
    } else {
        SearchOutcome::Matches(found)
    }
}
