//! Client-side search over the cached list.

use crate::models::Recommendation;

/// Keep the rows whose title, author, tags, notes or contributor contain `search`,
/// ignoring case. Order is preserved; an empty search keeps everything.
pub fn filter_recommendations(list: &[Recommendation], search: &str) -> Vec<Recommendation> {
    if search.is_empty() {
        return list.to_vec();
    }

    let needle = search.to_lowercase();
    list.iter()
        .filter(|rec| rec.matches(&needle))
        .cloned()
        .collect()
}
