//! Subsequence-aware prefix search ordering shared by the Background Index
//! and the Merged Index's `workspace/symbol` query.
//!
//! A candidate name matches a query `q` iff `q` is a case-insensitive
//! subsequence of the name. Matches are grouped (exact-prefix, then
//! acronym, then plain subsequence) and each group is ordered by ascending
//! name length, then lexicographically.

/// Where a name matched a query, used only to pick the ordering group; the
/// match itself is always the subsequence test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    ExactPrefix,
    Acronym,
    Subsequence,
}

/// True iff `query` is a case-insensitive subsequence of `name`: every
/// character of `query`, in order, appears somewhere in `name`.
pub fn is_subsequence(query: &str, name: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let mut query_chars = query.chars().flat_map(char::to_lowercase).peekable();
    for c in name.chars().flat_map(char::to_lowercase) {
        if let Some(&next) = query_chars.peek() {
            if c == next {
                query_chars.next();
            }
        } else {
            break;
        }
    }
    query_chars.peek().is_none()
}

/// The uppercase-initial acronym of a camelCase/PascalCase name, e.g.
/// `"getUserName"` -> `"gUN"`, `"UserService"` -> `"US"`.
fn acronym(name: &str) -> String {
    let mut out = String::new();
    let mut prev_lower_or_start = true;
    for (i, c) in name.chars().enumerate() {
        if i == 0 {
            out.push(c);
        } else if c.is_uppercase() && prev_lower_or_start {
            out.push(c);
        }
        prev_lower_or_start = c.is_lowercase();
    }
    out
}

fn match_rank(query: &str, name: &str) -> Option<MatchRank> {
    let lower_name = name.to_lowercase();
    let lower_query = query.to_lowercase();
    if lower_name.starts_with(&lower_query) {
        return Some(MatchRank::ExactPrefix);
    }
    if acronym(name).to_lowercase().starts_with(&lower_query) {
        return Some(MatchRank::Acronym);
    }
    if is_subsequence(query, name) {
        return Some(MatchRank::Subsequence);
    }
    None
}

/// Rank and order `names` (assumed already deduplicated by the caller) by
/// exact-prefix, then acronym, then subsequence match, capping the result
/// at `limit`.
pub fn rank_names(query: &str, names: impl IntoIterator<Item = String>, limit: usize) -> Vec<String> {
    rank_items(query, names.into_iter().collect(), limit, |name| name.as_str())
}

/// Rank and order arbitrary `items` by the same exact-prefix / acronym /
/// subsequence ordering `rank_names` uses, keyed by `name_of(item)`. Unlike
/// `rank_names`, distinct items that share a name (e.g. same-named symbols
/// declared in different files) are kept as separate entries rather than
/// collapsed, so callers that need to map ranked names back to richer
/// records don't have to resolve a name to a single position.
pub fn rank_items<T>(
    query: &str,
    items: Vec<T>,
    limit: usize,
    name_of: impl Fn(&T) -> &str,
) -> Vec<T> {
    let mut matches: Vec<(MatchRank, T)> = items
        .into_iter()
        .filter_map(|item| match_rank(query, name_of(&item)).map(|rank| (rank, item)))
        .collect();
    matches.sort_by(|(rank_a, a), (rank_b, b)| {
        rank_a
            .cmp(rank_b)
            .then(name_of(a).len().cmp(&name_of(b).len()))
            .then(name_of(a).cmp(name_of(b)))
    });
    matches.truncate(limit);
    matches.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsequence_matches_in_order() {
        assert!(is_subsequence("gun", "getUserName"));
        assert!(is_subsequence("GUN", "getUserName"));
        assert!(!is_subsequence("nug", "getUserName"));
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(is_subsequence("", "anything"));
    }

    #[test]
    fn exact_prefix_outranks_subsequence() {
        let ranked = rank_names(
            "use",
            ["fuseBox".to_string(), "userService".to_string()],
            10,
        );
        assert_eq!(ranked, vec!["userService".to_string(), "fuseBox".to_string()]);
    }

    #[test]
    fn acronym_outranks_plain_subsequence() {
        let ranked = rank_names(
            "gun",
            ["aGetUserNameX".to_string(), "getUserName".to_string()],
            10,
        );
        assert_eq!(ranked[0], "getUserName");
    }

    #[test]
    fn group_ordered_by_length_then_lexicographic() {
        let ranked = rank_names(
            "a",
            ["abc".to_string(), "ab".to_string(), "aac".to_string()],
            10,
        );
        assert_eq!(ranked, vec!["ab".to_string(), "aac".to_string(), "abc".to_string()]);
    }

    #[test]
    fn limit_caps_result_count() {
        let ranked = rank_names(
            "a",
            ["a1".to_string(), "a2".to_string(), "a3".to_string()],
            2,
        );
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn non_matching_candidates_are_dropped() {
        let ranked = rank_names("xyz", ["abc".to_string()], 10);
        assert!(ranked.is_empty());
    }
}
