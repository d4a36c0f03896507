//! Merging the account and repository lists into one ranked list.

use std::cmp::Ordering;

use feruca::{Collator, Locale, Tailoring};

use crate::search::SearchResult;

/// Concatenates accounts then repositories, sorts by name and keeps the first `max` rows.
///
/// The sort is stable, so rows with equal names keep their upstream ranking and
/// accounts stay ahead of repositories.
pub fn merge_results(accounts: &[SearchResult], repositories: &[SearchResult], max: usize) -> Vec<SearchResult> {
    let mut merged: Vec<SearchResult> = accounts.iter().chain(repositories).cloned().collect();
    let mut collator = name_collator();
    merged.sort_by(|a, b| collator.collate(a.name(), b.name()));
    merged.truncate(max);
    merged
}

/// Compares two names in Unicode root collation order.
///
/// Punctuation is not ignored: `_` < `-` < `.` < digits < letters. Accents and
/// case only decide between names that are otherwise equal, lowercase first.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    name_collator().collate(a, b)
}

fn name_collator() -> Collator {
    Collator::new(Tailoring::Cldr(Locale::Root), false, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{RepositoryResult, UserResult};

    fn user(name: &str) -> SearchResult {
        SearchResult::User(UserResult {
            id: format!("user-{name}"),
            name: name.to_string(),
            ..Default::default()
        })
    }

    fn repo(name: &str) -> SearchResult {
        SearchResult::Repository(RepositoryResult {
            id: format!("repo-{name}"),
            name: name.to_string(),
            ..Default::default()
        })
    }

    fn names(rows: &[SearchResult]) -> String {
        rows.iter().map(|r| r.name()).collect::<Vec<_>>().join(", ")
    }

    #[test]
    fn merged_by_name() {
        let merged = merge_results(&[user("johnsmith")], &[repo("cool-lib")], 50);
        insta::assert_snapshot!(names(&merged), @"cool-lib, johnsmith");

        let merged = merge_results(&[user("delta"), user("alpha")], &[repo("charlie"), repo("bravo")], 50);
        insta::assert_snapshot!(names(&merged), @"alpha, bravo, charlie, delta");
    }

    #[test]
    fn case_only_breaks_ties() {
        let merged = merge_results(&[user("Zeta"), user("alpha")], &[repo("Beta"), repo("beta")], 50);
        insta::assert_snapshot!(names(&merged), @"alpha, beta, Beta, Zeta");
    }

    #[test]
    fn punctuation_and_digits_sort_before_letters() {
        assert_eq!(compare_names("a_b", "a1"), Ordering::Less);
        assert_eq!(compare_names("a_b", "a-b"), Ordering::Less);
        assert_eq!(compare_names("a-b", "a.b"), Ordering::Less);
        assert_eq!(compare_names("a.b", "a1"), Ordering::Less);
        assert_eq!(compare_names("a9", "ab"), Ordering::Less);

        let merged = merge_results(
            &[user("a1"), user("ab"), user("a_b")],
            &[repo("a.b"), repo("a-b")],
            50,
        );
        insta::assert_snapshot!(names(&merged), @"a_b, a-b, a.b, a1, ab");
    }

    #[test]
    fn accents_sort_with_their_base_letter() {
        assert_eq!(compare_names("élan", "flan"), Ordering::Less);
        assert_eq!(compare_names("elan", "élan"), Ordering::Less);
        let merged = merge_results(&[user("flan"), user("élan")], &[repo("dune")], 50);
        insta::assert_snapshot!(names(&merged), @"dune, élan, flan");
    }

    #[test]
    fn equal_names_keep_accounts_first() {
        let merged = merge_results(&[user("same")], &[repo("same")], 50);
        assert!(matches!(merged[0], SearchResult::User(_)));
        assert!(matches!(merged[1], SearchResult::Repository(_)));
    }

    #[test]
    fn empty_names_sort_first() {
        let merged = merge_results(&[user("abc")], &[repo("")], 50);
        assert_eq!(merged[0].name(), "");
    }

    #[test]
    fn truncated_to_max() {
        let accounts: Vec<_> = (0..50).map(|i| user(&format!("u{i:02}"))).collect();
        let repos: Vec<_> = (0..50).map(|i| repo(&format!("r{i:02}"))).collect();
        let merged = merge_results(&accounts, &repos, 50);
        assert_eq!(merged.len(), 50);
        assert_eq!(merged[0].name(), "r00");
        assert_eq!(merged[49].name(), "r49");
    }
}
