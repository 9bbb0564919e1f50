use std::collections::HashSet;
use std::hash::Hash;
use std::sync::OnceLock;

use regex::Regex;

pub struct Helpers {}

fn non_alphanumeric() -> &'static Regex {
    static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();
    SLUG_REGEX.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug regex is valid"))
}

impl Helpers {
    /// # slugify a display name
    /// lowercase and trim the name, collapse every run of non alphanumeric
    /// characters into a single `-` and strip leading and trailing dashes.
    ///
    /// ## Arguments
    /// * `name` - the display name
    ///
    /// ## Returns
    /// * `String` - the slug, empty when the name has no alphanumeric characters
    pub fn slugify(name: &str) -> String {
        let lowered = name.trim().to_lowercase();
        non_alphanumeric()
            .replace_all(&lowered, "-")
            .trim_matches('-')
            .to_string()
    }

    /// # split a comma separated list
    /// split on `,`, trim every entry and drop the empty ones
    pub fn split_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// # unique values in order
    /// deduplicate while keeping the order in which values were first seen
    pub fn unique_in_order<T: Eq + Hash + Clone>(values: impl IntoIterator<Item = T>) -> Vec<T> {
        let mut seen = HashSet::new();
        values
            .into_iter()
            .filter(|value| seen.insert(value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(Helpers::slugify("  Citroën C3 Rally2 "), "citro-n-c3-rally2");
        assert_eq!(Helpers::slugify("Ford Fiesta -- WRC (2019)"), "ford-fiesta-wrc-2019");
        assert_eq!(Helpers::slugify("Group A8"), "group-a8");
        assert_eq!(Helpers::slugify("---"), "");
    }

    #[test]
    fn split_list_trims_entries() {
        assert_eq!(
            Helpers::split_list("Group A8, Group A7,, "),
            vec!["Group A8".to_string(), "Group A7".to_string()]
        );
        assert!(Helpers::split_list("   ").is_empty());
    }

    #[test]
    fn unique_in_order_keeps_first_occurrence() {
        assert_eq!(Helpers::unique_in_order(vec!["b", "a", "b", "c", "a"]), vec!["b", "a", "c"]);
    }
}
