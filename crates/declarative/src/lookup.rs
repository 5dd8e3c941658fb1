//! List-then-find lookups
//!
//! Used where the remote API only offers a "list all" endpoint for a kind.
//! The scan is linear and the first match wins. Keys (names, emails) are
//! assumed unique within their scope but nothing remote enforces that, so a
//! duplicate is logged rather than rejected.

/// Find the first element matching `predicate`
pub fn find_by_key<T, I, P>(collection: I, key: &str, predicate: P) -> Option<T>
where
    I: IntoIterator<Item = T>,
    P: Fn(&T) -> bool,
{
    let mut matches = collection.into_iter().filter(|item| predicate(item));
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        log::warn!("Lookup for '{key}' matched {} entries, using the first", extra + 1);
    }
    Some(first)
}

/// Search tiers in order and return the first match
///
/// Each tier is searched with [`find_by_key`]; later tiers are only
/// consulted when earlier ones have no match.
pub fn find_in_tiers<'a, T, P>(tiers: &[&'a [T]], key: &str, predicate: P) -> Option<&'a T>
where
    P: Fn(&T) -> bool,
{
    tiers.iter().find_map(|tier| {
        let tier: &'a [T] = tier;
        find_by_key(tier.iter(), key, |item| predicate(item))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_key_first_wins() {
        let items = vec![("a", 1), ("b", 2), ("a", 3)];
        let found = find_by_key(items, "a", |(name, _)| *name == "a");
        assert_eq!(found, Some(("a", 1)));
    }

    #[test]
    fn test_find_by_key_none() {
        let items: Vec<&str> = vec!["x", "y"];
        assert_eq!(find_by_key(items, "z", |s| *s == "z"), None);
    }

    #[test]
    fn test_find_in_tiers_order() {
        let root = ["ADMIN"];
        let project = ["CREATE_FEATURE", "ADMIN"];
        let found = find_in_tiers(&[&root[..], &project[..]], "ADMIN", |p| *p == "ADMIN");
        assert!(std::ptr::eq(found.unwrap(), &root[0]));

        let found = find_in_tiers(&[&root[..], &project[..]], "CREATE_FEATURE", |p| {
            *p == "CREATE_FEATURE"
        });
        assert_eq!(found, Some(&"CREATE_FEATURE"));
    }
}
