/// A list of UTF-8 strings, named to match the domain vocabulary used
/// throughout the registry and codec (package id lists, codename lists).
pub type StringList = Vec<String>;

/// Push `item` onto `list` unless an element already compares equal under
/// `key`, so repeated seeding of built-in tables is idempotent instead of
/// accumulating duplicates.
pub fn dedup_push_by_identity<T, K, F>(list: &mut Vec<T>, item: T, key: F)
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let item_key = key(&item);
    if !list.iter().any(|existing| key(existing) == item_key) {
        list.push(item);
    }
}
