use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Produces method names that never collide with other methods in
/// the same client.
///
/// Two methods only collide when their whole call text, the name and
/// the rendered argument list, is the same. Methods that share a name
/// but take different arguments keep their names.
#[derive(Debug, Default)]
pub struct UniqueCallSpace(BTreeMap<String, usize>);

impl UniqueCallSpace {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a unique method name for a call with the given
    /// argument list. On a collision, the name gets a numeric suffix
    /// one greater than the number of earlier identical calls, or the
    /// next free suffix if that call is already taken.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oas_to_k6_clients::codegen::UniqueCallSpace;
    /// # let mut space = UniqueCallSpace::new();
    /// assert_eq!(space.uniquify("count", "params = undefined"), "count");
    /// assert_eq!(space.uniquify("count", "params = undefined"), "count2");
    /// assert_eq!(space.uniquify("count", "id, params = undefined"), "count");
    /// ```
    pub fn uniquify<'a>(&mut self, name: &'a str, args: &str) -> Cow<'a, str> {
        let call = format!("{name}({args})");
        let mut count = match self.0.entry(call.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                entry.insert(1);
                return name.into();
            }
        };
        // Skip suffixes that another method already uses.
        let renamed = loop {
            count += 1;
            let renamed = format!("{name}{count}");
            if let Entry::Vacant(entry) = self.0.entry(format!("{renamed}({args})")) {
                entry.insert(1);
                break renamed;
            }
        };
        self.0.insert(call, count);
        renamed.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_duplicate_gets_two() {
        let mut space = UniqueCallSpace::new();
        assert_eq!(space.uniquify("count", "params = undefined"), "count");
        assert_eq!(space.uniquify("count", "params = undefined"), "count2");
        assert_eq!(space.uniquify("count", "params = undefined"), "count3");
    }

    #[test]
    fn test_different_arguments_dont_collide() {
        let mut space = UniqueCallSpace::new();
        assert_eq!(space.uniquify("get", "params = undefined"), "get");
        assert_eq!(space.uniquify("get", "id, params = undefined"), "get");
        assert_eq!(space.uniquify("get", "id, params = undefined"), "get2");
    }

    #[test]
    fn test_renamed_call_is_recorded() {
        let mut space = UniqueCallSpace::new();
        assert_eq!(space.uniquify("count", "params = undefined"), "count");
        assert_eq!(space.uniquify("count", "params = undefined"), "count2");
        assert_eq!(space.uniquify("count2", "params = undefined"), "count22");
    }

    #[test]
    fn test_suffix_skips_existing_call() {
        let mut space = UniqueCallSpace::new();
        assert_eq!(space.uniquify("count2", "params = undefined"), "count2");
        assert_eq!(space.uniquify("count", "params = undefined"), "count");
        assert_eq!(space.uniquify("count", "params = undefined"), "count3");
        assert_eq!(space.uniquify("count", "params = undefined"), "count4");
        assert_eq!(space.uniquify("count3", "params = undefined"), "count32");
    }

    #[test]
    fn test_case_sensitive() {
        let mut space = UniqueCallSpace::new();
        assert_eq!(space.uniquify("getBeer", "params = undefined"), "getBeer");
        assert_eq!(space.uniquify("getbeer", "params = undefined"), "getbeer");
    }
}
