use addrforge_core::OrderedMap;

/// Maps free-text country names to canonical dataset keys.
#[derive(Debug, Clone, Copy)]
pub struct CountryResolver<'a> {
    aliases: &'a OrderedMap<Vec<String>>,
}

impl<'a> CountryResolver<'a> {
    pub fn new(aliases: &'a OrderedMap<Vec<String>>) -> Self {
        Self { aliases }
    }

    /// Returns the first canonical key whose alias list contains the
    /// lowercased, trimmed input, or that normalized input unchanged.
    pub fn resolve(&self, raw: &str) -> String {
        let normalized = raw.trim().to_lowercase();
        self.aliases
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|alias| alias == &normalized))
            .map(|(key, _)| key.to_string())
            .unwrap_or(normalized)
    }

    /// Canonical keys with their aliases, in alias-map order.
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, &'a [String])> {
        self.aliases
            .iter()
            .map(|(key, aliases)| (key, aliases.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases() -> OrderedMap<Vec<String>> {
        let mut map = OrderedMap::new();
        map.insert(
            "usa",
            vec!["usa".to_string(), "us".to_string(), "united states".to_string()],
        );
        map.insert("uk", vec!["uk".to_string(), "united kingdom".to_string()]);
        map
    }

    #[test]
    fn resolves_aliases_case_insensitively() {
        let map = aliases();
        let resolver = CountryResolver::new(&map);
        assert_eq!(resolver.resolve("  United States "), "usa");
        assert_eq!(resolver.resolve("UK"), "uk");
    }

    #[test]
    fn unknown_names_pass_through_normalized() {
        let map = aliases();
        let resolver = CountryResolver::new(&map);
        assert_eq!(resolver.resolve(" Atlantis "), "atlantis");
    }
}
