//! Key column derivation for row correlation

/// Suffixes tried, in order, when no suffixes are configured
pub const DEFAULT_KEY_SUFFIXES: &[&str] = &["_ID", "_CIF", "_CURRENCY_CODE"];

/// Number of leading characters of the first column name used as the key prefix
const KEY_PREFIX_LEN: usize = 3;

/// Derives a table's key column from its column names and candidate suffixes.
///
/// The prefix is the first three characters of the first column name (the whole
/// name if it is shorter). Each suffix is appended in order and the first
/// derived name that is one of `column_names` is the key column.
pub struct KeyBuilder {
    suffixes: Vec<String>,
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_SUFFIXES.iter().map(|s| s.to_string()).collect())
    }
}

impl KeyBuilder {
    pub fn new(suffixes: Vec<String>) -> Self {
        Self { suffixes }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Key prefix taken from the first column name
    pub fn prefix(first_column: &str) -> &str {
        match first_column.char_indices().nth(KEY_PREFIX_LEN) {
            Some((end, _)) => &first_column[..end],
            None => first_column,
        }
    }

    /// Resolve the key column among `column_names`, or `None` when no suffix matches
    pub fn resolve<'a, I>(&self, column_names: I) -> Option<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: Vec<&str> = column_names.into_iter().collect();
        let prefix = Self::prefix(names.first()?);

        self.suffixes
            .iter()
            .map(|suffix| format!("{}{}", prefix, suffix))
            .find(|candidate| names.contains(&candidate.as_str()))
    }
}
