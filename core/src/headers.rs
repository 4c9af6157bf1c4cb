//! Case-insensitive, order-preserving header table.
//!
//! # Design
//! One entry per canonical (lowercase) name, storing the original casing as
//! last supplied plus the ordered value list. Iteration order is insertion
//! order; replacing an entry moves it to the end, appending keeps it in
//! place, and `unshift` forces it to the front (HTTP wants the Host header
//! near the top of the block). Lookups are a linear scan; header tables are
//! small and the ordering is part of the contract.

/// One or more values for a single header name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderValues(Vec<String>);

impl HeaderValues {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for HeaderValues {
    fn from(value: &str) -> Self {
        HeaderValues(vec![value.to_string()])
    }
}

impl From<String> for HeaderValues {
    fn from(value: String) -> Self {
        HeaderValues(vec![value])
    }
}

impl From<Vec<String>> for HeaderValues {
    fn from(values: Vec<String>) -> Self {
        HeaderValues(values)
    }
}

impl From<&[&str]> for HeaderValues {
    fn from(values: &[&str]) -> Self {
        HeaderValues(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for HeaderValues {
    fn from(values: [&str; N]) -> Self {
        HeaderValues(values.iter().map(|v| v.to_string()).collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry {
    lower: String,
    name: String,
    values: Vec<String>,
}

/// Ordered multi-value header map with case-insensitive names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<Entry>,
}

const NO_VALUES: &[String] = &[];

impl Headers {
    pub fn new() -> Self {
        Headers {
            entries: Vec::new(),
        }
    }

    fn position(&self, lower: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.lower == lower)
    }

    /// Store `values` under `name`. With `append` set and the name already
    /// present, the new values are concatenated after the existing ones and
    /// the original casing is kept; otherwise any existing entry is replaced
    /// and the casing updates to the supplied name.
    pub fn set(&mut self, name: &str, values: impl Into<HeaderValues>, append: bool) {
        let lower = name.to_ascii_lowercase();
        let values = values.into().into_vec();

        if append {
            if let Some(i) = self.position(&lower) {
                self.entries[i].values.extend(values);
                return;
            }
        }

        if let Some(i) = self.position(&lower) {
            self.entries.remove(i);
        }

        self.entries.push(Entry {
            lower,
            name: name.to_string(),
            values,
        });
    }

    /// Replace any entry for `name` and put it first in iteration order.
    pub fn unshift(&mut self, name: &str, values: impl Into<HeaderValues>) {
        let lower = name.to_ascii_lowercase();
        if let Some(i) = self.position(&lower) {
            self.entries.remove(i);
        }

        self.entries.insert(
            0,
            Entry {
                lower,
                name: name.to_string(),
                values: values.into().into_vec(),
            },
        );
    }

    pub fn has(&self, name: &str) -> bool {
        self.position(&name.to_ascii_lowercase()).is_some()
    }

    /// All values stored under `name`, or an empty slice.
    pub fn get(&self, name: &str) -> &[String] {
        match self.position(&name.to_ascii_lowercase()) {
            Some(i) => &self.entries[i].values,
            None => NO_VALUES,
        }
    }

    /// The values under `name` joined with `", "`.
    pub fn get_line(&self, name: &str) -> String {
        self.get(name).join(", ")
    }

    /// Drop any entry for `name`; absent names are a no-op.
    pub fn remove(&mut self, name: &str) {
        let lower = name.to_ascii_lowercase();
        if let Some(i) = self.position(&lower) {
            self.entries.remove(i);
        }
    }

    /// Entries in iteration order as `(original name, values)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/html", false);
        assert!(headers.has("content-type"));
        assert!(headers.has("CONTENT-TYPE"));
        assert_eq!(headers.get("cOnTeNt-TyPe"), ["text/html"]);
    }

    #[test]
    fn append_concatenates_after_existing_values() {
        let mut headers = Headers::new();
        headers.set("Foo", "Bar", true);
        headers.set("foo", "baZ", true);
        assert_eq!(headers.get("FOO"), ["Bar", "baZ"]);
        // Appending keeps the first-seen casing.
        assert_eq!(headers.iter().next().unwrap().0, "Foo");
    }

    #[test]
    fn replace_updates_casing_and_values() {
        let mut headers = Headers::new();
        headers.set("accept", "text/plain", false);
        headers.set("Accept", ["text/html", "application/json"], false);
        assert_eq!(headers.get("accept"), ["text/html", "application/json"]);
        assert_eq!(headers.iter().next().unwrap().0, "Accept");
    }

    #[test]
    fn replace_moves_entry_to_the_end() {
        let mut headers = Headers::new();
        headers.set("A", "1", false);
        headers.set("B", "2", false);
        headers.set("a", "3", false);
        let order: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(order, ["B", "a"]);
    }

    #[test]
    fn unshift_places_entry_first() {
        let mut headers = Headers::new();
        headers.set("Accept", "*/*", false);
        headers.set("Host", "stale.example", false);
        headers.unshift("Host", "fresh.example");
        let order: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(order, ["Host", "Accept"]);
        assert_eq!(headers.get("host"), ["fresh.example"]);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn get_line_joins_with_comma_space() {
        let mut headers = Headers::new();
        headers.set("Foo", ["Bar", "baZ"], false);
        assert_eq!(headers.get_line("foo"), "Bar, baZ");
        assert_eq!(headers.get_line("missing"), "");
    }

    #[test]
    fn remove_is_a_noop_when_absent() {
        let mut headers = Headers::new();
        headers.set("Foo", "Bar", false);
        headers.remove("nope");
        headers.remove("FOO");
        assert!(headers.is_empty());
    }
}
