//! Search and ordering parameters shared by the collection endpoints.

/// Lowercased terms from a `search` parameter, split on whitespace and commas.
pub(crate) fn search_terms(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Every term must occur, case-insensitively, in at least one of the fields.
pub(crate) fn matches_terms(terms: &[String], fields: &[&str]) -> bool {
    terms.iter().all(|term| {
        fields
            .iter()
            .any(|field| field.to_lowercase().contains(term.as_str()))
    })
}

/// Sort key requested through an `ordering` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OrderingKey<K> {
    pub(crate) key: K,
    pub(crate) descending: bool,
}

/// Parse `field,-other` into keys; names `resolve` does not know are dropped.
pub(crate) fn ordering_keys<K>(
    raw: Option<&str>,
    resolve: impl Fn(&str) -> Option<K>,
) -> Vec<OrderingKey<K>> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter_map(|term| {
            let (name, descending) = match term.strip_prefix('-') {
                Some(name) => (name, true),
                None => (term, false),
            };
            resolve(name).map(|key| OrderingKey { key, descending })
        })
        .collect()
}
