//! Parses the completion-fd input format (spec §6): one completion per
//! line, an in-line separator byte splitting completion text from
//! description; completions sharing a description are merged into one
//! line with an item-separator byte between items.

/// A run of completions that share one description, as read from a single
/// input line.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CompletionGroup {
    pub items: Vec<String>,
    pub description: String,
}

/// Parses `input` (already split from its backing fd) into groups.
/// `desc_sep` separates the item run from the description on each line;
/// `item_sep` separates multiple items sharing a description.
pub fn parse_completions(input: &str, item_sep: char, desc_sep: char) -> Vec<CompletionGroup> {
    input
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (items_part, description) = match line.split_once(desc_sep) {
                Some((items, desc)) => (items, desc.to_owned()),
                None => (line, String::new()),
            };
            let items = items_part.split(item_sep).map(str::to_owned).collect();
            CompletionGroup { items, description }
        })
        .collect()
}

/// Flattens groups into the plain ranked completion-text list a column
/// layout is computed over.
pub fn flatten(groups: &[CompletionGroup]) -> Vec<&str> {
    groups.iter().flat_map(|g| g.items.iter().map(String::as_str)).collect()
}
