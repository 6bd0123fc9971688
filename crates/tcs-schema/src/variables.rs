//! Text encoding of variable-list fields.
//!
//! Values are stored as `Name=Value;Name2=Value2`, descriptions in a sibling
//! leaf as `Name:Description;...`.

/// Prefix every user-defined variable name carries.
pub const VARIABLE_PREFIX: &str = "My_";
/// Sibling leaf holding the descriptions of a variable-list field.
pub const DEFAULT_DESCRIPTIONS_FIELD: &str = "varDescriptions";

/// One row of a variable-list field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariableEntry {
    pub name: String,
    pub value: String,
    pub description: String,
}

impl VariableEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// `name` trimmed, with the variable prefix added when missing.
pub fn canonical_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() || name.starts_with(VARIABLE_PREFIX) {
        name.to_string()
    } else {
        format!("{VARIABLE_PREFIX}{name}")
    }
}

/// Splits `Name=Value;...` into trimmed pairs. A pair without `=` has an
/// empty value; blank pairs are skipped.
pub fn parse_assignments(text: &str) -> Vec<(String, String)> {
    split_pairs(text, '=')
}

fn split_pairs(text: &str, separator: char) -> Vec<(String, String)> {
    text.split(';')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| match pair.split_once(separator) {
            Some((name, rest)) => (name.trim().to_string(), rest.trim().to_string()),
            None => (pair.trim().to_string(), String::new()),
        })
        .collect()
}

/// Rows of a variable-list field, each with the first description entry
/// written for its name, with or without the variable prefix.
pub fn entries(vars: &str, descriptions: &str) -> Vec<VariableEntry> {
    let described: Vec<&str> = descriptions
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();
    parse_assignments(vars)
        .into_iter()
        .map(|(name, value)| {
            let canonical = canonical_name(&name);
            VariableEntry {
                description: described
                    .iter()
                    .find_map(|entry| {
                        description_for(entry, &name)
                            .or_else(|| description_for(entry, &canonical))
                    })
                    .unwrap_or_default(),
                name,
                value,
            }
        })
        .collect()
}

/// Names may themselves contain `:`, so entries are matched by prefix.
fn description_for(entry: &str, name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let description = entry.strip_prefix(name)?.trim_start().strip_prefix(':')?.trim();
    (!description.is_empty()).then(|| description.to_string())
}

/// Encodes rows as `(vars, descriptions)` text. Names get the variable
/// prefix; rows with an empty name or value are dropped.
pub fn encode(rows: &[VariableEntry]) -> (String, String) {
    let mut vars = Vec::new();
    let mut descriptions = Vec::new();
    for row in rows {
        let name = canonical_name(&row.name);
        let value = row.value.trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        vars.push(format!("{name}={value}"));
        let description = row.description.trim();
        if !description.is_empty() {
            descriptions.push(format!("{name}:{description}"));
        }
    }
    (vars.join(";"), descriptions.join(";"))
}

/// Re-encodes stored text in canonical form.
pub fn normalize(vars: &str, descriptions: &str) -> (String, String) {
    encode(&entries(vars, descriptions))
}
