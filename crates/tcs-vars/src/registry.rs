//! Symbol table of the variables a case defines.

use serde::Serialize;
use tracing::debug;

use tcs_model::{CaseDocument, ComponentNode, Path};
use tcs_schema::SaveAsChange;
use tcs_schema::variables::{self, DEFAULT_DESCRIPTIONS_FIELD};

/// Component kind whose `vars` list defines variables directly.
pub const VARIABLE_COMPONENT_KIND: &str = "variable";
/// Variable-list leaf of a variable component.
pub const VARS_FIELD: &str = "vars";

/// Which family of service a component calls, for symbol descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResponderStyle {
    Soap,
    Rest,
    Generic,
}

impl ResponderStyle {
    pub fn classify(kind: &str, display_name: &str) -> Self {
        if kind == "api" || display_name.to_ascii_uppercase().contains("SOAP") {
            ResponderStyle::Soap
        } else if kind == "restful" || display_name.to_ascii_uppercase().contains("REST") {
            ResponderStyle::Rest
        } else {
            ResponderStyle::Generic
        }
    }

    pub fn of(component: &ComponentNode) -> Self {
        Self::classify(&component.kind, &component.display_name)
    }

    pub fn label(self) -> &'static str {
        match self {
            ResponderStyle::Soap => "SOAP",
            ResponderStyle::Rest => "REST",
            ResponderStyle::Generic => "API",
        }
    }
}

/// A variable name and where it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableSymbol {
    pub name: String,
    pub description: String,
}

impl VariableSymbol {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Where a `saveAs` leaf lives, enough to describe its symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingContext {
    pub style: ResponderStyle,
    /// Leaf path inside the response tree, e.g. `data.subscriberId`.
    pub field_key: String,
}

impl BindingContext {
    pub fn new(style: ResponderStyle, field_key: impl Into<String>) -> Self {
        Self {
            style,
            field_key: field_key.into(),
        }
    }

    /// Context of the leaf at `path` in `component`'s parameters. The first
    /// segment names the response field and is left out of the key.
    pub fn for_leaf(component: &ComponentNode, path: &Path) -> Self {
        let field_key = match path.segments() {
            [only] => only.clone(),
            [_, rest @ ..] => rest.join("."),
            [] => String::new(),
        };
        Self::new(ResponderStyle::of(component), field_key)
    }

    pub fn describe(&self) -> String {
        format!("{} response field {}", self.style.label(), self.field_key)
    }
}

/// Variables defined by `case`, in traversal order, first occurrence wins.
///
/// Sections are walked preconditions, steps, expected results. Within a
/// component, `vars` entries of variable components come first, then
/// `saveAs` leaves depth-first.
pub fn rescan(case: &CaseDocument) -> Vec<VariableSymbol> {
    let mut symbols: Vec<VariableSymbol> = Vec::new();
    let mut push = |symbol: VariableSymbol| {
        if !symbols.iter().any(|known| known.name == symbol.name) {
            symbols.push(symbol);
        }
    };
    for (_, component) in case.components() {
        if component.kind == VARIABLE_COMPONENT_KIND {
            for row in declared_variables(component) {
                if !row.name.is_empty() {
                    push(VariableSymbol::new(row.name, row.description));
                }
            }
        }
        for (path, leaf) in component.parameters.leaves() {
            if let Some(name) = leaf.save_as() {
                push(VariableSymbol::new(
                    name,
                    BindingContext::for_leaf(component, &path).describe(),
                ));
            }
        }
    }
    symbols
}

fn declared_variables(component: &ComponentNode) -> Vec<variables::VariableEntry> {
    let text = |key: &str| {
        component
            .parameters
            .leaf(key)
            .map(|leaf| leaf.value.as_text().into_owned())
            .unwrap_or_default()
    };
    variables::entries(&text(VARS_FIELD), &text(DEFAULT_DESCRIPTIONS_FIELD))
}

/// Derived cache of [`rescan`], kept current by the edit session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableRegistry {
    symbols: Vec<VariableSymbol>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan(case: &CaseDocument) -> Self {
        let mut registry = Self::new();
        registry.rescan(case);
        registry
    }

    /// Rebuilds the table from scratch. Needed after any structural change.
    pub fn rescan(&mut self, case: &CaseDocument) {
        self.symbols = rescan(case);
        debug!(case = %case.id, symbols = self.symbols.len(), "rescanned variables");
    }

    pub fn symbols(&self) -> &[VariableSymbol] {
        &self.symbols
    }

    pub fn get(&self, name: &str) -> Option<&VariableSymbol> {
        self.symbols.iter().find(|symbol| symbol.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Symbols whose name contains `prefix`, ignoring case, in table order.
    pub fn lookup(&self, prefix: &str) -> Vec<&VariableSymbol> {
        let needle = prefix.to_lowercase();
        self.symbols
            .iter()
            .filter(|symbol| symbol.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Applies an in-place `saveAs` edit without walking the case. Returns
    /// whether the table changed.
    ///
    /// The old name is dropped even if another leaf still binds it; callers
    /// that cannot rule that out rescan instead.
    pub fn sync_rename(
        &mut self,
        old: Option<&str>,
        new: Option<&str>,
        context: &BindingContext,
    ) -> bool {
        let old = old.map(str::trim).filter(|name| !name.is_empty());
        let new = new.map(str::trim).filter(|name| !name.is_empty());
        if old == new {
            return false;
        }
        let mut changed = false;
        if let Some(old) = old {
            let before = self.symbols.len();
            self.symbols.retain(|symbol| symbol.name != old);
            changed |= self.symbols.len() != before;
        }
        if let Some(new) = new
            && !self.contains(new)
        {
            self.symbols
                .push(VariableSymbol::new(new, context.describe()));
            changed = true;
        }
        debug!(?old, ?new, changed, "synced renamed binding");
        changed
    }

    /// [`sync_rename`](Self::sync_rename) for a form edit.
    pub fn apply(&mut self, change: &SaveAsChange, style: ResponderStyle) -> bool {
        self.sync_rename(
            change.old.as_deref(),
            change.new.as_deref(),
            &BindingContext::new(style, change.field_key.clone()),
        )
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
