use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tcs_catalog::Catalog;
use tcs_model::{CaseDocument, Leaf, ValidationRule};
use tcs_schema::{FieldKind, ParamForm};
use tcs_vars::VariableSymbol;

use crate::types::ExportResult;

pub fn print_export(result: &ExportResult) {
    println!("Output: {}", result.output.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Case"),
        header_cell("Name"),
        header_cell("Steps"),
        header_cell("Components"),
        header_cell("Variables"),
    ]);
    apply_table_style(&mut table);
    for column in 2..5 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    let mut total_steps = 0usize;
    let mut total_components = 0usize;
    for case in &result.cases {
        total_steps += case.steps;
        total_components += case.components;
        table.add_row(vec![
            Cell::new(&case.id).fg(Color::Green),
            Cell::new(&case.name),
            Cell::new(case.steps),
            Cell::new(case.components),
            count_cell(case.variables),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} cases", result.cases.len())).add_attribute(Attribute::Bold),
        Cell::new(total_steps).add_attribute(Attribute::Bold),
        Cell::new(total_components).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
}

pub fn print_variables(case: &CaseDocument, symbols: &[&VariableSymbol]) {
    println!("Case: {} ({})", case.name, case.id);
    if symbols.is_empty() {
        println!("No variables.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Variable"), header_cell("Source")]);
    apply_table_style(&mut table);
    for symbol in symbols {
        table.add_row(vec![
            Cell::new(format!("${{{}}}", symbol.name)).fg(Color::Green),
            description_cell(&symbol.description),
        ]);
    }
    println!("{table}");
}

pub fn print_form(form: &ParamForm, show_all: bool) {
    println!("Component kind: {}", form.kind());
    if form.fields().is_empty() {
        println!("No configurable fields.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Value"),
        header_cell("Validation"),
        header_cell("Save as"),
    ]);
    apply_table_style(&mut table);
    for field in form.fields() {
        let label = if field.required {
            format!("{} *", field.name)
        } else {
            field.name.clone()
        };
        match &field.kind {
            FieldKind::JsonTree { .. } => {
                table.add_row(vec![
                    Cell::new(&label).add_attribute(Attribute::Bold),
                    dim_cell(field.kind.as_str()),
                    dim_cell(""),
                    dim_cell(""),
                    dim_cell(""),
                ]);
                for (path, leaf) in form.visible_leaves(&field.name, show_all).unwrap_or_default() {
                    table.add_row(leaf_row(format!("  {path}"), leaf));
                }
            }
            FieldKind::VariableList => {
                let rows = form.variables(&field.name).unwrap_or_default();
                table.add_row(vec![
                    Cell::new(&label),
                    dim_cell(field.kind.as_str()),
                    count_cell(rows.len()),
                    dim_cell(""),
                    dim_cell(""),
                ]);
                for row in rows {
                    table.add_row(vec![
                        Cell::new(format!("  {}", row.name)),
                        dim_cell(&row.description),
                        Cell::new(&row.value),
                        dim_cell(""),
                        dim_cell(""),
                    ]);
                }
            }
            _ => {
                let value = form
                    .tree()
                    .leaf(&field.name)
                    .map(|leaf| leaf.value.to_string())
                    .unwrap_or_default();
                table.add_row(vec![
                    Cell::new(&label),
                    dim_cell(field.kind.as_str()),
                    Cell::new(value),
                    dim_cell(""),
                    dim_cell(""),
                ]);
            }
        }
    }
    println!("{table}");
    let missing = form.missing_required();
    if !missing.is_empty() {
        println!("Missing required fields: {}", missing.join(", "));
    }
}

pub fn print_cases(cases: &[CaseDocument]) {
    if cases.is_empty() {
        println!("No matching cases.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Case"),
        header_cell("Name"),
        header_cell("Steps"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for case in cases {
        table.add_row(vec![
            Cell::new(case.id.as_str()).fg(Color::Green),
            Cell::new(&case.name),
            Cell::new(case.step_count()),
        ]);
    }
    println!("{table}");
}

pub fn print_catalog(catalog: &Catalog) {
    let mut libraries = Table::new();
    libraries.set_header(vec![header_cell("Library"), header_cell("Label")]);
    apply_table_style(&mut libraries);
    for option in catalog.library_options() {
        libraries.add_row(vec![Cell::new(&option.value), Cell::new(&option.label)]);
    }
    println!("{libraries}");

    let mut steps = Table::new();
    steps.set_header(vec![
        header_cell("Step preset"),
        header_cell("Description"),
        header_cell("Components"),
    ]);
    apply_table_style(&mut steps);
    align_column(&mut steps, 2, CellAlignment::Right);
    for step in catalog.step_presets() {
        steps.add_row(vec![
            Cell::new(&step.name),
            description_cell(&step.description),
            Cell::new(step.components.len()),
        ]);
    }
    println!("{steps}");

    let mut components = Table::new();
    components.set_header(vec![
        header_cell("Component"),
        header_cell("Type"),
        header_cell("Schema"),
    ]);
    apply_table_style(&mut components);
    align_column(&mut components, 2, CellAlignment::Center);
    for component in catalog.component_presets() {
        let has_schema = catalog.schemas().fields(&component.kind).is_some();
        components.add_row(vec![
            Cell::new(&component.name),
            Cell::new(&component.kind).fg(Color::Green),
            if has_schema {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("-")
            },
        ]);
    }
    println!("{components}");
    if !catalog.schemas_loaded() {
        println!("Parameter schemas unavailable; components have no configurable fields.");
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn leaf_row(label: String, leaf: &Leaf) -> Vec<Cell> {
    let value = if leaf.is_default && leaf.value.is_empty() {
        dim_cell("(default)")
    } else {
        Cell::new(leaf.value.to_string())
    };
    vec![
        Cell::new(label),
        dim_cell(leaf.leaf_type.as_str()),
        value,
        validation_cell(leaf.validation),
        match leaf.save_as() {
            Some(name) => Cell::new(name).fg(Color::Green),
            None => dim_cell(""),
        },
    ]
}

fn validation_cell(rule: ValidationRule) -> Cell {
    if rule == ValidationRule::default() {
        dim_cell(rule.label())
    } else {
        Cell::new(rule.label()).fg(Color::Yellow)
    }
}

fn count_cell(count: usize) -> Cell {
    if count == 0 {
        dim_cell("0")
    } else {
        Cell::new(count)
    }
}

fn description_cell(description: &str) -> Cell {
    if description.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(description)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}
