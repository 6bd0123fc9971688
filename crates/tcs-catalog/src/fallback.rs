//! Built-in catalog content used when the case library cannot be reached.

use serde_json::json;

use crate::types::{CaseLibraryOption, ComponentTemplate, StepTemplate};

pub fn case_library_options() -> Vec<CaseLibraryOption> {
    vec![
        CaseLibraryOption::new("all", "All historical cases"),
        CaseLibraryOption::new("archived", "Archived curated cases"),
    ]
}

fn palette_entry(
    kind: &str,
    name: &str,
    alias: &str,
    icon: &str,
    description: &str,
) -> ComponentTemplate {
    ComponentTemplate {
        id: Some(format!("comp_{kind}")),
        alias: Some(alias.to_string()),
        icon: Some(icon.to_string()),
        description: description.to_string(),
        ..ComponentTemplate::new(kind, name)
    }
}

pub fn component_presets() -> Vec<ComponentTemplate> {
    vec![
        palette_entry(
            "phone",
            "Phone setup",
            "PhonesAssign",
            "phone",
            "Set calling and called numbers, call area and forwarding",
        ),
        palette_entry(
            "variable",
            "Set variables",
            "TableSetVar",
            "variable",
            "Create variables, set request parameters and seed test data",
        ),
        palette_entry(
            "saveUserInfo",
            "Save user info to variables",
            "SaveUserInfo",
            "save",
            "After creating a user, store its details as environment variables",
        ),
        palette_entry(
            "moveForwardEfftime",
            "Move time forward",
            "MoveForwardEfftime",
            "clock-forward",
            "Move the effective time forward",
        ),
        palette_entry(
            "delayTime",
            "Delay",
            "DelayTime",
            "clock-delay",
            "Wait before the next component runs",
        ),
        palette_entry(
            "database",
            "Database query",
            "DataBaseQuery",
            "database",
            "Query a field of a table",
        ),
        palette_entry(
            "api",
            "Soap request",
            "SoapClient",
            "globe",
            "Send a SOAP request and check the response",
        ),
        palette_entry(
            "comment",
            "Step comment",
            "comment",
            "message-square",
            "Annotate an automated step",
        ),
        palette_entry(
            "restful",
            "Rest request",
            "RestfulClient",
            "send",
            "Send a REST request and check the response",
        ),
        palette_entry("shell", "Shell command", "ShellExec", "terminal", "Run a shell command"),
        palette_entry(
            "task",
            "Trigger task",
            "TaskTrigger",
            "play-circle",
            "Trigger a scheduled task",
        ),
    ]
}

fn preset_step(
    id: &str,
    name: &str,
    description: &str,
    components: Vec<ComponentTemplate>,
) -> StepTemplate {
    StepTemplate {
        id: Some(id.to_string()),
        name: name.to_string(),
        description: description.to_string(),
        components,
    }
}

pub fn step_presets() -> Vec<StepTemplate> {
    vec![
        preset_step(
            "preset_1",
            "Open login page",
            "Open the login page and wait for it to load",
            vec![
                ComponentTemplate::new("api", "Call - fetch login page")
                    .with_params(json!({ "method": "GET", "url": "/login" })),
                ComponentTemplate::new("assert", "Assert - page loaded")
                    .with_params(json!({ "type": "visible", "selector": "#login-form" })),
            ],
        ),
        preset_step(
            "preset_2",
            "Enter user name and password",
            "Fill the login form with user credentials",
            vec![
                ComponentTemplate::new("input", "Input - user name")
                    .with_params(json!({ "selector": "#username", "value": "testuser" })),
                ComponentTemplate::new("input", "Input - password")
                    .with_params(json!({ "selector": "#password", "value": "password123" })),
            ],
        ),
        preset_step(
            "preset_3",
            "Click login",
            "Submit the login form",
            vec![
                ComponentTemplate::new("button", "Button - login")
                    .with_params(json!({ "selector": "#login-btn", "action": "click" })),
            ],
        ),
        preset_step(
            "preset_4",
            "Verify login succeeded",
            "The user is logged in and lands on the dashboard",
            vec![
                ComponentTemplate::new("assert", "Assert - redirect")
                    .with_params(json!({ "type": "url", "expected": "/dashboard" })),
                ComponentTemplate::new("assert", "Assert - welcome text").with_params(
                    json!({ "type": "text", "selector": ".welcome", "contains": "Welcome" }),
                ),
            ],
        ),
        preset_step(
            "preset_11",
            "User account exists",
            "The user account is registered in the system",
            vec![
                ComponentTemplate::new("api", "Call - check user")
                    .with_params(json!({ "method": "GET", "url": "/api/users/check" })),
            ],
        ),
        preset_step(
            "preset_12",
            "Login service available",
            "The login service answers",
            vec![
                ComponentTemplate::new("assert", "Assert - login page reachable")
                    .with_params(json!({ "type": "status", "expected": 200 })),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_options_are_fixed() {
        let values: Vec<String> = case_library_options()
            .into_iter()
            .map(|option| option.value)
            .collect();
        assert_eq!(values, ["all", "archived"]);
    }

    #[test]
    fn palette_ids_follow_kind() {
        let presets = component_presets();
        assert_eq!(presets.len(), 11);
        assert!(presets
            .iter()
            .all(|preset| preset.id.as_deref() == Some(format!("comp_{}", preset.kind).as_str())));
    }
}
