//! Plan display

use colored::{ColoredString, Colorize};
use declarative::{Action, AttributeChange, ExecutionPlan, PlannedChange, Schema};
use serde_json::Value;
use std::collections::BTreeMap;

const REDACTED: &str = "(sensitive value)";

fn symbol(action: Action) -> ColoredString {
    match action {
        Action::Create => "+".green(),
        Action::Update => "~".yellow(),
        Action::Replace => "±".magenta(),
        Action::Delete => "-".red(),
    }
}

/// One-line rendering of an attribute value
pub fn render_value(value: &Value, sensitive: bool) -> String {
    match value {
        Value::Null => "(unset)".to_string(),
        _ if sensitive => REDACTED.to_string(),
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

/// Copy of a record with sensitive attributes masked
pub fn redact(record: &Value, schema: &Schema) -> Value {
    let mut record = record.clone();
    if let Some(fields) = record.as_object_mut() {
        for (name, value) in fields.iter_mut() {
            if schema.is_sensitive(name) && !value.is_null() {
                *value = Value::String(REDACTED.to_string());
            }
        }
    }
    record
}

/// `name: before → after`, with replacement marker
pub fn render_change(action: Action, change: &AttributeChange) -> String {
    let after = render_value(&change.after, change.sensitive);
    let line = match action {
        Action::Create => format!("{} = {after}", change.name),
        _ => format!(
            "{}: {} → {after}",
            change.name,
            render_value(&change.before, change.sensitive)
        ),
    };
    if change.forces_replacement && action == Action::Replace {
        format!("{line} (forces replacement)")
    } else {
        line
    }
}

fn print_change(change: &PlannedChange) {
    println!(
        "│   {} {:<40} {}",
        symbol(change.action),
        change.address.name,
        format!("({})", change.action).dimmed()
    );
    if change.action == Action::Delete {
        return;
    }
    for attribute in &change.diff.changes {
        println!("│       {}", render_change(change.action, attribute).dimmed());
    }
}

/// Display a plan grouped by entity kind
pub fn display_plan(plan: &ExecutionPlan) {
    if plan.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        if plan.unchanged > 0 {
            println!("    {} records up to date", plan.unchanged);
        }
        return;
    }

    let mut by_type: BTreeMap<&str, Vec<&PlannedChange>> = BTreeMap::new();
    for change in &plan.changes {
        by_type
            .entry(change.address.type_name.as_str())
            .or_default()
            .push(change);
    }

    println!();
    println!("┌─ {} ─────────────────────────────────────────┐", "Execution Plan".bold());
    println!("│");

    for (type_name, changes) in &by_type {
        println!("│ {}", type_name.bold());
        for change in changes {
            print_change(change);
        }
        println!("│");
    }

    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Plan: {} to create, {} to update, {} to replace, {} to delete",
        plan.count(Action::Create).to_string().green(),
        plan.count(Action::Update).to_string().yellow(),
        plan.count(Action::Replace).to_string().magenta(),
        plan.count(Action::Delete).to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn change(before: Value, after: Value, sensitive: bool) -> AttributeChange {
        AttributeChange {
            name: "secret".to_string(),
            before,
            after,
            forces_replacement: false,
            sensitive,
        }
    }

    #[test]
    fn test_sensitive_values_redacted() {
        let line = render_change(
            Action::Update,
            &change(json!("old-secret"), json!("new-secret"), true),
        );
        assert_eq!(line, "secret: (sensitive value) → (sensitive value)");
        assert!(!line.contains("new-secret"));
    }

    #[test]
    fn test_unset_shown_even_when_sensitive() {
        let line = render_change(Action::Create, &change(Value::Null, Value::Null, true));
        assert_eq!(line, "secret = (unset)");
    }

    #[test]
    fn test_replacement_marker() {
        let mut attribute = change(json!("a"), json!("b"), false);
        attribute.name = "project".to_string();
        attribute.forces_replacement = true;
        assert_eq!(
            render_change(Action::Replace, &attribute),
            "project: \"a\" → \"b\" (forces replacement)"
        );
    }

    #[test]
    fn test_redact_record() {
        use declarative::{Attribute, AttributeType};

        let schema = Schema::new("token")
            .with_attribute(Attribute::computed("secret", AttributeType::String, "").sensitive())
            .with_attribute(Attribute::optional("token_name", AttributeType::String, ""));
        let redacted = redact(
            &json!({"secret": "default:development.abc", "token_name": "backend"}),
            &schema,
        );
        assert_eq!(
            redacted,
            json!({"secret": "(sensitive value)", "token_name": "backend"})
        );
    }

    #[test]
    fn test_render_structured_values() {
        assert_eq!(render_value(&json!([1, 2]), false), "[1,2]");
        assert_eq!(render_value(&json!(true), false), "true");
    }
}
