//! schema [type]

use crate::Context;
use crate::provider;
use crate::ui;
use anyhow::{Context as AnyhowContext, Result, bail};
use colored::Colorize;
use declarative::{Attribute, AttributeKind, Schema};

pub fn run(ctx: &Context, type_name: Option<&str>, json: bool) -> Result<()> {
    let registry = provider::offline_registry();

    let Some(type_name) = type_name else {
        ui::header("Resources");
        for resource in registry.resources() {
            println!("  {:<32} {}", resource.type_name(), resource.schema().description.dimmed());
        }
        ui::header("Data sources");
        for source in registry.data_sources() {
            println!("  {:<32} {}", source.type_name(), source.schema().description.dimmed());
        }
        return Ok(());
    };

    let resource = registry.resource(type_name).map(|r| r.schema());
    let source = registry.data_source(type_name).map(|d| d.schema());
    if resource.is_none() && source.is_none() {
        bail!("Unknown type '{type_name}'");
    }

    if json {
        let doc = serde_json::json!({"resource": resource, "data_source": source});
        println!("{}", serde_json::to_string_pretty(&doc).context("Failed to render schema")?);
        return Ok(());
    }

    for (label, schema) in [("resource", resource), ("data source", source)] {
        if let Some(schema) = schema {
            print_schema(ctx, &format!("{type_name} ({label})"), &schema);
        }
    }
    Ok(())
}

fn print_schema(ctx: &Context, title: &str, schema: &Schema) {
    ui::header(title);
    if !ctx.quiet {
        ui::dim(schema.description);
    }
    for attribute in &schema.attributes {
        println!(
            "  {} {:<18} {:<14} {}",
            format!("{:<24}", attribute.name).bold(),
            attribute.attr_type.label(),
            tags(attribute),
            attribute.description.dimmed()
        );
    }
}

/// Classification and flags, e.g. `OC,S,F`
pub fn tags(attribute: &Attribute) -> String {
    let mut tags = vec![match attribute.kind {
        AttributeKind::Required => "R",
        AttributeKind::Optional => "O",
        AttributeKind::OptionalComputed => "OC",
        AttributeKind::Computed => "C",
    }];
    if attribute.sensitive {
        tags.push("S");
    }
    if attribute.replace_on_change {
        tags.push("F");
    }
    tags.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::AttributeType;

    #[test]
    fn test_tags() {
        let attribute =
            Attribute::optional_computed("environment", AttributeType::String, "").replace_on_change();
        assert_eq!(tags(&attribute), "OC,F");
        let attribute = Attribute::computed("secret", AttributeType::String, "").sensitive();
        assert_eq!(tags(&attribute), "C,S");
    }

    #[test]
    fn test_every_kind_has_attributes() {
        let registry = provider::offline_registry();
        for resource in registry.resources() {
            assert!(!resource.schema().attributes.is_empty(), "{}", resource.type_name());
        }
    }
}
