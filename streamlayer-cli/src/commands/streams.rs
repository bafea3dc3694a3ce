//! Registry inspection command.

use streamlayer::stream::{PrefixEntry, StreamResolver};

use crate::error::CliError;

/// Print the registered namespaces and their prefix chains.
pub fn run(resolver: &StreamResolver, json: bool) -> Result<(), CliError> {
    let registry = resolver.registry();
    let namespaces: Vec<_> = registry.namespaces().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&namespaces)?);
        return Ok(());
    }

    if let Some(base) = registry.base_dir() {
        println!("Base directory: {}", base.display());
        println!();
    }

    for namespace in namespaces {
        println!("{}://  ({})", namespace.name, namespace.access);
        if namespace.prefixes.is_empty() {
            println!("    (no locations)");
            continue;
        }
        for sub_path in namespace.prefixes.sub_paths() {
            let key = if sub_path.key.is_empty() {
                "*"
            } else {
                sub_path.key.as_str()
            };
            println!("    {} -> {}", key, format_entries(&sub_path.entries));
        }
    }

    Ok(())
}

fn format_entries(entries: &[PrefixEntry]) -> String {
    if entries.is_empty() {
        return "(none)".to_string();
    }
    entries
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
