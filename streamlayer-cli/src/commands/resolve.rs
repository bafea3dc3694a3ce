//! Reference resolution commands.

use streamlayer::stream::StreamResolver;

use crate::error::CliError;

/// Print the first existing location of a reference.
pub fn run_resolve(resolver: &StreamResolver, reference: &str) -> Result<(), CliError> {
    let path = resolver.resolve(reference)?;
    println!("{}", path.display());
    Ok(())
}

/// Print every candidate location, existing or not.
///
/// Existing candidates are marked with `+`, missing ones with `-`.
pub fn run_expand(resolver: &StreamResolver, reference: &str, json: bool) -> Result<(), CliError> {
    let result = resolver.expand(reference)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let existing = resolver.list_candidates(reference)?;
    for candidate in result.iter() {
        let marker = if existing.contains(candidate) { '+' } else { '-' };
        println!("{} {}", marker, candidate);
    }
    Ok(())
}

/// Print every existing location, highest precedence first.
pub fn run_list(resolver: &StreamResolver, reference: &str) -> Result<(), CliError> {
    for path in resolver.list(reference)? {
        println!("{}", path.display());
    }
    Ok(())
}

/// Print the location a reference would be written to.
pub fn run_write_path(resolver: &StreamResolver, reference: &str) -> Result<(), CliError> {
    let path = resolver.resolve_for_write(reference)?;
    println!("{}", path.display());
    Ok(())
}

/// Report which references exist. Fails if any is missing.
pub fn run_exists(resolver: &StreamResolver, references: &[String]) -> Result<(), CliError> {
    let results = resolver.find_all(references);
    let mut missing = 0;

    for (reference, result) in references.iter().zip(results) {
        match result {
            Ok(path) => println!("{}  {}", reference, path.display()),
            Err(e) => {
                missing += 1;
                println!("{}  (missing: {})", reference, e);
            }
        }
    }

    if missing > 0 {
        return Err(CliError::Missing(missing));
    }
    Ok(())
}
