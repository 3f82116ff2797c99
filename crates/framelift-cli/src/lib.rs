//! CLI logic for the framelift replacement tool.
//!
//! Loads the mapping configuration, component library, and document,
//! runs a replacement pass (or a dry-run discovery), and writes the
//! updated document back out.

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use framelift::{
    FrameliftError, Replacer, Session, StaticLibrary,
    document::{DetachedNode, Document},
    registry::ComponentRegistry,
};

/// Run the framelift CLI application
///
/// Loads all inputs, performs the replacement run against the document,
/// and writes the resulting document to the output path. With `--dry-run`
/// the document is left untouched and discovered candidates are printed
/// instead.
///
/// # Errors
///
/// Returns `FrameliftError` for:
/// - File I/O errors
/// - Malformed mapping, library, registry, or document files
pub fn run(args: &Args) -> Result<(), FrameliftError> {
    info!(
        document_path = args.document,
        output_path = args.output;
        "Processing document"
    );

    let mappings = config::load_mappings(args.mappings.as_ref())?;

    let library: StaticLibrary = read_json(&args.library, "library")?;
    let registry = match &args.registry {
        Some(path) => read_json(path, "registry")?,
        None => ComponentRegistry::new(Vec::new()),
    };

    let root: DetachedNode = read_json(&args.document, "document")?;
    let mut doc = Document::from_root(root);

    let replacer = Replacer::new(&library, &registry, &mappings);
    let mut session = Session::new();

    if args.dry_run {
        let candidates = replacer.discover(&doc, &session);
        info!(candidates = candidates.len(); "Dry run, document left untouched");
        for candidate in candidates {
            println!("{}\t{}\t{}", candidate.node, candidate.node_name, candidate.mapping_id);
        }
        return Ok(());
    }

    let summary = replacer.run(&mut doc, &mut session);
    for skip in &summary.skips {
        println!("skipped\t{}\t{}", skip.node_name, skip.reason);
    }

    let serialized = serde_json::to_string_pretty(&doc.to_detached())
        .map_err(|e| FrameliftError::Config(format!("failed to serialize document: {e}")))?;
    fs::write(&args.output, serialized)?;

    info!(
        replaced = summary.replaced_count(),
        skipped = summary.skipped_count(),
        output_file = args.output;
        "Document exported successfully"
    );

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str, what: &str) -> Result<T, FrameliftError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| FrameliftError::Config(format!("failed to parse {what} file `{path}`: {e}")))
}
