use std::collections::BTreeMap;
use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use sl_core::Lexicon;

use super::LoadArgs;

pub fn run(
    catalog_path: &Path,
    load: &LoadArgs,
    words: Option<&Path>,
    list: bool,
) -> Result<(), String> {
    let catalog = super::load_catalog(catalog_path, load)?;

    let mut lengths: BTreeMap<usize, usize> = BTreeMap::new();
    for pair in catalog.pairs() {
        *lengths.entry(pair.word_length()).or_default() += 1;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Letters", "Pairs"]);
    for (len, count) in &lengths {
        table.add_row(vec![len.to_string(), count.to_string()]);
    }
    println!("{table}");

    if list {
        let mut pairs = Table::new();
        pairs.set_content_arrangement(ContentArrangement::Dynamic);
        pairs.set_header(vec!["Word", "Image"]);
        for pair in catalog.pairs() {
            pairs.add_row(vec![pair.word.as_str(), pair.image_ref.as_str()]);
        }
        println!("{pairs}");
    }

    if let Some(path) = words {
        let lexicon = Lexicon::load(path).map_err(|e| format!("{}: {e}", path.display()))?;
        let missing: Vec<&str> = catalog
            .pairs()
            .iter()
            .filter(|p| !lexicon.contains(&p.word))
            .map(|p| p.word.as_str())
            .collect();
        println!("  {} words in {}", lexicon.len(), path.display());
        if !missing.is_empty() {
            // These are still guessable; the catalog is merged into the word list at startup.
            println!(
                "  {} catalog word{} missing from the word list: {}",
                missing.len(),
                if missing.len() == 1 { "" } else { "s" },
                missing.join(", ")
            );
        }
    }

    println!();
    println!(
        "  All checks passed for '{}'. {} pairs",
        catalog_path.display(),
        catalog.len()
    );

    Ok(())
}
