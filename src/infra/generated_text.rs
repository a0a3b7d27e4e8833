use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Write a generated corpus: one example per line, tokens joined by spaces.
pub fn save_generated_text(path: &Path, generated_corpus: &[Vec<String>]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Cannot create generated text file '{}'", path.display()))?;
    let mut out = BufWriter::new(file);
    for tokens in generated_corpus {
        writeln!(out, "{}", tokens.join(" "))?;
    }
    out.flush()
        .with_context(|| format!("Cannot write generated text to '{}'", path.display()))?;

    tracing::debug!("Wrote {} generated lines to '{}'", generated_corpus.len(), path.display());
    Ok(())
}
