// File: src/persistence.rs
use crate::error::{LexiconError, Result};
use crate::etymology::graph::AncestryGraph;
use crate::store::InMemoryLexicon;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes the lexicon snapshot with bincode. The file is replaced atomically:
/// readers see either the old snapshot or the new one.
pub fn save_to_disk(store: &InMemoryLexicon, path: &Path) -> Result<()> {
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, store)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| e.error)?;
    tracing::info!(path = %path.display(), "saved lexicon snapshot");
    Ok(())
}

/// Reads a snapshot written by [`save_to_disk`]. A snapshot whose edges form
/// a loop is refused.
pub fn load_from_disk(path: &Path) -> Result<InMemoryLexicon> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let store: InMemoryLexicon = bincode::deserialize_from(reader)?;

    if let Some(cycle) = AncestryGraph::find_cycle(&store) {
        let child = cycle.first().copied().unwrap_or_default();
        let ancestor = cycle.get(1).copied().unwrap_or(child);
        tracing::warn!(?cycle, path = %path.display(), "snapshot contains an ancestry cycle");
        return Err(LexiconError::CycleDetected { child, ancestor });
    }
    Ok(store)
}

/// Human-readable dump of the whole lexicon.
pub fn export_json(store: &InMemoryLexicon, path: &Path) -> Result<()> {
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, store)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
