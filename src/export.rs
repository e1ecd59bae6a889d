//! Learning-history export for external plotting collaborators

use std::path::Path;

use crate::error::Result;

/// Write learning histories as CSV: one episode per row, one run per column
///
/// Ragged histories leave trailing cells empty.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub fn write_history_csv<P: AsRef<Path>>(path: P, histories: &[Vec<usize>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["episode".to_string()];
    header.extend((0..histories.len()).map(|run| format!("run_{run}")));
    writer.write_record(&header)?;

    let episodes = histories.iter().map(Vec::len).max().unwrap_or(0);
    for episode in 0..episodes {
        let mut record = vec![episode.to_string()];
        for history in histories {
            record.push(
                history
                    .get(episode)
                    .map(|steps| steps.to_string())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
