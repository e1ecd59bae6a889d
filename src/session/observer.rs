//! Observer port for learning sessions
//!
//! Observers compose: a session notifies each of them in registration order
//! at session start, after every episode, and at session end. The default
//! implementations do nothing, so an observer only overrides the events it
//! cares about.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Observer of learning-session events
pub trait Observer: Send {
    /// Called once before the first episode
    fn on_session_start(
        &mut self,
        _algorithm: &str,
        _environment: &str,
        _total_episodes: usize,
    ) -> Result<()> {
        Ok(())
    }

    /// Called after every episode with its step count
    fn on_episode_end(&mut self, _episode: usize, _steps: usize) -> Result<()> {
        Ok(())
    }

    /// Called once after the last episode
    fn on_session_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Progress-bar observer for interactive runs
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self { progress_bar: None }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_session_start(
        &mut self,
        algorithm: &str,
        environment: &str,
        total_episodes: usize,
    ) -> Result<()> {
        let progress_bar = ProgressBar::new(total_episodes as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix} [{bar:40.cyan/blue}] {pos}/{len} episodes {msg}")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        progress_bar.set_prefix(format!("{algorithm} on {environment}"));
        self.progress_bar = Some(progress_bar);
        Ok(())
    }

    fn on_episode_end(&mut self, _episode: usize, steps: usize) -> Result<()> {
        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.set_message(format!("last: {steps} steps"));
            progress_bar.inc(1);
        }
        Ok(())
    }

    fn on_session_end(&mut self) -> Result<()> {
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish();
        }
        Ok(())
    }
}

/// One line of a JSONL episode log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Episode index within the session
    pub episode: usize,
    /// Step count of the episode
    pub steps: usize,
}

/// Writes one JSON record per episode, for downstream analysis tooling
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create an observer writing to the given path
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be created.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, episode: usize, steps: usize) -> Result<()> {
        let record = EpisodeRecord { episode, steps };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn on_session_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
