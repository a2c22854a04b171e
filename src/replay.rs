// src/replay.rs
//
// File-driven detection source: JSON-lines files with one frame's worth of
// detections per line, replayed through a scanning session exactly as live
// detector output would be.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use walkdir::WalkDir;

use crate::session::DetectionSource;
use crate::types::FrameDetections;

pub fn find_replay_files(input_dir: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(input_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    info!("Found {} replay file(s)", files.len());
    Ok(files)
}

pub struct ReplayFileSource {
    reader: BufReader<File>,
    path: PathBuf,
    line: usize,
}

impl ReplayFileSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("opening replay file {}", path.display()))?;
        Ok(Self {
            reader: BufReader::new(file),
            path: path.to_path_buf(),
            line: 0,
        })
    }
}

impl DetectionSource for ReplayFileSource {
    async fn next_frame(&mut self) -> Result<Option<FrameDetections>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            let n = self
                .reader
                .read_line(&mut buf)
                .with_context(|| format!("reading {}", self.path.display()))?;
            if n == 0 {
                return Ok(None);
            }
            self.line += 1;

            let line = buf.trim();
            if line.is_empty() {
                continue;
            }
            let frame: FrameDetections = serde_json::from_str(line)
                .with_context(|| format!("{}:{}", self.path.display(), self.line))?;
            return Ok(Some(frame));
        }
    }
}
