use std::{
    any::Any,
    fs::{File, OpenOptions},
    io::Write,
    path::PathBuf,
    sync::Mutex,
};

use loglane_common::Result;

use crate::{Handler, HandlerOptions, Level, Record};

/// Where a [`StreamHandler`] writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTarget {
    Stdout,
    Stderr,
    File(PathBuf),
}

impl StreamTarget {
    /// Parse a configured stream: `stdout`, `stderr` (`php://` prefixes are
    /// tolerated) or a file path.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().trim_start_matches("php://") {
            "stdout" | "output" => Self::Stdout,
            "stderr" => Self::Stderr,
            _ => Self::File(PathBuf::from(raw.trim())),
        }
    }
}

/// Writes line-formatted records to stdout, stderr or an append-mode file.
pub struct StreamHandler {
    target: StreamTarget,
    file: Option<Mutex<File>>,
    options: HandlerOptions,
}

impl StreamHandler {
    /// Create the handler, opening the file (and its parent directories) up
    /// front for file targets.
    pub fn new(target: StreamTarget, level: Level, bubble: bool) -> Result<Self> {
        let file = match &target {
            StreamTarget::File(path) => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Some(Mutex::new(file))
            },
            StreamTarget::Stdout | StreamTarget::Stderr => None,
        };
        Ok(Self {
            target,
            file,
            options: HandlerOptions::new(level, bubble),
        })
    }

    pub fn target(&self) -> &StreamTarget {
        &self.target
    }
}

impl Handler for StreamHandler {
    fn options(&self) -> &HandlerOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut HandlerOptions {
        &mut self.options
    }

    fn write(&self, _record: &Record, formatted: &str) -> Result<()> {
        match (&self.target, &self.file) {
            (StreamTarget::Stdout, _) => std::io::stdout().lock().write_all(formatted.as_bytes())?,
            (StreamTarget::Stderr, _) => std::io::stderr().lock().write_all(formatted.as_bytes())?,
            (StreamTarget::File(_), Some(file)) => {
                let mut file = file.lock().unwrap_or_else(|e| e.into_inner());
                file.write_all(formatted.as_bytes())?;
                file.flush()?;
            },
            (StreamTarget::File(path), None) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("stream {} is not open", path.display()),
                )
                .into());
            },
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::Map};

    #[test]
    fn parses_targets() {
        assert_eq!(StreamTarget::parse("stdout"), StreamTarget::Stdout);
        assert_eq!(StreamTarget::parse("php://stderr"), StreamTarget::Stderr);
        assert_eq!(
            StreamTarget::parse("/var/log/app.log"),
            StreamTarget::File(PathBuf::from("/var/log/app.log"))
        );
    }

    #[test]
    fn appends_to_file_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("app.log");
        let handler =
            StreamHandler::new(StreamTarget::File(path.clone()), Level::Info, true).unwrap();

        handler
            .handle(&Record::new(Level::Info, "app", "first", Map::new()))
            .unwrap();
        handler
            .handle(&Record::new(Level::Debug, "app", "filtered", Map::new()))
            .unwrap();
        handler
            .handle(&Record::new(Level::Error, "app", "second", Map::new()))
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("app.INFO: first"));
        assert!(lines[1].contains("app.ERROR: second"));
    }
}
