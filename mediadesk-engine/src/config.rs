// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Layered configuration loading: built-in defaults, an optional TOML or
//! YAML file, `MEDIADESK_`-prefixed environment variables, and finally CLI
//! overrides, in that order of increasing precedence.

use std::path::Path;

use mediadesk_domain::{FilterSpec, MediadeskError, ProcessingMode, RunConfig};
use mediadesk_domain::value_objects::{ChunkSize, WorkerCount};

/// The built-in defaults layered under every other config source.
fn default_run_config() -> RunConfig {
    RunConfig {
        root_dir: String::new(),
        output_file: "output.csv".to_string(),
        output_folder: None,
        num_workers: WorkerCount::default_count(),
        verbose: false,
        processing_mode: ProcessingMode::default(),
        chunk_size: ChunkSize::default_size(),
        pause_between_chunks: false,
        pause_duration_secs: 5,
        filter_config: FilterSpec::disabled(),
    }
}

/// CLI-supplied overrides, applied last so they win over file and env
/// sources. Each field is `None` unless the user passed the flag.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_dir: Option<String>,
    pub output_file: Option<String>,
    pub output_folder: Option<String>,
    pub num_workers: Option<usize>,
    pub verbose: Option<bool>,
    pub processing_mode: Option<ProcessingMode>,
    pub chunk_size: Option<usize>,
    pub pause_between_chunks: Option<bool>,
    pub pause_duration_secs: Option<u64>,
}

impl CliOverrides {
    fn apply(self, config: &mut RunConfig) -> Result<(), MediadeskError> {
        if let Some(root_dir) = self.root_dir {
            config.root_dir = root_dir;
        }
        if let Some(output_file) = self.output_file {
            config.output_file = output_file;
        }
        if let Some(output_folder) = self.output_folder {
            config.output_folder = Some(output_folder);
        }
        if let Some(num_workers) = self.num_workers {
            config.num_workers = WorkerCount::new(num_workers)?;
        }
        if let Some(verbose) = self.verbose {
            config.verbose = verbose;
        }
        if let Some(processing_mode) = self.processing_mode {
            config.processing_mode = processing_mode;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = ChunkSize::new(chunk_size)?;
        }
        if let Some(pause_between_chunks) = self.pause_between_chunks {
            config.pause_between_chunks = pause_between_chunks;
        }
        if let Some(pause_duration_secs) = self.pause_duration_secs {
            config.pause_duration_secs = pause_duration_secs;
        }
        Ok(())
    }
}

/// Loads and validates a [`RunConfig`] from defaults, an optional config
/// file, environment variables, and CLI overrides, in that precedence
/// order.
pub fn load_run_config(
    file_path: Option<&Path>,
    cli: CliOverrides,
) -> Result<RunConfig, MediadeskError> {
    let defaults = default_run_config();

    let mut builder = config::Config::builder().add_source(
        config::Config::try_from(&defaults)
            .map_err(|err| MediadeskError::InvalidConfiguration(err.to_string()))?,
    );

    if let Some(path) = file_path {
        builder = builder.add_source(config::File::from(path).required(false));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("MEDIADESK")
            .separator("__")
            .try_parsing(true),
    );

    let assembled = builder
        .build()
        .map_err(|err| MediadeskError::InvalidConfiguration(err.to_string()))?;

    let mut run_config: RunConfig = assembled
        .try_deserialize()
        .map_err(|err| MediadeskError::InvalidConfiguration(err.to_string()))?;

    cli.apply(&mut run_config)?;
    run_config.validate()?;
    Ok(run_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fail_validation_without_a_root_dir() {
        let result = load_run_config(None, CliOverrides::default());
        assert!(result.is_err());
    }

    #[test]
    fn cli_overrides_supply_the_missing_root_dir() {
        let cli = CliOverrides {
            root_dir: Some("/data/root".to_string()),
            ..Default::default()
        };
        let config = load_run_config(None, cli).unwrap();
        assert_eq!(config.root_dir, "/data/root");
        assert_eq!(config.output_file, "output.csv");
        assert_eq!(config.num_workers.get(), 4);
    }

    #[test]
    fn file_source_overrides_defaults_and_cli_overrides_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("mediadesk.toml");
        std::fs::write(&file_path, "rootDir = \"/from/file\"\noutputFile = \"/from/file.csv\"\n").unwrap();

        let cli = CliOverrides {
            output_file: Some("/from/cli.csv".to_string()),
            ..Default::default()
        };
        let config = load_run_config(Some(&file_path), cli).unwrap();
        assert_eq!(config.root_dir, "/from/file");
        assert_eq!(config.output_file, "/from/cli.csv");
    }

    #[test]
    fn rejects_an_invalid_cli_worker_count() {
        let cli = CliOverrides {
            root_dir: Some("/data/root".to_string()),
            num_workers: Some(0),
            ..Default::default()
        };
        assert!(load_run_config(None, cli).is_err());
    }
}
