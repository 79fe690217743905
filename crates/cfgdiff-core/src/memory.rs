//! In-memory config platform, used for offline diffs and tests

use crate::diff::DiffEngine;
use crate::platform::{
    ConfigError, ConfigPlatform, ConfigResponse, LoadOptions, Operation, Transport, TransportError,
};
use crate::record::DiffRecord;
use std::collections::BTreeMap;

/// Transport that is alive once opened
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    alive: bool,
}

impl MemoryTransport {
    pub fn close(&mut self) {
        self.alive = false;
    }
}

impl Transport for MemoryTransport {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn open(&mut self) -> Result<(), TransportError> {
        self.alive = true;
        Ok(())
    }
}

/// A candidate waiting to be committed
#[derive(Debug, Clone)]
struct Staged {
    config: String,
    replace: bool,
}

/// Named config stores held in memory
///
/// A replace load stages the config as the whole candidate. A merge load
/// appends the staged lines the target store does not already contain.
#[derive(Debug, Clone)]
pub struct MemoryPlatform {
    host: String,
    transport: MemoryTransport,
    stores: BTreeMap<String, String>,
    staged: Option<Staged>,
    engine: DiffEngine,
    colorize: bool,
    side_by_side_width: usize,
}

impl MemoryPlatform {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            transport: MemoryTransport::default(),
            stores: BTreeMap::new(),
            staged: None,
            engine: DiffEngine::default(),
            colorize: true,
            side_by_side_width: 0,
        }
    }

    pub fn with_store(mut self, name: impl Into<String>, config: impl Into<String>) -> Self {
        self.stores.insert(name.into(), config.into());
        self
    }

    pub fn with_engine(mut self, engine: DiffEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Rendering settings applied to records produced by `diff_config`
    pub fn with_rendering(mut self, colorize: bool, side_by_side_width: usize) -> Self {
        self.colorize = colorize;
        self.side_by_side_width = side_by_side_width;
        self
    }

    pub fn store(&self, name: &str) -> Option<&str> {
        self.stores.get(name).map(String::as_str)
    }

    pub fn is_staged(&self) -> bool {
        self.staged.is_some()
    }

    fn ensure_alive(&self) -> Result<(), TransportError> {
        if self.transport.is_alive() {
            Ok(())
        } else {
            Err(TransportError::NotOpen)
        }
    }

    fn candidate_for(&self, source: &str) -> Option<String> {
        let staged = self.staged.as_ref()?;
        if staged.replace {
            return Some(staged.config.clone());
        }

        let current = self.stores.get(source).map(String::as_str).unwrap_or_default();
        let mut merged = current.to_string();
        if !merged.is_empty() && !merged.ends_with('\n') {
            merged.push('\n');
        }
        for line in staged.config.split_inclusive('\n') {
            let bare = line.trim_end_matches(['\r', '\n']);
            if !current.lines().any(|existing| existing == bare) {
                merged.push_str(line);
            }
        }
        Some(merged)
    }
}

impl ConfigPlatform for MemoryPlatform {
    type Transport = MemoryTransport;

    fn host(&self) -> &str {
        &self.host
    }

    fn transport(&self) -> &MemoryTransport {
        &self.transport
    }

    fn transport_mut(&mut self) -> &mut MemoryTransport {
        &mut self.transport
    }

    fn get_config(&mut self, source: &str) -> Result<ConfigResponse, ConfigError> {
        self.ensure_alive()?;
        let config = self.stores.get(source).cloned().unwrap_or_default();
        Ok(ConfigResponse::success(&self.host, Operation::GetConfig, config))
    }

    fn load_config(
        &mut self,
        config: &str,
        replace: bool,
        _options: &LoadOptions,
    ) -> Result<ConfigResponse, ConfigError> {
        self.ensure_alive()?;
        if config.trim().is_empty() {
            return Ok(ConfigResponse::failure(
                &self.host,
                Operation::LoadConfig,
                "candidate config is empty",
            ));
        }

        self.staged = Some(Staged {
            config: config.to_string(),
            replace,
        });
        Ok(ConfigResponse::success(&self.host, Operation::LoadConfig, ""))
    }

    fn abort_config(&mut self) -> Result<ConfigResponse, ConfigError> {
        self.ensure_alive()?;
        self.staged = None;
        Ok(ConfigResponse::success(&self.host, Operation::AbortConfig, ""))
    }

    fn commit_config(&mut self, source: &str) -> Result<ConfigResponse, ConfigError> {
        self.ensure_alive()?;
        let Some(candidate) = self.candidate_for(source) else {
            return Ok(ConfigResponse::failure(
                &self.host,
                Operation::CommitConfig,
                "no candidate config loaded",
            ));
        };

        self.stores.insert(source.to_string(), candidate);
        self.staged = None;
        Ok(ConfigResponse::success(&self.host, Operation::CommitConfig, ""))
    }

    fn diff_config(&mut self, source: &str) -> Result<DiffRecord, ConfigError> {
        let current = self.get_config(source)?.result;
        let candidate = self.candidate_for(source).unwrap_or_else(|| current.clone());

        let mut record = DiffRecord::new(&self.host, source)
            .with_colorize(self.colorize)
            .with_side_by_side_width(self.side_by_side_width);
        record.record_with(&self.engine, current, candidate, "")?;
        Ok(record)
    }
}
