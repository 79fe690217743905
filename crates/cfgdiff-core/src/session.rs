//! Session coordinator driving a config platform

use crate::platform::{
    ConfigError, ConfigPlatform, ConfigResponse, LoadOptions, Operation, Transport,
};
use crate::record::DiffRecord;
use crate::substitute::{render_substituted, Substitute};

/// Hook run after the transport is confirmed alive
pub type OnOpen<P> = Box<dyn FnMut(&mut ConfigSession<P>) -> Result<(), ConfigError>>;

/// Coordinates open/get/load/abort/commit/diff against one target
///
/// Holds no lifecycle state of its own; staging is tracked by the platform.
pub struct ConfigSession<P: ConfigPlatform> {
    platform: P,
    config_sources: Vec<String>,
    on_open: Option<OnOpen<P>>,
}

impl<P: ConfigPlatform> ConfigSession<P> {
    pub fn new<S: Into<String>>(platform: P, config_sources: impl IntoIterator<Item = S>) -> Self {
        Self {
            platform,
            config_sources: config_sources.into_iter().map(Into::into).collect(),
            on_open: None,
        }
    }

    pub fn with_on_open(
        mut self,
        on_open: impl FnMut(&mut ConfigSession<P>) -> Result<(), ConfigError> + 'static,
    ) -> Self {
        self.on_open = Some(Box::new(on_open));
        self
    }

    pub fn host(&self) -> &str {
        self.platform.host()
    }

    pub fn config_sources(&self) -> &[String] {
        &self.config_sources
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn into_platform(self) -> P {
        self.platform
    }

    /// Open the transport if needed, then run the on-open hook once
    pub fn open(&mut self) -> Result<(), ConfigError> {
        tracing::info!(host = %self.host(), "opening config session");

        if !self.platform.transport().is_alive() {
            self.platform.transport_mut().open()?;
        }

        if let Some(mut on_open) = self.on_open.take() {
            tracing::debug!(host = %self.host(), "executing on open hook");
            let result = on_open(self);
            self.on_open = Some(on_open);
            result?;
        }

        Ok(())
    }

    pub fn get_config(&mut self, source: &str) -> Result<ConfigResponse, ConfigError> {
        self.validate_source(Operation::GetConfig, source)?;
        let result = self.platform.get_config(source);
        self.with_context(Operation::GetConfig, Some(source), result)
    }

    pub fn load_config(
        &mut self,
        config: &str,
        replace: bool,
        options: &LoadOptions,
    ) -> Result<ConfigResponse, ConfigError> {
        tracing::info!(host = %self.host(), replace, "loading candidate config");
        let result = self.platform.load_config(config, replace, options);
        self.with_context(Operation::LoadConfig, None, result)
    }

    pub fn abort_config(&mut self) -> Result<ConfigResponse, ConfigError> {
        tracing::info!(host = %self.host(), "aborting candidate config");
        let result = self.platform.abort_config();
        self.with_context(Operation::AbortConfig, None, result)
    }

    pub fn commit_config(&mut self, source: &str) -> Result<ConfigResponse, ConfigError> {
        self.validate_source(Operation::CommitConfig, source)?;
        tracing::info!(host = %self.host(), source, "committing candidate config");
        let result = self.platform.commit_config(source);
        self.with_context(Operation::CommitConfig, Some(source), result)
    }

    pub fn diff_config(&mut self, source: &str) -> Result<DiffRecord, ConfigError> {
        self.validate_source(Operation::DiffConfig, source)?;
        let result = self.platform.diff_config(source);
        self.with_context(Operation::DiffConfig, Some(source), result)
    }

    /// Fetch `source` and fill the template's placeholders from it
    pub fn render_substituted_config(
        &mut self,
        template: &str,
        substitutes: &[Substitute],
        source: &str,
    ) -> Result<String, ConfigError> {
        tracing::info!(
            host = %self.host(),
            source,
            "fetching configuration and replacing with provided substitutes"
        );

        let source_config = self.get_config(source)?.raise_for_status()?;
        let result = render_substituted(template, substitutes, &source_config.result);
        self.with_context(Operation::RenderSubstitutedConfig, Some(source), result)
    }

    fn validate_source(&self, operation: Operation, source: &str) -> Result<(), ConfigError> {
        if self.config_sources.iter().any(|s| s == source) {
            return Ok(());
        }
        self.with_context(
            operation,
            Some(source),
            Err(ConfigError::InvalidSource {
                store: source.to_string(),
                available: self.config_sources.clone(),
            }),
        )
    }

    fn with_context<T>(
        &self,
        operation: Operation,
        store: Option<&str>,
        result: Result<T, ConfigError>,
    ) -> Result<T, ConfigError> {
        result.map_err(|inner| ConfigError::Operation {
            host: self.host().to_string(),
            operation,
            store: store.map(str::to_string),
            inner: Box::new(inner),
        })
    }
}
