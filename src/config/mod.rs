//! Project configuration management for `fwembed.toml`.
//!
//! The config file is optional: without one, defaults match the usual
//! PlatformIO layout (`gui/` front-end built with pnpm, output in
//! `src/frontend.cpp`).
//!
//! # Sections
//!
//! | Section      | Purpose                                           |
//! |--------------|---------------------------------------------------|
//! | `[frontend]` | Front-end project dir, build command, dist dir    |
//! | `[output]`   | Generated module path and rendering options       |
//! | `[http]`     | Response headers of generated routes              |
//!
//! # Example
//!
//! ```toml
//! [frontend]
//! dir = "web"
//! command = ["npm", "run", "build"]
//!
//! [output]
//! path = "src/web_assets.cpp"
//! chunk_width = 16
//! ```

mod error;
mod util;

pub use error::ConfigError;
use util::{find_config_file, is_c_identifier, resolve_path};

use crate::{
    asset::compress::DEFAULT_LEVEL,
    cli::{Cli, GenerateArgs},
    codegen::EmitOptions,
    debug, log,
    pipeline::BuildContext,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing fwembed.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Path to the loaded config file, empty when running on defaults (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory, all relative paths resolve against it (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Front-end build settings
    pub frontend: FrontendConfig,

    /// Generated module settings
    pub output: OutputConfig,

    /// Served response settings
    pub http: HttpConfig,
}

/// `[frontend]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Front-end project directory, the build command runs here.
    pub dir: PathBuf,
    /// Build output directory (default: `<dir>/dist`).
    pub dist: Option<PathBuf>,
    /// Build command: program followed by arguments.
    pub command: Vec<String>,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("gui"),
            dist: None,
            command: vec!["pnpm".into(), "run".into(), "build".into()],
        }
    }
}

impl FrontendConfig {
    /// Build output directory, relative to the project root.
    pub fn dist_dir(&self) -> PathBuf {
        self.dist.clone().unwrap_or_else(|| self.dir.join("dist"))
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Generated module path.
    pub path: PathBuf,
    /// Bytes per array row.
    pub chunk_width: usize,
    /// Gzip level, 0-9.
    pub compression_level: u32,
    /// Generated setup function, called once at startup.
    pub setup_fn: String,
    /// Global server object the routes register on.
    pub server: String,
    /// Type of the server object.
    pub server_type: String,
    /// Headers included at the top of the module.
    pub includes: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let emit = EmitOptions::default();
        Self {
            path: PathBuf::from("src/frontend.cpp"),
            chunk_width: emit.chunk_width,
            compression_level: DEFAULT_LEVEL,
            setup_fn: emit.setup_fn,
            server: emit.server,
            server_type: emit.server_type,
            includes: emit.includes,
        }
    }
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// `Cache-Control: max-age` of every route, in seconds.
    pub max_age: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_age: EmitOptions::default().max_age,
        }
    }
}

impl EmbedConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Without `--root`, searches upward from cwd to find the config file and
    /// uses its parent as project root. A missing config file is not an
    /// error: defaults are used with cwd (or `--root`) as root.
    pub fn load(cli: &Cli) -> Result<Self> {
        crate::logger::set_verbose(cli.verbose());

        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let explicit_root = cli.root.as_deref().map(|r| resolve_path(&cwd, r));

        let config_path = match &explicit_root {
            Some(root) => Some(resolve_path(root, &cli.config)).filter(|p| p.is_file()),
            None => find_config_file(&cwd, &cli.config),
        };

        let mut config = match &config_path {
            Some(path) => {
                debug!("config"; "using {}", path.display());
                Self::from_path(path)?
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self::default()
            }
        };

        config.root = explicit_root
            .or_else(|| config_path.as_deref().and_then(Path::parent).map(Path::to_path_buf))
            .unwrap_or(cwd);
        config.config_path = config_path.unwrap_or_default();

        if let Some(args) = cli.generate_args() {
            config.apply_generate_args(args);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse `{}`", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} (ignored): {}", display_path, fields.join(", "));
    }

    /// Apply build/embed arguments from CLI.
    fn apply_generate_args(&mut self, args: &GenerateArgs) {
        if let Some(output) = &args.output {
            self.output.path = output.clone();
        }
        if let Some(dist) = &args.dist {
            self.frontend.dist = Some(dist.clone());
        }
    }

    /// Check values that would otherwise produce a broken module.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.frontend.command.first().is_none_or(String::is_empty) {
            errors.push("frontend.command must name a program".to_string());
        }
        if self.output.chunk_width == 0 {
            errors.push("output.chunk_width must be at least 1".to_string());
        }
        if self.output.compression_level > 9 {
            errors.push(format!(
                "output.compression_level must be 0-9, got {}",
                self.output.compression_level
            ));
        }
        for (field, value) in [
            ("output.setup_fn", &self.output.setup_fn),
            ("output.server", &self.output.server),
        ] {
            if !is_c_identifier(value) {
                errors.push(format!("{field} `{value}` is not a valid identifier"));
            }
        }
        let type_ok = self
            .output
            .server_type
            .split("::")
            .all(is_c_identifier);
        if !type_ok {
            errors.push(format!(
                "output.server_type `{}` is not a valid type name",
                self.output.server_type
            ));
        }
        if self.output.path.as_os_str().is_empty() {
            errors.push("output.path must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    // ========================================================================
    // derived values
    // ========================================================================

    /// Join a path with the root directory (absolute paths pass through).
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        resolve_path(&self.root, path.as_ref())
    }

    /// Rendering options for the generated module.
    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            chunk_width: self.output.chunk_width,
            setup_fn: self.output.setup_fn.clone(),
            server: self.output.server.clone(),
            server_type: self.output.server_type.clone(),
            includes: self.output.includes.clone(),
            max_age: self.http.max_age,
        }
    }

    /// Resolved parameters for one generation run.
    pub fn context(&self) -> BuildContext {
        BuildContext {
            frontend_dir: self.root_join(&self.frontend.dir),
            dist_dir: self.root_join(self.frontend.dist_dir()),
            output_path: self.root_join(&self.output.path),
            command: self.frontend.command.clone(),
            compression_level: self.output.compression_level,
            emit: self.emit_options(),
        }
    }
}

// ============================================================================
// tests
// ============================================================================
