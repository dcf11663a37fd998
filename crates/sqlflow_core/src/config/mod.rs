use std::collections::HashMap;
use std::sync::LazyLock;

use logutil::{LogFormat, LogLevel};
use serde::{Deserialize, Serialize};
use sqlflow_error::{CompilerError, Result, ResultExt};

/// Configuration for a compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub lowering: LoweringConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoweringConfig {
    /// Wrap references to row fields that cannot be copied in a clone.
    pub emit_clones: bool,
    /// 2 logs every lowered call, 3 additionally logs every compiled
    /// expression.
    pub verbosity: u32,
}

impl Default for LoweringConfig {
    fn default() -> Self {
        LoweringConfig {
            emit_clones: true,
            verbosity: 0,
        }
    }
}

impl LoweringConfig {
    pub fn log_calls(&self) -> bool {
        self.verbosity >= 2
    }

    pub fn log_expressions(&self) -> bool {
        self.verbosity >= 3
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Install the global logger described by this config.
    pub fn install(&self) -> Result<()> {
        logutil::configure_global_logger(self.level, self.format)
            .context("Failed to install global logger")
    }
}

impl CompilerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse compiler configuration")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize compiler configuration")
    }

    pub fn set_from_str(&mut self, name: &str, value: &str) -> Result<()> {
        let func = GET_SET_FUNCTIONS
            .get(name)
            .ok_or_else(|| CompilerError::new(format!("Missing setting for '{name}'")))?;

        (func.set)(value, self)
    }

    pub fn get_as_string(&self, name: &str) -> Result<String> {
        let func = GET_SET_FUNCTIONS
            .get(name)
            .ok_or_else(|| CompilerError::new(format!("Missing setting for '{name}'")))?;

        Ok((func.get)(self))
    }

    /// Reset a single setting to its default.
    pub fn reset(&mut self, name: &str) -> Result<()> {
        let default = Self::default().get_as_string(name)?;
        self.set_from_str(name, &default)
    }

    /// Names and descriptions of all settings.
    pub fn settings() -> impl Iterator<Item = (&'static str, &'static str)> {
        let mut settings: Vec<_> = GET_SET_FUNCTIONS
            .iter()
            .map(|(name, funcs)| (*name, funcs.description))
            .collect();
        settings.sort_unstable();
        settings.into_iter()
    }
}

struct SettingFunctions {
    description: &'static str,
    set: fn(value: &str, conf: &mut CompilerConfig) -> Result<()>,
    get: fn(conf: &CompilerConfig) -> String,
}

impl SettingFunctions {
    const fn new<S: CompilerSetting>() -> Self {
        SettingFunctions {
            description: S::DESCRIPTION,
            set: S::set_from_str as _,
            get: S::get_as_string as _,
        }
    }
}

fn insert_setting<S: CompilerSetting>(map: &mut HashMap<&'static str, SettingFunctions>) {
    if map.insert(S::NAME, SettingFunctions::new::<S>()).is_some() {
        panic!("Duplicate settings names: {}", S::NAME);
    }
}

static GET_SET_FUNCTIONS: LazyLock<HashMap<&'static str, SettingFunctions>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    insert_setting::<EmitClones>(&mut map);
    insert_setting::<Verbosity>(&mut map);
    insert_setting::<LogLevelSetting>(&mut map);
    insert_setting::<LogFormatSetting>(&mut map);

    map
});

pub trait CompilerSetting: Sync + Send + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn set_from_str(value: &str, conf: &mut CompilerConfig) -> Result<()>;
    fn get_as_string(conf: &CompilerConfig) -> String;
}

pub struct EmitClones;

impl CompilerSetting for EmitClones {
    const NAME: &'static str = "emit_clones";
    const DESCRIPTION: &'static str = "Clone non-copyable fields read from a row";

    fn set_from_str(value: &str, conf: &mut CompilerConfig) -> Result<()> {
        conf.lowering.emit_clones = value
            .parse::<bool>()
            .context_fn(|| format!("Invalid value for {}: '{value}'", Self::NAME))?;
        Ok(())
    }

    fn get_as_string(conf: &CompilerConfig) -> String {
        conf.lowering.emit_clones.to_string()
    }
}

pub struct Verbosity;

impl CompilerSetting for Verbosity {
    const NAME: &'static str = "verbosity";
    const DESCRIPTION: &'static str = "Amount of detail logged while lowering expressions";

    fn set_from_str(value: &str, conf: &mut CompilerConfig) -> Result<()> {
        conf.lowering.verbosity = value
            .parse::<u32>()
            .context_fn(|| format!("Invalid value for {}: '{value}'", Self::NAME))?;
        Ok(())
    }

    fn get_as_string(conf: &CompilerConfig) -> String {
        conf.lowering.verbosity.to_string()
    }
}

pub struct LogLevelSetting;

impl CompilerSetting for LogLevelSetting {
    const NAME: &'static str = "log_level";
    const DESCRIPTION: &'static str = "Default level of the global logger";

    fn set_from_str(value: &str, conf: &mut CompilerConfig) -> Result<()> {
        conf.logging.level = value.parse::<LogLevel>().context("Failed to parse log level")?;
        Ok(())
    }

    fn get_as_string(conf: &CompilerConfig) -> String {
        conf.logging.level.to_string()
    }
}

pub struct LogFormatSetting;

impl CompilerSetting for LogFormatSetting {
    const NAME: &'static str = "log_format";
    const DESCRIPTION: &'static str = "Output format of the global logger";

    fn set_from_str(value: &str, conf: &mut CompilerConfig) -> Result<()> {
        conf.logging.format = value.parse::<LogFormat>().context("Failed to parse log format")?;
        Ok(())
    }

    fn get_as_string(conf: &CompilerConfig) -> String {
        conf.logging.format.to_string()
    }
}
