//! Module configuration file format and operations.

use std::path::Path;

use lamb_core::{
    CLOCK_TIMEOUT_SECS, ClockSync, LFO_COUNT, LfoChannel, MAX_FREQUENCY_HZ, MAX_RATE_HZ,
    MIN_FREQUENCY_HZ, MIN_RATE_HZ, Module, NUM_STEPS, Sequencer, StepSequencer,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{
    self, ValidationError, ValidationResult, check_range, parse_range, parse_ratio,
    parse_sequence, parse_shape, parse_skip, parse_trigger,
};

/// Power-on state of the module.
///
/// Every section and field is optional; missing values take the defaults
/// shown below. Fewer than three `[[lfo]]` entries leave the remaining
/// channels at their defaults.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
/// buffer_size = 128
///
/// [clock]
/// timeout_secs = 20.0
///
/// [[lfo]]
/// frequency = 1.0
/// duty = 0.5
/// shape = "square"
/// range = "low"
/// external_clock = false
/// ratio = "x1"
///
/// [sequencer]
/// frequency = 1.0
/// sequence = "up"
/// skip = [false, false, false, false, false, false, false, false]
/// trigger = "internal"
/// seed = 305419896
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModuleConfig {
    /// Audio callback sample rate in Hz.
    pub sample_rate: u32,

    /// Frames per audio callback.
    pub buffer_size: usize,

    /// External clock input.
    pub clock: ClockConfig,

    /// LFO channels A, B and C in order.
    #[serde(rename = "lfo")]
    pub lfos: Vec<LfoConfig>,

    /// Step sequencer voice.
    pub sequencer: SequencerConfig,
}

/// `[clock]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClockConfig {
    /// Seconds without a pulse before sync is considered lost.
    pub timeout_secs: f64,
}

/// One `[[lfo]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LfoConfig {
    /// Free-running frequency in Hz.
    pub frequency: f32,
    /// Duty cycle in `[0, 1]`.
    pub duty: f32,
    /// `"square"` or `"triangle"`.
    pub shape: String,
    /// `"low"` or `"high"`.
    pub range: String,
    /// Follow the external clock.
    pub external_clock: bool,
    /// Clock ratio label, `"/9"` to `"x9"`.
    pub ratio: String,
}

/// `[sequencer]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SequencerConfig {
    /// Internal clock rate in Hz.
    pub frequency: f32,
    /// Sequence name (`"up"`, `"up/down"`, `"+2-1"`, ...) or ordinal.
    pub sequence: String,
    /// Eight flags, `true` = step skipped.
    pub skip: Vec<bool>,
    /// `"internal"` or `"gate"`.
    pub trigger: String,
    /// Seed for the random sequence.
    pub seed: u32,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 128,
            clock: ClockConfig::default(),
            lfos: vec![LfoConfig::default(); LFO_COUNT],
            sequencer: SequencerConfig::default(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            timeout_secs: CLOCK_TIMEOUT_SECS,
        }
    }
}

impl Default for LfoConfig {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            duty: 0.5,
            shape: "square".to_string(),
            range: "low".to_string(),
            external_clock: false,
            ratio: "x1".to_string(),
        }
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            sequence: "up".to_string(),
            skip: vec![false; NUM_STEPS],
            trigger: "internal".to_string(),
            seed: 0x1234_5678,
        }
    }
}

impl LfoConfig {
    /// Apply this entry to a channel. The entry must already be valid.
    fn apply(&self, index: usize, channel: &mut LfoChannel) -> ValidationResult<()> {
        let prefix = format!("lfo[{index}]");
        channel.set_frequency(self.frequency);
        channel.set_duty(self.duty);
        channel.set_shape(parse_shape(&format!("{prefix}.shape"), &self.shape)?);
        channel.set_range(parse_range(&format!("{prefix}.range"), &self.range)?);
        channel.set_external_clock(self.external_clock);
        channel.set_ratio(parse_ratio(&self.ratio)?);
        Ok(())
    }

    fn validate(&self, index: usize, errors: &mut Vec<ValidationError>) {
        let prefix = format!("lfo[{index}]");
        check_range(
            &format!("{prefix}.frequency"),
            f64::from(self.frequency),
            f64::from(MIN_FREQUENCY_HZ),
            f64::from(MAX_FREQUENCY_HZ),
            errors,
        );
        check_range(&format!("{prefix}.duty"), f64::from(self.duty), 0.0, 1.0, errors);
        if let Err(e) = parse_shape(&format!("{prefix}.shape"), &self.shape) {
            errors.push(e);
        }
        if let Err(e) = parse_range(&format!("{prefix}.range"), &self.range) {
            errors.push(e);
        }
        if let Err(e) = parse_ratio(&self.ratio) {
            errors.push(e);
        }
    }
}

impl SequencerConfig {
    fn build(&self) -> ValidationResult<StepSequencer> {
        let mut sequencer = Sequencer::with_seed(self.seed);
        sequencer.set_sequence_kind(parse_sequence(&self.sequence)?);
        sequencer.set_skip_mask(parse_skip(&self.skip)?);

        let mut voice = StepSequencer::with_sequencer(self.frequency, sequencer);
        voice.set_trigger_mode(parse_trigger("sequencer.trigger", &self.trigger)?);
        Ok(voice)
    }

    fn validate(&self, errors: &mut Vec<ValidationError>) {
        check_range(
            "sequencer.frequency",
            f64::from(self.frequency),
            f64::from(MIN_RATE_HZ),
            f64::from(MAX_RATE_HZ),
            errors,
        );
        if let Err(e) = parse_sequence(&self.sequence) {
            errors.push(e);
        }
        if let Err(e) = parse_skip(&self.skip) {
            errors.push(e);
        }
        if let Err(e) = parse_trigger("sequencer.trigger", &self.trigger) {
            errors.push(e);
        }
    }
}

impl ModuleConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), lfos = config.lfos.len(), "loaded module config");
        Ok(config)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), "saved module config");
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value, reporting all problems at once.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        check_range("sample_rate", f64::from(self.sample_rate), 1000.0, 384_000.0, &mut errors);
        check_range("buffer_size", self.buffer_size as f64, 1.0, 8192.0, &mut errors);
        check_range("clock.timeout_secs", self.clock.timeout_secs, 0.001, 3600.0, &mut errors);

        if self.lfos.len() > LFO_COUNT {
            errors.push(ValidationError::TooManyLfos {
                count: self.lfos.len(),
                max: LFO_COUNT,
            });
        }
        for (i, lfo) in self.lfos.iter().enumerate() {
            lfo.validate(i, &mut errors);
        }
        self.sequencer.validate(&mut errors);

        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "module config failed validation");
        }
        validation::collect(errors)
    }

    /// Validate and assemble a [`Module`] in this state.
    pub fn build(&self) -> Result<Module, ConfigError> {
        self.validate()?;

        let mut channels: [LfoChannel; LFO_COUNT] =
            core::array::from_fn(|_| LfoChannel::default());
        for (i, (lfo, channel)) in self.lfos.iter().zip(channels.iter_mut()).enumerate() {
            lfo.apply(i, channel)?;
        }
        let clock = ClockSync::with_timeout(self.clock.timeout_secs);
        let sequencer = self.sequencer.build()?;

        Ok(Module::with_parts(channels, clock, sequencer))
    }

    /// Sample rate as the `f32` the audio callback takes.
    pub fn sample_rate_hz(&self) -> f32 {
        self.sample_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamb_core::{ClockRatio, FrequencyRange, LfoShape, SequenceKind, TriggerMode};

    #[test]
    fn test_default_is_valid() {
        let config = ModuleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lfos.len(), LFO_COUNT);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = ModuleConfig::from_toml("").unwrap();
        assert_eq!(config, ModuleConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = ModuleConfig::from_toml(
            r#"
            sample_rate = 44100

            [[lfo]]
            frequency = 3.5
            shape = "triangle"

            [sequencer]
            sequence = "+1-2"
            "#,
        )
        .unwrap();

        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.buffer_size, 128);
        assert_eq!(config.lfos.len(), 1);
        assert_eq!(config.lfos[0].duty, 0.5);
        assert_eq!(config.sequencer.skip.len(), NUM_STEPS);
    }

    #[test]
    fn test_build_applies_values() {
        let config = ModuleConfig::from_toml(
            r#"
            [[lfo]]
            frequency = 300.0
            duty = 0.25
            shape = "triangle"
            range = "high"

            [[lfo]]
            external_clock = true
            ratio = "/3"

            [sequencer]
            frequency = 4.0
            sequence = "up/down"
            skip = [true, false, false, false, false, false, false, true]
            trigger = "gate"
            "#,
        )
        .unwrap();
        let module = config.build().unwrap();

        let a = module.channel(0);
        assert!((a.free_frequency() - 300.0).abs() < 1e-3);
        assert_eq!(a.lfo().shape(), LfoShape::Triangle);
        assert_eq!(a.lfo().range(), FrequencyRange::High);
        assert!((a.lfo().duty() - 0.25).abs() < 1e-6);

        let b = module.channel(1);
        assert!(b.external_clock());
        assert_eq!(b.ratio(), ClockRatio::Div3);

        // Channel C untouched
        assert!((module.channel(2).free_frequency() - 1.0).abs() < 1e-6);

        let voice = module.sequencer();
        assert!((voice.rate() - 4.0).abs() < 1e-6);
        assert_eq!(voice.trigger_mode(), TriggerMode::Gate);
        assert_eq!(voice.sequencer().sequence_kind(), SequenceKind::UpDown);
        assert_eq!(voice.sequencer().skip_bits(), 0b1000_0001);
    }

    #[test]
    fn test_validation_reports_everything() {
        let mut config = ModuleConfig::default();
        config.lfos[0].duty = 1.5;
        config.lfos[1].shape = "sine".to_string();
        config.lfos[2].ratio = "x12".to_string();
        config.sequencer.sequence = "sideways".to_string();
        config.sequencer.skip = vec![false; 3];
        config.sequencer.frequency = 50.0;

        let Err(ValidationError::Multiple(errors)) = config.validate() else {
            panic!("expected multiple errors");
        };
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::BadSkipLength(3)));
        assert!(errors.contains(&ValidationError::UnknownSequence("sideways".to_string())));
    }

    #[test]
    fn test_too_many_lfos() {
        let mut config = ModuleConfig::default();
        config.lfos.push(LfoConfig::default());
        assert_eq!(
            config.validate(),
            Err(ValidationError::TooManyLfos { count: 4, max: 3 })
        );
        assert!(matches!(config.build(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ModuleConfig::default();
        config.lfos[1].external_clock = true;
        config.lfos[1].ratio = "x4".to_string();
        config.sequencer.skip[6] = true;

        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[[lfo]]"));
        assert_eq!(ModuleConfig::from_toml(&toml).unwrap(), config);
    }
}
