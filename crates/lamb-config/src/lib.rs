//! Configuration for the lamb LFO/sequencer module.
//!
//! A module's power-on state (sample rate, three LFO channels, the clock
//! input and the step sequencer) is described in a TOML file, validated in
//! one pass, and turned into a ready-to-run [`lamb_core::Module`].
//!
//! # Features
//!
//! - **Config files**: Load and save [`ModuleConfig`] as TOML
//! - **Validation**: Every problem in a file reported at once
//! - **Build**: Apply a config through the core mutators
//!
//! # Example
//!
//! ```rust
//! use lamb_config::ModuleConfig;
//!
//! let config = ModuleConfig::from_toml(r#"
//!     [[lfo]]
//!     frequency = 2.0
//!     shape = "triangle"
//!
//!     [sequencer]
//!     sequence = "+2-1"
//!     skip = [false, false, false, true, false, false, false, false]
//! "#).unwrap();
//!
//! let module = config.build().unwrap();
//! assert_eq!(module.sequencer().sequencer().skip_bits(), 0b0000_1000);
//! ```

mod error;
mod module_config;

/// Value checks and string parsing for config fields.
pub mod validation;

pub use error::ConfigError;
pub use module_config::{ClockConfig, LfoConfig, ModuleConfig, SequencerConfig};
pub use validation::{ValidationError, ValidationResult};
