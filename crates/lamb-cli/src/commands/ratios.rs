//! Clock ratio table.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use lamb_core::{ClockRatio, MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ};

#[derive(Args)]
pub struct RatiosArgs {
    /// Also show the LFO frequency each ratio gives for this clock rate (Hz)
    #[arg(long, value_name = "HZ")]
    clock_hz: Option<f32>,
}

pub fn run(args: RatiosArgs) -> anyhow::Result<()> {
    if let Some(hz) = args.clock_hz {
        anyhow::ensure!(
            hz.is_finite() && hz > 0.0,
            "clock rate must be positive, got {hz}"
        );
    }

    println!("Clock Ratios");
    println!("============");
    println!();
    match args.clock_hz {
        Some(hz) => {
            println!("  {:5}  {:5}  {:10}  {}", "Index", "Label", "Multiplier", "LFO Hz");
            println!("  {:5}  {:5}  {:10}  {}", "-----", "-----", "----------", "------");
            for ratio in ClockRatio::ALL {
                let lfo_hz = (hz * ratio.multiplier()).clamp(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ);
                println!(
                    "  {:5}  {:5}  {:10.4}  {:.4}",
                    ratio.index(),
                    ratio.label(),
                    ratio.multiplier(),
                    lfo_hz
                );
            }
        }
        None => {
            println!("  {:5}  {:5}  {}", "Index", "Label", "Multiplier");
            println!("  {:5}  {:5}  {}", "-----", "-----", "----------");
            for ratio in ClockRatio::ALL {
                println!(
                    "  {:5}  {:5}  {:.4}",
                    ratio.index(),
                    ratio.label(),
                    ratio.multiplier()
                );
            }
        }
    }

    Ok(())
}
