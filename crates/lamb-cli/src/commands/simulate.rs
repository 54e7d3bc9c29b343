//! Offline module simulation.
//!
//! Runs the module buffer by buffer the way an audio callback would, with
//! optional clock pulses at a fixed period, and reports every step change.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use lamb_core::{CHANNEL_NAMES, LFO_COUNT, Module, NUM_STEPS, StepEvent, StepPins, dac_code};

#[derive(Args)]
pub struct SimulateArgs {
    /// Config file describing the module (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Length of the run in seconds
    #[arg(short, long, default_value = "4.0")]
    seconds: f64,

    /// Override the sample rate
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Override the buffer size
    #[arg(long)]
    buffer_size: Option<usize>,

    /// Send a clock pulse every SECS seconds
    #[arg(long, value_name = "SECS")]
    clock_period: Option<f64>,

    /// Override the sequence (name or slot number)
    #[arg(long)]
    sequence: Option<String>,

    /// Comma-separated steps to skip, e.g. "1,3"
    #[arg(long, value_name = "LIST")]
    skip: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

/// One step change seen during the run.
struct StepRecord {
    sample: u64,
    from: usize,
    to: usize,
}

pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.seconds.is_finite() && args.seconds > 0.0,
        "--seconds must be positive, got {}",
        args.seconds
    );
    if let Some(period) = args.clock_period {
        anyhow::ensure!(
            period.is_finite() && period > 0.0,
            "--clock-period must be positive, got {period}"
        );
    }

    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(rate) = args.sample_rate {
        config.sample_rate = rate;
    }
    if let Some(size) = args.buffer_size {
        config.buffer_size = size;
    }
    if let Some(sequence) = &args.sequence {
        config.sequencer.sequence.clone_from(sequence);
    }
    if let Some(list) = &args.skip {
        config.sequencer.skip = parse_skip_list(list)?.to_vec();
    }

    let mut module = config.build().context("config is invalid")?;
    if let Some(period) = args.clock_period {
        let sample_period = 1.0 / f64::from(config.sample_rate);
        anyhow::ensure!(
            period >= sample_period,
            "--clock-period {period} is shorter than one sample ({sample_period} s)"
        );
    }
    let sample_rate = config.sample_rate_hz();
    let total_frames = (args.seconds * f64::from(config.sample_rate)).round() as u64;

    tracing::info!(
        sample_rate = config.sample_rate,
        buffer_size = config.buffer_size,
        seconds = args.seconds,
        sequence = module.sequencer().sequencer().sequence_kind().name(),
        "starting simulation"
    );

    if args.clock_period.is_some() && !module.channels().iter().any(|c| c.external_clock()) {
        tracing::warn!("clock pulses requested but no LFO has external_clock enabled");
    }
    if module.sequencer().sequencer().all_skipped() {
        tracing::warn!("every step is skipped; the sequencer will hold");
    }

    let steps = simulate(
        &mut module,
        sample_rate,
        config.buffer_size,
        total_frames,
        args.clock_period,
    );

    tracing::debug!(steps = steps.len(), "simulation finished");

    if args.json {
        print_json(&module, &steps, config.sample_rate, args.seconds)
    } else {
        print_text(&module, &steps, config.sample_rate, args.seconds);
        Ok(())
    }
}

/// Drive `module` for `total_frames` samples and collect every step change.
fn simulate(
    module: &mut Module,
    sample_rate: f32,
    buffer_size: usize,
    total_frames: u64,
    clock_period: Option<f64>,
) -> Vec<StepRecord> {
    let mut a = vec![0.0_f32; buffer_size];
    let mut b = vec![0.0_f32; buffer_size];
    let mut c = vec![0.0_f32; buffer_size];

    let mut steps = Vec::new();
    let mut pulse_index = 0_u64;
    let mut remaining = total_frames;

    while remaining > 0 {
        // At most one pulse per sample of the coming buffer
        if let Some(period) = clock_period {
            for _ in 0..buffer_size {
                let at = pulse_index as f64 * period;
                if at > module.elapsed_seconds() {
                    break;
                }
                module.clock_pulse_at(at);
                pulse_index += 1;
            }
        }

        let frames = usize::try_from(remaining).map_or(buffer_size, |r| r.min(buffer_size));
        module.process(
            sample_rate,
            [&mut a[..frames], &mut b[..frames], &mut c[..frames]],
            |event: StepEvent| {
                steps.push(StepRecord {
                    sample: event.sample_index,
                    from: event.from,
                    to: event.to,
                });
            },
        );
        remaining -= frames as u64;
    }

    steps
}

/// Parse `"1,3,5"` into a skip mask. An empty list skips nothing.
fn parse_skip_list(list: &str) -> anyhow::Result<[bool; NUM_STEPS]> {
    let mut mask = [false; NUM_STEPS];
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let step: usize = item
            .parse()
            .with_context(|| format!("invalid step '{item}' in --skip"))?;
        anyhow::ensure!(
            step < NUM_STEPS,
            "step {step} in --skip is out of range (0-{})",
            NUM_STEPS - 1
        );
        mask[step] = true;
    }
    Ok(mask)
}

/// Step pins as a string, most significant bit first.
fn pin_bits(step: usize) -> String {
    StepPins::encode(step)
        .iter()
        .rev()
        .map(|&high| if high { '1' } else { '0' })
        .collect()
}

fn print_text(module: &Module, steps: &[StepRecord], sample_rate: u32, seconds: f64) {
    let sequencer = module.sequencer();
    let skip: String = (0..NUM_STEPS)
        .map(|i| {
            if sequencer.sequencer().is_skipped(i) {
                'x'
            } else {
                '-'
            }
        })
        .collect();

    println!("Simulation: {seconds:.3} s at {sample_rate} Hz");
    println!(
        "Sequence: {}  Skip: {}  Trigger: {}  Rate: {:.2} Hz",
        sequencer.sequencer().sequence_kind().name(),
        skip,
        sequencer.trigger_mode().name(),
        sequencer.rate()
    );
    println!();
    println!("  {:>9}  {:>9}  {:>6}  {}", "Time (s)", "Sample", "Step", "Pins");
    for record in steps {
        println!(
            "  {:>9.4}  {:>9}  {} -> {}  {}",
            record.sample as f64 / f64::from(sample_rate),
            record.sample,
            record.from,
            record.to,
            pin_bits(record.to)
        );
    }

    println!();
    println!("LFOs:");
    for (i, channel) in module.channels().iter().enumerate() {
        let lfo = channel.lfo();
        let source = if channel.is_synced(module.clock()) {
            format!("clock {}", channel.ratio().label())
        } else {
            "free".to_string()
        };
        println!(
            "  {}  {:8}  {:>10.4} Hz  duty {:.2}  {:12}  DAC {}",
            CHANNEL_NAMES[i],
            lfo.shape().name(),
            lfo.frequency(),
            lfo.duty(),
            source,
            dac_code(lfo.value())
        );
    }

    println!();
    let clock = module.clock();
    match clock.measured_period() {
        Some(period) if clock.is_valid() => {
            println!("Clock: valid, period {period:.4} s");
        }
        _ => println!("Clock: none"),
    }
    println!(
        "Steps: {} changes, final step {}",
        steps.len(),
        module.current_step()
    );
}

fn print_json(
    module: &Module,
    steps: &[StepRecord],
    sample_rate: u32,
    seconds: f64,
) -> anyhow::Result<()> {
    let steps: Vec<serde_json::Value> = steps
        .iter()
        .map(|record| {
            serde_json::json!({
                "time": record.sample as f64 / f64::from(sample_rate),
                "sample": record.sample,
                "from": record.from,
                "to": record.to,
                "pins": StepPins::encode(record.to),
            })
        })
        .collect();

    let lfos: Vec<serde_json::Value> = (0..LFO_COUNT)
        .map(|i| {
            let channel = module.channel(i);
            let lfo = channel.lfo();
            serde_json::json!({
                "name": CHANNEL_NAMES[i],
                "shape": lfo.shape().name(),
                "frequency": lfo.frequency(),
                "duty": lfo.duty(),
                "synced": channel.is_synced(module.clock()),
                "ratio": channel.ratio().label(),
                "dac": dac_code(lfo.value()),
            })
        })
        .collect();

    let clock = module.clock();
    let sequencer = module.sequencer();
    let report = serde_json::json!({
        "sample_rate": sample_rate,
        "seconds": seconds,
        "sequence": sequencer.sequencer().sequence_kind().name(),
        "skip_mask": sequencer.sequencer().skip_bits(),
        "steps": steps,
        "final_step": module.current_step(),
        "lfos": lfos,
        "clock": {
            "valid": clock.is_valid(),
            "period": clock.measured_period(),
            "frequency": clock.measured_frequency(),
        },
    });

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamb_config::ModuleConfig;

    #[test]
    fn test_parse_skip_list() {
        let mask = parse_skip_list("1, 3,7").unwrap();
        assert_eq!(
            mask,
            [false, true, false, true, false, false, false, true]
        );
        assert_eq!(parse_skip_list("").unwrap(), [false; NUM_STEPS]);
        assert!(parse_skip_list("8").is_err());
        assert!(parse_skip_list("two").is_err());
    }

    #[test]
    fn test_pin_bits_msb_first() {
        assert_eq!(pin_bits(0), "000");
        assert_eq!(pin_bits(1), "001");
        assert_eq!(pin_bits(6), "110");
    }

    #[test]
    fn test_simulate_counts_steps() {
        let config = ModuleConfig::from_toml(
            "sample_rate = 1000\nbuffer_size = 64\n[sequencer]\nfrequency = 2.0",
        )
        .unwrap();
        let mut module = config.build().unwrap();
        // 2 Hz for 1.9 s: edges at 0.0, 0.5, 1.0 and 1.5 s
        let steps = simulate(&mut module, 1000.0, 64, 1900, None);
        assert_eq!(steps.len(), 4);
        let to: Vec<usize> = steps.iter().map(|r| r.to).collect();
        assert_eq!(to, vec![1, 2, 3, 4]);
        assert_eq!(module.elapsed_samples(), 1900);
    }

    #[test]
    fn test_simulate_bounds_pulses_for_tiny_period() {
        let mut module = ModuleConfig::default().build().unwrap();
        let steps = simulate(&mut module, 1000.0, 64, 128, Some(1e-20));
        assert_eq!(module.elapsed_samples(), 128);
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn test_simulate_locks_clock() {
        let config = ModuleConfig::from_toml(
            "sample_rate = 1000\nbuffer_size = 50\n[[lfo]]\nexternal_clock = true\nratio = \"x2\"",
        )
        .unwrap();
        let mut module = config.build().unwrap();
        simulate(&mut module, 1000.0, 50, 1000, Some(0.25));

        assert!(module.clock().is_valid());
        let period = module.clock().measured_period().unwrap();
        assert!((period - 0.25).abs() < 1e-9);
        assert!(module.channel(0).is_synced(module.clock()));
        assert!((module.channel(0).lfo().frequency() - 8.0).abs() < 1e-3);
    }
}
