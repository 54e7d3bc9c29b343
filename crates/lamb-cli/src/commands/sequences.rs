//! Sequence selector table.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use lamb_core::{SEQUENCE_SLOTS, SequenceKind};

#[derive(Args)]
pub struct SequencesArgs {
    /// Show the first steps of each sequence from step 0
    #[arg(long)]
    preview: bool,
}

pub fn run(args: SequencesArgs) -> anyhow::Result<()> {
    println!("Sequences");
    println!("=========");
    println!();
    println!("  {:4}  {:8}  {}", "Slot", "Name", "Direction");
    println!("  {:4}  {:8}  {}", "----", "--------", "---------");

    for kind in SequenceKind::ALL {
        let direction = if kind.uses_direction() { "yes" } else { "no" };
        println!("  {:4}  {:8}  {}", kind.index(), kind.name(), direction);
        if args.preview && kind != SequenceKind::Random {
            println!("        {}", preview(kind));
        }
    }
    for slot in SequenceKind::COUNT..SEQUENCE_SLOTS {
        println!("  {:4}  {:8}  {}", slot, "reserved", "-");
    }

    Ok(())
}

/// First sixteen steps of `kind` with nothing skipped.
fn preview(kind: SequenceKind) -> String {
    let mut sequencer = lamb_core::Sequencer::new();
    sequencer.set_sequence_kind(kind);
    let steps: Vec<String> = std::iter::once(sequencer.current_step())
        .chain((0..15).map(|_| sequencer.advance()))
        .map(|s| s.to_string())
        .collect();
    steps.join(" ")
}
