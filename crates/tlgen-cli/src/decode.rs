//! `decode` command: hex input through the reference codec to JSON

use crate::generate::Inputs;
use anyhow::{Context, Result};
use tlgen_wire::{Codec, Registry, TlCodec};

/// Hex text to bytes, tolerating whitespace and a `0x` prefix.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(digits).context("Invalid hex input")
}

/// Decode command implementation
pub fn run(inputs: Inputs, hex: &str) -> Result<()> {
    if inputs.sources.is_empty() {
        anyhow::bail!("decode needs at least one schema (-l LAYER=PATH or a manifest)");
    }

    let bytes = parse_hex(hex)?;
    let registry = Registry::from_sources(&inputs.sources, inputs.config.ignore_core)
        .context("Failed to load schema")?;
    tracing::debug!(constructors = registry.len(), bytes = bytes.len(), "decoding");

    let object = TlCodec::new(registry)
        .decode(&bytes)
        .context("Decoding failed")?;
    println!("{}", object.to_json()?);

    Ok(())
}
