use std::env;

use anyhow::Context;
use utxo_policy::{Checkpoint, CheckpointRegistry, CoreConfig};

fn main() -> anyhow::Result<()> {
    // Initialize logger (set RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = CoreConfig::from_env();
    config.validate()?;

    // CHECKPOINT_FILE overrides the embedded blob for the configured profile
    let checkpoint = match env::var("CHECKPOINT_FILE") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading checkpoint file {}", path))?;
            CheckpointRegistry::embedded()
                .with_blob(config.network, config.checkpoint_profile, raw)
                .get(config.network, config.checkpoint_profile)?
        }
        Err(_) => CheckpointRegistry::global().get(config.network, config.checkpoint_profile)?,
    };

    let pow_policy = config.network_params().pow_policy;
    for block in checkpoint.blocks() {
        if let Err(e) = pow_policy.check(&block.header) {
            log::warn!("⚠️  Block {} at height {}: {}", block.hash(), block.height, e);
        }
    }

    print_summary(&config, &checkpoint);
    Ok(())
}

fn print_summary(config: &CoreConfig, checkpoint: &Checkpoint) {
    let anchor = &checkpoint.anchor_block;
    let tip = checkpoint.tip();

    println!("network:       {}", config.network);
    println!("profile:       {}", config.checkpoint_profile);
    println!("anchor height: {}", anchor.height);
    println!("anchor hash:   {}", anchor.hash());
    println!("anchor time:   {}", anchor.header.timestamp);
    println!("tip height:    {}", tip.height);
    println!("blocks:        {}", checkpoint.block_count());
}
