// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::process;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vmaf_rc::config::{load_and_validate_config, RuntimeBuilder};
use vmaf_rc::extractors::ExtractorRegistry;
use vmaf_rc::frame::YuvReader;
use vmaf_rc::traits::QualityModel;

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: {} <config.yaml|config.toml> <reference.yuv> <distorted.yuv>", args[0]);
        eprintln!("Example: {} configs/psnr-motion.yaml ref.yuv dist.yuv", args[0]);
        eprintln!("Version: {}", vmaf_rc::version());
        process::exit(1);
    }

    if let Err(e) = run(&args[1], &args[2], &args[3]) {
        eprintln!("❌ {:#}", e);
        process::exit(1);
    }
}

fn run(config_path: &str, reference_path: &str, distorted_path: &str) -> Result<()> {
    let registry = Arc::new(ExtractorRegistry::builtin());
    let config = load_and_validate_config(config_path, &registry)
        .with_context(|| format!("Failed to load configuration '{}'", config_path))?;
    let geometry = config
        .frame_geometry()
        .context("Raw input needs a 'frame' section with width, height and bit_depth")?;

    let (mut session, model, pooling) = RuntimeBuilder::from_config(&config, Arc::clone(&registry))?;
    let mut reference = YuvReader::open(reference_path, geometry)
        .with_context(|| format!("Failed to open reference '{}'", reference_path))?;
    let mut distorted = YuvReader::open(distorted_path, geometry)
        .with_context(|| format!("Failed to open distorted '{}'", distorted_path))?;

    let started = Instant::now();
    let mut frames = 0u32;
    loop {
        let pair = (
            reference.next_picture().context("Failed to read reference frame")?,
            distorted.next_picture().context("Failed to read distorted frame")?,
        );
        match pair {
            (Some(reference), Some(distorted)) => {
                session.submit_frame_pair(reference, distorted, frames)?;
                frames += 1;
            }
            (None, None) => break,
            _ => {
                tracing::warn!(frames, "Inputs differ in length, stopping after {} frame(s)", frames);
                break;
            }
        }
    }
    if frames == 0 {
        bail!("No frames read from '{}'", reference_path);
    }
    session.drain()?;

    if let Some(model) = &model {
        let score = session.score_pooled(model, pooling, 0, frames)?;
        println!("{} ({}): {:.6}", model.name(), pooling, score);
    }

    if let Some(path) = &config.output.path {
        let file = File::create(path).with_context(|| format!("Failed to create '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);
        session.write_output(&mut writer, &config.output.format)?;
        writer
            .flush()
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        if config.output.format.is_known() {
            println!("📄 Report written to {} ({})", path.display(), config.output.format);
        } else {
            tracing::warn!(
                format = %config.output.format,
                "Unrecognized output format '{}', nothing written",
                config.output.format
            );
        }
    }

    session.close()?;
    tracing::info!(
        frames,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Processed {} frame pair(s) in {:?}",
        frames,
        started.elapsed()
    );
    Ok(())
}
