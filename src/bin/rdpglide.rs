// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Developer CLI for the combiner translation
//!
//! Decodes a `G_SETCOMBINE` word pair, derives the Glide state for it and
//! prints the result as JSON, or prints the effective configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use rdpglide::core::{CombineMode, Config, CycleType, NullBackend, RdpCombine, RenderContext};
use serde::Serialize;

/// N64 RDP to Glide combiner inspector
#[derive(Parser)]
#[command(name = "rdpglide")]
#[command(about = "Inspect RDP combine translation", long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive the combiner state for a G_SETCOMBINE word pair
    Combine {
        /// High word (hex, 0x prefix optional)
        #[arg(value_parser = parse_hex)]
        w0: u32,

        /// Low word (hex, 0x prefix optional)
        #[arg(value_parser = parse_hex)]
        w1: u32,

        /// Cycle type
        #[arg(long, value_enum, default_value = "one")]
        cycle: CycleArg,

        /// Primitive color (0xRRGGBBAA)
        #[arg(long, value_parser = parse_hex, default_value = "0")]
        prim: u32,

        /// Environment color (0xRRGGBBAA)
        #[arg(long, value_parser = parse_hex, default_value = "0")]
        env: u32,

        /// Primitive LOD fraction
        #[arg(long, default_value = "0")]
        lod_frac: u8,

        /// Also log the backend calls the state produces
        #[arg(long)]
        apply: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum CycleArg {
    One,
    Two,
    Copy,
    Fill,
}

impl From<CycleArg> for CycleType {
    fn from(arg: CycleArg) -> Self {
        match arg {
            CycleArg::One => CycleType::One,
            CycleArg::Two => CycleType::Two,
            CycleArg::Copy => CycleType::Copy,
            CycleArg::Fill => CycleType::Fill,
        }
    }
}

fn parse_hex(value: &str) -> Result<u32, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex value '{}': {}", value, e))
}

/// JSON report for `combine`
#[derive(Serialize)]
struct CombineReport<'a> {
    input: &'a RdpCombine,
    outcome: rdpglide::core::CombineOutcome,
    state: &'a rdpglide::core::CombinerState,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional; RUST_LOG may come from it
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    info!("rdpglide v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path).map_err(|e| {
            error!("Failed to load config: {}", e);
            e
        })?,
        None => Config::default(),
    };

    match args.command {
        Command::Combine {
            w0,
            w1,
            cycle,
            prim,
            env,
            lod_frac,
            apply,
        } => {
            let mut ctx = RenderContext::new(config);
            let rdp = RdpCombine {
                prim_color: prim,
                env_color: env,
                prim_lod_frac: lod_frac,
                ..RdpCombine::new(CombineMode::from_words(w0, w1), cycle.into())
            };
            info!("Combine {:08X}:{:08X}", w0, w1);

            let outcome = ctx.combine(&rdp);
            if apply {
                let mut backend = NullBackend::new();
                ctx.apply(&mut backend);
                info!("{} backend calls", backend.calls());
            }

            let report = CombineReport {
                input: &rdp,
                outcome,
                state: ctx.state(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
