mod app;
mod commands;
mod output;

use anyhow::Context;
use clap::Parser;

use crate::app::{Cli, Command};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .context("failed to set Ctrl+C handler")?;

    let cli = Cli::parse();

    // Show tianogen info+ on stderr unless --json; --verbose enables debug; RUST_LOG overrides
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("tianogen", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    match &cli.command {
        Command::Generate {
            path,
            arch,
            module,
            all,
            output,
            fv_dir,
            unload_policy,
            pcd_header,
            pcd_source,
        } => commands::generate::run(
            path,
            &commands::generate::GenerateOptions {
                arch,
                module: module.as_deref(),
                all: *all,
                output,
                fv_dir: fv_dir.as_deref(),
                unload_policy,
                pcd_header: pcd_header.as_deref(),
                pcd_source: pcd_source.as_deref(),
                global: &cli.global,
            },
        ),
        Command::Order { path, arch, module } => {
            commands::order::run(path, arch, module, &cli.global)
        }
        Command::Capabilities { path, arch, module } => {
            commands::capabilities::run(path, arch, module, &cli.global)
        }
    }
}
