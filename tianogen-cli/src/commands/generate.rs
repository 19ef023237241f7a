use std::path::Path;

use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use tianogen::{
    autogen::{AUTOGEN_HEADER, AUTOGEN_SOURCE},
    prelude::*,
};

use crate::{
    app::GlobalOptions,
    commands::common::{find_module, load_workspace, parse_arch, parse_unload_policy},
    output::{print_output, Listing, NONE},
};

pub struct GenerateOptions<'a> {
    pub arch: &'a str,
    pub module: Option<&'a str>,
    pub all: bool,
    pub output: &'a Path,
    pub fv_dir: Option<&'a Path>,
    pub unload_policy: &'a str,
    pub pcd_header: Option<&'a Path>,
    pub pcd_source: Option<&'a Path>,
    pub global: &'a GlobalOptions,
}

#[derive(Debug, Serialize)]
pub struct GeneratedFile {
    pub path: String,
    pub written: bool,
}

#[derive(Debug, Serialize)]
pub struct GeneratedModule {
    pub module: String,
    pub arch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<GeneratedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<GeneratedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GeneratedModule {
    fn new(module: &str, arch: Arch, result: tianogen::Result<GenerationReport>) -> Self {
        let file = |file: OutputFile| GeneratedFile {
            path: file.path.display().to_string(),
            written: file.outcome == WriteOutcome::Written,
        };
        match result {
            Ok(report) => GeneratedModule {
                module: report.module,
                arch: report.arch.to_string(),
                header: Some(file(report.header)),
                source: Some(file(report.source)),
                error: None,
            },
            Err(error) => GeneratedModule {
                module: module.to_string(),
                arch: arch.to_string(),
                header: None,
                source: None,
                error: Some(format!("{} error: {error}", error.category())),
            },
        }
    }
}

fn state(file: Option<&GeneratedFile>) -> &'static str {
    match file {
        Some(file) if file.written => "written",
        Some(_) => "unchanged",
        None => NONE,
    }
}

pub fn run(path: &Path, opts: &GenerateOptions<'_>) -> anyhow::Result<()> {
    let registry = load_workspace(path)?;
    let arch = parse_arch(opts.arch)?;

    let mut config = AutoGenConfig {
        unload_policy: parse_unload_policy(opts.unload_policy)?,
        ..AutoGenConfig::default()
    };
    if let Some(dir) = opts.fv_dir {
        config = config.with_flash_map_dir(dir);
    }
    let pcd = PcdFragments::from_files(opts.pcd_header, opts.pcd_source)
        .context("failed to read PCD fragments")?;
    let autogen = AutoGen::with_config(&registry, config);

    let results: Vec<GeneratedModule> = if opts.all {
        autogen
            .generate_all(arch, opts.output, &pcd)
            .into_iter()
            .map(|outcome| GeneratedModule::new(&outcome.module.id.name, arch, outcome.result))
            .collect()
    } else {
        let name = opts
            .module
            .ok_or_else(|| anyhow!("either --module or --all is required"))?;
        let module = find_module(&registry, name)?;
        vec![GeneratedModule::new(
            name,
            arch,
            autogen.generate(module, arch, opts.output, &pcd),
        )]
    };

    print_output(&results, opts.global, |results| {
        let mut table = Listing::new(&["MODULE", "ARCH", AUTOGEN_HEADER, AUTOGEN_SOURCE, "ERROR"]);
        for result in results {
            table.row([
                result.module.as_str(),
                result.arch.as_str(),
                state(result.header.as_ref()),
                state(result.source.as_ref()),
                result.error.as_deref().unwrap_or_default(),
            ]);
        }
        table.print();
    })?;

    let failed = results.iter().filter(|result| result.error.is_some()).count();
    if failed > 0 {
        bail!("{failed} of {} module(s) failed", results.len());
    }
    Ok(())
}
