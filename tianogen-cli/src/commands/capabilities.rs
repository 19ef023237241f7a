use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tianogen::prelude::*;

use crate::{
    app::GlobalOptions,
    commands::common::{find_module, library_order, load_workspace, parse_arch},
    output::{heading, print_output, Listing},
};

#[derive(Debug, Serialize)]
pub struct CapabilityInfo {
    pub kind: String,
    pub keyword: String,
    pub cname: String,
    pub guid: String,
}

#[derive(Debug, Serialize)]
pub struct CapabilitiesInfo {
    pub module: String,
    pub arch: String,
    pub packages: Vec<String>,
    pub capabilities: Vec<CapabilityInfo>,
}

fn package_name(registry: &Registry, reference: &PackageRef) -> String {
    registry
        .package(reference)
        .map_or_else(|| reference.to_string(), |package| package.id.name.clone())
}

pub fn run(path: &Path, arch: &str, module: &str, opts: &GlobalOptions) -> anyhow::Result<()> {
    let registry = load_workspace(path)?;
    let arch = parse_arch(arch)?;
    let module = find_module(&registry, module)?;
    let order = library_order(&registry, module, arch)?;

    let set = CapabilitySet::collect(&ModuleView::new(module, arch), &order);
    let resolved = ResolvedCapabilities::resolve(&set, &registry)
        .with_context(|| format!("failed to resolve capabilities of {}", module.id.name))?;

    let mut capabilities = Vec::with_capacity(resolved.len());
    for kind in [
        CapabilityKind::Protocol,
        CapabilityKind::Ppi,
        CapabilityKind::Guid,
    ] {
        capabilities.extend(resolved.entries(kind).iter().map(|entry| CapabilityInfo {
            kind: kind.to_string(),
            keyword: entry.keyword.clone(),
            cname: entry.cname.clone(),
            guid: entry.guid.to_string(),
        }));
    }

    let info = CapabilitiesInfo {
        module: module.id.name.clone(),
        arch: arch.to_string(),
        packages: set
            .packages()
            .iter()
            .map(|reference| package_name(&registry, reference))
            .collect(),
        capabilities,
    };

    print_output(&info, opts, |info| {
        heading(&info.module, &info.arch, None);
        println!("Packages: {}", info.packages.join(", "));
        println!();

        let mut table = Listing::new(&["KIND", "KEYWORD", "CNAME", "GUID"]);
        for capability in &info.capabilities {
            table.row([
                capability.kind.as_str(),
                capability.keyword.as_str(),
                capability.cname.as_str(),
                capability.guid.as_str(),
            ]);
        }
        table.indent("  ").print();
    })
}
