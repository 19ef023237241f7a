use std::{path::Path, str::FromStr};

use anyhow::{anyhow, Context};
use tianogen::prelude::*;

/// Load a workspace document into a registry.
pub fn load_workspace(path: &Path) -> anyhow::Result<Registry> {
    Registry::from_path(path)
        .with_context(|| format!("failed to load workspace: {}", path.display()))
}

/// Parse an architecture name, case-insensitively.
pub fn parse_arch(name: &str) -> anyhow::Result<Arch> {
    Arch::from_str(&name.to_ascii_uppercase())
        .map_err(|_| anyhow!("unknown architecture '{name}' (expected IA32, X64, IPF, or EBC)"))
}

/// Parse an unload policy name.
pub fn parse_unload_policy(name: &str) -> anyhow::Result<UnloadPolicy> {
    UnloadPolicy::from_str(name)
        .map_err(|_| anyhow!("unknown unload policy '{name}' (expected run-all or stop-on-error)"))
}

/// Look up a module by base name.
pub fn find_module<'a>(registry: &'a Registry, name: &str) -> anyhow::Result<&'a ModuleDescriptor> {
    Ok(registry.require_module(name)?)
}

/// Library instances of `module` in constructor order.
pub fn library_order<'a>(
    registry: &'a Registry,
    module: &ModuleDescriptor,
    arch: Arch,
) -> anyhow::Result<LibraryOrder<'a>> {
    LibraryOrder::resolve(&ModuleView::new(module, arch), registry)
        .with_context(|| format!("failed to order library instances of {}", module.id.name))
}
