//! `AutoGen.h` rendering.

use std::fmt::Write;

use indexmap::IndexSet;

use crate::{
    autogen::notice,
    registry::Registry,
    surface::{LibraryClassUsage, ModuleView, PackageRef},
    Error, Result,
};

/// Name of the legacy flash-map header inside the output directory.
pub const FLASH_MAP_HEADER: &str = "TianoR8FlashMap.h";

/// Include guard symbol for a module, derived from its GUID.
#[must_use]
pub fn include_guard(view: &ModuleView<'_>) -> String {
    let guid = view.descriptor().id.guid.to_string().to_ascii_uppercase();
    format!("_AUTOGENH_{}", guid.replace('-', "_"))
}

/// Header paths a module includes, in include order.
///
/// The module's own packages contribute the header registered for its module type; then every
/// library class the module consumes or produces contributes its class header, taken from the
/// first of those packages that declares the class. Duplicates keep their first position.
///
/// # Errors
/// Returns [`Error::PackageNotFound`] if a package the module lists is not registered and
/// [`Error::LibraryClassNotFound`] if none of the module's packages declares a header for a class.
pub fn includes<'r>(view: &ModuleView<'_>, registry: &'r Registry) -> Result<IndexSet<&'r str>> {
    let packages: Vec<PackageRef> = view.packages().cloned().collect();
    let mut headers = IndexSet::new();

    for package in &packages {
        if let Some(header) = registry.package_header(package, view.module_type())? {
            headers.insert(header);
        }
    }

    for usage in [LibraryClassUsage::Consumed, LibraryClassUsage::Produced] {
        for class in view.library_classes(usage) {
            let header = registry
                .library_class_header(class, &packages)?
                .ok_or_else(|| Error::LibraryClassNotFound(class.to_string()))?;
            headers.insert(header);
        }
    }

    Ok(headers)
}

/// Renders `AutoGen.h`.
pub(crate) fn render(view: &ModuleView<'_>, registry: &Registry, pcd: &str) -> Result<String> {
    let guard = include_guard(view);
    let mut out = notice("AutoGen.h");
    let _ = write!(out, "#ifndef {guard}\n#define {guard}\n\n");

    for version in view.spec_versions() {
        let _ = writeln!(out, "#define {version}");
    }
    for header in includes(view, registry)? {
        let _ = writeln!(out, "#include <{header}>");
    }
    out.push('\n');

    if view.flash_map() {
        let _ = writeln!(out, "#include  <{FLASH_MAP_HEADER}>");
    }

    out.push('\n');
    out.push_str(pcd);
    out.push_str("#endif\n");
    Ok(out)
}
