//! AutoGen glue-code generation.
//!
//! A generation pass turns one module of a [`Registry`] into the two files its build compiles
//! alongside the module sources: `AutoGen.h` (include guard, specification defines, package and
//! library-class includes) and `AutoGen.c` (driver-model tables, lifecycle event tables, GUID
//! globals, library constructor/destructor dispatchers and the entry-point dispatcher).
//!
//! # Pipeline
//!
//! 1. [`LibraryOrder`] - transitive library instances in constructor order
//! 2. [`CapabilitySet`] - union of the module's and its libraries' declarations
//! 3. [`ResolvedCapabilities`] - keywords mapped to C symbols and GUID values
//! 4. [`CodeShape`] - module-type specific dispatchers, picked by [`shape_for`]
//! 5. [`write_if_changed`] - outputs only touched when their content changes
//!
//! Every pass reads the registry through its own [`ModuleView`]; nothing is shared or mutated
//! between passes, so [`AutoGen::generate_all`] runs them in parallel.
//!
//! # Examples
//!
//! ```rust,ignore
//! use tianogen::prelude::*;
//!
//! let registry = Registry::from_path(Path::new("workspace.xml"))?;
//! let autogen = AutoGen::new(&registry);
//! let module = registry.require_module("HelloWorld")?;
//! let report = autogen.generate(module, Arch::X64, Path::new("Build/HelloWorld"), &PcdFragments::default())?;
//! println!("{report}");
//! ```

mod aggregate;
mod config;
mod header;
mod order;
mod pcd;
mod resolve;
mod shape;
mod source;
mod writer;

pub use aggregate::{CapabilitySet, LibraryHook};
pub use config::AutoGenConfig;
pub use header::{include_guard, includes, FLASH_MAP_HEADER};
pub use order::LibraryOrder;
pub use pcd::PcdFragments;
pub use resolve::{c_initializer, ResolvedCapabilities, ResolvedGuid};
pub use shape::{shape_for, CodeShape, EntryPoints, LibraryConvention, UnloadPolicy};
pub use source::DriverModelProtocols;
pub use writer::{copy_if_newer, write_if_changed, WriteOutcome};

use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use rayon::prelude::*;

use crate::{
    registry::Registry,
    surface::{Arch, ModuleDescriptor, ModuleView},
    Error, Result,
};

/// File name of the generated header.
pub const AUTOGEN_HEADER: &str = "AutoGen.h";
/// File name of the generated source.
pub const AUTOGEN_SOURCE: &str = "AutoGen.c";
/// File name of the legacy flash-map header inside the firmware-volume directory.
pub const FLASH_MAP_SOURCE: &str = "FlashMap.h";

pub(crate) fn notice(file: &str) -> String {
    format!(
        "/**\n  DO NOT EDIT\n  FILE auto-generated by tianogen\n  Module name:\n    {file}\n  \
         Abstract:\n    Auto-generated {file} for building module or library.\n**/\n\n"
    )
}

/// Both generated buffers of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAutoGen {
    /// Content of `AutoGen.h`
    pub header: String,
    /// Content of `AutoGen.c`
    pub source: String,
}

/// One generated file and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Path of the file
    pub path: PathBuf,
    /// Whether the file was rewritten
    pub outcome: WriteOutcome,
}

/// Result of a successful generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Module base name
    pub module: String,
    /// Architecture the module was generated for
    pub arch: Arch,
    /// `AutoGen.h`
    pub header: OutputFile,
    /// `AutoGen.c`
    pub source: OutputFile,
}

impl GenerationReport {
    /// Returns `true` if neither file had to be rewritten.
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.header.outcome == WriteOutcome::Unchanged
            && self.source.outcome == WriteOutcome::Unchanged
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]:", self.module, self.arch)?;
        for file in [&self.header, &self.source] {
            let state = match file.outcome {
                WriteOutcome::Written => "written",
                WriteOutcome::Unchanged => "unchanged",
            };
            write!(f, " {} {state}", file.path.display())?;
        }
        Ok(())
    }
}

/// Outcome of one module inside [`AutoGen::generate_all`].
#[derive(Debug)]
pub struct ModuleOutcome<'a> {
    /// The module
    pub module: &'a ModuleDescriptor,
    /// Its generation result
    pub result: Result<GenerationReport>,
}

/// The AutoGen engine over one registry.
#[derive(Debug, Clone)]
pub struct AutoGen<'a> {
    registry: &'a Registry,
    config: AutoGenConfig,
}

impl<'a> AutoGen<'a> {
    /// Creates an engine with [`AutoGenConfig::default`].
    #[must_use]
    pub fn new(registry: &'a Registry) -> Self {
        Self::with_config(registry, AutoGenConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    #[must_use]
    pub fn with_config(registry: &'a Registry, config: AutoGenConfig) -> Self {
        AutoGen { registry, config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &AutoGenConfig {
        &self.config
    }

    /// The registry modules are resolved against.
    #[must_use]
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Renders both files of `module` without touching the filesystem.
    ///
    /// # Arguments
    /// * `module` - The module to generate, library instances included
    /// * `arch` - Architecture whose declarations apply
    /// * `pcd` - Fragments appended verbatim to both files
    ///
    /// # Errors
    /// Any configuration or resolution error of the module; see [`Error`].
    pub fn render(
        &self,
        module: &ModuleDescriptor,
        arch: Arch,
        pcd: &PcdFragments,
    ) -> Result<RenderedAutoGen> {
        let view = ModuleView::new(module, arch);
        let header = header::render(&view, self.registry, &pcd.header)?;

        let source = if view.is_library() {
            source::render_library(&pcd.source)
        } else {
            let order = LibraryOrder::resolve(&view, self.registry)?;
            let capabilities = CapabilitySet::collect(&view, &order);
            let resolved = ResolvedCapabilities::resolve(&capabilities, self.registry)?;
            source::render_module(&source::SourceParts {
                view,
                shape: shape_for(view.module_type()),
                capabilities: &capabilities,
                resolved: &resolved,
                config: &self.config,
                pcd: &pcd.source,
            })?
        };

        Ok(RenderedAutoGen { header, source })
    }

    /// Renders `module` and writes `AutoGen.h` / `AutoGen.c` into `output_dir`.
    ///
    /// Both buffers are rendered before anything is written, so a failing module leaves no
    /// output behind. Files whose content did not change keep their modification time.
    ///
    /// # Errors
    /// Everything [`AutoGen::render`] reports, [`Error::FlashMapMissing`] when the module asks
    /// for the legacy flash map and none is available, and write failures.
    pub fn generate(
        &self,
        module: &ModuleDescriptor,
        arch: Arch,
        output_dir: &Path,
        pcd: &PcdFragments,
    ) -> Result<GenerationReport> {
        let rendered = self.render(module, arch, pcd)?;
        let flash_map = match (module.flash_map, &self.config.flash_map_dir) {
            (false, _) => None,
            (true, Some(dir)) => Some(dir.join(FLASH_MAP_SOURCE)),
            (true, None) => return Err(Error::FlashMapMissing(PathBuf::from(FLASH_MAP_SOURCE))),
        };

        fs::create_dir_all(output_dir).map_err(|source| Error::WriteFailed {
            path: output_dir.to_path_buf(),
            source,
        })?;

        if let Some(source) = flash_map {
            copy_if_newer(&source, &output_dir.join(FLASH_MAP_HEADER))?;
        }

        let header = Self::emit(output_dir.join(AUTOGEN_HEADER), &rendered.header)?;
        let source = Self::emit(output_dir.join(AUTOGEN_SOURCE), &rendered.source)?;

        Ok(GenerationReport {
            module: module.id.name.clone(),
            arch,
            header,
            source,
        })
    }

    fn emit(path: PathBuf, contents: &str) -> Result<OutputFile> {
        let outcome = write_if_changed(&path, contents.as_bytes())?;
        match outcome {
            WriteOutcome::Written => info!("Generated {}", path.display()),
            WriteOutcome::Unchanged => debug!("Skipped {} (unchanged)", path.display()),
        }
        Ok(OutputFile { path, outcome })
    }

    /// Generates every non-library module of the registry for `arch`, in parallel.
    ///
    /// Each module is written to `<output_root>/<module name>/<arch>`. Results come back in
    /// registration order; one module failing does not stop the others.
    pub fn generate_all(
        &self,
        arch: Arch,
        output_root: &Path,
        pcd: &PcdFragments,
    ) -> Vec<ModuleOutcome<'a>> {
        let modules: Vec<&'a ModuleDescriptor> = self
            .registry
            .modules()
            .iter()
            .filter(|module| !module.is_library)
            .collect();

        modules
            .into_par_iter()
            .map(|module| {
                let output_dir = output_root.join(&module.id.name).join(arch.to_string());
                ModuleOutcome {
                    module,
                    result: self.generate(module, arch, &output_dir, pcd),
                }
            })
            .collect()
    }
}
