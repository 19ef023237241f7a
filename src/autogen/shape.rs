//! Module-type specific code shapes.
//!
//! Every module type gets its entry point, the dispatcher the loader calls
//! (`ProcessModuleEntryPointList`), the optional unload dispatcher and the calling convention of
//! library constructors from exactly one [`CodeShape`]. [`shape_for`] is the only place that
//! maps a [`ModuleType`] to its shape.
//!
//! | Module type | Entry points | Dispatcher | Unload | Library convention |
//! |-------------|--------------|------------|--------|--------------------|
//! | `BASE` | ignored | none | none | `VOID` |
//! | `PEI_CORE` | exactly one | forward | none | PEI services |
//! | `PEIM` | any | forward / combined status | none | PEI services |
//! | `DXE_CORE` | exactly one | forward | none | image handle |
//! | drivers, applications | any | forward / `SetJump` fan-out | any | image handle |

use std::fmt::Write;

use log::warn;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{surface::ModuleType, Error, Result};

/// How `ProcessModuleUnloadList` sequences more than one unload handler.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum UnloadPolicy {
    /// Every handler runs. The first handler's status is always captured; a later status
    /// replaces it only while no error has been seen, so the first error is returned.
    #[default]
    RunAll,
    /// Handlers run until one fails; that error is returned and later handlers are skipped.
    StopOnError,
}

/// Calling convention of library constructors and destructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryConvention {
    /// `RETURN_STATUS Ctor (VOID)`
    Base,
    /// `EFI_STATUS Ctor (FfsHeader, PeiServices)`
    Pei,
    /// `EFI_STATUS Ctor (ImageHandle, SystemTable)`
    Dxe,
}

impl LibraryConvention {
    /// Return type of a constructor or destructor.
    #[must_use]
    pub fn return_type(self) -> &'static str {
        match self {
            LibraryConvention::Base => "RETURN_STATUS",
            LibraryConvention::Pei | LibraryConvention::Dxe => "EFI_STATUS",
        }
    }

    /// Parameter declarations, one per line.
    #[must_use]
    pub fn parameters(self) -> &'static [&'static str] {
        match self {
            LibraryConvention::Base => VOID_PARAMS,
            LibraryConvention::Pei => PEI_LIBRARY_PARAMS,
            LibraryConvention::Dxe => DRIVER_PARAMS,
        }
    }

    /// Argument list a dispatcher forwards.
    #[must_use]
    pub fn arguments(self) -> &'static str {
        match self {
            LibraryConvention::Base => "",
            LibraryConvention::Pei => "FfsHeader, PeiServices",
            LibraryConvention::Dxe => "ImageHandle, SystemTable",
        }
    }
}

const VOID_PARAMS: &[&str] = &["VOID"];
const PEI_CORE_PARAMS: &[&str] = &[
    "IN EFI_PEI_STARTUP_DESCRIPTOR  *PeiStartupDescriptor",
    "IN VOID                        *OldCoreData",
];
const DXE_CORE_PARAMS: &[&str] = &["IN VOID  *HobStart"];
const PEIM_PARAMS: &[&str] = &[
    "IN EFI_FFS_FILE_HEADER  *FfsHeader",
    "IN EFI_PEI_SERVICES     **PeiServices",
];
const PEI_LIBRARY_PARAMS: &[&str] = &[
    "IN EFI_FFS_FILE_HEADER       *FfsHeader",
    "IN EFI_PEI_SERVICES          **PeiServices",
];
const DRIVER_PARAMS: &[&str] = &[
    "IN EFI_HANDLE        ImageHandle",
    "IN EFI_SYSTEM_TABLE  *SystemTable",
];
const UNLOAD_PARAMS: &[&str] = &["IN EFI_HANDLE  ImageHandle"];
const EXIT_PARAMS: &[&str] = &["IN EFI_STATUS  Status"];

/// Terminates a prototype.
pub(crate) const DECLARATION: &str = ";\n\n";
/// Opens a function body.
pub(crate) const DEFINITION: &str = "\n{\n";

/// Writes a function head in EDK layout, followed by `terminator`.
pub(crate) fn signature(
    out: &mut String,
    return_type: &str,
    name: &str,
    parameters: &[&str],
    terminator: &str,
) {
    let _ = write!(out, "{return_type}\nEFIAPI\n{name} (\n");
    for (index, parameter) in parameters.iter().enumerate() {
        let separator = if index + 1 < parameters.len() { "," } else { "" };
        let _ = writeln!(out, "  {parameter}{separator}");
    }
    out.push_str("  )");
    out.push_str(terminator);
}

/// Entry and unload symbols of one module, deduplicated.
#[derive(Debug, Clone, Copy)]
pub struct EntryPoints<'a> {
    /// Module type the symbols belong to
    pub module_type: ModuleType,
    /// Entry points in declaration order
    pub entries: &'a [&'a str],
    /// Unload-image handlers in declaration order
    pub unloads: &'a [&'a str],
    /// Sequencing of multiple unload handlers
    pub unload_policy: UnloadPolicy,
}

/// Generation strategy for one module type.
pub trait CodeShape: Send + Sync {
    /// Convention of library constructors/destructors and their dispatchers.
    fn library_convention(&self) -> LibraryConvention;

    /// Whether the source carries the lifecycle-event tables.
    fn has_lifecycle_tables(&self) -> bool {
        false
    }

    /// Whether a `ProcessLibraryDestructorList` dispatcher is emitted.
    fn has_destructors(&self) -> bool {
        self.library_convention() == LibraryConvention::Dxe
    }

    /// C type of the `gEfiCallerIdGuid` global.
    fn caller_id_type(&self) -> &'static str {
        "EFI_GUID"
    }

    /// Renders entry point prototypes and dispatchers.
    ///
    /// # Errors
    /// Returns [`Error::EntryPointCount`] if the module type demands a specific number of entry
    /// points and a different number was declared.
    fn render_entry_points(&self, symbols: &EntryPoints<'_>, out: &mut String) -> Result<()>;
}

fn exactly_one<'a>(symbols: &EntryPoints<'a>) -> Result<&'a str> {
    match symbols.entries {
        [entry] => Ok(*entry),
        entries => Err(Error::EntryPointCount {
            module_type: symbols.module_type,
            found: entries.len(),
        }),
    }
}

fn ignore_unloads(symbols: &EntryPoints<'_>) {
    if !symbols.unloads.is_empty() {
        warn!(
            "{} modules have no unload dispatcher, ignoring {}",
            symbols.module_type,
            symbols.unloads.join(", ")
        );
    }
}

/// Libraries and other phase independent code: no dispatchers.
struct BaseShape;

impl CodeShape for BaseShape {
    fn library_convention(&self) -> LibraryConvention {
        LibraryConvention::Base
    }

    fn caller_id_type(&self) -> &'static str {
        "GUID"
    }

    fn render_entry_points(&self, symbols: &EntryPoints<'_>, _out: &mut String) -> Result<()> {
        if !symbols.entries.is_empty() {
            warn!(
                "{} modules have no entry point dispatcher, ignoring {}",
                symbols.module_type,
                symbols.entries.join(", ")
            );
        }
        ignore_unloads(symbols);
        Ok(())
    }
}

struct PeiCoreShape;

impl CodeShape for PeiCoreShape {
    fn library_convention(&self) -> LibraryConvention {
        LibraryConvention::Pei
    }

    fn render_entry_points(&self, symbols: &EntryPoints<'_>, out: &mut String) -> Result<()> {
        let entry = exactly_one(symbols)?;
        ignore_unloads(symbols);

        signature(out, "EFI_STATUS", entry, PEI_CORE_PARAMS, DECLARATION);
        signature(
            out,
            "EFI_STATUS",
            "ProcessModuleEntryPointList",
            PEI_CORE_PARAMS,
            DEFINITION,
        );
        let _ = write!(
            out,
            "  return {entry} (PeiStartupDescriptor, OldCoreData);\n}}\n\n"
        );
        Ok(())
    }
}

struct DxeCoreShape;

impl CodeShape for DxeCoreShape {
    fn library_convention(&self) -> LibraryConvention {
        LibraryConvention::Dxe
    }

    fn render_entry_points(&self, symbols: &EntryPoints<'_>, out: &mut String) -> Result<()> {
        let entry = exactly_one(symbols)?;
        ignore_unloads(symbols);

        out.push_str("const UINT32 _gUefiDriverRevision = 0;\n\n");
        signature(out, "VOID", entry, DXE_CORE_PARAMS, DECLARATION);
        signature(
            out,
            "VOID",
            "ProcessModuleEntryPointList",
            DXE_CORE_PARAMS,
            DEFINITION,
        );
        let _ = write!(out, "  {entry} (HobStart);\n}}\n\n");
        Ok(())
    }
}

struct PeimShape;

impl CodeShape for PeimShape {
    fn library_convention(&self) -> LibraryConvention {
        LibraryConvention::Pei
    }

    fn render_entry_points(&self, symbols: &EntryPoints<'_>, out: &mut String) -> Result<()> {
        ignore_unloads(symbols);

        out.push_str("GLOBAL_REMOVE_IF_UNREFERENCED const UINT32 _gPeimRevision = 0;\n\n");
        for entry in symbols.entries {
            signature(out, "EFI_STATUS", entry, PEIM_PARAMS, DECLARATION);
        }

        signature(
            out,
            "EFI_STATUS",
            "ProcessModuleEntryPointList",
            PEIM_PARAMS,
            DEFINITION,
        );
        match symbols.entries {
            [] => out.push_str("  return EFI_SUCCESS;\n"),
            [entry] => {
                let _ = writeln!(out, "  return {entry} (FfsHeader, PeiServices);");
            }
            entries => {
                out.push_str("  EFI_STATUS  Status;\n  EFI_STATUS  CombinedStatus;\n\n");
                out.push_str("  CombinedStatus = EFI_LOAD_ERROR;\n\n");
                for entry in entries {
                    let _ = write!(
                        out,
                        "  Status = {entry} (FfsHeader, PeiServices);\n\
                         \x20 if (!EFI_ERROR (Status) && EFI_ERROR (CombinedStatus)) {{\n\
                         \x20   CombinedStatus = Status;\n\
                         \x20 }}\n\n"
                    );
                }
                out.push_str("  return CombinedStatus;\n");
            }
        }
        out.push_str("}\n\n");
        Ok(())
    }
}

/// DXE drivers, runtime and SAL drivers, SMM drivers, UEFI drivers and applications.
struct DriverShape {
    revision: bool,
    lifecycle: bool,
}

impl DriverShape {
    fn render_exit_driver(count: usize, out: &mut String) {
        signature(out, "VOID", "ExitDriver", EXIT_PARAMS, DEFINITION);
        if count == 1 {
            out.push_str(
                "  if (EFI_ERROR (Status)) {\n\
                 \x20   ProcessLibraryDestructorList (gImageHandle, gST);\n\
                 \x20 }\n\
                 \x20 gBS->Exit (gImageHandle, Status, 0, NULL);\n",
            );
        } else {
            out.push_str(
                "  if (!EFI_ERROR (Status) || EFI_ERROR (mDriverEntryPointStatus)) {\n\
                 \x20   mDriverEntryPointStatus = Status;\n\
                 \x20 }\n\
                 \x20 LongJump (&mJumpContext, (UINTN)-1);\n\
                 \x20 ASSERT (FALSE);\n",
            );
        }
        out.push_str("}\n\n");
    }

    fn render_unload(symbols: &EntryPoints<'_>, out: &mut String) {
        for unload in symbols.unloads {
            signature(out, "EFI_STATUS", unload, UNLOAD_PARAMS, DECLARATION);
        }
        let _ = write!(
            out,
            "GLOBAL_REMOVE_IF_UNREFERENCED const UINT8  _gDriverUnloadImageCount = {};\n\n",
            symbols.unloads.len()
        );

        signature(
            out,
            "EFI_STATUS",
            "ProcessModuleUnloadList",
            UNLOAD_PARAMS,
            DEFINITION,
        );
        match (symbols.unloads, symbols.unload_policy) {
            ([], _) => out.push_str("  return EFI_SUCCESS;\n"),
            ([unload], _) => {
                let _ = writeln!(out, "  return {unload} (ImageHandle);");
            }
            ([first, rest @ ..], UnloadPolicy::RunAll) => {
                let _ = write!(out, "  EFI_STATUS  Status;\n\n  Status = {first} (ImageHandle);\n");
                for unload in rest {
                    let _ = write!(
                        out,
                        "  if (EFI_ERROR (Status)) {{\n\
                         \x20   {unload} (ImageHandle);\n\
                         \x20 }} else {{\n\
                         \x20   Status = {unload} (ImageHandle);\n\
                         \x20 }}\n"
                    );
                }
                out.push_str("\n  return Status;\n");
            }
            (unloads, UnloadPolicy::StopOnError) => {
                out.push_str("  EFI_STATUS  Status;\n\n");
                for unload in unloads {
                    let _ = write!(
                        out,
                        "  Status = {unload} (ImageHandle);\n\
                         \x20 if (EFI_ERROR (Status)) {{\n\
                         \x20   return Status;\n\
                         \x20 }}\n"
                    );
                }
                out.push_str("\n  return Status;\n");
            }
        }
        out.push_str("}\n\n");
    }
}

impl CodeShape for DriverShape {
    fn library_convention(&self) -> LibraryConvention {
        LibraryConvention::Dxe
    }

    fn has_lifecycle_tables(&self) -> bool {
        self.lifecycle
    }

    fn render_entry_points(&self, symbols: &EntryPoints<'_>, out: &mut String) -> Result<()> {
        let count = symbols.entries.len();

        if self.revision {
            out.push_str("GLOBAL_REMOVE_IF_UNREFERENCED const UINT32 _gUefiDriverRevision = 0;\n\n");
        }
        for entry in symbols.entries {
            signature(out, "EFI_STATUS", entry, DRIVER_PARAMS, DECLARATION);
        }
        let _ = write!(
            out,
            "GLOBAL_REMOVE_IF_UNREFERENCED const UINT8  _gDriverEntryPointCount = {count};\n\n"
        );
        if count > 1 {
            out.push_str(
                "static BASE_LIBRARY_JUMP_BUFFER  mJumpContext;\n\
                 static EFI_STATUS  mDriverEntryPointStatus = EFI_LOAD_ERROR;\n\n",
            );
        }

        signature(
            out,
            "EFI_STATUS",
            "ProcessModuleEntryPointList",
            DRIVER_PARAMS,
            DEFINITION,
        );
        match symbols.entries {
            [] => out.push_str("  return EFI_SUCCESS;\n"),
            [entry] => {
                let _ = writeln!(out, "  return {entry} (ImageHandle, SystemTable);");
            }
            entries => {
                for entry in entries {
                    let _ = write!(
                        out,
                        "  if (SetJump (&mJumpContext) == 0) {{\n\
                         \x20   ExitDriver ({entry} (ImageHandle, SystemTable));\n\
                         \x20   ASSERT (FALSE);\n\
                         \x20 }}\n\n"
                    );
                }
                out.push_str("  return mDriverEntryPointStatus;\n");
            }
        }
        out.push_str("}\n\n");

        if count > 0 {
            Self::render_exit_driver(count, out);
        }
        Self::render_unload(symbols, out);
        Ok(())
    }
}

static BASE: BaseShape = BaseShape;
static PEI_CORE: PeiCoreShape = PeiCoreShape;
static DXE_CORE: DxeCoreShape = DxeCoreShape;
static PEIM: PeimShape = PeimShape;
static DXE_DRIVER: DriverShape = DriverShape {
    revision: true,
    lifecycle: true,
};
static DXE_SMM_DRIVER: DriverShape = DriverShape {
    revision: false,
    lifecycle: false,
};

/// Returns the code shape for `module_type`.
#[must_use]
pub fn shape_for(module_type: ModuleType) -> &'static dyn CodeShape {
    match module_type {
        ModuleType::Base => &BASE,
        ModuleType::PeiCore => &PEI_CORE,
        ModuleType::Peim => &PEIM,
        ModuleType::DxeCore => &DXE_CORE,
        ModuleType::DxeDriver
        | ModuleType::DxeRuntimeDriver
        | ModuleType::DxeSalDriver
        | ModuleType::UefiDriver
        | ModuleType::UefiApplication => &DXE_DRIVER,
        ModuleType::DxeSmmDriver => &DXE_SMM_DRIVER,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    fn render(
        module_type: ModuleType,
        entries: &[&str],
        unloads: &[&str],
        unload_policy: UnloadPolicy,
    ) -> Result<String> {
        let mut out = String::new();
        shape_for(module_type).render_entry_points(
            &EntryPoints {
                module_type,
                entries,
                unloads,
                unload_policy,
            },
            &mut out,
        )?;
        Ok(out)
    }

    #[test]
    fn test_signature_layout() {
        let mut out = String::new();
        signature(&mut out, "EFI_STATUS", "Foo", DRIVER_PARAMS, DECLARATION);
        assert_eq!(
            out,
            "EFI_STATUS\nEFIAPI\nFoo (\n  IN EFI_HANDLE        ImageHandle,\n  IN EFI_SYSTEM_TABLE  *SystemTable\n  );\n\n"
        );
    }

    #[test]
    fn test_core_types_require_exactly_one_entry_point() {
        for module_type in [ModuleType::PeiCore, ModuleType::DxeCore] {
            for entries in [&[][..], &["A", "B"][..]] {
                let err = render(module_type, entries, &[], UnloadPolicy::RunAll).unwrap_err();
                match err {
                    Error::EntryPointCount {
                        module_type: reported,
                        found,
                    } => {
                        assert_eq!(reported, module_type);
                        assert_eq!(found, entries.len());
                    }
                    other => panic!("unexpected error {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_pei_core_forwards() {
        let out = render(ModuleType::PeiCore, &["PeiMain"], &[], UnloadPolicy::RunAll).unwrap();
        assert!(out.contains("EFI_STATUS\nEFIAPI\nPeiMain (\n"));
        assert!(out.contains("{\n  return PeiMain (PeiStartupDescriptor, OldCoreData);\n}\n"));
    }

    #[test]
    fn test_dxe_core_forwards() {
        let out = render(ModuleType::DxeCore, &["DxeMain"], &[], UnloadPolicy::RunAll).unwrap();
        assert!(out.starts_with("const UINT32 _gUefiDriverRevision = 0;\n"));
        assert!(out.contains("VOID\nEFIAPI\nDxeMain (\n  IN VOID  *HobStart\n  );\n"));
        assert!(out.contains("{\n  DxeMain (HobStart);\n}\n"));
    }

    #[test]
    fn test_peim_entry_point_counts() {
        let none = render(ModuleType::Peim, &[], &[], UnloadPolicy::RunAll).unwrap();
        assert!(none.contains("{\n  return EFI_SUCCESS;\n}\n"));

        let one = render(ModuleType::Peim, &["Only"], &[], UnloadPolicy::RunAll).unwrap();
        assert!(one.contains("  return Only (FfsHeader, PeiServices);\n"));
        assert!(!one.contains("CombinedStatus"));
    }

    #[test]
    fn test_peim_combined_status() {
        let out = render(ModuleType::Peim, &["Entry1", "Entry2"], &[], UnloadPolicy::RunAll).unwrap();

        assert!(out.contains("EFI_STATUS\nEFIAPI\nEntry1 (\n"));
        assert!(out.contains("EFI_STATUS\nEFIAPI\nEntry2 (\n"));
        assert!(out.contains("  CombinedStatus = EFI_LOAD_ERROR;\n"));

        let first = out.find("  Status = Entry1 (FfsHeader, PeiServices);").unwrap();
        let second = out.find("  Status = Entry2 (FfsHeader, PeiServices);").unwrap();
        assert!(first < second);
        assert_eq!(
            out.matches("if (!EFI_ERROR (Status) && EFI_ERROR (CombinedStatus)) {")
                .count(),
            2
        );
        assert!(out.contains("  return CombinedStatus;\n}\n"));
    }

    #[test]
    fn test_uefi_driver_single_entry_no_unload() {
        let out = render(ModuleType::UefiDriver, &["OnlyEntry"], &[], UnloadPolicy::RunAll).unwrap();

        assert!(out.contains("_gDriverEntryPointCount = 1;"));
        assert!(out.contains("  return OnlyEntry (ImageHandle, SystemTable);\n"));
        assert!(!out.contains("SetJump"));
        assert!(!out.contains("mJumpContext"));
        assert!(out.contains("_gDriverUnloadImageCount = 0;"));
        assert!(out.contains(
            "ProcessModuleUnloadList (\n  IN EFI_HANDLE  ImageHandle\n  )\n{\n  return EFI_SUCCESS;\n}\n"
        ));
        assert!(out.contains("gBS->Exit (gImageHandle, Status, 0, NULL);"));
    }

    #[test]
    fn test_driver_multiple_entries_use_jump_context() {
        let out = render(ModuleType::DxeDriver, &["A", "B"], &[], UnloadPolicy::RunAll).unwrap();

        assert!(out.contains("_gDriverEntryPointCount = 2;"));
        assert!(out.contains("static BASE_LIBRARY_JUMP_BUFFER  mJumpContext;"));
        assert!(out.contains("static EFI_STATUS  mDriverEntryPointStatus = EFI_LOAD_ERROR;"));
        assert!(out.contains("    ExitDriver (A (ImageHandle, SystemTable));\n"));
        assert!(out.contains("    ExitDriver (B (ImageHandle, SystemTable));\n"));
        assert!(out.contains("  LongJump (&mJumpContext, (UINTN)-1);"));
        assert!(out.contains("  return mDriverEntryPointStatus;\n"));
    }

    #[test]
    fn test_driver_without_entries_has_no_exit_driver() {
        let out = render(ModuleType::DxeDriver, &[], &[], UnloadPolicy::RunAll).unwrap();
        assert!(out.contains("_gDriverEntryPointCount = 0;"));
        assert!(!out.contains("ExitDriver"));
    }

    #[test]
    fn test_unload_run_all() {
        let out = render(ModuleType::UefiDriver, &["Entry"], &["U1", "U2", "U3"], UnloadPolicy::RunAll).unwrap();

        assert!(out.contains("_gDriverUnloadImageCount = 3;"));
        assert!(out.contains("  Status = U1 (ImageHandle);\n"));
        for later in ["U2", "U3"] {
            assert!(out.contains(&format!(
                "  if (EFI_ERROR (Status)) {{\n    {later} (ImageHandle);\n  }} else {{\n    Status = {later} (ImageHandle);\n  }}\n"
            )));
        }
        assert!(!out.contains("    return Status;"));
    }

    #[test]
    fn test_unload_stop_on_error() {
        let out = render(ModuleType::UefiDriver, &["Entry"], &["U1", "U2"], UnloadPolicy::StopOnError).unwrap();

        assert_eq!(out.matches("    return Status;\n").count(), 2);
        let first = out.find("  Status = U1 (ImageHandle);").unwrap();
        let second = out.find("  Status = U2 (ImageHandle);").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_single_unload_forwards() {
        let out = render(ModuleType::DxeRuntimeDriver, &[], &["Unload"], UnloadPolicy::RunAll).unwrap();
        assert!(out.contains("  return Unload (ImageHandle);\n"));
    }

    #[test]
    fn test_smm_driver_has_no_revision_or_lifecycle() {
        let shape = shape_for(ModuleType::DxeSmmDriver);
        assert!(!shape.has_lifecycle_tables());
        assert!(shape.has_destructors());

        let out = render(ModuleType::DxeSmmDriver, &["SmmEntry"], &[], UnloadPolicy::RunAll).unwrap();
        assert!(!out.contains("_gUefiDriverRevision"));
        assert!(out.contains("  return SmmEntry (ImageHandle, SystemTable);\n"));
    }

    #[test]
    fn test_base_emits_nothing() {
        let out = render(ModuleType::Base, &["Ignored"], &["AlsoIgnored"], UnloadPolicy::RunAll).unwrap();
        assert!(out.is_empty());
        assert_eq!(shape_for(ModuleType::Base).caller_id_type(), "GUID");
    }

    #[test]
    fn test_dispatch_table() {
        for module_type in ModuleType::iter() {
            let shape = shape_for(module_type);
            let convention = shape.library_convention();
            if module_type == ModuleType::Base {
                assert_eq!(convention, LibraryConvention::Base);
            } else if module_type.is_pei() {
                assert_eq!(convention, LibraryConvention::Pei);
                assert!(!shape.has_destructors());
            } else {
                assert_eq!(convention, LibraryConvention::Dxe);
                assert!(shape.has_destructors());
            }
        }

        for lifecycle in [
            ModuleType::DxeDriver,
            ModuleType::DxeRuntimeDriver,
            ModuleType::DxeSalDriver,
            ModuleType::UefiDriver,
            ModuleType::UefiApplication,
        ] {
            assert!(shape_for(lifecycle).has_lifecycle_tables());
        }
        assert!(!shape_for(ModuleType::DxeCore).has_lifecycle_tables());
        assert!(!shape_for(ModuleType::Peim).has_lifecycle_tables());
    }

    #[test]
    fn test_unload_policy_parse() {
        assert_eq!(UnloadPolicy::from_str("run-all").unwrap(), UnloadPolicy::RunAll);
        assert_eq!(
            UnloadPolicy::from_str("stop-on-error").unwrap(),
            UnloadPolicy::StopOnError
        );
        assert_eq!(UnloadPolicy::default(), UnloadPolicy::RunAll);
        assert_eq!(UnloadPolicy::iter().count(), 2);
    }
}
