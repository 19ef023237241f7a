//! `AutoGen.c` rendering.

use std::fmt::Write;

use bitflags::bitflags;
use log::warn;

use crate::{
    autogen::{
        aggregate::{CapabilitySet, LibraryHook},
        config::AutoGenConfig,
        notice,
        resolve::{c_initializer, ResolvedCapabilities},
        shape::{signature, CodeShape, EntryPoints, LibraryConvention, DECLARATION, DEFINITION},
    },
    surface::{ModuleType, ModuleView},
    Error, Result,
};

bitflags! {
    /// Optional driver-model protocols present in `_gDriverModelProtocolList`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DriverModelProtocols: u8 {
        /// `EFI_COMPONENT_NAME_PROTOCOL`
        const COMPONENT_NAME = 0x01;
        /// `EFI_DRIVER_CONFIGURATION_PROTOCOL`
        const DRIVER_CONFIGURATION = 0x02;
        /// `EFI_DRIVER_DIAGNOSTICS_PROTOCOL`
        const DRIVER_DIAGNOSTICS = 0x04;
    }
}

const EVENT_PARAMS: &[&str] = &["IN EFI_EVENT  Event", "IN VOID       *Context"];

/// Everything the module source is rendered from.
pub(crate) struct SourceParts<'a> {
    pub view: ModuleView<'a>,
    pub shape: &'static dyn CodeShape,
    pub capabilities: &'a CapabilitySet,
    pub resolved: &'a ResolvedCapabilities,
    pub config: &'a AutoGenConfig,
    pub pcd: &'a str,
}

/// Renders `AutoGen.c` for a module.
pub(crate) fn render_module(parts: &SourceParts<'_>) -> Result<String> {
    let view = &parts.view;
    let mut out = notice("AutoGen.c");
    out.push_str("#include <AutoGen.h>\n\n");

    if !view.module_type().is_dxe() && !view.driver_model().is_empty() {
        warn!(
            "{}: {} modules are not loaded by the driver model, driver bindings are inert",
            view.name(),
            view.module_type()
        );
    }
    render_driver_model(view, parts.config.honor_driver_model_pcds, &mut out)?;

    if parts.shape.has_lifecycle_tables() {
        render_event_table(
            "_gDriverSetVirtualAddressMapEvent",
            parts.capabilities.virtual_address_map_callbacks(),
            &mut out,
        );
        render_event_table(
            "_gDriverExitBootServicesEvent",
            parts.capabilities.exit_boot_services_callbacks(),
            &mut out,
        );
    } else if !parts.capabilities.virtual_address_map_callbacks().is_empty()
        || !parts.capabilities.exit_boot_services_callbacks().is_empty()
    {
        warn!(
            "{}: {} modules have no event tables, ignoring lifecycle callbacks",
            view.name(),
            view.module_type()
        );
    }

    let _ = write!(
        out,
        "GLOBAL_REMOVE_IF_UNREFERENCED {} gEfiCallerIdGuid = {{{}}};\n\n",
        parts.shape.caller_id_type(),
        c_initializer(&view.descriptor().id.guid)
    );

    for entry in parts.resolved.iter() {
        let _ = writeln!(
            out,
            "GLOBAL_REMOVE_IF_UNREFERENCED EFI_GUID {} = {{ {} }};",
            entry.cname,
            entry.c_initializer()
        );
    }
    if !parts.resolved.is_empty() {
        out.push('\n');
    }

    let convention = parts.shape.library_convention();
    render_library_list(
        "ProcessLibraryConstructorList",
        convention,
        parts.capabilities.constructors(),
        &mut out,
    );
    if parts.shape.has_destructors() {
        render_library_list(
            "ProcessLibraryDestructorList",
            convention,
            parts.capabilities.destructors(),
            &mut out,
        );
    }

    let entries = view.entry_points();
    let unloads = view.unload_images();
    parts.shape.render_entry_points(
        &EntryPoints {
            module_type: view.module_type(),
            entries: &entries,
            unloads: &unloads,
            unload_policy: parts.config.unload_policy,
        },
        &mut out,
    )?;

    out.push_str(parts.pcd);
    Ok(out)
}

/// Renders `AutoGen.c` for a library instance: the glue lives in the consuming module.
pub(crate) fn render_library(pcd: &str) -> String {
    let mut out = notice("AutoGen.c");
    out.push_str("#include <AutoGen.h>\n\n");
    out.push_str(pcd);
    out
}

fn render_driver_model(view: &ModuleView<'_>, honor_pcds: bool, out: &mut String) -> Result<()> {
    let model = view.driver_model();
    let expected = model.driver_binding.len();

    for (group, list) in [
        ("Component Name", &model.component_name),
        ("Driver Configuration", &model.driver_configuration),
        ("Driver Diagnostics", &model.driver_diagnostics),
    ] {
        if !list.is_empty() && list.len() != expected {
            return Err(Error::DriverModelMismatch {
                group,
                expected,
                found: list.len(),
            });
        }
    }

    let mut present = DriverModelProtocols::empty();
    present.set(
        DriverModelProtocols::COMPONENT_NAME,
        !model.component_name.is_empty()
            && !(honor_pcds && view.pcd_enabled("PcdComponentNameDisable")),
    );
    present.set(
        DriverModelProtocols::DRIVER_CONFIGURATION,
        !model.driver_configuration.is_empty(),
    );
    present.set(
        DriverModelProtocols::DRIVER_DIAGNOSTICS,
        !model.driver_diagnostics.is_empty()
            && !(honor_pcds && view.pcd_enabled("PcdDriverDiagnosticsDisable")),
    );

    let columns: [(&str, DriverModelProtocols, &[String]); 3] = [
        (
            "EFI_COMPONENT_NAME_PROTOCOL",
            DriverModelProtocols::COMPONENT_NAME,
            &model.component_name,
        ),
        (
            "EFI_DRIVER_CONFIGURATION_PROTOCOL",
            DriverModelProtocols::DRIVER_CONFIGURATION,
            &model.driver_configuration,
        ),
        (
            "EFI_DRIVER_DIAGNOSTICS_PROTOCOL",
            DriverModelProtocols::DRIVER_DIAGNOSTICS,
            &model.driver_diagnostics,
        ),
    ];

    for binding in &model.driver_binding {
        let _ = writeln!(out, "extern EFI_DRIVER_BINDING_PROTOCOL  {binding};");
    }
    for (protocol, flag, list) in &columns {
        if present.contains(*flag) {
            for symbol in list.iter() {
                let _ = writeln!(out, "extern {protocol}  {symbol};");
            }
        }
    }
    if expected > 0 {
        out.push('\n');
    }

    let _ = write!(
        out,
        "GLOBAL_REMOVE_IF_UNREFERENCED const UINT8  _gDriverModelProtocolBitmask = {};\n\
         GLOBAL_REMOVE_IF_UNREFERENCED const UINTN  _gDriverModelProtocolListEntries = {expected};\n\n",
        present.bits()
    );

    if expected == 0 {
        return Ok(());
    }

    out.push_str(
        "GLOBAL_REMOVE_IF_UNREFERENCED const EFI_DRIVER_MODEL_PROTOCOL_LIST  _gDriverModelProtocolList[] = {\n",
    );
    for (row, binding) in model.driver_binding.iter().enumerate() {
        let _ = write!(out, "  {{\n    &{binding}");
        for (_, flag, list) in &columns {
            match list.get(row) {
                Some(symbol) if present.contains(*flag) => {
                    let _ = write!(out, ",\n    &{symbol}");
                }
                _ => out.push_str(",\n    NULL"),
            }
        }
        out.push_str(if row + 1 < expected { "\n  },\n" } else { "\n  }\n" });
    }
    out.push_str("};\n\n");
    Ok(())
}

fn render_event_table(table: &str, callbacks: &[String], out: &mut String) {
    let _ = write!(
        out,
        "GLOBAL_REMOVE_IF_UNREFERENCED const UINTN {table}Count = {};\n\n",
        callbacks.len()
    );
    for callback in callbacks {
        signature(out, "VOID", callback, EVENT_PARAMS, DECLARATION);
    }
    let _ = writeln!(
        out,
        "GLOBAL_REMOVE_IF_UNREFERENCED const EFI_EVENT_NOTIFY {table}[] = {{"
    );
    for callback in callbacks {
        let _ = writeln!(out, "  {callback},");
    }
    out.push_str("  NULL\n};\n\n");
}

fn render_library_list(
    dispatcher: &str,
    module_convention: LibraryConvention,
    hooks: &[LibraryHook],
    out: &mut String,
) {
    let convention_of = |hook: &LibraryHook| {
        if hook.module_type == ModuleType::Base {
            LibraryConvention::Base
        } else {
            module_convention
        }
    };

    for hook in hooks {
        let convention = convention_of(hook);
        signature(
            out,
            convention.return_type(),
            &hook.symbol,
            convention.parameters(),
            DECLARATION,
        );
    }

    signature(
        out,
        "VOID",
        dispatcher,
        module_convention.parameters(),
        DEFINITION,
    );
    if !hooks.is_empty() {
        out.push_str("  EFI_STATUS  Status;\n\n");
    }
    for hook in hooks {
        let _ = write!(
            out,
            "  Status = {} ({});\n  ASSERT_EFI_ERROR (Status);\n",
            hook.symbol,
            convention_of(hook).arguments()
        );
    }
    out.push_str("}\n\n");
}
