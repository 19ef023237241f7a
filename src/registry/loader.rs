//! Workspace document reader.
//!
//! The document is a flat list of `<Package>` and `<Module>` elements below a `<Workspace>`
//! root. Every child of a package or module is a leaf: its attributes and text content are
//! applied to the enclosing descriptor when the leaf closes. Unknown leaves are skipped so
//! documents can carry extra data for other tools.

use std::str::FromStr;

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use uguid::Guid;

use crate::{
    registry::{GuidDeclaration, PackageDescriptor, PackageId, Registry},
    surface::{
        Arch, ArchSet, CapabilityKind, Declared, InstanceRef, LibraryClassUsage,
        ModuleDescriptor, ModuleId, ModuleType, PackageRef,
    },
    Error, Result,
};

/// Attributes of one element, unescaped.
struct Attrs {
    element: String,
    values: Vec<(String, String)>,
}

impl Attrs {
    fn parse(start: &BytesStart<'_>) -> Result<Self> {
        let element = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut values = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            values.push((key, value));
        }
        Ok(Attrs { element, values })
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    fn required(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| {
            malformed_error!(
                "<{}> is missing the required attribute '{}'",
                self.element,
                key
            )
        })
    }

    fn flag(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            None => Ok(false),
            Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
            Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
            Some(value) => Err(malformed_error!(
                "<{}> attribute '{}' must be true or false, got '{}'",
                self.element,
                key,
                value
            )),
        }
    }

    fn guid(&self, key: &str) -> Result<Guid> {
        parse_guid(self.required(key)?)
    }

    fn arches(&self) -> Result<ArchSet> {
        match self.get("SupArchList") {
            None => Ok(ArchSet::all()),
            Some(list) => {
                let mut set = ArchSet::empty();
                for name in list.split_whitespace() {
                    let arch =
                        Arch::from_str(name).map_err(|_| Error::ArchUnknown(name.to_string()))?;
                    set |= ArchSet::from(arch);
                }
                Ok(set)
            }
        }
    }
}

fn parse_guid(value: &str) -> Result<Guid> {
    Guid::try_parse(value.trim()).map_err(|_| Error::InvalidGuid(value.to_string()))
}

fn parse_module_type(value: &str) -> Result<ModuleType> {
    ModuleType::from_str(value.trim()).map_err(|_| Error::ModuleTypeUnknown(value.to_string()))
}

/// A leaf element waiting for its closing tag.
struct Leaf {
    attrs: Attrs,
    text: String,
}

enum Scope {
    Root,
    Package(PackageDescriptor),
    Module(ModuleDescriptor),
}

fn open_package(attrs: &Attrs) -> Result<PackageDescriptor> {
    Ok(PackageDescriptor::new(PackageId {
        name: attrs.required("Name")?.to_string(),
        guid: attrs.guid("Guid")?,
        version: attrs.get("Version").unwrap_or("1.0").to_string(),
    }))
}

fn open_module(attrs: &Attrs) -> Result<ModuleDescriptor> {
    let id = ModuleId::new(
        attrs.required("Name")?,
        attrs.guid("Guid")?,
        attrs.get("Version").unwrap_or("1.0"),
    );
    let mut module = ModuleDescriptor::new(id, parse_module_type(attrs.required("ModuleType")?)?);
    module.is_library = attrs.flag("Library")?;
    module.flash_map = attrs.flag("FlashMap")?;
    module.package = attrs.get("Package").map(parse_guid).transpose()?;
    Ok(module)
}

fn apply_package_leaf(package: &mut PackageDescriptor, leaf: Leaf) -> Result<()> {
    let attrs = &leaf.attrs;
    let kind = match attrs.element.as_str() {
        "ModuleTypeHeader" => {
            let module_type = parse_module_type(attrs.required("ModuleType")?)?;
            package.module_type_headers.insert(module_type, leaf.text);
            return Ok(());
        }
        "LibraryClass" => {
            let name = attrs.required("Name")?.to_string();
            if leaf.text.is_empty() {
                return Err(malformed_error!(
                    "library class {} declares no header",
                    name
                ));
            }
            package.library_class_headers.insert(name, leaf.text);
            return Ok(());
        }
        "Ppi" => CapabilityKind::Ppi,
        "Protocol" => CapabilityKind::Protocol,
        "Guid" => CapabilityKind::Guid,
        _ => return Ok(()),
    };

    let keyword = attrs.required("Name")?.to_string();
    let declaration = GuidDeclaration {
        cname: attrs.required("CName")?.to_string(),
        guid: attrs.guid("Guid")?,
    };
    package.declarations_mut(kind).insert(keyword, declaration);
    Ok(())
}

fn symbol(leaf: &Leaf) -> Result<String> {
    if leaf.text.is_empty() {
        return Err(malformed_error!("<{}> must not be empty", leaf.attrs.element));
    }
    Ok(leaf.text.clone())
}

fn apply_module_leaf(module: &mut ModuleDescriptor, leaf: Leaf) -> Result<()> {
    let attrs = &leaf.attrs;
    match attrs.element.as_str() {
        "Package" => module.packages.push(Declared::on(
            PackageRef {
                guid: attrs.guid("PackageGuid")?,
                version: attrs.get("PackageVersion").map(str::to_string),
            },
            attrs.arches()?,
        )),
        "LibraryClass" => {
            let usage = match attrs.get("Usage").unwrap_or("ALWAYS_CONSUMED") {
                "ALWAYS_CONSUMED" | "SOMETIMES_CONSUMED" => LibraryClassUsage::Consumed,
                "ALWAYS_PRODUCED" | "SOMETIMES_PRODUCED" => LibraryClassUsage::Produced,
                other => {
                    return Err(malformed_error!("unknown library class usage '{}'", other));
                }
            };
            module
                .library_classes
                .push(Declared::on((symbol(&leaf)?, usage), attrs.arches()?));
        }
        "LibraryInstance" => module.library_instances.push(Declared::on(
            InstanceRef {
                guid: attrs.guid("ModuleGuid")?,
                version: attrs.get("ModuleVersion").map(str::to_string),
            },
            attrs.arches()?,
        )),
        "Ppi" => module
            .ppis
            .push(Declared::on(symbol(&leaf)?, attrs.arches()?)),
        "PpiNotify" => module
            .ppi_notifies
            .push(Declared::on(symbol(&leaf)?, attrs.arches()?)),
        "Protocol" => module
            .protocols
            .push(Declared::on(symbol(&leaf)?, attrs.arches()?)),
        "ProtocolNotify" => module
            .protocol_notifies
            .push(Declared::on(symbol(&leaf)?, attrs.arches()?)),
        "Guid" => module
            .guids
            .push(Declared::on(symbol(&leaf)?, attrs.arches()?)),
        "EntryPoint" => module.entry_points.push(symbol(&leaf)?),
        "UnloadImage" => module.unload_images.push(symbol(&leaf)?),
        "Constructor" => module.constructor = Some(symbol(&leaf)?),
        "Destructor" => module.destructor = Some(symbol(&leaf)?),
        "SetVirtualAddressMapCallBack" => module
            .virtual_address_map_callbacks
            .push(symbol(&leaf)?),
        "ExitBootServicesCallBack" => module.exit_boot_services_callbacks.push(symbol(&leaf)?),
        "DriverBinding" => module.driver_model.driver_binding.push(symbol(&leaf)?),
        "ComponentName" => module.driver_model.component_name.push(symbol(&leaf)?),
        "DriverConfiguration" => module
            .driver_model
            .driver_configuration
            .push(symbol(&leaf)?),
        "DriverDiagnostics" => module.driver_model.driver_diagnostics.push(symbol(&leaf)?),
        "SpecVersion" => module.spec_versions.push(symbol(&leaf)?),
        "Pcd" => {
            let name = attrs.required("Name")?.to_string();
            module.pcds.insert(name, leaf.text);
        }
        _ => {}
    }
    Ok(())
}

/// Parses a workspace document into a [`Registry`].
pub(crate) fn load(xml: &str) -> Result<Registry> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut registry = Registry::new();
    let mut scope = Scope::Root;
    let mut leaf: Option<Leaf> = None;
    let mut seen_root = false;

    loop {
        let event = reader.read_event()?;
        let (start, closes) = match &event {
            Event::Start(start) => (Some(Attrs::parse(start)?), false),
            Event::Empty(start) => (Some(Attrs::parse(start)?), true),
            Event::Text(text) => {
                if let Some(leaf) = leaf.as_mut() {
                    leaf.text.push_str(&text.unescape()?);
                }
                continue;
            }
            Event::CData(data) => {
                if let Some(leaf) = leaf.as_mut() {
                    leaf.text.push_str(&String::from_utf8_lossy(data));
                }
                continue;
            }
            Event::End(_) => (None, true),
            Event::Eof => break,
            _ => continue,
        };

        if let Some(attrs) = start {
            if matches!(scope, Scope::Root) {
                scope = match attrs.element.as_str() {
                    "Workspace" if !seen_root => {
                        seen_root = true;
                        Scope::Root
                    }
                    "Package" if seen_root => Scope::Package(open_package(&attrs)?),
                    "Module" if seen_root => Scope::Module(open_module(&attrs)?),
                    other => return Err(malformed_error!("unexpected element <{}>", other)),
                };
            } else if leaf.is_none() {
                leaf = Some(Leaf {
                    attrs,
                    text: String::new(),
                });
            }
            // Markup nested inside a leaf only contributes its text.
        }

        if !closes {
            continue;
        }

        if let Some(closed) = take_closing_leaf(&mut leaf, &event) {
            match &mut scope {
                Scope::Package(package) => apply_package_leaf(package, closed)?,
                Scope::Module(module) => apply_module_leaf(module, closed)?,
                Scope::Root => {}
            }
            continue;
        }
        if leaf.is_some() {
            continue;
        }

        match std::mem::replace(&mut scope, Scope::Root) {
            Scope::Package(package) => registry.add_package(package),
            Scope::Module(module) => registry.add_module(module),
            Scope::Root => {}
        }
    }

    if !seen_root {
        return Err(malformed_error!("document has no <Workspace> root"));
    }
    if !matches!(scope, Scope::Root) || leaf.is_some() {
        return Err(malformed_error!("document ends inside an open element"));
    }
    Ok(registry)
}

/// Hands out the pending leaf if `event` closes it.
fn take_closing_leaf(leaf: &mut Option<Leaf>, event: &Event<'_>) -> Option<Leaf> {
    let name = match event {
        Event::End(end) => String::from_utf8_lossy(end.name().as_ref()).into_owned(),
        Event::Empty(start) => String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        _ => return None,
    };
    if leaf
        .as_ref()
        .is_some_and(|pending| pending.attrs.element == name)
    {
        leaf.take()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKSPACE: &str = r#"
<Workspace>
  <Package Name="MdePkg" Guid="5e0e9358-46b6-4ae2-8218-4ab8b9bbdcec" Version="0.3">
    <ModuleTypeHeader ModuleType="DXE_DRIVER">DxeDriver.h</ModuleTypeHeader>
    <ModuleTypeHeader ModuleType="BASE"></ModuleTypeHeader>
    <LibraryClass Name="BaseLib">Library/BaseLib.h</LibraryClass>
    <Protocol Name="DevicePath" CName="gEfiDevicePathProtocolGuid"
              Guid="09576e91-6d3f-11d2-8e39-00a0c969723b"/>
    <Ppi Name="Stall" CName="gEfiPeiStallPpiGuid" Guid="1f4c6f90-b06b-48d8-a201-bae5f1cd7d56"/>
  </Package>
  <Module Name="BaseLibImpl" Guid="27d67720-ea68-48ae-93da-a3a074c90e30"
          ModuleType="BASE" Library="true">
    <LibraryClass Usage="ALWAYS_PRODUCED">BaseLib</LibraryClass>
    <Constructor>BaseLibConstructor</Constructor>
  </Module>
  <Module Name="Sample" Guid="d2b2b828-0826-48a7-b3df-983c006024f0" Version="1.0"
          ModuleType="UEFI_DRIVER" FlashMap="true">
    <Package PackageGuid="5e0e9358-46b6-4ae2-8218-4ab8b9bbdcec"/>
    <LibraryClass>BaseLib</LibraryClass>
    <LibraryInstance ModuleGuid="27d67720-ea68-48ae-93da-a3a074c90e30" SupArchList="IA32 X64"/>
    <Protocol>DevicePath</Protocol>
    <Ppi SupArchList="IPF">Stall</Ppi>
    <EntryPoint>SampleEntry</EntryPoint>
    <UnloadImage>SampleUnload</UnloadImage>
    <DriverBinding>gSampleBinding</DriverBinding>
    <SpecVersion>EFI_SPECIFICATION_VERSION 0x00020000</SpecVersion>
    <Pcd Name="PcdComponentNameDisable">TRUE</Pcd>
    <Unknown Whatever="1"><Nested>ignored</Nested></Unknown>
  </Module>
</Workspace>
"#;

    #[test]
    fn test_load_workspace() {
        let registry = load(WORKSPACE).unwrap();

        assert_eq!(registry.packages().len(), 1);
        assert_eq!(registry.modules().len(), 2);

        let pkg = &registry.packages()[0];
        assert_eq!(pkg.id.name, "MdePkg");
        assert_eq!(pkg.id.version, "0.3");
        assert_eq!(
            pkg.module_type_headers.get(&ModuleType::DxeDriver).unwrap(),
            "DxeDriver.h"
        );
        assert_eq!(pkg.module_type_headers.get(&ModuleType::Base).unwrap(), "");
        assert_eq!(
            pkg.protocols.get("DevicePath").unwrap().cname,
            "gEfiDevicePathProtocolGuid"
        );
        assert_eq!(pkg.ppis.len(), 1);

        let lib = registry.module_by_name("BaseLibImpl").unwrap();
        assert!(lib.is_library);
        assert_eq!(lib.module_type, ModuleType::Base);
        assert_eq!(lib.constructor.as_deref(), Some("BaseLibConstructor"));

        let sample = registry.module_by_name("Sample").unwrap();
        assert_eq!(sample.module_type, ModuleType::UefiDriver);
        assert!(sample.flash_map);
        assert!(!sample.is_library);
        assert_eq!(sample.entry_points, ["SampleEntry"]);
        assert_eq!(sample.unload_images, ["SampleUnload"]);
        assert_eq!(sample.driver_model.driver_binding, ["gSampleBinding"]);
        assert_eq!(sample.spec_versions.len(), 1);
        assert!(sample.pcd_enabled("PcdComponentNameDisable"));
        assert_eq!(
            sample.library_classes[0].value,
            ("BaseLib".to_string(), LibraryClassUsage::Consumed)
        );
        assert_eq!(
            sample.library_instances[0].arches,
            ArchSet::IA32 | ArchSet::X64
        );
        assert_eq!(sample.ppis[0].arches, ArchSet::IPF);
        assert_eq!(sample.protocols[0].arches, ArchSet::all());

        assert!(registry.module(&sample.library_instances[0].value).is_some());
    }

    #[test]
    fn test_missing_attribute() {
        let xml = r#"<Workspace><Module Name="X" ModuleType="PEIM"/></Workspace>"#;
        let err = load(xml).unwrap_err();
        match err {
            Error::Malformed { message, .. } => assert!(message.contains("'Guid'")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_bad_values() {
        let xml = r#"<Workspace><Module Name="X" Guid="not-a-guid" ModuleType="PEIM"/></Workspace>"#;
        assert!(matches!(load(xml), Err(Error::InvalidGuid(_))));

        let xml = r#"<Workspace><Module Name="X" Guid="d2b2b828-0826-48a7-b3df-983c006024f0" ModuleType="SEC_CORE"/></Workspace>"#;
        assert!(matches!(load(xml), Err(Error::ModuleTypeUnknown(_))));

        let xml = r#"<Workspace><Module Name="X" Guid="d2b2b828-0826-48a7-b3df-983c006024f0" ModuleType="PEIM"><Ppi SupArchList="ARM">Stall</Ppi></Module></Workspace>"#;
        assert!(matches!(load(xml), Err(Error::ArchUnknown(_))));
    }

    #[test]
    fn test_structure_errors() {
        assert!(matches!(
            load("<Package/>"),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(load(""), Err(Error::Malformed { .. })));
        assert!(load(
            r#"<Workspace><Module Name="X" Guid="d2b2b828-0826-48a7-b3df-983c006024f0" ModuleType="PEIM">"#
        )
        .is_err());
    }
}
