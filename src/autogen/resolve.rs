//! Capability keyword resolution.
//!
//! Every keyword in a [`CapabilitySet`] is mapped to the C symbol and GUID value declared for
//! it by the first dependent package (in aggregation order) that declares it. Nothing is
//! cached: two modules with different package lists can legitimately resolve the same keyword
//! differently.

use std::{collections::HashSet, fmt::Write};

use log::debug;
use uguid::Guid;

use crate::{
    autogen::aggregate::CapabilitySet,
    registry::Registry,
    surface::{CapabilityKind, PackageRef},
    Error, Result,
};

/// A keyword resolved to its C global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGuid {
    /// Keyword as declared by the module or library
    pub keyword: String,
    /// C symbol of the GUID global
    pub cname: String,
    /// GUID value
    pub guid: Guid,
}

impl ResolvedGuid {
    /// The GUID as a C struct initializer body, see [`c_initializer`].
    #[must_use]
    pub fn c_initializer(&self) -> String {
        c_initializer(&self.guid)
    }
}

/// Formats a GUID as the body of an `EFI_GUID` initializer.
///
/// ```rust,ignore
/// let guid = uguid::guid!("d2b2b828-0826-48a7-b3df-983c006024f0");
/// assert_eq!(
///     c_initializer(&guid),
///     "0xd2b2b828, 0x0826, 0x48a7, {0xb3, 0xdf, 0x98, 0x3c, 0x00, 0x60, 0x24, 0xf0}"
/// );
/// ```
#[must_use]
pub fn c_initializer(guid: &Guid) -> String {
    let bytes = guid.to_bytes();
    let data1 = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let data2 = u16::from_le_bytes([bytes[4], bytes[5]]);
    let data3 = u16::from_le_bytes([bytes[6], bytes[7]]);

    let mut out = format!("0x{data1:08x}, 0x{data2:04x}, 0x{data3:04x}, {{");
    for (index, byte) in bytes[8..].iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "0x{byte:02x}");
    }
    out.push('}');
    out
}

/// Resolved GUID globals of one module, in emission order.
///
/// A C symbol appears at most once across all three namespaces even if several keywords (or
/// namespaces) resolve to it.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCapabilities {
    protocols: Vec<ResolvedGuid>,
    ppis: Vec<ResolvedGuid>,
    guids: Vec<ResolvedGuid>,
}

impl ResolvedCapabilities {
    /// Resolves every keyword of `set` against the packages `set` depends on.
    ///
    /// Namespaces are resolved protocols first, then PPIs, then GUIDs; that is also the order
    /// the globals are emitted in.
    ///
    /// # Errors
    /// Returns [`Error::DeclarationNotFound`] naming the first keyword no dependent package
    /// declares, and [`Error::PackageNotFound`] if a dependent package is not registered.
    pub fn resolve(set: &CapabilitySet, registry: &Registry) -> Result<Self> {
        let packages: Vec<PackageRef> = set.packages().iter().cloned().collect();
        let mut emitted = HashSet::new();
        let mut resolved = ResolvedCapabilities::default();

        for kind in [
            CapabilityKind::Protocol,
            CapabilityKind::Ppi,
            CapabilityKind::Guid,
        ] {
            for keyword in set.keywords(kind) {
                let declaration = registry.lookup(kind, keyword, &packages)?.ok_or_else(|| {
                    Error::DeclarationNotFound {
                        kind,
                        keyword: keyword.to_string(),
                    }
                })?;

                if !emitted.insert(declaration.cname.clone()) {
                    debug!("{kind} {keyword} resolves to already emitted {}", declaration.cname);
                    continue;
                }

                resolved.list_mut(kind).push(ResolvedGuid {
                    keyword: keyword.to_string(),
                    cname: declaration.cname.clone(),
                    guid: declaration.guid,
                });
            }
        }

        Ok(resolved)
    }

    fn list_mut(&mut self, kind: CapabilityKind) -> &mut Vec<ResolvedGuid> {
        match kind {
            CapabilityKind::Ppi => &mut self.ppis,
            CapabilityKind::Protocol => &mut self.protocols,
            CapabilityKind::Guid => &mut self.guids,
        }
    }

    /// Resolved entries of one namespace.
    #[must_use]
    pub fn entries(&self, kind: CapabilityKind) -> &[ResolvedGuid] {
        match kind {
            CapabilityKind::Ppi => &self.ppis,
            CapabilityKind::Protocol => &self.protocols,
            CapabilityKind::Guid => &self.guids,
        }
    }

    /// All entries in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedGuid> {
        self.protocols
            .iter()
            .chain(self.ppis.iter())
            .chain(self.guids.iter())
    }

    /// Total number of globals to emit.
    #[must_use]
    pub fn len(&self) -> usize {
        self.protocols.len() + self.ppis.len() + self.guids.len()
    }

    /// Returns `true` if there is nothing to emit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use uguid::guid;

    use super::*;
    use crate::{
        autogen::order::LibraryOrder,
        surface::{Arch, Declared, ModuleDescriptor, ModuleType, ModuleView},
        test::{library, link, module, package, ppi, protocol, registry, use_package},
    };

    fn resolve(driver: &ModuleDescriptor, registry: &Registry) -> Result<ResolvedCapabilities> {
        let view = ModuleView::new(driver, Arch::Ia32);
        let order = LibraryOrder::resolve(&view, registry)?;
        ResolvedCapabilities::resolve(&CapabilitySet::collect(&view, &order), registry)
    }

    #[test]
    fn test_c_initializer() {
        let value = guid!("d2b2b828-0826-48a7-b3df-983c006024f0");
        assert_eq!(
            c_initializer(&value),
            "0xd2b2b828, 0x0826, 0x48a7, {0xb3, 0xdf, 0x98, 0x3c, 0x00, 0x60, 0x24, 0xf0}"
        );
    }

    #[test]
    fn test_resolution_uses_dependent_packages_only() {
        let mut declared = package("Declares");
        protocol(&mut declared, "Foo", "gFooProtocolGuid");
        let elsewhere = package("Elsewhere");

        let mut driver = module("Driver", ModuleType::DxeDriver);
        use_package(&mut driver, &elsewhere);
        driver.protocols.push(Declared::new("Foo".into()));

        let registry = registry([declared, elsewhere], []);
        let err = resolve(&driver, &registry).unwrap_err();
        match err {
            Error::DeclarationNotFound { kind, keyword } => {
                assert_eq!(kind, CapabilityKind::Protocol);
                assert_eq!(keyword, "Foo");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_shared_keyword_emitted_once() {
        let mut mde = package("MdePkg");
        protocol(&mut mde, "DevicePath", "gEfiDevicePathProtocolGuid");
        ppi(&mut mde, "Stall", "gEfiPeiStallPpiGuid");

        let mut lib = library("Lib", ModuleType::Base);
        use_package(&mut lib, &mde);
        lib.protocols.push(Declared::new("DevicePath".into()));

        let mut driver = module("Driver", ModuleType::DxeDriver);
        use_package(&mut driver, &mde);
        driver.protocols.push(Declared::new("DevicePath".into()));
        driver
            .protocol_notifies
            .push(Declared::new("DevicePath".into()));
        driver.ppis.push(Declared::new("Stall".into()));
        link(&mut driver, &lib);

        let registry = registry([mde], [lib]);
        let resolved = resolve(&driver, &registry).unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(
            resolved.entries(CapabilityKind::Protocol)[0].cname,
            "gEfiDevicePathProtocolGuid"
        );
        assert_eq!(
            resolved.iter().map(|entry| entry.cname.as_str()).collect::<Vec<_>>(),
            ["gEfiDevicePathProtocolGuid", "gEfiPeiStallPpiGuid"]
        );
    }

    #[test]
    fn test_symbol_dedup_across_namespaces() {
        let mut pkg = package("Pkg");
        protocol(&mut pkg, "Same", "gSharedGuid");
        crate::test::guid(&mut pkg, "AlsoSame", "gSharedGuid");

        let mut driver = module("Driver", ModuleType::UefiDriver);
        use_package(&mut driver, &pkg);
        driver.protocols.push(Declared::new("Same".into()));
        driver.guids.push(Declared::new("AlsoSame".into()));

        let registry = registry([pkg], []);
        let resolved = resolve(&driver, &registry).unwrap();

        assert_eq!(resolved.len(), 1);
        assert!(resolved.entries(CapabilityKind::Guid).is_empty());
    }

    #[test]
    fn test_first_package_wins() {
        let mut first = package("First");
        let mut second = package("Second");
        protocol(&mut first, "Dup", "gFirstDupGuid");
        protocol(&mut second, "Dup", "gSecondDupGuid");

        let mut driver = module("Driver", ModuleType::DxeDriver);
        use_package(&mut driver, &second);
        use_package(&mut driver, &first);
        driver.protocols.push(Declared::new("Dup".into()));

        let registry = registry([first, second], []);
        let resolved = resolve(&driver, &registry).unwrap();
        assert_eq!(
            resolved.entries(CapabilityKind::Protocol)[0].cname,
            "gSecondDupGuid"
        );
    }
}
