//! Factory functions for surface-area test data.
//!
//! Every module and package built here gets a GUID derived from its name, so tests can
//! rebuild references without keeping the descriptor around.

use uguid::Guid;

use crate::{
    registry::{GuidDeclaration, PackageDescriptor, PackageId, Registry},
    surface::{
        CapabilityKind, Declared, LibraryClassUsage, ModuleDescriptor, ModuleId, ModuleType,
    },
};

/// Stable GUID for a test name.
pub(crate) fn guid_of(name: &str) -> Guid {
    let mut bytes = [0u8; 16];
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for (index, slot) in bytes.iter_mut().enumerate() {
        for byte in name.bytes().chain(std::iter::once(index as u8)) {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        *slot = (hash >> 24) as u8;
    }
    Guid::from_bytes(bytes)
}

/// A driver-side module with no declarations.
pub(crate) fn module(name: &str, module_type: ModuleType) -> ModuleDescriptor {
    ModuleDescriptor::new(ModuleId::new(name, guid_of(name), "1.0"), module_type)
}

/// A library instance with no declarations.
pub(crate) fn library(name: &str, module_type: ModuleType) -> ModuleDescriptor {
    ModuleDescriptor::library(ModuleId::new(name, guid_of(name), "1.0"), module_type)
}

/// A library instance producing `class` with the given constructor and destructor.
pub(crate) fn library_with_hooks(
    name: &str,
    module_type: ModuleType,
    class: &str,
    constructor: Option<&str>,
    destructor: Option<&str>,
) -> ModuleDescriptor {
    let mut lib = library(name, module_type);
    lib.library_classes.push(Declared::new((
        class.to_string(),
        LibraryClassUsage::Produced,
    )));
    lib.constructor = constructor.map(str::to_string);
    lib.destructor = destructor.map(str::to_string);
    lib
}

/// Makes `consumer` link `instance` explicitly.
pub(crate) fn link(consumer: &mut ModuleDescriptor, instance: &ModuleDescriptor) {
    consumer
        .library_instances
        .push(Declared::new(instance.reference()));
}

/// Makes `consumer` consume the library class `class`.
pub(crate) fn consume(consumer: &mut ModuleDescriptor, class: &str) {
    consumer.library_classes.push(Declared::new((
        class.to_string(),
        LibraryClassUsage::Consumed,
    )));
}

/// Makes `consumer` depend on `package`.
pub(crate) fn use_package(consumer: &mut ModuleDescriptor, package: &PackageDescriptor) {
    consumer.packages.push(Declared::new(package.reference()));
}

/// An empty package, version 1.0.
pub(crate) fn package(name: &str) -> PackageDescriptor {
    PackageDescriptor::new(PackageId {
        name: name.to_string(),
        guid: guid_of(name),
        version: "1.0".to_string(),
    })
}

fn declare(package: &mut PackageDescriptor, kind: CapabilityKind, keyword: &str, cname: &str) {
    package.declarations_mut(kind).insert(
        keyword.to_string(),
        GuidDeclaration {
            cname: cname.to_string(),
            guid: guid_of(cname),
        },
    );
}

/// Declares a protocol keyword in `package`.
pub(crate) fn protocol(package: &mut PackageDescriptor, keyword: &str, cname: &str) {
    declare(package, CapabilityKind::Protocol, keyword, cname);
}

/// Declares a PPI keyword in `package`.
pub(crate) fn ppi(package: &mut PackageDescriptor, keyword: &str, cname: &str) {
    declare(package, CapabilityKind::Ppi, keyword, cname);
}

/// Declares a GUID keyword in `package`.
pub(crate) fn guid(package: &mut PackageDescriptor, keyword: &str, cname: &str) {
    declare(package, CapabilityKind::Guid, keyword, cname);
}

/// A registry holding `packages` and `modules`, in that order.
pub(crate) fn registry(
    packages: impl IntoIterator<Item = PackageDescriptor>,
    modules: impl IntoIterator<Item = ModuleDescriptor>,
) -> Registry {
    let mut registry = Registry::new();
    for package in packages {
        registry.add_package(package);
    }
    for module in modules {
        registry.add_module(module);
    }
    registry
}
