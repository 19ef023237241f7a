//! Capability aggregation over a module and its ordered library instances.
//!
//! Aggregation walks the library instances in constructor order and then the module itself,
//! reading each through its own [`ModuleView`]. Keywords and packages are deduplicated on
//! first occurrence, so the position of everything in the result is fixed by the walk order.
//! The result is an immutable [`CapabilitySet`]; nothing in the walk mutates shared state.

use indexmap::IndexSet;
use log::debug;

use crate::{
    autogen::order::LibraryOrder,
    surface::{CapabilityKind, ModuleType, ModuleView, PackageRef},
};

/// A library constructor or destructor together with the module type its library declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryHook {
    /// C symbol of the constructor or destructor
    pub symbol: String,
    /// Module type declared by the library that provides the symbol
    pub module_type: ModuleType,
}

/// Everything a module pulls in through its own declarations and its library instances.
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    ppis: IndexSet<String>,
    protocols: IndexSet<String>,
    guids: IndexSet<String>,
    packages: IndexSet<PackageRef>,
    virtual_address_map: Vec<String>,
    exit_boot_services: Vec<String>,
    constructors: Vec<LibraryHook>,
    destructors: Vec<LibraryHook>,
}

impl CapabilitySet {
    /// Aggregates `module` and the instances in `order`.
    ///
    /// Library instances contribute in constructor order, the module last. PPI-notify and
    /// protocol-notify keywords fold into the PPI and protocol sets.
    ///
    /// # Arguments
    /// * `module` - View of the module being generated
    /// * `order` - The module's library instances in constructor order
    #[must_use]
    pub fn collect(module: &ModuleView<'_>, order: &LibraryOrder<'_>) -> Self {
        let mut set = CapabilitySet::default();

        for library in order.iter() {
            let view = module.scoped(library);
            set.absorb(&view);
            if let Some(symbol) = view.constructor() {
                set.constructors.push(LibraryHook {
                    symbol: symbol.to_string(),
                    module_type: view.module_type(),
                });
            }
        }

        for library in order.destruction() {
            let view = module.scoped(library);
            if let Some(symbol) = view.destructor() {
                set.destructors.push(LibraryHook {
                    symbol: symbol.to_string(),
                    module_type: view.module_type(),
                });
            }
        }

        set.absorb(module);

        debug!(
            "{}: {} PPIs, {} protocols, {} GUIDs, {} packages, {} constructors, {} destructors",
            module.name(),
            set.ppis.len(),
            set.protocols.len(),
            set.guids.len(),
            set.packages.len(),
            set.constructors.len(),
            set.destructors.len()
        );
        set
    }

    fn absorb(&mut self, view: &ModuleView<'_>) {
        self.ppis
            .extend(view.ppis().chain(view.ppi_notifies()).map(str::to_string));
        self.protocols.extend(
            view.protocols()
                .chain(view.protocol_notifies())
                .map(str::to_string),
        );
        self.guids.extend(view.guids().map(str::to_string));
        self.packages.extend(view.packages().cloned());
        self.virtual_address_map
            .extend(view.virtual_address_map_callbacks().map(str::to_string));
        self.exit_boot_services
            .extend(view.exit_boot_services_callbacks().map(str::to_string));
    }

    /// Keywords of one capability namespace in first-occurrence order.
    pub fn keywords(&self, kind: CapabilityKind) -> impl Iterator<Item = &str> {
        let set = match kind {
            CapabilityKind::Ppi => &self.ppis,
            CapabilityKind::Protocol => &self.protocols,
            CapabilityKind::Guid => &self.guids,
        };
        set.iter().map(String::as_str)
    }

    /// Dependent packages, deduplicated, in first-occurrence order.
    #[must_use]
    pub fn packages(&self) -> &IndexSet<PackageRef> {
        &self.packages
    }

    /// Virtual-address-map-change callbacks, libraries first.
    #[must_use]
    pub fn virtual_address_map_callbacks(&self) -> &[String] {
        &self.virtual_address_map
    }

    /// Exit-boot-services callbacks, libraries first.
    #[must_use]
    pub fn exit_boot_services_callbacks(&self) -> &[String] {
        &self.exit_boot_services
    }

    /// Library constructors in the order they have to run.
    #[must_use]
    pub fn constructors(&self) -> &[LibraryHook] {
        &self.constructors
    }

    /// Library destructors in the order they have to run (reverse construction order).
    #[must_use]
    pub fn destructors(&self) -> &[LibraryHook] {
        &self.destructors
    }
}
