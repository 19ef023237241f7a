//! Global metadata registry: packages and the modules/library instances built from them.
//!
//! The registry answers every question generation has to ask about the world outside the
//! module being generated:
//!
//! - which library instance a module's instance reference points to
//! - which header a package provides for a given module type
//! - which header declares a library class
//! - which C symbol and GUID value a capability keyword maps to, searching only the packages
//!   a module depends on
//!
//! Registries are usually loaded from a workspace document with [`Registry::from_xml`] or
//! [`Registry::from_path`], but can be assembled in code with [`Registry::add_package`] and
//! [`Registry::add_module`].

mod loader;

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::Path,
};

use uguid::Guid;

use crate::{
    surface::{CapabilityKind, InstanceRef, ModuleDescriptor, ModuleType, PackageRef},
    Error, Result,
};

/// Identity of a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageId {
    /// Package name
    pub name: String,
    /// Package GUID
    pub guid: Guid,
    /// Package version
    pub version: String,
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} v{})", self.name, self.guid, self.version)
    }
}

/// A C symbol bound to a GUID value, as declared by a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidDeclaration {
    /// C name of the global, e.g. `gEfiDevicePathProtocolGuid`
    pub cname: String,
    /// The GUID value
    pub guid: Guid,
}

/// Everything a package declares that generation needs.
#[derive(Debug, Clone)]
pub struct PackageDescriptor {
    /// Package identity
    pub id: PackageId,
    /// Header to include per consuming module type; an empty path means "nothing to include"
    pub module_type_headers: BTreeMap<ModuleType, String>,
    /// Header declaring each library class
    pub library_class_headers: BTreeMap<String, String>,
    /// PPI declarations by keyword
    pub ppis: BTreeMap<String, GuidDeclaration>,
    /// Protocol declarations by keyword
    pub protocols: BTreeMap<String, GuidDeclaration>,
    /// GUID declarations by keyword
    pub guids: BTreeMap<String, GuidDeclaration>,
}

impl PackageDescriptor {
    /// Creates an empty package.
    pub fn new(id: PackageId) -> Self {
        PackageDescriptor {
            id,
            module_type_headers: BTreeMap::new(),
            library_class_headers: BTreeMap::new(),
            ppis: BTreeMap::new(),
            protocols: BTreeMap::new(),
            guids: BTreeMap::new(),
        }
    }

    /// Declarations of one capability namespace.
    #[must_use]
    pub fn declarations(&self, kind: CapabilityKind) -> &BTreeMap<String, GuidDeclaration> {
        match kind {
            CapabilityKind::Ppi => &self.ppis,
            CapabilityKind::Protocol => &self.protocols,
            CapabilityKind::Guid => &self.guids,
        }
    }

    /// Mutable declarations of one capability namespace.
    pub fn declarations_mut(
        &mut self,
        kind: CapabilityKind,
    ) -> &mut BTreeMap<String, GuidDeclaration> {
        match kind {
            CapabilityKind::Ppi => &mut self.ppis,
            CapabilityKind::Protocol => &mut self.protocols,
            CapabilityKind::Guid => &mut self.guids,
        }
    }

    /// A reference that resolves back to exactly this package.
    #[must_use]
    pub fn reference(&self) -> PackageRef {
        PackageRef {
            guid: self.id.guid,
            version: Some(self.id.version.clone()),
        }
    }

    fn matches(&self, reference: &PackageRef) -> bool {
        self.id.guid == reference.guid
            && reference
                .version
                .as_ref()
                .map_or(true, |version| *version == self.id.version)
    }
}

/// Packages and modules known to a build, in registration order.
///
/// Lookups that have to pick among several candidates always pick the first registered one,
/// so results only depend on the order in which things were registered.
#[derive(Debug, Default)]
pub struct Registry {
    packages: Vec<PackageDescriptor>,
    modules: Vec<ModuleDescriptor>,
    packages_by_guid: HashMap<Guid, Vec<usize>>,
    modules_by_guid: HashMap<Guid, Vec<usize>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a registry from a workspace document.
    ///
    /// # Arguments
    /// * `xml` - The workspace document
    ///
    /// # Errors
    /// Returns [`crate::Error::Xml`] for XML syntax errors and [`crate::Error::Malformed`] (or
    /// one of the parse errors) when the document does not describe a valid workspace.
    pub fn from_xml(xml: &str) -> Result<Self> {
        loader::load(xml)
    }

    /// Loads a registry from a workspace document on disk.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read, otherwise see
    /// [`Registry::from_xml`].
    pub fn from_path(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path)?;
        Self::from_xml(&xml)
    }

    /// Registers a package.
    pub fn add_package(&mut self, package: PackageDescriptor) {
        self.packages_by_guid
            .entry(package.id.guid)
            .or_default()
            .push(self.packages.len());
        self.packages.push(package);
    }

    /// Registers a module or library instance.
    pub fn add_module(&mut self, module: ModuleDescriptor) {
        self.modules_by_guid
            .entry(module.id.guid)
            .or_default()
            .push(self.modules.len());
        self.modules.push(module);
    }

    /// All packages in registration order.
    #[must_use]
    pub fn packages(&self) -> &[PackageDescriptor] {
        &self.packages
    }

    /// All modules and library instances in registration order.
    #[must_use]
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    /// Finds the first registered package matching `reference`.
    #[must_use]
    pub fn package(&self, reference: &PackageRef) -> Option<&PackageDescriptor> {
        self.packages_by_guid
            .get(&reference.guid)?
            .iter()
            .map(|&index| &self.packages[index])
            .find(|package| package.matches(reference))
    }

    /// Finds the first registered module matching `reference`.
    #[must_use]
    pub fn module(&self, reference: &InstanceRef) -> Option<&ModuleDescriptor> {
        self.modules_by_guid
            .get(&reference.guid)?
            .iter()
            .map(|&index| &self.modules[index])
            .find(|module| {
                reference
                    .version
                    .as_ref()
                    .map_or(true, |version| *version == module.id.version)
            })
    }

    /// Finds a module by base name.
    #[must_use]
    pub fn module_by_name(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|module| module.id.name == name)
    }

    /// Like [`Registry::module_by_name`], failing with [`Error::ModuleNotFound`].
    ///
    /// # Errors
    /// Returns [`Error::ModuleNotFound`] if no module has that name.
    pub fn require_module(&self, name: &str) -> Result<&ModuleDescriptor> {
        self.module_by_name(name)
            .ok_or_else(|| Error::ModuleNotFound(name.to_string()))
    }

    /// Searches `packages` in order for a declaration of `keyword`; the first match wins.
    ///
    /// # Errors
    /// Returns [`Error::PackageNotFound`] if one of the searched packages is not registered
    /// before a match is found.
    pub fn lookup(
        &self,
        kind: CapabilityKind,
        keyword: &str,
        packages: &[PackageRef],
    ) -> Result<Option<&GuidDeclaration>> {
        for reference in packages {
            let package = self
                .package(reference)
                .ok_or_else(|| Error::PackageNotFound(reference.to_string()))?;
            if let Some(declaration) = package.declarations(kind).get(keyword) {
                return Ok(Some(declaration));
            }
        }
        Ok(None)
    }

    /// Header a package provides for modules of `module_type`.
    ///
    /// `Ok(None)` means the package declares nothing (or an empty path) for that type.
    ///
    /// # Errors
    /// Returns [`Error::PackageNotFound`] if the package is not registered.
    pub fn package_header(
        &self,
        reference: &PackageRef,
        module_type: ModuleType,
    ) -> Result<Option<&str>> {
        let package = self
            .package(reference)
            .ok_or_else(|| Error::PackageNotFound(reference.to_string()))?;
        Ok(package
            .module_type_headers
            .get(&module_type)
            .map(String::as_str)
            .filter(|header| !header.is_empty()))
    }

    /// Header declaring `class`, searched in the order of `packages`; the first match wins.
    ///
    /// # Errors
    /// Returns [`Error::PackageNotFound`] if one of the searched packages is not registered
    /// before a match is found.
    pub fn library_class_header(
        &self,
        class: &str,
        packages: &[PackageRef],
    ) -> Result<Option<&str>> {
        for reference in packages {
            let package = self
                .package(reference)
                .ok_or_else(|| Error::PackageNotFound(reference.to_string()))?;
            if let Some(header) = package.library_class_headers.get(class) {
                return Ok(Some(header.as_str()));
            }
        }
        Ok(None)
    }
}
