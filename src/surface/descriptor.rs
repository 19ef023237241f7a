use std::{collections::BTreeMap, fmt};

use uguid::Guid;

use crate::surface::{ArchSet, ModuleType};

/// Identity of a module or library instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId {
    /// Base name of the module
    pub name: String,
    /// File GUID of the module
    pub guid: Guid,
    /// Declared version string
    pub version: String,
}

impl ModuleId {
    /// Creates a new module identity.
    pub fn new(name: impl Into<String>, guid: Guid, version: impl Into<String>) -> Self {
        ModuleId {
            name: name.into(),
            guid,
            version: version.into(),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} v{})", self.name, self.guid, self.version)
    }
}

/// Reference to a library instance, as found in a module's instance list.
///
/// A missing version matches any registered version of the GUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceRef {
    /// File GUID of the referenced instance
    pub guid: Guid,
    /// Version constraint
    pub version: Option<String>,
}

impl fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} v{version}", self.guid),
            None => write!(f, "{}", self.guid),
        }
    }
}

/// Reference to a package a module depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
    /// Package GUID
    pub guid: Guid,
    /// Version constraint
    pub version: Option<String>,
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} v{version}", self.guid),
            None => write!(f, "{}", self.guid),
        }
    }
}

/// Whether a library class is consumed or produced by the declaring module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryClassUsage {
    /// `ALWAYS_CONSUMED`
    Consumed,
    /// `ALWAYS_PRODUCED`
    Produced,
}

/// A declaration qualified by the architectures it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declared<T> {
    /// The declared value
    pub value: T,
    /// Architectures the declaration is valid for
    pub arches: ArchSet,
}

impl<T> Declared<T> {
    /// A declaration valid for every architecture.
    pub fn new(value: T) -> Self {
        Declared {
            value,
            arches: ArchSet::all(),
        }
    }

    /// A declaration restricted to `arches`.
    pub fn on(value: T, arches: ArchSet) -> Self {
        Declared { value, arches }
    }
}

/// Driver-model protocol instances a driver registers, grouped by protocol.
///
/// Row `i` of the generated table combines entry `i` of every non-empty group, so every
/// non-empty group must be as long as `driver_binding`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverModel {
    /// `EFI_DRIVER_BINDING_PROTOCOL` instances
    pub driver_binding: Vec<String>,
    /// `EFI_COMPONENT_NAME_PROTOCOL` instances
    pub component_name: Vec<String>,
    /// `EFI_DRIVER_CONFIGURATION_PROTOCOL` instances
    pub driver_configuration: Vec<String>,
    /// `EFI_DRIVER_DIAGNOSTICS_PROTOCOL` instances
    pub driver_diagnostics: Vec<String>,
}

impl DriverModel {
    /// Returns `true` if no group declares anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.driver_binding.is_empty()
            && self.component_name.is_empty()
            && self.driver_configuration.is_empty()
            && self.driver_diagnostics.is_empty()
    }
}

/// The declared surface area of a module or library instance.
///
/// Library instances use the same shape with `is_library` set; their `module_type` is the
/// type the library itself declares, which matters for constructor and destructor signatures.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    /// Identity of the module
    pub id: ModuleId,
    /// GUID of the package that owns the module, if known
    pub package: Option<Guid>,
    /// Declared module type
    pub module_type: ModuleType,
    /// `true` for library instances
    pub is_library: bool,
    /// Packages whose declarations the module relies on
    pub packages: Vec<Declared<PackageRef>>,
    /// Consumed and produced library classes
    pub library_classes: Vec<Declared<(String, LibraryClassUsage)>>,
    /// Library instances linked into the module
    pub library_instances: Vec<Declared<InstanceRef>>,
    /// PPI keywords
    pub ppis: Vec<Declared<String>>,
    /// PPI notification keywords
    pub ppi_notifies: Vec<Declared<String>>,
    /// Protocol keywords
    pub protocols: Vec<Declared<String>>,
    /// Protocol notification keywords
    pub protocol_notifies: Vec<Declared<String>>,
    /// GUID keywords
    pub guids: Vec<Declared<String>>,
    /// Entry point symbols in declaration order
    pub entry_points: Vec<String>,
    /// Unload-image symbols in declaration order
    pub unload_images: Vec<String>,
    /// Library constructor symbol
    pub constructor: Option<String>,
    /// Library destructor symbol
    pub destructor: Option<String>,
    /// Callbacks for the virtual-address-map-change event
    pub virtual_address_map_callbacks: Vec<String>,
    /// Callbacks for the exit-boot-services event
    pub exit_boot_services_callbacks: Vec<String>,
    /// Driver-model protocol instances
    pub driver_model: DriverModel,
    /// `#define` bodies emitted into the header, e.g. `EFI_SPECIFICATION_VERSION 0x00020000`
    pub spec_versions: Vec<String>,
    /// Whether the legacy flash-map header is pulled in
    pub flash_map: bool,
    /// Fixed PCD values the module pins
    pub pcds: BTreeMap<String, String>,
}

impl ModuleDescriptor {
    /// Creates an empty descriptor for a module.
    pub fn new(id: ModuleId, module_type: ModuleType) -> Self {
        ModuleDescriptor {
            id,
            package: None,
            module_type,
            is_library: false,
            packages: Vec::new(),
            library_classes: Vec::new(),
            library_instances: Vec::new(),
            ppis: Vec::new(),
            ppi_notifies: Vec::new(),
            protocols: Vec::new(),
            protocol_notifies: Vec::new(),
            guids: Vec::new(),
            entry_points: Vec::new(),
            unload_images: Vec::new(),
            constructor: None,
            destructor: None,
            virtual_address_map_callbacks: Vec::new(),
            exit_boot_services_callbacks: Vec::new(),
            driver_model: DriverModel::default(),
            spec_versions: Vec::new(),
            flash_map: false,
            pcds: BTreeMap::new(),
        }
    }

    /// Creates an empty descriptor for a library instance.
    pub fn library(id: ModuleId, module_type: ModuleType) -> Self {
        ModuleDescriptor {
            is_library: true,
            ..ModuleDescriptor::new(id, module_type)
        }
    }

    /// A reference that resolves back to exactly this descriptor.
    #[must_use]
    pub fn reference(&self) -> InstanceRef {
        InstanceRef {
            guid: self.id.guid,
            version: Some(self.id.version.clone()),
        }
    }

    /// Returns `true` if the module pins `name` to a true boolean value.
    #[must_use]
    pub fn pcd_enabled(&self, name: &str) -> bool {
        self.pcds
            .get(name)
            .is_some_and(|value| value.eq_ignore_ascii_case("TRUE") || value == "1")
    }
}
