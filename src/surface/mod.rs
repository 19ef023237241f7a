//! Surface-area model for firmware modules, library instances and packages.
//!
//! A *surface area* is everything a module declares about itself: its identity, the
//! capabilities (PPIs, protocols, GUIDs) it consumes or produces, the packages it depends on,
//! the library classes and instances it links against, and the symbols (entry points,
//! constructors, lifecycle hooks) the generated glue code has to call.
//!
//! The types here are plain data. Descriptors are loaded once (see
//! [`crate::registry::Registry::from_xml`]) and never mutated by generation; every generation
//! pass reads them through a [`ModuleView`], which pins the target architecture.
//!
//! # Key Components
//!
//! - [`ModuleType`] - Closed set of module types; selects the generated code shape
//! - [`Arch`] / [`ArchSet`] - Target architectures and architecture filters
//! - [`CapabilityKind`] - The three capability namespaces (PPI, protocol, GUID)
//! - [`ModuleDescriptor`] - Everything a module or library instance declares
//! - [`ModuleView`] - Architecture-scoped read-only accessor over a descriptor

mod descriptor;
mod view;

pub use descriptor::{
    Declared, DriverModel, InstanceRef, LibraryClassUsage, ModuleDescriptor, ModuleId, PackageRef,
};
pub use view::ModuleView;

use bitflags::bitflags;
use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// Firmware module types understood by the generator.
///
/// Parsed from and displayed as the surface-area spelling (`PEI_CORE`, `UEFI_DRIVER`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    IntoStaticStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleType {
    /// Phase independent code, typically libraries
    Base,
    /// The PEI foundation
    PeiCore,
    /// A PEI module
    Peim,
    /// The DXE foundation
    DxeCore,
    /// A boot-services DXE driver
    DxeDriver,
    /// A DXE driver that survives into runtime
    DxeRuntimeDriver,
    /// A DXE driver providing SAL services
    DxeSalDriver,
    /// A driver loaded into SMRAM
    DxeSmmDriver,
    /// A UEFI driver-model driver
    UefiDriver,
    /// A UEFI application
    UefiApplication,
}

impl ModuleType {
    /// Returns `true` for module types executed during the PEI phase.
    #[must_use]
    pub fn is_pei(self) -> bool {
        matches!(self, ModuleType::PeiCore | ModuleType::Peim)
    }

    /// Returns `true` for module types executed once boot services are available.
    #[must_use]
    pub fn is_dxe(self) -> bool {
        !self.is_pei() && self != ModuleType::Base
    }
}

/// Target architectures.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Arch {
    /// 32-bit x86
    Ia32,
    /// x86-64
    X64,
    /// Itanium
    Ipf,
    /// EFI byte code
    Ebc,
}

bitflags! {
    /// Set of architectures a declaration applies to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ArchSet: u8 {
        /// 32-bit x86
        const IA32 = 0x01;
        /// x86-64
        const X64 = 0x02;
        /// Itanium
        const IPF = 0x04;
        /// EFI byte code
        const EBC = 0x08;
    }
}

impl Default for ArchSet {
    fn default() -> Self {
        ArchSet::all()
    }
}

impl From<Arch> for ArchSet {
    fn from(arch: Arch) -> Self {
        match arch {
            Arch::Ia32 => ArchSet::IA32,
            Arch::X64 => ArchSet::X64,
            Arch::Ipf => ArchSet::IPF,
            Arch::Ebc => ArchSet::EBC,
        }
    }
}

impl ArchSet {
    /// Returns `true` if `arch` is a member of this set.
    #[must_use]
    pub fn includes(self, arch: Arch) -> bool {
        self.contains(ArchSet::from(arch))
    }
}

/// The three GUID-backed capability namespaces a module can consume.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, EnumCount, IntoStaticStr,
)]
pub enum CapabilityKind {
    /// PEIM-to-PEIM interface
    #[strum(serialize = "PPI")]
    Ppi,
    /// DXE protocol
    #[strum(serialize = "Protocol")]
    Protocol,
    /// Plain GUID (event groups, HOBs, variables, ...)
    #[strum(serialize = "GUID")]
    Guid,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_module_type_spelling() {
        assert_eq!(ModuleType::PeiCore.to_string(), "PEI_CORE");
        assert_eq!(ModuleType::Peim.to_string(), "PEIM");
        assert_eq!(ModuleType::DxeSmmDriver.to_string(), "DXE_SMM_DRIVER");
        assert_eq!(
            ModuleType::from_str("UEFI_APPLICATION").unwrap(),
            ModuleType::UefiApplication
        );
        assert!(ModuleType::from_str("SEC_CORE").is_err());

        for ty in ModuleType::iter() {
            assert_eq!(ModuleType::from_str(ty.into()).unwrap(), ty);
        }
    }

    #[test]
    fn test_module_type_phase() {
        assert!(ModuleType::Peim.is_pei());
        assert!(!ModuleType::Peim.is_dxe());
        assert!(ModuleType::DxeCore.is_dxe());
        assert!(ModuleType::UefiApplication.is_dxe());
        assert!(!ModuleType::Base.is_dxe());
        assert!(!ModuleType::Base.is_pei());
    }

    #[test]
    fn test_arch_set() {
        assert_eq!(Arch::from_str("IA32").unwrap(), Arch::Ia32);
        assert_eq!(Arch::X64.to_string(), "X64");

        let set = ArchSet::IA32 | ArchSet::X64;
        assert!(set.includes(Arch::Ia32));
        assert!(!set.includes(Arch::Ipf));
        assert!(ArchSet::default().includes(Arch::Ebc));
    }

    #[test]
    fn test_capability_kind_display() {
        assert_eq!(CapabilityKind::Ppi.to_string(), "PPI");
        assert_eq!(CapabilityKind::Protocol.to_string(), "Protocol");
        assert_eq!(CapabilityKind::Guid.to_string(), "GUID");
    }
}
