use crate::surface::{
    Arch, Declared, DriverModel, InstanceRef, LibraryClassUsage, ModuleDescriptor, ModuleType,
    PackageRef,
};

/// Read-only, architecture-scoped view over a [`ModuleDescriptor`].
///
/// The view is the only way generation code reads surface-area data. Looking at a different
/// module (a library instance while aggregating, say) is done with [`ModuleView::scoped`],
/// which returns a *new* view and leaves the current one untouched, so there is no shared
/// context to restore when an error propagates.
///
/// Views are `Copy` and hold only shared borrows, so independent modules can be generated
/// from different threads.
///
/// # Examples
///
/// ```rust,ignore
/// let view = ModuleView::new(&module, Arch::X64);
/// for library in order.iter() {
///     let scoped = view.scoped(library);
///     println!("{} declares {} protocols", scoped.name(), scoped.protocols().count());
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ModuleView<'a> {
    descriptor: &'a ModuleDescriptor,
    arch: Arch,
}

fn applicable<T>(list: &[Declared<T>], arch: Arch) -> impl Iterator<Item = &T> {
    list.iter()
        .filter(move |entry| entry.arches.includes(arch))
        .map(|entry| &entry.value)
}

fn dedup(list: &[String]) -> Vec<&str> {
    let mut seen = Vec::with_capacity(list.len());
    for symbol in list {
        if !symbol.is_empty() && !seen.contains(&symbol.as_str()) {
            seen.push(symbol.as_str());
        }
    }
    seen
}

impl<'a> ModuleView<'a> {
    /// Creates a view of `descriptor` for `arch`.
    pub fn new(descriptor: &'a ModuleDescriptor, arch: Arch) -> Self {
        ModuleView { descriptor, arch }
    }

    /// A view of another descriptor for the same architecture.
    #[must_use]
    pub fn scoped<'b>(&self, descriptor: &'b ModuleDescriptor) -> ModuleView<'b> {
        ModuleView {
            descriptor,
            arch: self.arch,
        }
    }

    /// The underlying descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &'a ModuleDescriptor {
        self.descriptor
    }

    /// The architecture this view is pinned to.
    #[must_use]
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// Module base name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.descriptor.id.name
    }

    /// Declared module type.
    #[must_use]
    pub fn module_type(&self) -> ModuleType {
        self.descriptor.module_type
    }

    /// `true` for library instances.
    #[must_use]
    pub fn is_library(&self) -> bool {
        self.descriptor.is_library
    }

    /// Dependent packages for this architecture.
    pub fn packages(&self) -> impl Iterator<Item = &'a PackageRef> {
        applicable(&self.descriptor.packages, self.arch)
    }

    /// PPI keywords for this architecture.
    pub fn ppis(&self) -> impl Iterator<Item = &'a str> {
        applicable(&self.descriptor.ppis, self.arch).map(String::as_str)
    }

    /// PPI-notify keywords for this architecture.
    pub fn ppi_notifies(&self) -> impl Iterator<Item = &'a str> {
        applicable(&self.descriptor.ppi_notifies, self.arch).map(String::as_str)
    }

    /// Protocol keywords for this architecture.
    pub fn protocols(&self) -> impl Iterator<Item = &'a str> {
        applicable(&self.descriptor.protocols, self.arch).map(String::as_str)
    }

    /// Protocol-notify keywords for this architecture.
    pub fn protocol_notifies(&self) -> impl Iterator<Item = &'a str> {
        applicable(&self.descriptor.protocol_notifies, self.arch).map(String::as_str)
    }

    /// GUID keywords for this architecture.
    pub fn guids(&self) -> impl Iterator<Item = &'a str> {
        applicable(&self.descriptor.guids, self.arch).map(String::as_str)
    }

    /// Library classes with the given usage for this architecture.
    pub fn library_classes(&self, usage: LibraryClassUsage) -> impl Iterator<Item = &'a str> {
        applicable(&self.descriptor.library_classes, self.arch)
            .filter(move |(_, declared)| *declared == usage)
            .map(|(name, _)| name.as_str())
    }

    /// Library instances for this architecture.
    pub fn library_instances(&self) -> impl Iterator<Item = &'a InstanceRef> {
        applicable(&self.descriptor.library_instances, self.arch)
    }

    /// Entry points, first occurrence of each symbol only.
    #[must_use]
    pub fn entry_points(&self) -> Vec<&'a str> {
        dedup(&self.descriptor.entry_points)
    }

    /// Unload-image handlers, first occurrence of each symbol only.
    #[must_use]
    pub fn unload_images(&self) -> Vec<&'a str> {
        dedup(&self.descriptor.unload_images)
    }

    /// Library constructor symbol.
    #[must_use]
    pub fn constructor(&self) -> Option<&'a str> {
        self.descriptor
            .constructor
            .as_deref()
            .filter(|symbol| !symbol.is_empty())
    }

    /// Library destructor symbol.
    #[must_use]
    pub fn destructor(&self) -> Option<&'a str> {
        self.descriptor
            .destructor
            .as_deref()
            .filter(|symbol| !symbol.is_empty())
    }

    /// Virtual-address-map-change callbacks.
    pub fn virtual_address_map_callbacks(&self) -> impl Iterator<Item = &'a str> {
        self.descriptor
            .virtual_address_map_callbacks
            .iter()
            .map(String::as_str)
    }

    /// Exit-boot-services callbacks.
    pub fn exit_boot_services_callbacks(&self) -> impl Iterator<Item = &'a str> {
        self.descriptor
            .exit_boot_services_callbacks
            .iter()
            .map(String::as_str)
    }

    /// Driver-model protocol groups.
    #[must_use]
    pub fn driver_model(&self) -> &'a DriverModel {
        &self.descriptor.driver_model
    }

    /// Specification-version defines.
    pub fn spec_versions(&self) -> impl Iterator<Item = &'a str> {
        self.descriptor.spec_versions.iter().map(String::as_str)
    }

    /// Whether the legacy flash-map header is requested.
    #[must_use]
    pub fn flash_map(&self) -> bool {
        self.descriptor.flash_map
    }

    /// Whether the module pins the boolean PCD `name` to true.
    #[must_use]
    pub fn pcd_enabled(&self, name: &str) -> bool {
        self.descriptor.pcd_enabled(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        surface::ArchSet,
        test::{library, module},
    };

    #[test]
    fn test_arch_filter() {
        let mut desc = module("Filter", ModuleType::DxeDriver);
        desc.protocols.push(Declared::new("Everywhere".to_string()));
        desc.protocols
            .push(Declared::on("OnlyIa32".to_string(), ArchSet::IA32));

        let ia32 = ModuleView::new(&desc, Arch::Ia32);
        let x64 = ModuleView::new(&desc, Arch::X64);

        assert_eq!(ia32.protocols().collect::<Vec<_>>(), ["Everywhere", "OnlyIa32"]);
        assert_eq!(x64.protocols().collect::<Vec<_>>(), ["Everywhere"]);
    }

    #[test]
    fn test_entry_points_dedup() {
        let mut desc = module("Dup", ModuleType::Peim);
        desc.entry_points = vec![
            "First".into(),
            "Second".into(),
            "First".into(),
            String::new(),
        ];

        let view = ModuleView::new(&desc, Arch::Ia32);
        assert_eq!(view.entry_points(), ["First", "Second"]);
    }

    #[test]
    fn test_scoped_keeps_arch_and_parent() {
        let parent = module("Parent", ModuleType::UefiDriver);
        let child = library("ChildLib", ModuleType::Base);

        let view = ModuleView::new(&parent, Arch::X64);
        let scoped = view.scoped(&child);

        assert_eq!(scoped.arch(), Arch::X64);
        assert_eq!(scoped.name(), "ChildLib");
        assert!(scoped.is_library());
        assert_eq!(view.name(), "Parent");
    }

    #[test]
    fn test_library_class_usage() {
        let mut desc = library("UsesClasses", ModuleType::Base);
        desc.library_classes
            .push(Declared::new(("BaseLib".into(), LibraryClassUsage::Consumed)));
        desc.library_classes
            .push(Declared::new(("DebugLib".into(), LibraryClassUsage::Produced)));

        let view = ModuleView::new(&desc, Arch::Ia32);
        assert_eq!(
            view.library_classes(LibraryClassUsage::Consumed)
                .collect::<Vec<_>>(),
            ["BaseLib"]
        );
        assert_eq!(
            view.library_classes(LibraryClassUsage::Produced)
                .collect::<Vec<_>>(),
            ["DebugLib"]
        );
    }
}
