#![allow(unused)]
extern crate tianogen;

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use tianogen::prelude::*;
use uguid::Guid;

const DEPTH: usize = 64;

fn guid(kind: u8, index: usize) -> Guid {
    let mut bytes = [0u8; 16];
    bytes[0] = kind;
    bytes[8..16].copy_from_slice(&(index as u64).to_le_bytes());
    Guid::from_bytes(bytes)
}

/// A driver on top of a chain of `DEPTH` library instances, each consuming the class of the one
/// below it and declaring its own protocol.
fn deep_stack() -> Registry {
    let mut package = PackageDescriptor::new(PackageId {
        name: "BenchPkg".to_string(),
        guid: guid(1, 0),
        version: "1.0".to_string(),
    });
    package
        .module_type_headers
        .insert(ModuleType::DxeDriver, "PiDxe.h".to_string());

    let mut registry = Registry::new();
    let mut driver = ModuleDescriptor::new(
        ModuleId::new("BenchDriver", guid(2, 0), "1.0"),
        ModuleType::DxeDriver,
    );
    driver.packages.push(Declared::new(package.reference()));
    driver.entry_points.push("BenchEntry".to_string());

    for index in 0..DEPTH {
        let class = format!("Bench{index}Lib");
        package
            .library_class_headers
            .insert(class.clone(), format!("Library/{class}.h"));
        package.declarations_mut(CapabilityKind::Protocol).insert(
            format!("Bench{index}"),
            GuidDeclaration {
                cname: format!("gBench{index}ProtocolGuid"),
                guid: guid(3, index),
            },
        );

        let mut lib = ModuleDescriptor::library(
            ModuleId::new(class.clone(), guid(4, index), "1.0"),
            ModuleType::DxeDriver,
        );
        lib.library_classes
            .push(Declared::new((class.clone(), LibraryClassUsage::Produced)));
        if index > 0 {
            lib.library_classes.push(Declared::new((
                format!("Bench{}Lib", index - 1),
                LibraryClassUsage::Consumed,
            )));
        }
        lib.protocols.push(Declared::new(format!("Bench{index}")));
        lib.constructor = Some(format!("Bench{index}Constructor"));
        lib.destructor = Some(format!("Bench{index}Destructor"));

        // Linked top-down so ordering has to reverse the declaration order.
        driver.library_instances.insert(0, Declared::new(lib.reference()));
        driver
            .library_classes
            .push(Declared::new((class, LibraryClassUsage::Consumed)));
        registry.add_module(lib);
    }

    registry.add_package(package);
    registry.add_module(driver);
    registry
}

fn bench_render(c: &mut Criterion) {
    let registry = deep_stack();
    let autogen = AutoGen::new(&registry);
    let driver = registry.module_by_name("BenchDriver").unwrap();
    let pcd = PcdFragments::default();

    let mut group = c.benchmark_group("autogen");
    group.bench_function("library_order", |b| {
        b.iter(|| {
            let view = ModuleView::new(black_box(driver), Arch::X64);
            black_box(LibraryOrder::resolve(&view, &registry).unwrap().len())
        });
    });
    group.bench_function("render_deep_stack", |b| {
        b.iter(|| black_box(autogen.render(black_box(driver), Arch::X64, &pcd).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
