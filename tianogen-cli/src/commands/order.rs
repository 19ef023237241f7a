use std::path::Path;

use serde::Serialize;
use tianogen::prelude::*;

use crate::{
    app::GlobalOptions,
    commands::common::{find_module, library_order, load_workspace, parse_arch},
    output::{heading, or_none, print_output, Listing},
};

#[derive(Debug, Serialize)]
pub struct InstanceInfo {
    pub name: String,
    pub module_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constructor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destructor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderInfo {
    pub module: String,
    pub arch: String,
    pub instances: Vec<InstanceInfo>,
    pub constructors: Vec<String>,
    pub destructors: Vec<String>,
}

pub fn run(path: &Path, arch: &str, module: &str, opts: &GlobalOptions) -> anyhow::Result<()> {
    let registry = load_workspace(path)?;
    let arch = parse_arch(arch)?;
    let module = find_module(&registry, module)?;
    let order = library_order(&registry, module, arch)?;

    let view = ModuleView::new(module, arch);
    let capabilities = CapabilitySet::collect(&view, &order);

    let info = OrderInfo {
        module: module.id.name.clone(),
        arch: arch.to_string(),
        instances: order
            .iter()
            .map(|library| {
                let scoped = view.scoped(library);
                InstanceInfo {
                    name: library.id.name.clone(),
                    module_type: library.module_type.to_string(),
                    constructor: scoped.constructor().map(str::to_string),
                    destructor: scoped.destructor().map(str::to_string),
                }
            })
            .collect(),
        constructors: capabilities
            .constructors()
            .iter()
            .map(|hook| hook.symbol.clone())
            .collect(),
        destructors: capabilities
            .destructors()
            .iter()
            .map(|hook| hook.symbol.clone())
            .collect(),
    };

    print_output(&info, opts, |info| {
        let summary = format!("{} library instance(s)", info.instances.len());
        heading(&info.module, &info.arch, Some(&summary));
        if info.instances.is_empty() {
            return;
        }
        println!();

        let mut table = Listing::numbered(&["INSTANCE", "TYPE", "CONSTRUCTOR", "DESTRUCTOR"]);
        for instance in &info.instances {
            table.row([
                instance.name.as_str(),
                instance.module_type.as_str(),
                or_none(instance.constructor.as_deref()),
                or_none(instance.destructor.as_deref()),
            ]);
        }
        table.print();

        if !info.destructors.is_empty() {
            println!();
            println!("Destructor order: {}", info.destructors.join(", "));
        }
    })
}
