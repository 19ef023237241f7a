//! Library instance ordering.
//!
//! A module links a list of library instances; each instance may link further instances and
//! consumes library classes that other instances in the same link set produce. Both kinds of
//! relationship are dependencies: the instance that is depended upon has to be constructed
//! first and destroyed last.
//!
//! [`LibraryOrder::resolve`] collects the transitive instance set and sorts it with a
//! depth-first post-order walk, so every instance appears after everything it depends on. The
//! walk starts from instances in the order the module lists them, which makes the result a
//! pure function of the declarations. Cycles are reported with the full path.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::debug;

use crate::{
    registry::Registry,
    surface::{LibraryClassUsage, ModuleDescriptor, ModuleId, ModuleView},
    Error, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White, // Unvisited
    Gray,  // On the current path
    Black, // Emitted
}

/// Library instances of a module in constructor order.
///
/// Iterating forwards yields the order constructors run in; [`LibraryOrder::destruction`]
/// yields the exact reverse.
#[derive(Debug, Clone, Default)]
pub struct LibraryOrder<'a> {
    instances: Vec<&'a ModuleDescriptor>,
}

impl<'a> LibraryOrder<'a> {
    /// Orders the direct and transitive library instances of `module`.
    ///
    /// # Arguments
    /// * `module` - View of the module whose instance list is ordered
    /// * `registry` - Registry the instance references are resolved against
    ///
    /// # Errors
    /// Returns [`Error::LibraryInstanceNotFound`] for a dangling instance reference and
    /// [`Error::CyclicDependency`] if the instances depend on each other in a loop.
    pub fn resolve(module: &ModuleView<'_>, registry: &'a Registry) -> Result<Self> {
        let nodes = collect(module, registry)?;
        let edges = dependencies(module, registry, &nodes)?;

        let mut colors = vec![Color::White; nodes.len()];
        let mut path = Vec::new();
        let mut instances = Vec::with_capacity(nodes.len());

        for start in 0..nodes.len() {
            if colors[start] == Color::White {
                visit(start, &edges, &mut colors, &mut path, &mut instances).map_err(|cycle| {
                    Error::CyclicDependency(
                        cycle
                            .into_iter()
                            .map(|index| nodes[index].id.name.clone())
                            .collect(),
                    )
                })?;
            }
        }

        let instances: Vec<&'a ModuleDescriptor> =
            instances.into_iter().map(|index| nodes[index]).collect();
        debug!(
            "{}: library order [{}]",
            module.name(),
            instances
                .iter()
                .map(|lib| lib.id.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(LibraryOrder { instances })
    }

    /// Instances in constructor order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a ModuleDescriptor> + '_ {
        self.instances.iter().copied()
    }

    /// Instances in destructor order.
    pub fn destruction(&self) -> impl Iterator<Item = &'a ModuleDescriptor> + '_ {
        self.iter().rev()
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` if the module links no library instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instance names in constructor order.
    #[must_use]
    pub fn names(&self) -> Vec<&'a str> {
        self.instances
            .iter()
            .map(|lib| lib.id.name.as_str())
            .collect()
    }
}

type Nodes<'a> = IndexMap<&'a ModuleId, &'a ModuleDescriptor>;

/// Breadth-first collection of every instance reachable through instance references.
fn collect<'a>(module: &ModuleView<'_>, registry: &'a Registry) -> Result<Nodes<'a>> {
    let mut nodes = Nodes::new();

    for reference in module.library_instances() {
        let instance = registry.module(reference).ok_or_else(|| {
            Error::LibraryInstanceNotFound(format!("{reference} (linked by {})", module.name()))
        })?;
        nodes.entry(&instance.id).or_insert(instance);
    }

    let mut next = 0;
    while next < nodes.len() {
        let owner = module.scoped(nodes[next]);
        for reference in owner.library_instances() {
            let instance = registry.module(reference).ok_or_else(|| {
                Error::LibraryInstanceNotFound(format!("{reference} (linked by {})", owner.name()))
            })?;
            nodes.entry(&instance.id).or_insert(instance);
        }
        next += 1;
    }

    Ok(nodes)
}

/// Outgoing dependency edges per node: explicit instance links first, then producers of the
/// library classes the node consumes.
fn dependencies(
    module: &ModuleView<'_>,
    registry: &Registry,
    nodes: &Nodes<'_>,
) -> Result<Vec<Vec<usize>>> {
    let mut producers: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, instance) in nodes.values().enumerate() {
        for class in module
            .scoped(instance)
            .library_classes(LibraryClassUsage::Produced)
        {
            producers.entry(class).or_default().push(index);
        }
    }

    let mut edges = Vec::with_capacity(nodes.len());
    for (index, instance) in nodes.values().enumerate() {
        let view = module.scoped(instance);
        let mut targets = Vec::new();

        for reference in view.library_instances() {
            let target = registry
                .module(reference)
                .and_then(|target| nodes.get_index_of(&target.id))
                .ok_or_else(|| Error::LibraryInstanceNotFound(reference.to_string()))?;
            if !targets.contains(&target) {
                targets.push(target);
            }
        }

        // An instance consuming a class it also produces is not a dependency on itself.
        for class in view.library_classes(LibraryClassUsage::Consumed) {
            for &target in producers.get(class).into_iter().flatten() {
                if target != index && !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }

        edges.push(targets);
    }
    Ok(edges)
}

/// Post-order visit; on a cycle returns the node path from the re-entered node back to it.
fn visit(
    node: usize,
    edges: &[Vec<usize>],
    colors: &mut [Color],
    path: &mut Vec<usize>,
    order: &mut Vec<usize>,
) -> std::result::Result<(), Vec<usize>> {
    colors[node] = Color::Gray;
    path.push(node);

    for &target in &edges[node] {
        match colors[target] {
            Color::White => visit(target, edges, colors, path, order)?,
            Color::Gray => {
                let start = path.iter().position(|&entry| entry == target).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(target);
                return Err(cycle);
            }
            Color::Black => {}
        }
    }

    colors[node] = Color::Black;
    path.pop();
    order.push(node);
    Ok(())
}
