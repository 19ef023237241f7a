// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # tianogen
//!
//! AutoGen glue-code generation for EDK-style firmware modules.
//!
//! Every module of an EDK build is compiled together with two generated files: `AutoGen.h`,
//! which pulls in the headers for the module's type and the library classes it uses, and
//! `AutoGen.c`, which defines the GUID globals the module references and the dispatchers that
//! run library constructors, the module's entry points and its unload handlers. `tianogen`
//! produces both from a workspace description of packages, modules and library instances.
//!
//! ## Features
//!
//! - **Deterministic output** - identical inputs always render byte-identical files
//! - **Library ordering** - constructors run after everything they depend on, destructors in reverse
//! - **Scoped resolution** - capability keywords resolve only against the packages a module depends on
//! - **Incremental friendly** - unchanged files are never rewritten, so build timestamps stay valid
//! - **Parallel** - independent modules are generated concurrently
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tianogen::prelude::*;
//!
//! let registry = Registry::from_path(Path::new("workspace.xml"))?;
//! let autogen = AutoGen::new(&registry);
//!
//! let module = registry.require_module("HelloWorld")?;
//! let report = autogen.generate(
//!     module,
//!     Arch::X64,
//!     Path::new("Build/HelloWorld/X64"),
//!     &PcdFragments::default(),
//! )?;
//! println!("{report}");
//! # Ok::<(), tianogen::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`surface`] - What modules, library instances and packages declare
//! - [`registry`] - The set of known packages and modules, and lookups across them
//! - [`autogen`] - Ordering, aggregation, resolution, rendering and writing
//! - [`Error`] and [`Result`] - Error handling

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust,no_run
/// use tianogen::prelude::*;
///
/// let registry = Registry::from_xml("<Workspace/>")?;
/// let autogen = AutoGen::new(&registry);
/// # Ok::<(), tianogen::Error>(())
/// ```
pub mod prelude;

/// Surface-area model of firmware modules.
///
/// # Key Types
///
/// - [`surface::ModuleDescriptor`] - Declarations of one module or library instance
/// - [`surface::ModuleView`] - Architecture-scoped accessor over a descriptor
/// - [`surface::ModuleType`] - The closed set of module types
pub mod surface;

/// Packages and modules known to a build.
pub mod registry;

/// `AutoGen.h` / `AutoGen.c` generation.
///
/// See [`autogen::AutoGen`] for the entry point.
pub mod autogen;

/// `tianogen` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust,no_run
/// use tianogen::{registry::Registry, Result};
///
/// fn load(path: &str) -> Result<Registry> {
///     Registry::from_path(std::path::Path::new(path))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `tianogen` Error type
///
/// # Examples
///
/// ```rust,no_run
/// use tianogen::{registry::Registry, Error};
///
/// match Registry::from_xml("<Workspace><Module/></Workspace>") {
///     Ok(_) => println!("Loaded successfully"),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::{Error, ErrorCategory};

/// Main entry point for generating AutoGen files.
pub use autogen::{AutoGen, AutoGenConfig, GenerationReport, PcdFragments, UnloadPolicy};

/// Registry of packages and modules.
pub use registry::Registry;
