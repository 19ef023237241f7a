//! # tianogen Prelude
//!
//! Commonly used types for loading a workspace and generating AutoGen files. Import this
//! module to get quick access to them.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all tianogen operations
pub use crate::{Error, ErrorCategory};

/// The result type used throughout tianogen
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Generation engine, its configuration and outputs
pub use crate::autogen::{
    AutoGen, AutoGenConfig, GenerationReport, ModuleOutcome, OutputFile, PcdFragments,
    RenderedAutoGen, UnloadPolicy, WriteOutcome,
};

/// Package and module registry
pub use crate::registry::{GuidDeclaration, PackageDescriptor, PackageId, Registry};

// ================================================================================================
// Surface Area
// ================================================================================================

/// Module declarations and their architecture-scoped view
pub use crate::surface::{
    Arch, ArchSet, CapabilityKind, Declared, DriverModel, InstanceRef, LibraryClassUsage,
    ModuleDescriptor, ModuleId, ModuleType, ModuleView, PackageRef,
};

// ================================================================================================
// Generation Stages
// ================================================================================================

/// Individual stages, for callers that inspect intermediate results
pub use crate::autogen::{
    shape_for, CapabilitySet, CodeShape, LibraryOrder, ResolvedCapabilities, ResolvedGuid,
};
