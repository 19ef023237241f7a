use std::path::PathBuf;

use crate::autogen::shape::UnloadPolicy;

/// Configuration for AutoGen generation passes.
///
/// # Examples
///
/// ```rust,ignore
/// use tianogen::AutoGenConfig;
///
/// let config = AutoGenConfig {
///     flash_map_dir: Some("Build/FV".into()),
///     ..AutoGenConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoGenConfig {
    /// Directory holding the legacy `FlashMap.h`, usually the firmware-volume directory
    /// Only consulted for modules that request the flash-map include
    pub flash_map_dir: Option<PathBuf>,

    /// Sequencing of `ProcessModuleUnloadList` when a driver has several unload handlers
    pub unload_policy: UnloadPolicy,

    /// Apply `PcdComponentNameDisable` / `PcdDriverDiagnosticsDisable` to the driver-model table
    pub honor_driver_model_pcds: bool,
}

impl Default for AutoGenConfig {
    fn default() -> Self {
        Self {
            flash_map_dir: None,
            unload_policy: UnloadPolicy::RunAll,
            honor_driver_model_pcds: true,
        }
    }
}

impl AutoGenConfig {
    /// Configuration whose unload dispatcher stops at the first failing handler
    #[must_use]
    pub fn strict() -> Self {
        Self {
            unload_policy: UnloadPolicy::StopOnError,
            ..Self::default()
        }
    }

    /// Replaces the flash-map directory
    #[must_use]
    pub fn with_flash_map_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.flash_map_dir = Some(dir.into());
        self
    }
}
