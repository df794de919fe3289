//! Dispatcher feature flags.

use bitflags::bitflags;

bitflags! {
    /// Toggles gating which cross-cutting participants a dispatcher resolves.
    ///
    /// Flags are fixed when the dispatcher is built. `HOOKS` has no effect
    /// unless `PIPELINE` is also set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u8 {
        /// Resolve behaviors and compose them around the handler.
        const PIPELINE = 1 << 0;
        /// Resolve pre-hooks, combined hooks and post-hooks.
        const HOOKS = 1 << 1;
    }
}

impl Features {
    /// Whether behaviors are resolved at all.
    pub fn pipeline_enabled(self) -> bool {
        self.contains(Self::PIPELINE)
    }

    /// Whether hooks are resolved. Requires the pipeline.
    pub fn hooks_enabled(self) -> bool {
        self.contains(Self::PIPELINE | Self::HOOKS)
    }
}

impl Default for Features {
    fn default() -> Self {
        Self::all()
    }
}
