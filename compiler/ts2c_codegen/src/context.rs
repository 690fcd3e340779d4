//! Everything one compilation may be extended with.
//!
//! A [`CompilationContext`] starts with the standard runtime headers,
//! resolvers and lowering rules. Presets add platform headers, plugins,
//! startup code and callbacks on top. The context is a plain value built
//! per compilation; nothing is shared between compilations.

use std::rc::Rc;

use ts2c_ir::SyntaxKind;

use crate::lower::{LowerFn, LoweringTable};
use crate::registry::{Bottom, Header, HeaderRegistry, Main, Preset};
use crate::resolve::{CallResolver, Plugin, ResolverChain};
use crate::runtime;

/// Presets including each other in a cycle stop here.
const MAX_PRESET_DEPTH: usize = 16;

#[derive(Clone)]
pub struct CompilationContext {
    headers: HeaderRegistry,
    mains: Vec<Rc<dyn Main>>,
    bottoms: Vec<Rc<dyn Bottom>>,
    resolvers: ResolverChain,
    lowering: LoweringTable,
}

impl Default for CompilationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilationContext {
    /// The standard runtime, resolvers and lowering rules.
    pub fn new() -> Self {
        let mut headers = HeaderRegistry::default();
        runtime::register_standard(&mut headers);
        CompilationContext {
            headers,
            mains: Vec::new(),
            bottoms: Vec::new(),
            resolvers: ResolverChain::standard(),
            lowering: LoweringTable::standard(),
        }
    }

    /// The standard context extended by `presets`, in order.
    pub fn with_presets(presets: &[Rc<dyn Preset>]) -> Self {
        let mut context = Self::new();
        for preset in presets {
            context.add_preset(preset.as_ref());
        }
        context
    }

    /// Apply `preset`. Nested presets are applied first, so the outer
    /// preset's registrations win.
    pub fn add_preset(&mut self, preset: &dyn Preset) {
        self.apply(preset, 0);
    }

    fn apply(&mut self, preset: &dyn Preset, depth: usize) {
        if depth > MAX_PRESET_DEPTH {
            tracing::warn!(depth, "presets nested too deeply; inner presets skipped");
            return;
        }
        for inner in preset.presets() {
            self.apply(inner.as_ref(), depth + 1);
        }
        for header in preset.headers() {
            self.register_header(header);
        }
        for plugin in preset.plugins() {
            self.register_plugin(plugin);
        }
        self.mains.extend(preset.mains());
        self.bottoms.extend(preset.bottoms());
    }

    /// Later registrations for the same key replace earlier ones.
    pub fn register_header(&mut self, header: Rc<dyn Header>) {
        tracing::debug!(key = header.type_key(), "register header");
        self.headers.register(header);
    }

    pub fn register_plugin(&mut self, plugin: Rc<dyn Plugin>) {
        self.resolvers.register_plugin(plugin);
    }

    pub fn register_resolver(&mut self, resolver: Rc<dyn CallResolver>) {
        self.resolvers.register_standard(resolver);
    }

    pub fn register_main(&mut self, main: Rc<dyn Main>) {
        self.mains.push(main);
    }

    pub fn register_bottom(&mut self, bottom: Rc<dyn Bottom>) {
        self.bottoms.push(bottom);
    }

    /// Replace the lowering rule for `kinds`.
    pub fn register_lowering(&mut self, kinds: &[SyntaxKind], rule: LowerFn) {
        self.lowering.register(kinds, rule);
    }

    pub fn headers(&self) -> &HeaderRegistry {
        &self.headers
    }

    pub fn mains(&self) -> &[Rc<dyn Main>] {
        &self.mains
    }

    pub fn bottoms(&self) -> &[Rc<dyn Bottom>] {
        &self.bottoms
    }

    pub fn resolvers(&self) -> &ResolverChain {
        &self.resolvers
    }

    pub fn lowering(&self) -> &LoweringTable {
        &self.lowering
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::StaticHeader;

    struct Board;

    impl Preset for Board {
        fn headers(&self) -> Vec<Rc<dyn Header>> {
            vec![Rc::new(StaticHeader::new("board", "#include <board.h>", &[]))]
        }

        fn presets(&self) -> Vec<Rc<dyn Preset>> {
            vec![Rc::new(Chip)]
        }
    }

    struct Chip;

    impl Preset for Chip {
        fn headers(&self) -> Vec<Rc<dyn Header>> {
            vec![
                Rc::new(StaticHeader::new("chip", "#include <chip.h>", &[])),
                Rc::new(StaticHeader::new("board", "#include <chip_board.h>", &[])),
            ]
        }
    }

    #[test]
    fn test_standard_runtime_is_registered() {
        let context = CompilationContext::new();
        assert!(context.headers().contains(runtime::keys::ARRAY));
        assert!(context.headers().contains(runtime::keys::STR_SPLIT));
        assert_eq!(context.resolvers().plugin_count(), 0);
    }

    #[test]
    fn test_outer_preset_wins_over_nested() {
        let presets: Vec<Rc<dyn Preset>> = vec![Rc::new(Board)];
        let context = CompilationContext::with_presets(&presets);
        assert!(context.headers().contains("chip"));
        let board = context.headers().get("board").map(|header| {
            let mut cx = crate::registry::HeaderCx::default();
            header.render(&mut cx)
        });
        assert_eq!(board.as_deref(), Some("#include <board.h>"));
    }
}
