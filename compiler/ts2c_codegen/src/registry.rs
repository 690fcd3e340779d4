//! Extension points: headers, startup code, callback bodies and presets.
//!
//! A header is any block of text placed before the program (includes,
//! macros, runtime helpers, struct definitions). Lowering requires headers
//! by key; a header may require or declare further headers while
//! rendering. [`HeaderSet::resolve`] renders each key once and orders
//! dependencies first.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::resolve::Plugin;
use crate::CodegenError;

/// A block of text emitted before the program.
pub trait Header {
    /// Deduplication key; a key is emitted at most once.
    fn type_key(&self) -> &str;

    fn render(&self, cx: &mut HeaderCx) -> String;
}

/// Dependencies a header announces while rendering.
#[derive(Default)]
pub struct HeaderCx {
    requires: Vec<String>,
    declared: Vec<Rc<dyn Header>>,
}

impl HeaderCx {
    /// Depend on a registered header.
    pub fn require(&mut self, key: &str) {
        self.requires.push(key.to_string());
    }

    /// Depend on a header instance that need not be registered.
    pub fn declare(&mut self, header: Rc<dyn Header>) {
        self.requires.push(header.type_key().to_string());
        self.declared.push(header);
    }
}

/// Header implementations known to a compilation, by key.
#[derive(Default, Clone)]
pub struct HeaderRegistry {
    headers: FxHashMap<String, Rc<dyn Header>>,
}

impl HeaderRegistry {
    /// Register `header`, replacing an earlier one with the same key.
    pub fn register(&mut self, header: Rc<dyn Header>) {
        self.headers.insert(header.type_key().to_string(), header);
    }

    pub fn get(&self, key: &str) -> Option<&Rc<dyn Header>> {
        self.headers.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.headers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

/// Headers one program needs.
#[derive(Default)]
pub struct HeaderSet {
    wanted: Vec<String>,
    seen: FxHashSet<String>,
    declared: FxHashMap<String, Rc<dyn Header>>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(&mut self, key: &str) {
        if self.seen.insert(key.to_string()) {
            self.wanted.push(key.to_string());
        }
    }

    /// Require a header instance; the first instance for a key wins.
    pub fn declare(&mut self, header: Rc<dyn Header>) {
        let key = header.type_key().to_string();
        self.declared.entry(key.clone()).or_insert(header);
        self.require(&key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Render every required header, dependencies first.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve(mut self, registry: &HeaderRegistry) -> Result<Vec<String>, CodegenError> {
        let mut rendered: FxHashMap<String, (String, Vec<String>)> = FxHashMap::default();
        let mut order: Vec<String> = Vec::new();
        let mut pending: Vec<(String, Option<String>)> =
            self.wanted.drain(..).map(|key| (key, None)).collect();
        let mut round = 0usize;

        while !pending.is_empty() {
            round += 1;
            let mut next = Vec::new();
            for (key, required_by) in pending {
                if rendered.contains_key(&key) {
                    continue;
                }
                let Some(header) = self
                    .declared
                    .get(&key)
                    .or_else(|| registry.get(&key))
                    .cloned()
                else {
                    return Err(CodegenError::MissingHeader { key, required_by });
                };

                let mut cx = HeaderCx::default();
                let text = header.render(&mut cx);
                for dependency in cx.declared {
                    self.declared
                        .entry(dependency.type_key().to_string())
                        .or_insert(dependency);
                }
                for dependency in &cx.requires {
                    if !rendered.contains_key(dependency) {
                        next.push((dependency.clone(), Some(key.clone())));
                    }
                }
                order.push(key.clone());
                rendered.insert(key, (text, cx.requires));
            }
            tracing::debug!(round, headers = rendered.len(), "header round");
            pending = next;
        }

        let mut emitted = FxHashSet::default();
        let mut out = Vec::with_capacity(order.len());
        for key in &order {
            emit(key, &rendered, &mut emitted, &mut out);
        }
        Ok(out)
    }
}

fn emit(
    key: &str,
    rendered: &FxHashMap<String, (String, Vec<String>)>,
    emitted: &mut FxHashSet<String>,
    out: &mut Vec<String>,
) {
    if !emitted.insert(key.to_string()) {
        return;
    }
    let Some((text, dependencies)) = rendered.get(key) else {
        return;
    };
    for dependency in dependencies {
        emit(dependency, rendered, emitted, out);
    }
    if !text.trim().is_empty() {
        out.push(text.trim_end().to_string());
    }
}

/// Code run at the start of `main`.
pub trait Main {
    fn render(&self) -> String;
}

/// One line of a named callback body. Every contribution to the same
/// name ends up in one function.
pub trait Bottom {
    fn name(&self) -> &str;
    fn render(&self) -> String;
}

/// A bundle describing a target platform.
pub trait Preset {
    fn headers(&self) -> Vec<Rc<dyn Header>> {
        Vec::new()
    }

    fn plugins(&self) -> Vec<Rc<dyn Plugin>> {
        Vec::new()
    }

    /// Presets this one builds on; applied before it.
    fn presets(&self) -> Vec<Rc<dyn Preset>> {
        Vec::new()
    }

    fn mains(&self) -> Vec<Rc<dyn Main>> {
        Vec::new()
    }

    fn bottoms(&self) -> Vec<Rc<dyn Bottom>> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests;
