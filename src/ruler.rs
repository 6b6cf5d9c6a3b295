// Rule Matcher: a named, ordered set of block rules, compiled (resolved from
// the registry into a dispatch-ready list) and cached by rule-set identity.
//
// Grounded in `logic::cache::ParserCache`'s use of `moka::sync::Cache` for a
// process-wide, lock-free cache keyed by a hash of content; here the "content"
// being cached is a *rule set*, not a document, so the key is the sorted,
// joined rule names (two rule sets with the same names, any order, are the
// same ruleset and compile to the same entry) — exactly the stable key the
// spec calls for (§4.2). `moka::sync::Cache` requires its values to be
// `Send + Sync`, which is why handlers are `Arc<dyn Fn + Send + Sync>` rather
// than the `Rc` used for the single-threaded `Env` link table: the cache is
// the one piece of `BlockParser` state meant to be shared across parser
// instances/threads (§5).

use std::collections::HashMap;
use std::sync::Arc;

use moka::sync::Cache;

use crate::rules::RuleMatch;
use crate::state::BlockState;
use crate::BlockParser;

/// Recognizes a rule at the current cursor.
pub type MatcherFn = fn(&BlockState) -> Option<RuleMatch>;

/// Consumes a match, mutates `state` (emitting tokens, advancing the
/// cursor), and returns the new cursor — or `None` to decline, which tells
/// the driver to fall back to one-line paragraph flush (e.g. `ref_link`
/// declines inside an open paragraph; see §4.2's interrupt rules).
pub type HandlerFn = Arc<dyn Fn(RuleMatch, &mut BlockState, &BlockParser) -> Option<usize> + Send + Sync>;

#[derive(Clone)]
pub struct RuleEntry {
    pub name: &'static str,
    pub matcher: MatcherFn,
    pub handler: HandlerFn,
}

/// Resolves named rule sets against a registry and caches the resolved,
/// ordered dispatch list.
pub struct Ruler {
    cache: Cache<String, Arc<Vec<RuleEntry>>>,
}

impl Ruler {
    pub fn new() -> Self {
        Self {
            cache: Cache::new(64),
        }
    }

    /// Stable cache key for a rule set: sorted names, joined. Order doesn't
    /// affect the key (two differently-ordered configs naming the same
    /// rules are the same ruleset), but the *value* preserves the order the
    /// caller asked for, which is what dispatch actually uses.
    fn key(names: &[&'static str]) -> String {
        let mut sorted: Vec<&str> = names.to_vec();
        sorted.sort_unstable();
        sorted.join("|")
    }

    pub fn resolve(&self, registry: &HashMap<&'static str, RuleEntry>, names: &[&'static str]) -> Arc<Vec<RuleEntry>> {
        let key = Self::key(names);
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }
        let compiled: Vec<RuleEntry> = names
            .iter()
            .filter_map(|name| registry.get(name).cloned())
            .collect();
        let compiled = Arc::new(compiled);
        self.cache.insert(key, compiled.clone());
        compiled
    }

    /// Drop every cached compilation. Called whenever `register_rule` or
    /// `remove_rule` changes what a rule name resolves to (§4.8: "the
    /// matcher cache is invalidated").
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for Ruler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_entry(name: &'static str) -> RuleEntry {
        RuleEntry {
            name,
            matcher: |_state| None,
            handler: Arc::new(|_m, _state, _parser| None),
        }
    }

    #[test]
    fn resolve_returns_entries_for_every_named_rule() {
        let ruler = Ruler::new();
        let mut registry = HashMap::new();
        registry.insert("b", dummy_entry("b"));
        registry.insert("a", dummy_entry("a"));

        let resolved = ruler.resolve(&registry, &["a", "b"]);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name, "a");
        assert_eq!(resolved[1].name, "b");
    }

    #[test]
    fn resolve_is_cached_by_sorted_key() {
        let ruler = Ruler::new();
        let mut registry = HashMap::new();
        registry.insert("a", dummy_entry("a"));
        let first = ruler.resolve(&registry, &["a"]);
        let second = ruler.resolve(&registry, &["a"]);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn invalidate_forces_recompilation() {
        let ruler = Ruler::new();
        let mut registry = HashMap::new();
        registry.insert("a", dummy_entry("a"));
        let first = ruler.resolve(&registry, &["a"]);
        ruler.invalidate();
        let second = ruler.resolve(&registry, &["a"]);
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
