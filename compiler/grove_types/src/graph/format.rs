//! Source-like rendering of type references.
//!
//! Rendering is cycle-safe: once a placeholder has been printed with its
//! bounds, later occurrences inside those bounds print as the bare name, so
//! `T extends Comparable<? super T>` terminates.

use rustc_hash::FxHashSet;

use grove_ir::Name;

use super::{ClassGraph, ClassKind};
use crate::{ClassId, GenericsType};

impl ClassGraph {
    /// Render `id` with its type arguments, e.g. `java.util.Map<K, java.util.List<V>>`.
    pub fn type_text(&self, id: ClassId) -> String {
        let mut out = String::new();
        self.write_bounds(id, &mut FxHashSet::default(), &mut out);
        out
    }

    /// Render one generics slot, e.g. `T extends java.lang.Number` or
    /// `? super java.lang.Integer`.
    pub fn generics_text(&self, gt: &GenericsType) -> String {
        let mut out = String::new();
        self.write_generics(gt, &mut FxHashSet::default(), &mut out);
        out
    }

    fn write_generics(&self, gt: &GenericsType, visited: &mut FxHashSet<Name>, out: &mut String) {
        if gt.placeholder {
            visited.insert(gt.name);
        }
        if gt.wildcard || gt.placeholder {
            out.push_str(self.lookup(gt.name));
        } else {
            self.write_bounds(gt.ty, visited, out);
        }

        if let Some(lower) = gt.lower_bound {
            out.push_str(" super ");
            self.write_bounds(lower, visited, out);
            return;
        }
        let Some(upper) = gt.upper_bounds.as_deref() else {
            return;
        };
        // `T extends Object` prints as `T`.
        let trivial = gt.placeholder
            && upper.len() == 1
            && !self.is_generics_placeholder(upper[0])
            && self.terminal(upper[0]) == ClassId::OBJECT;
        if trivial {
            return;
        }
        out.push_str(" extends ");
        for (i, &bound) in upper.iter().enumerate() {
            if i > 0 {
                out.push_str(" & ");
            }
            self.write_bounds(bound, visited, out);
        }
    }

    fn write_bounds(&self, id: ClassId, visited: &mut FxHashSet<Name>, out: &mut String) {
        if let Some(component) = self.record(id).component {
            self.write_bounds(component, visited, out);
            out.push_str("[]");
            return;
        }

        let terminal = self.terminal(id);
        let generics = self.generics(id).unwrap_or_default();

        // A placeholder node (or an `Object` carrying a single placeholder
        // slot) prints as just the placeholder name.
        let lone_placeholder = generics.len() == 1 && generics[0].placeholder;
        if lone_placeholder && (terminal == ClassId::OBJECT || self.is_generics_placeholder(id)) {
            out.push_str(self.lookup(generics[0].name));
            return;
        }

        // Virtual types carry their interfaces' arguments in `text` already.
        if let ClassKind::Virtual(v) = &self.record(terminal).kind {
            out.push_str(&v.text);
            return;
        }
        out.push_str(self.name_str(terminal));
        if generics.is_empty() {
            return;
        }

        out.push('<');
        for (i, gt) in generics.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if gt.placeholder && visited.contains(&gt.name) {
                out.push_str(self.lookup(gt.name));
            } else {
                self.write_generics(gt, visited, out);
            }
        }
        out.push('>');
    }
}
