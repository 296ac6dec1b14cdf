//! The class graph.
//!
//! One arena holds every type reference of a compilation. A record is either
//! a *terminal* (a declared, reflected or synthesized class) or a proxy whose
//! `redirect` points further along the chain. Use-site parameterizations
//! (`List<String>`), placeholders (`T`) and plain references are proxies: they
//! carry their own type arguments but delegate every structural query
//! (supertypes, interfaces, members) to their terminal.
//!
//! # Record lifecycle
//!
//! - **Primary**: built from source. Never redirected. Members are available
//!   immediately.
//! - **Reflected**: registered by the reflection loader with an eager header.
//!   Members are produced by the [`MemberLoader`] on first access.
//! - **Stub**: created from a bare name. Dangling until the resolver binds it
//!   with [`ClassGraph::set_redirect`]; structural queries on a dangling stub
//!   are an internal error.
//! - **Synthetic**: array wrappers, the wildcard base and virtual common types.
//!
//! Use-site parameterizations, array proxies and virtual common types are
//! interned: asking the same lattice or generics question twice hands back
//! the records built the first time instead of growing the arena.

mod body;
mod builder;
mod format;
mod hierarchy;

pub use builder::ClassBuilder;
pub use hierarchy::SuperChain;

use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use grove_diagnostic::internal_error;
use grove_ir::{Name, SharedInterner, StringInterner};

use crate::{AnnotationNode, ClassId, ClassMembers, GenericsType, MemberLoader, Modifiers};

/// Where a record came from.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Origin {
    Primary,
    Reflected,
    Stub,
    Synthetic,
}

/// Synthesized common supertype produced by the lattice engine.
///
/// The record's `super_class` and `interfaces` hold the upper bound and the
/// shared interfaces; name and backing-type queries go to `compile_time`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualType {
    /// `Virtual$...` or `CommonAssignOf$...$...`.
    pub lub_name: Name,
    /// The upper bound, or the first interface when the upper bound is
    /// `Object`.
    pub compile_time: ClassId,
    /// `Upper or I1 or I2` rendering.
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Real,
    Virtual(VirtualType),
}

pub(crate) struct ClassRecord {
    /// Name as written at the creation site (`T`, `List`, `java.util.List`).
    pub(crate) name: Name,
    pub(crate) modifiers: Modifiers,
    pub(crate) origin: Origin,
    pub(crate) redirect: Option<ClassId>,
    pub(crate) kind: ClassKind,
    /// Declared super type, as a use-site reference.
    pub(crate) super_class: Option<ClassId>,
    pub(crate) interfaces: SmallVec<[ClassId; 4]>,
    pub(crate) mixins: Vec<ClassId>,
    /// Set iff the record is an array type.
    pub(crate) component: Option<ClassId>,
    pub(crate) generics: Option<Vec<GenericsType>>,
    pub(crate) uses_generics: bool,
    pub(crate) placeholder: bool,
    pub(crate) annotations: Vec<AnnotationNode>,
    /// Binary name of the backing runtime class.
    pub(crate) type_class: Option<Name>,
    /// `X[]` for this terminal, created on first `make_array`.
    pub(crate) array_cache: Option<ClassId>,
    pub(crate) members: OnceLock<ClassMembers>,
}

impl ClassRecord {
    pub(crate) fn new(name: Name, origin: Origin) -> Self {
        ClassRecord {
            name,
            modifiers: Modifiers::PUBLIC,
            origin,
            redirect: None,
            kind: ClassKind::Real,
            super_class: None,
            interfaces: SmallVec::new(),
            mixins: Vec::new(),
            component: None,
            generics: None,
            uses_generics: false,
            placeholder: false,
            annotations: Vec::new(),
            type_class: None,
            array_cache: None,
            members: OnceLock::new(),
        }
    }
}

/// Interned use-site parameterization: terminal, placeholder name, arguments.
type UseSiteKey = (ClassId, Option<Name>, Vec<GenericsType>);

/// Interned virtual type: synthesized name, upper bound, interfaces.
type VirtualKey = (Name, ClassId, SmallVec<[ClassId; 4]>);

/// Arena of class records for one compilation.
///
/// Queries take `&self` and are safe to run from several threads at once;
/// the only interior mutation is the one-time member population of reflected
/// classes. Everything that builds or rewires the graph takes `&mut self`.
pub struct ClassGraph {
    records: Vec<ClassRecord>,
    interner: SharedInterner,
    loader: Option<Arc<dyn MemberLoader>>,
    /// Declared and reflected classes by qualified name.
    class_index: FxHashMap<Name, ClassId>,
    /// Stubs created through `make_stub`, for the resolver pass.
    pending_stubs: Vec<ClassId>,
    next_annotation: u32,
    use_sites: FxHashMap<UseSiteKey, ClassId>,
    /// Array proxy by component proxy.
    array_proxies: FxHashMap<ClassId, ClassId>,
    virtual_types: FxHashMap<VirtualKey, ClassId>,
}

impl ClassGraph {
    /// Create a graph holding only the well-known classes.
    pub fn new() -> Self {
        Self::with_interner(StringInterner::shared())
    }

    /// Create a graph that shares `interner` with the rest of the front end.
    pub fn with_interner(interner: SharedInterner) -> Self {
        let mut graph = ClassGraph {
            records: Vec::with_capacity(256),
            interner,
            loader: None,
            class_index: FxHashMap::default(),
            pending_stubs: Vec::new(),
            next_annotation: 0,
            use_sites: FxHashMap::default(),
            array_proxies: FxHashMap::default(),
            virtual_types: FxHashMap::default(),
        };
        crate::well_known::bootstrap(&mut graph);
        graph
    }

    /// Install the loader used to populate reflected classes.
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn MemberLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn set_loader(&mut self, loader: Arc<dyn MemberLoader>) {
        self.loader = Some(loader);
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn lookup(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Number of records, including proxies.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub(crate) fn record(&self, id: ClassId) -> &ClassRecord {
        match self.records.get(id.index()) {
            Some(record) => record,
            None => internal_error(format_args!("{id:?} is not a record of this class graph")),
        }
    }

    #[inline]
    pub(crate) fn record_mut(&mut self, id: ClassId) -> &mut ClassRecord {
        match self.records.get_mut(id.index()) {
            Some(record) => record,
            None => internal_error(format_args!("{id:?} is not a record of this class graph")),
        }
    }

    pub(crate) fn alloc(&mut self, record: ClassRecord) -> ClassId {
        let raw = u32::try_from(self.records.len())
            .unwrap_or_else(|_| internal_error("class graph exceeded u32 index space"));
        let id = ClassId::from_raw(raw);
        if matches!(record.origin, Origin::Primary | Origin::Reflected) {
            self.class_index.insert(record.name, id);
        }
        self.records.push(record);
        id
    }

    pub(crate) fn pending_stubs_mut(&mut self) -> &mut Vec<ClassId> {
        &mut self.pending_stubs
    }

    pub(crate) fn next_annotation_id(&mut self) -> u32 {
        let id = self.next_annotation;
        self.next_annotation += 1;
        id
    }

    /// Find a declared or reflected class by qualified name.
    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        let name = self.interner.get(name)?;
        self.class_index.get(&name).copied()
    }

    // === Redirect chain ===

    /// Follow the redirect chain to the terminal record.
    pub fn terminal(&self, id: ClassId) -> ClassId {
        let mut current = id;
        while let Some(next) = self.record(current).redirect {
            current = next;
        }
        current
    }

    /// The record's own redirect, without following the chain.
    pub fn redirect_of(&self, id: ClassId) -> Option<ClassId> {
        self.record(id).redirect
    }

    pub fn is_redirect_node(&self, id: ClassId) -> bool {
        self.record(id).redirect.is_some()
    }

    /// Bind `id` to `target`'s terminal.
    ///
    /// Binding a primary class is an internal error. Binding a node to itself
    /// is a no-op.
    pub fn set_redirect(&mut self, id: ClassId, target: ClassId) {
        let record = self.record(id);
        if record.origin == Origin::Primary {
            internal_error(format_args!(
                "tried to set a redirect for the primary class {}",
                self.lookup(record.name)
            ));
        }
        let target = self.terminal(target);
        if target == id {
            return;
        }
        tracing::trace!(
            node = self.lookup(self.record(id).name),
            target = self.lookup(self.record(target).name),
            "redirect bound"
        );
        self.record_mut(id).redirect = Some(target);
    }

    /// Terminal of `id`, which must not be a dangling stub.
    #[track_caller]
    pub(crate) fn structural(&self, id: ClassId) -> ClassId {
        let terminal = self.terminal(id);
        let record = self.record(terminal);
        if record.origin == Origin::Stub {
            internal_error(format_args!(
                "class {} was queried before it was resolved",
                self.lookup(record.name)
            ));
        }
        terminal
    }

    // === Identity and naming ===

    pub fn origin(&self, id: ClassId) -> Origin {
        self.record(id).origin
    }

    pub fn is_primary(&self, id: ClassId) -> bool {
        self.record(id).origin == Origin::Primary
    }

    /// False only for dangling stubs.
    pub fn is_resolved(&self, id: ClassId) -> bool {
        self.record(self.terminal(id)).origin != Origin::Stub
    }

    /// Qualified name of the terminal class.
    ///
    /// Virtual common types answer with their compile-time fallback's name.
    pub fn name(&self, id: ClassId) -> Name {
        let terminal = self.terminal(id);
        let record = self.record(terminal);
        match &record.kind {
            ClassKind::Virtual(v) => self.name(v.compile_time),
            ClassKind::Real => record.name,
        }
    }

    pub fn name_str(&self, id: ClassId) -> &'static str {
        self.lookup(self.name(id))
    }

    /// The name the record was created with, ignoring redirects.
    pub fn unresolved_name(&self, id: ClassId) -> Name {
        self.record(id).name
    }

    /// Synthesized name of a virtual common type.
    pub fn lub_name(&self, id: ClassId) -> Option<Name> {
        match &self.record(self.terminal(id)).kind {
            ClassKind::Virtual(v) => Some(v.lub_name),
            ClassKind::Real => None,
        }
    }

    pub fn virtual_type(&self, id: ClassId) -> Option<&VirtualType> {
        match &self.record(self.terminal(id)).kind {
            ClassKind::Virtual(v) => Some(v),
            ClassKind::Real => None,
        }
    }

    pub fn is_virtual(&self, id: ClassId) -> bool {
        self.virtual_type(id).is_some()
    }

    /// Binary name of the backing runtime class, once known.
    pub fn type_class(&self, id: ClassId) -> Option<Name> {
        let terminal = self.terminal(id);
        match &self.record(terminal).kind {
            ClassKind::Virtual(v) => self.type_class(v.compile_time),
            ClassKind::Real => self.record(terminal).type_class,
        }
    }

    pub fn set_type_class(&mut self, id: ClassId, type_class: &str) {
        let terminal = self.terminal(id);
        let name = self.intern(type_class);
        self.record_mut(terminal).type_class = Some(name);
    }

    // === Flags ===

    pub fn modifiers(&self, id: ClassId) -> Modifiers {
        self.record(self.terminal(id)).modifiers
    }

    pub fn is_interface(&self, id: ClassId) -> bool {
        self.modifiers(id).is_interface()
    }

    pub fn is_annotation_definition(&self, id: ClassId) -> bool {
        self.modifiers(id).contains(Modifiers::ANNOTATION)
    }

    pub fn is_generics_placeholder(&self, id: ClassId) -> bool {
        self.record(id).placeholder
    }

    pub fn is_using_generics(&self, id: ClassId) -> bool {
        let record = self.record(id);
        record.uses_generics || record.generics.is_some()
    }

    pub fn set_using_generics(&mut self, id: ClassId, uses: bool) {
        self.record_mut(id).uses_generics = uses;
    }

    // === Generics ===

    /// Type arguments carried by this node itself (not its terminal).
    pub fn generics(&self, id: ClassId) -> Option<&[GenericsType]> {
        self.record(id).generics.as_deref()
    }

    /// Owned copy of `generics(id)`, for callers that go on to mutate the
    /// graph.
    pub fn generics_vec(&self, id: ClassId) -> Option<Vec<GenericsType>> {
        self.record(id).generics.clone()
    }

    pub fn set_generics(&mut self, id: ClassId, generics: Option<Vec<GenericsType>>) {
        let record = self.record_mut(id);
        record.uses_generics = record.uses_generics || generics.is_some();
        record.generics = generics;
    }

    // === Arrays ===

    /// Component type; set iff the node is an array.
    pub fn component(&self, id: ClassId) -> Option<ClassId> {
        let record = self.record(id);
        record
            .component
            .or_else(|| record.redirect.and_then(|_| self.record(self.terminal(id)).component))
    }

    pub fn is_array(&self, id: ClassId) -> bool {
        self.component(id).is_some()
    }

    // === Lazy member population ===

    /// Populate the members of `id` if that has not happened yet.
    ///
    /// `id` must be a terminal; initializing a proxy is an internal error.
    pub fn lazy_init(&self, id: ClassId) {
        if self.record(id).redirect.is_some() {
            internal_error(format_args!(
                "lazy initialization requested for the redirected node {}",
                self.lookup(self.record(id).name)
            ));
        }
        self.members_of_terminal(id);
    }

    /// Has the member body of `id`'s terminal been populated?
    pub fn is_initialized(&self, id: ClassId) -> bool {
        self.record(self.terminal(id)).members.get().is_some()
    }

    pub(crate) fn members_of_terminal(&self, terminal: ClassId) -> &ClassMembers {
        let record = self.record(terminal);
        record.members.get_or_init(|| match (record.origin, &self.loader) {
            (Origin::Reflected, Some(loader)) => {
                let members = loader.load(self, terminal);
                tracing::debug!(
                    class = self.lookup(record.name),
                    methods = members.methods.len(),
                    fields = members.fields.len(),
                    "members loaded lazily"
                );
                members
            }
            _ => ClassMembers::default(),
        })
    }
}

impl Default for ClassGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClassGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassGraph")
            .field("records", &self.records.len())
            .field("classes", &self.class_index.len())
            .field("pending_stubs", &self.pending_stubs.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
