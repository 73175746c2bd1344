//! The full set of overrides declared for one call

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::override_kind::OverrideKind;
use super::select::Selector;
use super::select::SelectorGroup;
use super::selector_map::SelectorId;
use super::selector_map::SelectorIds;
use super::selector_map::SelectorMap;
use crate::assignment::Assignment;
use crate::assignment::ValuePredicate;
use crate::error::Result;
use crate::generation::Generator;
use crate::model::Model;
use crate::schema::TypeExpr;
use crate::schema::TypeRegistry;

/// Produces a fresh value each time it is called
pub type Supplier = Arc<dyn Fn() -> JsonValue + Send + Sync>;

/// Receives the finished value of a matched node
pub type OnComplete = Arc<dyn Fn(&JsonValue) + Send + Sync>;

/// Where an overridden node gets its value from
#[derive(Clone)]
pub enum GeneratorSpec {
    /// A fixed value
    Value(JsonValue),
    /// A fresh value per node
    Supplier(Supplier),
    /// A leaf generator
    Generator(Arc<dyn Generator>),
    /// Delegate the whole subtree to another model of the same type
    Model(Arc<Model>),
}

impl GeneratorSpec {
    /// Wrap a closure as a supplier
    pub fn supplier(supplier: impl Fn() -> JsonValue + Send + Sync + 'static) -> Self {
        Self::Supplier(Arc::new(supplier))
    }

    /// Wrap a generator
    pub fn generator(generator: impl Generator + 'static) -> Self {
        Self::Generator(Arc::new(generator))
    }
}

impl From<JsonValue> for GeneratorSpec {
    fn from(value: JsonValue) -> Self { Self::Value(value) }
}

impl From<Arc<dyn Generator>> for GeneratorSpec {
    fn from(generator: Arc<dyn Generator>) -> Self { Self::Generator(generator) }
}

impl From<Model> for GeneratorSpec {
    fn from(model: Model) -> Self { Self::Model(Arc::new(model)) }
}

impl fmt::Debug for GeneratorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Supplier(_) => f.write_str("Supplier(..)"),
            Self::Generator(_) => f.write_str("Generator(..)"),
            Self::Model(model) => f.debug_tuple("Model").field(&model.root().to_string()).finish(),
        }
    }
}

/// Selectors and values declared through the builder, in declaration order
#[derive(Clone)]
pub struct Declarations {
    ids:                          SelectorIds,
    pub(crate) ignored:           SelectorMap<()>,
    pub(crate) nullable:          SelectorMap<()>,
    pub(crate) generators:        SelectorMap<GeneratorSpec>,
    pub(crate) filters:           SelectorMap<ValuePredicate>,
    /// The value is the declaration index; members of one group share their seen values
    pub(crate) unique:            SelectorMap<usize>,
    unique_declarations:          usize,
    pub(crate) callbacks:         SelectorMap<OnComplete>,
    /// Destination selectors; the value is the index into `assignments`
    pub(crate) destinations:      SelectorMap<usize>,
    pub(crate) assignments:       Vec<Assignment>,
    pub(crate) custom_generators: Vec<Arc<dyn Generator>>,
}

impl Default for Declarations {
    fn default() -> Self { Self::new() }
}

impl Declarations {
    /// Empty declaration set
    pub fn new() -> Self {
        Self {
            ids:                 SelectorIds::default(),
            ignored:             SelectorMap::new(OverrideKind::Ignore),
            nullable:            SelectorMap::new(OverrideKind::Nullable),
            generators:          SelectorMap::new(OverrideKind::Generate),
            filters:             SelectorMap::new(OverrideKind::Filter),
            unique:              SelectorMap::new(OverrideKind::Unique),
            unique_declarations: 0,
            callbacks:           SelectorMap::new(OverrideKind::OnComplete),
            destinations:        SelectorMap::new(OverrideKind::Assign),
            assignments:         Vec::new(),
            custom_generators:   Vec::new(),
        }
    }

    pub(crate) fn ignore(&mut self, group: SelectorGroup) {
        self.ignored.insert(&mut self.ids, group, ());
    }

    pub(crate) fn nullable(&mut self, group: SelectorGroup) {
        self.nullable.insert(&mut self.ids, group, ());
    }

    pub(crate) fn generator(&mut self, group: SelectorGroup, spec: GeneratorSpec) {
        self.generators.insert(&mut self.ids, group, spec);
    }

    pub(crate) fn filter(&mut self, group: SelectorGroup, predicate: ValuePredicate) {
        self.filters.insert(&mut self.ids, group, predicate);
    }

    pub(crate) fn unique(&mut self, group: SelectorGroup) {
        let declaration = self.unique_declarations;
        self.unique_declarations += 1;
        self.unique.insert(&mut self.ids, group, declaration);
    }

    pub(crate) fn on_complete(&mut self, group: SelectorGroup, callback: OnComplete) {
        self.callbacks.insert(&mut self.ids, group, callback);
    }

    pub(crate) fn assign(&mut self, assignment: Assignment) {
        let index = self.assignments.len();
        self.destinations
            .insert(&mut self.ids, assignment.destination.clone(), index);
        self.assignments.push(assignment);
    }

    pub(crate) fn register_generator(&mut self, generator: Arc<dyn Generator>) {
        self.custom_generators.push(generator);
    }

    /// First registered custom generator that supports `ty`
    pub(crate) fn custom_generator_for(&self, ty: &TypeExpr) -> Option<&Arc<dyn Generator>> {
        self.custom_generators
            .iter()
            .find(|generator| generator.supports(ty))
    }

    /// Every declared selector with its kind, in declaration order per kind
    pub(crate) fn declared(&self) -> impl Iterator<Item = (OverrideKind, SelectorId, &Selector)> {
        fn entries<V: Clone>(
            map: &SelectorMap<V>,
        ) -> impl Iterator<Item = (OverrideKind, SelectorId, &Selector)> {
            map.entries()
                .iter()
                .map(move |entry| (map.kind(), entry.id, &entry.selector))
        }
        entries(&self.ignored)
            .chain(entries(&self.nullable))
            .chain(entries(&self.generators))
            .chain(entries(&self.filters))
            .chain(entries(&self.unique))
            .chain(entries(&self.callbacks))
            .chain(entries(&self.destinations))
    }

    /// Reject field selectors that name fields their declaring type does not have
    pub(crate) fn validate(&self, registry: &TypeRegistry) -> Result<()> {
        for (_, _, selector) in self.declared() {
            selector.validate(registry)?;
        }
        for assignment in &self.assignments {
            assignment.origin.validate(registry)?;
        }
        Ok(())
    }

    /// Whether nothing was declared
    pub fn is_empty(&self) -> bool {
        self.declared().next().is_none() && self.custom_generators.is_empty()
    }
}
