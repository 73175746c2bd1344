//! Depth-first population of the instance graph
//!
//! Each node is handled in a fixed order:
//!
//! 1. ignored nodes are skipped (no field, no element, descendants untouched)
//! 2. a generator override supplies the value
//! 3. an assignment supplies the value, or delays the node until its origin exists
//! 4. nullable positions roll for null
//! 5. back-references resolve through the ancestor tracker
//! 6. opaque nodes are null
//! 7. a registered custom generator that supports the type supplies the value
//! 8. everything else is built from the node's kind
//!
//! Values from steps 2 and 4 to 8 are regenerated while a filter rejects them or a unique
//! declaration has already produced them. Lists, sets and maps drop null elements unless the
//! element position is nullable, so a collection of a recursive type ends up shorter rather than
//! holding nulls. After the root pass the delayed queue is retried until it drains or a pass
//! resolves nothing.

use std::collections::HashMap;
use std::collections::HashSet;

use error_stack::Report;
use tracing::debug;
use tracing::warn;

use super::Generator;
use super::ancestor_tracker::AncestorTracker;
use super::generators::builtin;
use super::instance_graph::Instance;
use super::instance_graph::InstanceGraph;
use super::instance_graph::InstanceId;
use super::instance_graph::Slot;
use super::instance_graph::Value;
use super::random::Random;
use super::value_store::Iteration;
use super::value_store::ValueStore;
use crate::assignment::AssignAction;
use crate::assignment::Assignment;
use crate::assignment::AssignmentPlan;
use crate::assignment::DelayedNode;
use crate::diagnostics::GeneratorFailureReport;
use crate::diagnostics::NodeReport;
use crate::diagnostics::UnresolvedAssignmentReport;
use crate::diagnostics::UnusedSelectorReport;
use crate::engine;
use crate::error::Error;
use crate::error::FatalGeneratorError;
use crate::error::Result;
use crate::model::Model;
use crate::node_model::Node;
use crate::node_model::NodeId;
use crate::node_model::NodeTree;
use crate::node_model::TypeKind;
use crate::schema::Shape;
use crate::schema::TypeExpr;
use crate::schema::TypeRegistry;
use crate::selector::Declarations;
use crate::selector::GeneratorSpec;
use crate::selector::ResolvedOverrides;
use crate::settings::BackReferencePolicy;
use crate::settings::Settings;

/// Everything the walker reads but never changes
#[derive(Clone, Copy)]
pub(crate) struct WalkContext<'a> {
    pub(crate) tree:         &'a NodeTree,
    pub(crate) registry:     &'a TypeRegistry,
    pub(crate) declarations: &'a Declarations,
    pub(crate) overrides:    &'a ResolvedOverrides,
    pub(crate) plan:         &'a AssignmentPlan,
    pub(crate) settings:     &'a Settings,
}

/// Result of a completed walk
pub(crate) struct Walked {
    pub(crate) root:          Value,
    pub(crate) failures:      Vec<GeneratorFailureReport>,
    /// Unused selectors reported by delegated models
    pub(crate) nested_unused: UnusedSelectorReport,
}

enum Outcome {
    Value(Value),
    Delayed,
    Ignored,
}

enum Assigned {
    Value(Value),
    Blocked(usize),
    Unassigned,
}

enum Entry {
    Added,
    Duplicate,
    /// Null key or value in a position that does not allow it
    Dropped,
    Ignored,
}

/// Lengths of the walker's queues before an attempt, so a rejected value leaves no trace
#[derive(Clone, Copy)]
struct Mark {
    completed: usize,
    delayed:   usize,
}

pub(crate) struct GenerationWalker<'a> {
    context:       WalkContext<'a>,
    random:        &'a mut Random,
    graph:         &'a mut InstanceGraph,
    tracker:       AncestorTracker,
    store:         ValueStore,
    delayed:       Vec<DelayedNode>,
    iteration:     Vec<Iteration>,
    completed:     Vec<(NodeId, Value)>,
    /// Serialized values already produced, per unique declaration
    unique_seen:   HashMap<usize, HashSet<String>>,
    failures:      Vec<GeneratorFailureReport>,
    nested_unused: UnusedSelectorReport,
    root:          Value,
}

impl<'a> GenerationWalker<'a> {
    pub(crate) fn new(context: WalkContext<'a>, random: &'a mut Random, graph: &'a mut InstanceGraph) -> Self {
        Self {
            context,
            random,
            graph,
            tracker: AncestorTracker::new(),
            store: ValueStore::default(),
            delayed: Vec::new(),
            iteration: Vec::new(),
            completed: Vec::new(),
            unique_seen: HashMap::new(),
            failures: Vec::new(),
            nested_unused: UnusedSelectorReport::default(),
            root: Value::Null,
        }
    }

    pub(crate) fn generate(mut self) -> Result<Walked> {
        let root = self.context.tree.root().id();
        self.root = match self.create(root, &Slot::Root)? {
            Outcome::Value(value) => value,
            Outcome::Delayed | Outcome::Ignored => Value::Null,
        };
        self.drain_delayed()?;
        self.run_callbacks();
        Ok(Walked {
            root:          self.root,
            failures:      self.failures,
            nested_unused: self.nested_unused,
        })
    }

    fn create(&mut self, id: NodeId, slot: &Slot) -> Result<Outcome> {
        let ctx = self.context;
        let node = ctx.tree.get(id);
        let overrides = ctx.overrides.for_node(id);

        if overrides.ignored {
            return Ok(Outcome::Ignored);
        }
        if overrides.generator.is_none() {
            match self.assigned_value(node)? {
                Assigned::Value(value) => return Ok(self.complete(node, value)),
                Assigned::Blocked(blocked_by) => {
                    debug!(path = node.display_path(), blocked_by, "Delaying node until its origin exists");
                    self.delayed.push(DelayedNode {
                        node: id,
                        slot: slot.clone(),
                        iteration: self.iteration.clone(),
                        ancestors: self.tracker.snapshot(),
                        blocked_by,
                    });
                    return Ok(Outcome::Delayed);
                }
                Assigned::Unassigned => {}
            }
        }

        let value = if overrides.is_constrained() {
            self.produce_accepted(node)?
        } else {
            self.produce(node)?
        };
        Ok(self.complete(node, value))
    }

    fn produce(&mut self, node: &Node) -> Result<Value> {
        let ctx = self.context;
        match &ctx.overrides.for_node(node.id()).generator {
            Some(spec) => self.from_spec(node, spec),
            None => self.generate_default(node),
        }
    }

    /// Regenerate until every filter accepts the value and no unique declaration has seen it
    ///
    /// Null values are accepted as they are.
    fn produce_accepted(&mut self, node: &Node) -> Result<Value> {
        let ctx = self.context;
        let overrides = ctx.overrides.for_node(node.id());
        let attempts = ctx.settings.max_generation_attempts;
        let mut filtered = 0;
        let mut repeated = 0;

        for _ in 0..attempts {
            let mark = self.mark();
            let value = self.produce(node)?;
            if value.is_null() {
                return Ok(value);
            }
            let json = self.graph.to_json(&value);
            if !overrides.filters.iter().all(|filter| filter(&json)) {
                filtered += 1;
                self.rollback(mark);
                continue;
            }
            let key = json.to_string();
            let seen = overrides.unique.iter().any(|declaration| {
                self.unique_seen
                    .get(declaration)
                    .is_some_and(|seen| seen.contains(&key))
            });
            if seen {
                repeated += 1;
                self.rollback(mark);
                continue;
            }
            for &declaration in &overrides.unique {
                self.unique_seen
                    .entry(declaration)
                    .or_default()
                    .insert(key.clone());
            }
            return Ok(value);
        }

        Err(Report::new(Error::GenerationAbandoned {
            path: node.display_path().to_string(),
            attempts,
            reason: format!("{filtered} values rejected by filters, {repeated} values already generated"),
        }))
    }

    fn generate_default(&mut self, node: &Node) -> Result<Value> {
        let ctx = self.context;
        if self.is_nullable(node) && self.random.dice_roll(ctx.settings.nullable_probability) {
            return Ok(Value::Null);
        }
        match node.type_kind() {
            TypeKind::BackReference => return Ok(self.back_reference(node)),
            TypeKind::Opaque => return Ok(Value::Null),
            _ => {}
        }
        if let Some(generator) = ctx.declarations.custom_generator_for(node.ty()) {
            return self.invoke(node, generator.as_ref());
        }
        match node.type_kind() {
            TypeKind::Value => Ok(self.primitive(node)),
            TypeKind::Enum => Ok(self.enumeration(node)),
            TypeKind::Struct => self.create_struct(node),
            TypeKind::List => self.create_collection(node, Instance::List(Vec::new())),
            TypeKind::Set => self.create_collection(node, Instance::Set(Vec::new())),
            TypeKind::Map => self.create_map(node),
            TypeKind::Array => self.create_array(node),
            TypeKind::BackReference | TypeKind::Opaque => Ok(Value::Null),
        }
    }

    fn is_nullable(&self, node: &Node) -> bool {
        self.context.overrides.for_node(node.id()).nullable
            || (node.is_optional() && self.context.settings.options_nullable)
    }

    fn back_reference(&self, node: &Node) -> Value {
        match self.context.settings.back_references {
            BackReferencePolicy::Null => Value::Null,
            BackReferencePolicy::Ancestor => self
                .tracker
                .nearest_ancestor(node.ty())
                .map_or(Value::Null, Value::Ref),
        }
    }

    fn primitive(&mut self, node: &Node) -> Value {
        let TypeExpr::Primitive(primitive) = node.ty() else {
            return Value::Null;
        };
        Value::from_json(builtin::primitive_value(
            *primitive,
            self.random,
            self.context.settings,
        ))
    }

    fn enumeration(&mut self, node: &Node) -> Value {
        let registry = self.context.registry;
        let definition = node.ty().type_name().and_then(|name| registry.get(name));
        match definition.map(|definition| &definition.shape) {
            Some(Shape::Enum { variants }) => {
                Value::from_json(builtin::enum_variant(variants, self.random))
            }
            _ => Value::Null,
        }
    }

    fn create_struct(&mut self, node: &Node) -> Result<Value> {
        let ctx = self.context;
        let owner = self.graph.alloc(Instance::Object {
            ty:     node.ty().clone(),
            fields: Vec::new(),
        });
        self.tracker.enter(owner, node.ty());
        for &child in node.children() {
            let Some(name) = ctx.tree.get(child).field_name() else {
                continue;
            };
            let slot = Slot::Field {
                owner,
                name: name.to_string(),
            };
            match self.create(child, &slot)? {
                Outcome::Value(value) => self.graph.write(&slot, value)?,
                Outcome::Delayed => self.graph.write(&slot, Value::Null)?,
                Outcome::Ignored => {}
            }
        }
        self.tracker.exit();
        Ok(Value::Ref(owner))
    }

    fn create_collection(&mut self, node: &Node, instance: Instance) -> Result<Value> {
        let settings = self.context.settings;
        let unique = matches!(instance, Instance::Set(_));
        let owner = self.graph.alloc(instance);
        let Some(&element) = node.children().first() else {
            return Ok(Value::Ref(owner));
        };
        let keep_null = self.accepts_null(element);

        let mut size = self
            .random
            .usize_range(settings.collection_size.min, settings.collection_size.max);
        let mut len = 0;
        let mut iteration = 0;
        let mut duplicates = 0;
        while len < size {
            let slot = Slot::Element { owner, index: len };
            let mark = self.mark();
            self.iteration.push((node.id(), iteration));
            iteration += 1;
            let outcome = self.create(element, &slot);
            self.iteration.pop();
            match outcome? {
                Outcome::Value(Value::Null) if !keep_null => {
                    // The attempt still counts against the size
                    self.rollback(mark);
                    size -= 1;
                    continue;
                }
                Outcome::Value(value) if unique && self.graph.contains_element(owner, &value) => {
                    self.rollback(mark);
                    duplicates += 1;
                    if duplicates >= settings.max_generation_attempts {
                        warn!(
                            path = node.display_path(),
                            size = len,
                            "Gave up filling set after repeated duplicate elements"
                        );
                        break;
                    }
                    continue;
                }
                Outcome::Value(value) => self.graph.write(&slot, value)?,
                Outcome::Delayed => self.graph.write(&slot, Value::Null)?,
                Outcome::Ignored => break,
            }
            len += 1;
        }
        Ok(Value::Ref(owner))
    }

    fn create_map(&mut self, node: &Node) -> Result<Value> {
        let settings = self.context.settings;
        let owner = self.graph.alloc(Instance::Map(Vec::new()));
        let &[key_node, value_node] = node.children() else {
            return Ok(Value::Ref(owner));
        };

        let mut size = self
            .random
            .usize_range(settings.map_size.min, settings.map_size.max);
        let mut len = 0;
        let mut iteration = 0;
        let mut duplicates = 0;
        while len < size {
            let mark = self.mark();
            self.iteration.push((node.id(), iteration));
            iteration += 1;
            let entry = self.create_entry(owner, len, key_node, value_node);
            self.iteration.pop();
            match entry? {
                Entry::Added => len += 1,
                Entry::Dropped => {
                    self.rollback(mark);
                    size -= 1;
                }
                Entry::Duplicate => {
                    self.rollback(mark);
                    duplicates += 1;
                    if duplicates >= settings.max_generation_attempts {
                        warn!(
                            path = node.display_path(),
                            size = len,
                            "Gave up filling map after repeated duplicate keys"
                        );
                        break;
                    }
                }
                Entry::Ignored => break,
            }
        }
        Ok(Value::Ref(owner))
    }

    fn create_entry(&mut self, owner: InstanceId, index: usize, key_node: NodeId, value_node: NodeId) -> Result<Entry> {
        let key = match self.create(key_node, &Slot::MapKey { owner, index })? {
            Outcome::Value(Value::Null) if !self.accepts_null(key_node) => return Ok(Entry::Dropped),
            Outcome::Value(key) if self.graph.contains_key(owner, &key) => return Ok(Entry::Duplicate),
            Outcome::Value(key) => key,
            Outcome::Delayed => Value::Null,
            Outcome::Ignored => return Ok(Entry::Ignored),
        };
        let value = match self.create(value_node, &Slot::MapValue { owner, index })? {
            Outcome::Value(Value::Null) if !self.accepts_null(value_node) => return Ok(Entry::Dropped),
            Outcome::Value(value) => value,
            Outcome::Delayed | Outcome::Ignored => Value::Null,
        };
        self.graph.push_entry(owner, key, value)?;
        Ok(Entry::Added)
    }

    /// Whether a collection keeps null elements produced at this position
    fn accepts_null(&self, element: NodeId) -> bool {
        let ctx = self.context;
        ctx.overrides.for_node(element).nullable || ctx.tree.get(element).is_optional()
    }

    fn create_array(&mut self, node: &Node) -> Result<Value> {
        let owner = self.graph.alloc(Instance::Array(Vec::new()));
        let (TypeExpr::Array(_, len), Some(&element)) = (node.ty(), node.children().first()) else {
            return Ok(Value::Ref(owner));
        };
        for index in 0..*len {
            let slot = Slot::Element { owner, index };
            self.iteration.push((node.id(), index));
            let outcome = self.create(element, &slot);
            self.iteration.pop();
            let value = match outcome? {
                Outcome::Value(value) => value,
                Outcome::Delayed | Outcome::Ignored => Value::Null,
            };
            self.graph.write(&slot, value)?;
        }
        Ok(Value::Ref(owner))
    }

    fn from_spec(&mut self, node: &Node, spec: &GeneratorSpec) -> Result<Value> {
        match spec {
            GeneratorSpec::Value(json) => Ok(Value::from_json(json.clone())),
            GeneratorSpec::Supplier(supplier) => Ok(Value::from_json(supplier())),
            GeneratorSpec::Generator(generator) => self.invoke(node, generator.as_ref()),
            GeneratorSpec::Model(model) => self.delegate(node, model),
        }
    }

    fn invoke(&mut self, node: &Node, generator: &dyn Generator) -> Result<Value> {
        match generator.generate(self.random) {
            Ok(json) => Ok(Value::from_json(json)),
            Err(source) => self.generator_failed(node, &source),
        }
    }

    /// Wrap a leaf failure with its node; suppress it when allowed
    fn generator_failed(&mut self, node: &Node, source: &anyhow::Error) -> Result<Value> {
        let report = GeneratorFailureReport {
            path:      node.display_path().to_string(),
            depth:     node.depth(),
            type_name: node.ty().to_string(),
            message:   format!("{source:#}"),
        };
        let fatal = source.downcast_ref::<FatalGeneratorError>().is_some();
        if fatal || self.context.settings.fail_on_error {
            return Err(Report::new(Error::GeneratorFailure(Box::new(report)))
                .attach(format!("{source:?}")));
        }
        warn!(
            path = %report.path,
            depth = report.depth,
            error = %report.message,
            "Generator failed, substituting null"
        );
        self.failures.push(report);
        Ok(Value::Null)
    }

    /// Generate a node from another model sharing this call's random source and graph
    fn delegate(&mut self, node: &Node, model: &Model) -> Result<Value> {
        if model.root() != node.ty() {
            return Err(Error::invalid(
                "model",
                format!(
                    "a model of {} cannot populate {} at {}",
                    model.root(),
                    node.ty(),
                    node.display_path()
                ),
            )
            .into());
        }
        debug!(path = node.display_path(), model = %model.root(), "Delegating node to model");
        let outcome = engine::run(&model.request(), self.random, self.graph)?;
        self.failures.extend(outcome.failures);
        self.nested_unused.merge(outcome.unused);
        Ok(outcome.root)
    }

    /// Try assignments targeting `node`, last declared first
    fn assigned_value(&mut self, node: &Node) -> Result<Assigned> {
        let ctx = self.context;
        let indices = &ctx.overrides.for_node(node.id()).assignments;
        for &index in indices.iter().rev() {
            let Some(origin) = ctx.plan.origin(index) else {
                return Ok(Assigned::Blocked(index));
            };
            let Some(origin_value) = self.store.lookup(ctx.tree, origin, &self.iteration).cloned()
            else {
                return Ok(Assigned::Blocked(index));
            };
            let assignment = &ctx.declarations.assignments[index];
            if let Some(value) = self.apply(node, assignment, &origin_value)? {
                return Ok(Assigned::Value(value));
            }
        }
        Ok(Assigned::Unassigned)
    }

    /// Destination value for one assignment; `None` when no conditional branch applies
    fn apply(&mut self, node: &Node, assignment: &Assignment, origin: &Value) -> Result<Option<Value>> {
        match &assignment.action {
            AssignAction::Copy => Ok(Some(origin.clone())),
            AssignAction::Map(map) => {
                let json = self.graph.to_json(origin);
                Ok(Some(Value::from_json(map(&json, self.random))))
            }
            AssignAction::Conditional {
                branches,
                otherwise,
            } => {
                let json = self.graph.to_json(origin);
                let source = branches
                    .iter()
                    .find(|branch| (branch.predicate)(&json))
                    .map(|branch| &branch.source)
                    .or(otherwise.as_ref());
                source.map(|source| self.from_spec(node, source)).transpose()
            }
        }
    }

    /// Record the finished value for assignments and callbacks
    fn complete(&mut self, node: &Node, value: Value) -> Outcome {
        let ctx = self.context;
        if ctx.plan.is_origin(node.id()) {
            self.store.record(node.id(), &self.iteration, value.clone());
        }
        if !value.is_null() && !ctx.overrides.for_node(node.id()).callbacks.is_empty() {
            self.completed.push((node.id(), value.clone()));
        }
        Outcome::Value(value)
    }

    const fn mark(&self) -> Mark {
        Mark {
            completed: self.completed.len(),
            delayed:   self.delayed.len(),
        }
    }

    /// Forget callbacks and delayed nodes recorded since `mark`
    fn rollback(&mut self, mark: Mark) {
        self.completed.truncate(mark.completed);
        self.delayed.truncate(mark.delayed);
    }

    fn drain_delayed(&mut self) -> Result<()> {
        let mut pass = 0;
        while !self.delayed.is_empty() {
            pass += 1;
            let pending = std::mem::take(&mut self.delayed);
            debug!(pass, pending = pending.len(), "Retrying delayed nodes");

            let mut resolved = 0;
            for entry in pending {
                self.iteration = entry.iteration;
                self.tracker.restore(entry.ancestors);
                if let Outcome::Value(value) = self.create(entry.node, &entry.slot)? {
                    self.write_slot(&entry.slot, value)?;
                    resolved += 1;
                }
            }
            self.iteration.clear();
            self.tracker.restore(Vec::new());

            if resolved == 0 {
                return Err(self.unresolved().into());
            }
        }
        Ok(())
    }

    fn write_slot(&mut self, slot: &Slot, value: Value) -> Result<()> {
        if *slot == Slot::Root {
            self.root = value;
            Ok(())
        } else {
            self.graph.write(slot, value)
        }
    }

    /// Report built from the entries left after a pass without progress
    fn unresolved(&self) -> Error {
        let ctx = self.context;
        let mut blocking: Vec<usize> = self.delayed.iter().map(|entry| entry.blocked_by).collect();
        blocking.sort_unstable();
        blocking.dedup();

        let mut seen = HashSet::new();
        let nodes = self
            .delayed
            .iter()
            .filter(|entry| seen.insert(entry.node))
            .map(|entry| NodeReport::from_node(ctx.tree, ctx.tree.get(entry.node)))
            .collect();

        Error::UnresolvedAssignment(Box::new(UnresolvedAssignmentReport {
            assignments: blocking
                .into_iter()
                .map(|index| ctx.declarations.assignments[index].to_string())
                .collect(),
            nodes,
        }))
    }

    fn run_callbacks(&self) {
        let overrides = self.context.overrides;
        for (id, value) in &self.completed {
            let json = self.graph.to_json(value);
            for callback in &overrides.for_node(*id).callbacks {
                callback(&json);
            }
        }
    }
}
