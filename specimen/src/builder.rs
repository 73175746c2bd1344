//! Builder front end: declare overrides, then create values

use std::sync::Arc;

use error_stack::Report;
use error_stack::ResultExt;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::assignment::Assignment;
use crate::diagnostics::GeneratorFailureReport;
use crate::diagnostics::UnusedSelectorReport;
use crate::engine;
use crate::engine::Request;
use crate::error::Error;
use crate::error::Result;
use crate::feed::DataSource;
use crate::feed::FeedCache;
use crate::feed::FeedGenerator;
use crate::generation::Generator;
use crate::generation::InstanceGraph;
use crate::generation::Random;
use crate::generation::Value;
use crate::model::Model;
use crate::schema::Describe;
use crate::schema::TypeExpr;
use crate::schema::TypeRegistry;
use crate::selector::Declarations;
use crate::selector::GeneratorSpec;
use crate::selector::SelectorGroup;
use crate::settings::BackReferencePolicy;
use crate::settings::Settings;
use crate::settings::seed_from_env;
use crate::support::tracing as tracing_support;

/// Generation builder for one root type
///
/// Every declaration method consumes and returns the builder. Terminal methods borrow it, so one
/// builder can create any number of values.
///
/// ```ignore
/// let person: Person = Specimen::of::<Person>()
///     .set(Selector::field_of::<Person>("name"), "Ada")
///     .ignore(Selector::field_of::<Person>("nickname"))
///     .with_seed(7)
///     .create()?;
/// ```
#[derive(Clone)]
pub struct Specimen {
    registry:     Arc<TypeRegistry>,
    root:         TypeExpr,
    declarations: Declarations,
    settings:     Settings,
    seed:         Option<u64>,
    feed_cache:   Arc<FeedCache>,
}

impl Specimen {
    /// Builder for a type implementing [`Describe`]
    pub fn of<T: Describe + ?Sized>() -> Self {
        Self::of_type(TypeRegistry::of::<T>(), TypeExpr::of::<T>())
    }

    /// Builder for a root type resolved against an existing registry
    pub fn of_type(registry: impl Into<Arc<TypeRegistry>>, root: TypeExpr) -> Self {
        Self {
            registry: registry.into(),
            root,
            declarations: Declarations::new(),
            settings: Settings::default(),
            seed: None,
            feed_cache: FeedCache::global(),
        }
    }

    /// Builder starting from a model's declarations and settings
    pub fn from_model(model: &Model) -> Self {
        Self {
            registry:     Arc::clone(&model.registry),
            root:         model.root.clone(),
            declarations: model.declarations.clone(),
            settings:     model.settings.clone(),
            seed:         None,
            feed_cache:   FeedCache::global(),
        }
    }

    /// Skip matching nodes entirely; their descendants are never visited
    #[must_use]
    pub fn ignore(mut self, selector: impl Into<SelectorGroup>) -> Self {
        self.declarations.ignore(selector.into());
        self
    }

    /// Let matching nodes be null at the configured rate
    #[must_use]
    pub fn with_nullable(mut self, selector: impl Into<SelectorGroup>) -> Self {
        self.declarations.nullable(selector.into());
        self
    }

    /// Fixed value for matching nodes
    #[must_use]
    pub fn set(mut self, selector: impl Into<SelectorGroup>, value: impl Into<JsonValue>) -> Self {
        self.declarations
            .generator(selector.into(), GeneratorSpec::Value(value.into()));
        self
    }

    /// Fresh value from `supplier` for each matching node
    #[must_use]
    pub fn supply(
        mut self,
        selector: impl Into<SelectorGroup>,
        supplier: impl Fn() -> JsonValue + Send + Sync + 'static,
    ) -> Self {
        self.declarations
            .generator(selector.into(), GeneratorSpec::supplier(supplier));
        self
    }

    /// Values from `generator` for matching nodes
    #[must_use]
    pub fn generate(mut self, selector: impl Into<SelectorGroup>, generator: impl Generator + 'static) -> Self {
        self.declarations
            .generator(selector.into(), GeneratorSpec::generator(generator));
        self
    }

    /// Regenerate matching nodes until `predicate` accepts the value
    ///
    /// Gives up with [`Error::GenerationAbandoned`] after `max_generation_attempts` rejections.
    /// Null values are not checked.
    #[must_use]
    pub fn filter(
        mut self,
        selector: impl Into<SelectorGroup>,
        predicate: impl Fn(&JsonValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.declarations.filter(selector.into(), Arc::new(predicate));
        self
    }

    /// Never produce the same value twice for the matching nodes within one call
    ///
    /// All members of the group share one set of seen values. Running out of fresh values within
    /// `max_generation_attempts` fails with [`Error::GenerationAbandoned`].
    #[must_use]
    pub fn with_unique(mut self, selector: impl Into<SelectorGroup>) -> Self {
        self.declarations.unique(selector.into());
        self
    }

    /// Populate matching nodes from another model of the same type
    #[must_use]
    pub fn set_model(mut self, selector: impl Into<SelectorGroup>, model: Model) -> Self {
        self.declarations.generator(selector.into(), model.into());
        self
    }

    /// Values from one property of an external data source
    ///
    /// Uses the builder's feed cache at the time of the call.
    #[must_use]
    pub fn feed(
        mut self,
        selector: impl Into<SelectorGroup>,
        source: Arc<dyn DataSource>,
        property: impl Into<String>,
    ) -> Self {
        let generator =
            FeedGenerator::new(source, property).with_cache(Arc::clone(&self.feed_cache));
        self.declarations
            .generator(selector.into(), GeneratorSpec::generator(generator));
        self
    }

    /// Called with the finished value of each matching node once generation completes
    #[must_use]
    pub fn on_complete(
        mut self,
        selector: impl Into<SelectorGroup>,
        callback: impl Fn(&JsonValue) + Send + Sync + 'static,
    ) -> Self {
        self.declarations
            .on_complete(selector.into(), Arc::new(callback));
        self
    }

    /// Derive a node's value from another node; see [`Assign`](crate::Assign)
    #[must_use]
    pub fn assign(mut self, assignment: impl Into<Assignment>) -> Self {
        self.declarations.assign(assignment.into());
        self
    }

    /// Generator used for every node whose type it supports, unless a selector says otherwise
    #[must_use]
    pub fn register_generator(mut self, generator: impl Generator + 'static) -> Self {
        self.declarations.register_generator(Arc::new(generator));
        self
    }

    /// Replace every setting at once
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Seed for this builder; takes precedence over every other seed source
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Nodes deeper than `max_depth` are left null
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.settings.max_depth = max_depth;
        self
    }

    /// What back-reference nodes produce
    #[must_use]
    pub const fn with_back_references(mut self, policy: BackReferencePolicy) -> Self {
        self.settings.back_references = policy;
        self
    }

    /// Log unused selectors instead of failing
    #[must_use]
    pub const fn lenient(mut self) -> Self {
        self.settings.lenient = true;
        self
    }

    /// Log the node tree before generating, installing a stderr subscriber if none is set
    #[must_use]
    pub const fn verbose(mut self) -> Self {
        self.settings.verbose = true;
        self
    }

    /// Cache used by later [`feed`](Self::feed) declarations
    #[must_use]
    pub fn with_feed_cache(mut self, cache: Arc<FeedCache>) -> Self {
        self.feed_cache = cache;
        self
    }

    /// Settings as currently declared
    pub const fn settings(&self) -> &Settings { &self.settings }

    /// Type this builder generates
    pub const fn root(&self) -> &TypeExpr { &self.root }

    /// Freeze the current declarations into a reusable model
    pub fn to_model(&self) -> Model {
        Model {
            registry:     Arc::clone(&self.registry),
            root:         self.root.clone(),
            declarations: self.declarations.clone(),
            settings:     self.settings.clone(),
        }
    }

    /// Generate one value and keep the full instance graph
    pub fn create_graph(&self) -> Result<Generated> { self.create_seeded(self.resolve_seed()) }

    /// Generate one value as JSON
    pub fn create_json(&self) -> Result<JsonValue> { Ok(self.create_graph()?.to_json()) }

    /// Generate one value and deserialize it
    pub fn create<T: DeserializeOwned>(&self) -> Result<T> { self.create_graph()?.deserialize() }

    /// Generate `count` values; each gets a seed drawn from the call's seeded source
    pub fn create_many<T: DeserializeOwned>(&self, count: usize) -> Result<Vec<T>> {
        let mut seeds = Random::new(self.resolve_seed());
        (0..count)
            .map(|index| {
                self.create_seeded(seeds.next_seed())
                    .and_then(|generated| generated.deserialize())
                    .attach_with(|| format!("item {index} of {count}"))
            })
            .collect()
    }

    fn create_seeded(&self, seed: u64) -> Result<Generated> {
        tracing_support::ensure_stderr_tracing(self.settings.verbose);
        let mut random = Random::new(seed);
        let mut graph = InstanceGraph::new();
        let request = Request {
            registry:     &self.registry,
            root:         &self.root,
            declarations: &self.declarations,
            settings:     &self.settings,
        };
        let outcome = engine::run(&request, &mut random, &mut graph)
            .attach_with(|| format!("seed: {seed}"))?;
        engine::check_unused(&outcome.unused, &self.settings)
            .attach_with(|| format!("seed: {seed}"))?;

        Ok(Generated {
            graph,
            root: outcome.root,
            seed,
            suppressed_failures: outcome.failures,
            unused: outcome.unused,
        })
    }

    fn resolve_seed(&self) -> u64 {
        if let Some(seed) = self.seed {
            debug!(seed, "Using builder seed");
            return seed;
        }
        if let Some(seed) = self.settings.seed {
            debug!(seed, "Using settings seed");
            return seed;
        }
        if let Some(seed) = seed_from_env() {
            debug!(seed, "Using environment seed");
            return seed;
        }
        let seed = rand::random();
        debug!(seed, "Using fresh seed");
        seed
    }
}

/// A finished call: the instance graph, its root and what was tolerated along the way
#[derive(Debug)]
pub struct Generated {
    graph:               InstanceGraph,
    root:                Value,
    seed:                u64,
    suppressed_failures: Vec<GeneratorFailureReport>,
    unused:              UnusedSelectorReport,
}

impl Generated {
    /// Every instance built by the call, including delegated models
    pub const fn graph(&self) -> &InstanceGraph { &self.graph }

    /// Root value; a reference into [`graph`](Self::graph) for non-leaf roots
    pub const fn root(&self) -> &Value { &self.root }

    /// Seed that reproduces this value
    pub const fn seed(&self) -> u64 { self.seed }

    /// Generator failures replaced by null because `fail_on_error` was off
    pub fn suppressed_failures(&self) -> &[GeneratorFailureReport] { &self.suppressed_failures }

    /// Unused selectors tolerated by a lenient call
    pub const fn unused_selectors(&self) -> &UnusedSelectorReport { &self.unused }

    /// Materialize the root; references back into an ancestor become null
    pub fn to_json(&self) -> JsonValue { self.graph.to_json(&self.root) }

    /// Deserialize the materialized root into `T`
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_json()).map_err(|e| {
            Report::new(Error::Conversion(e.to_string()))
                .attach(format!("target type: {}", std::any::type_name::<T>()))
        })
    }
}
