//! One generation pass: node tree, selector resolution, assignment plan, walk
//!
//! The caller owns the random source and the instance graph. Nested models run through here too,
//! writing into the same graph with the same random source.

use std::sync::Arc;

use error_stack::ResultExt;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::assignment::AssignmentPlan;
use crate::diagnostics::GeneratorFailureReport;
use crate::diagnostics::UnusedSelectorReport;
use crate::error::Error;
use crate::error::Result;
use crate::generation::GenerationWalker;
use crate::generation::InstanceGraph;
use crate::generation::Random;
use crate::generation::Value;
use crate::generation::WalkContext;
use crate::node_model::NodeTreeBuilder;
use crate::schema::TypeExpr;
use crate::schema::TypeRegistry;
use crate::selector;
use crate::selector::Declarations;
use crate::settings::Settings;

/// Inputs of one pass
#[derive(Clone, Copy)]
pub(crate) struct Request<'a> {
    pub(crate) registry:     &'a Arc<TypeRegistry>,
    pub(crate) root:         &'a TypeExpr,
    pub(crate) declarations: &'a Declarations,
    pub(crate) settings:     &'a Settings,
}

pub(crate) struct Outcome {
    pub(crate) root:     Value,
    pub(crate) unused:   UnusedSelectorReport,
    pub(crate) failures: Vec<GeneratorFailureReport>,
}

pub(crate) fn run(request: &Request<'_>, random: &mut Random, graph: &mut InstanceGraph) -> Result<Outcome> {
    let Request {
        registry,
        root,
        declarations,
        settings,
    } = *request;

    settings.validate()?;
    declarations.validate(registry)?;

    let tree = NodeTreeBuilder::new(Arc::clone(registry), settings.max_depth)
        .build(root)
        .attach_with(|| format!("root type: {root}"))?;
    if settings.verbose {
        info!("Node tree for {root}:\n{}", tree.render());
    }

    let overrides = selector::resolve(&tree, declarations);
    let plan = AssignmentPlan::new(&tree, &declarations.assignments)?;

    let context = WalkContext {
        tree:         &tree,
        registry:     registry.as_ref(),
        declarations,
        overrides:    &overrides,
        plan:         &plan,
        settings,
    };
    let walked = GenerationWalker::new(context, random, graph)
        .generate()
        .attach_with(|| format!("root type: {root}"))?;

    let mut unused = overrides.unused_selectors().clone();
    unused.merge(walked.nested_unused);
    debug!(
        root = %root,
        instances = graph.len(),
        failures = walked.failures.len(),
        unused = unused.selectors.len(),
        "Generation pass finished"
    );

    Ok(Outcome {
        root: walked.root,
        unused,
        failures: walked.failures,
    })
}

/// Turn unused selectors into an error unless the call is lenient
pub(crate) fn check_unused(unused: &UnusedSelectorReport, settings: &Settings) -> Result<()> {
    if unused.is_empty() {
        return Ok(());
    }
    if settings.lenient {
        warn!(count = unused.selectors.len(), "Ignoring unused selectors: {unused}");
        return Ok(());
    }
    Err(Error::UnusedSelectors(Box::new(unused.clone())).into())
}
