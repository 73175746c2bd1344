//! Reusable, immutable generation templates

use std::fmt;
use std::sync::Arc;

use crate::engine::Request;
use crate::schema::TypeExpr;
use crate::schema::TypeRegistry;
use crate::selector::Declarations;
use crate::settings::Settings;

/// A frozen set of declarations for one root type
///
/// Built with [`Specimen::to_model`](crate::Specimen::to_model). A model can seed a new builder
/// with [`Specimen::from_model`](crate::Specimen::from_model) or populate a matching node of
/// another call through [`Specimen::set_model`](crate::Specimen::set_model).
#[derive(Clone)]
pub struct Model {
    pub(crate) registry:     Arc<TypeRegistry>,
    pub(crate) root:         TypeExpr,
    pub(crate) declarations: Declarations,
    pub(crate) settings:     Settings,
}

impl Model {
    /// Type this model generates
    pub const fn root(&self) -> &TypeExpr { &self.root }

    /// Settings frozen into the model
    pub const fn settings(&self) -> &Settings { &self.settings }

    /// Registry the root type resolves against
    pub fn registry(&self) -> &TypeRegistry { &self.registry }

    pub(crate) const fn request(&self) -> Request<'_> {
        Request {
            registry:     &self.registry,
            root:         &self.root,
            declarations: &self.declarations,
            settings:     &self.settings,
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("root", &self.root.to_string())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
