//! Per-page template compilation.

use std::fs;
use std::io;
use std::path::Path;

use minijinja::{Environment, UndefinedBehavior, Value};
use thiserror::Error;

use crate::data::DataMap;
use crate::templates::includes::IncludeSet;

/// Errors raised while compiling a page template.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("no template for {path:?}")]
    NotFound { path: String },
    #[error("failed to read template {path:?}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("template parse failed: {0}")]
    Parse(#[from] minijinja::Error),
}

/// A page template parsed together with the shared includes.
///
/// The page owns its engine environment, so rendering needs no locks
/// and concurrent renders of the same page never contend.
pub struct CompiledPage {
    env: Environment<'static>,
    name: String,
}

impl CompiledPage {
    /// Renders the page with `data` as the template context.
    ///
    /// With no data, any reference to a context field fails the render;
    /// pages made of static markup still render fine.
    pub fn render(&self, data: Option<&DataMap>) -> Result<String, minijinja::Error> {
        let template = self.env.get_template(&self.name)?;
        let context = match data {
            Some(map) => Value::from_serialize(map),
            None => Value::UNDEFINED,
        };
        template.render(context)
    }

    /// The root-relative template name this page renders.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Compiles the template that serves `template_path` under `root`.
///
/// `template_path` is a normalized request path; the file it names is
/// read relative to `root` and parsed into a fresh environment that
/// already holds the shared includes. Undefined template variables are
/// strict errors at render time, never silent blanks.
pub fn compile_page(
    root: &Path,
    includes: &IncludeSet,
    template_path: &str,
) -> Result<CompiledPage, CompileError> {
    let name = template_path.trim_start_matches('/').to_owned();
    let file = root.join(&name);
    let source = match fs::read_to_string(&file) {
        Ok(source) => source,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(CompileError::NotFound {
                path: template_path.to_owned(),
            });
        }
        Err(err) => {
            return Err(CompileError::Read {
                path: template_path.to_owned(),
                source: err,
            });
        }
    };

    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    for (include_name, include_source) in includes.iter() {
        env.add_template_owned(include_name.to_owned(), include_source.to_owned())?;
    }
    env.add_template_owned(name.clone(), source)?;
    tracing::debug!(path = template_path, "template compiled");
    Ok(CompiledPage { env, name })
}
