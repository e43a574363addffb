//! Template rendering: requirement resolution, platform filtering and
//! placeholder substitution over YAML documents.
//!
//! A template is a YAML mapping. The optional `required_vars` section
//! declares the variables the rest of the document refers to as `{name}`:
//!
//! ```yaml
//! required_vars:
//!   email:
//!     description: your git email address
//!     cacheable: true
//!     from_cache: true
//! global:
//!   user:
//!     email: "{email}"
//! windows:
//!   aliases:
//!     ll: dir
//! ```
//!
//! Rendering resolves every declared variable, drops `required_vars` and the
//! sections of other platform families, and substitutes placeholders in every
//! remaining string (keys included). `{{` and `}}` produce literal braces;
//! braces that do not wrap an identifier are copied verbatim.
use std::collections::BTreeMap;

use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

use crate::error::TemplateError;
use crate::platform::Platform;
use crate::requirements::{Requirement, Resolver};

/// Top-level key declaring required variables.
pub const REQUIRED_VARS_KEY: &str = "required_vars";

/// Resolved variable values keyed by name.
pub type Resolved = BTreeMap<String, String>;

/// Renders template text for one platform using one resolver.
#[derive(Debug)]
pub struct Renderer<'a> {
    resolver: Resolver<'a>,
    platform: Platform,
}

impl<'a> Renderer<'a> {
    #[must_use]
    pub const fn new(resolver: Resolver<'a>, platform: Platform) -> Self {
        Self { resolver, platform }
    }

    /// Render raw template text into a filtered, placeholder-free document.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is malformed, a requirement cannot be
    /// resolved, or a placeholder has no resolved value.
    pub fn render(&self, raw: &str) -> Result<String, TemplateError> {
        let document = parse_document(raw)?;
        let (declarations, body) = split_document(document, &self.platform);

        let requirements = parse_requirements(declarations)?;
        let mut resolved = Resolved::new();
        for (name, requirement) in &requirements {
            let value = self
                .resolver
                .resolve(name, requirement)
                .map_err(|source| TemplateError::Resolve {
                    name: name.clone(),
                    source,
                })?;
            resolved.insert(name.clone(), value);
        }

        let rendered = substitute_value(Value::Mapping(body), &resolved)?;
        serde_yaml::to_string(&rendered).map_err(|e| TemplateError::Parse {
            message: e.to_string(),
        })
    }
}

/// Parse template text into its top-level mapping.
///
/// An empty document is an empty mapping.
///
/// # Errors
///
/// Returns [`TemplateError::Parse`] for invalid YAML or a non-mapping root.
pub fn parse_document(raw: &str) -> Result<Mapping, TemplateError> {
    let value: Value = serde_yaml::from_str(raw).map_err(|e| TemplateError::Parse {
        message: e.to_string(),
    })?;
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(TemplateError::Parse {
            message: "top level must be a mapping".to_string(),
        }),
    }
}

/// Separate the `required_vars` section from the body and drop the sections
/// belonging to other platform families. Key order is preserved.
fn split_document(document: Mapping, platform: &Platform) -> (Option<Value>, Mapping) {
    let mut declarations = None;
    let mut body = Mapping::new();
    for (key, value) in document {
        match key.as_str() {
            Some(REQUIRED_VARS_KEY) => declarations = Some(value),
            Some(section) if platform.excludes_section(section) => {
                tracing::debug!("dropping section '{section}' for {}", platform.os);
            }
            _ => {
                body.insert(key, value);
            }
        }
    }
    (declarations, body)
}

/// Decode `required_vars` into declarations, in document order.
///
/// # Errors
///
/// Returns [`TemplateError::InvalidRequirement`] for entries that are not
/// mappings of the expected fields.
pub fn parse_requirements(
    declarations: Option<Value>,
) -> Result<Vec<(String, Requirement)>, TemplateError> {
    let mapping = match declarations {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Mapping(mapping)) => mapping,
        Some(_) => {
            return Err(TemplateError::InvalidRequirement {
                name: REQUIRED_VARS_KEY.to_string(),
                message: "expected a mapping of variable names".to_string(),
            });
        }
    };

    let mut requirements = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let Some(name) = key.as_str().map(str::to_string) else {
            return Err(TemplateError::InvalidRequirement {
                name: format!("{key:?}"),
                message: "variable names must be strings".to_string(),
            });
        };
        let mut requirement = match value {
            Value::Null => Requirement::default(),
            Value::Mapping(_) => serde_yaml::from_value::<Requirement>(value).map_err(|e| {
                TemplateError::InvalidRequirement {
                    name: name.clone(),
                    message: e.to_string(),
                }
            })?,
            _ => {
                return Err(TemplateError::InvalidRequirement {
                    name,
                    message: "expected description, cacheable and from_cache".to_string(),
                });
            }
        };
        if requirement.description.is_empty() {
            requirement.description.clone_from(&name);
        }
        requirements.push((name, requirement));
    }
    Ok(requirements)
}

fn substitute_value(value: Value, resolved: &Resolved) -> Result<Value, TemplateError> {
    Ok(match value {
        Value::String(s) => Value::String(substitute(&s, resolved)?),
        Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| substitute_value(item, resolved))
                .collect::<Result<_, _>>()?,
        ),
        Value::Mapping(mapping) => {
            let mut out = Mapping::with_capacity(mapping.len());
            for (key, value) in mapping {
                out.insert(
                    substitute_value(key, resolved)?,
                    substitute_value(value, resolved)?,
                );
            }
            Value::Mapping(out)
        }
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            Value::Tagged(Box::new(TaggedValue {
                tag,
                value: substitute_value(value, resolved)?,
            }))
        }
        other => other,
    })
}

/// Replace every `{name}` in `text` with its resolved value.
///
/// # Errors
///
/// Returns [`TemplateError::MissingRequirement`] for a placeholder whose name
/// has no resolved value.
pub fn substitute(text: &str, resolved: &Resolved) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(['{', '}']) {
        let (literal, tail) = rest.split_at(pos);
        out.push_str(literal);

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if let Some((name, after)) = placeholder(tail) {
            let value = resolved
                .get(name)
                .ok_or_else(|| TemplateError::MissingRequirement {
                    name: name.to_string(),
                })?;
            out.push_str(value);
            rest = after;
        } else {
            // Lone brace; both candidates are single-byte.
            let (brace, after) = tail.split_at(1);
            out.push_str(brace);
            rest = after;
        }
    }
    out.push_str(rest);
    Ok(out)
}

/// Split `{name}rest` into `(name, rest)` when `name` is an identifier.
fn placeholder(tail: &str) -> Option<(&str, &str)> {
    let inner = tail.strip_prefix('{')?;
    let (name, after) = inner.split_once('}')?;
    is_identifier(name).then_some((name, after))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
