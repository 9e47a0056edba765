//! Handler registry mapping canonical attributes to extraction functions.

use std::collections::BTreeMap;

use super::handler::{DeletedFn, FieldFn, RecordIdFn};
use crate::error::{Result, TransformError};
use crate::models::Field;

/// One provider of extraction behavior, declared as a static table.
///
/// A source is an ordered list of layers. Later layers override the handlers
/// and hooks of earlier ones.
pub struct Layer {
    /// Name used in diagnostics.
    pub name: &'static str,
    /// Field handlers provided by this layer.
    pub fields: &'static [(Field, FieldFn)],
    /// Source record identifier hook.
    pub record_id: Option<RecordIdFn>,
    /// Deletion hook.
    pub is_deleted: Option<DeletedFn>,
}

impl Layer {
    /// A layer that only provides field handlers.
    #[must_use]
    pub const fn fields(name: &'static str, fields: &'static [(Field, FieldFn)]) -> Self {
        Self {
            name,
            fields,
            record_id: None,
            is_deleted: None,
        }
    }
}

/// Resolved, immutable set of handlers for one source.
pub struct HandlerRegistry {
    layers: Vec<&'static str>,
    handlers: BTreeMap<Field, FieldFn>,
    record_id: RecordIdFn,
    is_deleted: DeletedFn,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("layers", &self.layers)
            .field("fields", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    /// Fold layers into a registry, last listed wins per attribute.
    ///
    /// # Errors
    /// Returns `TransformError::Configuration` when a mandatory attribute or
    /// an identity hook has no provider.
    pub fn build(layers: &[&'static Layer]) -> Result<Self> {
        let mut handlers: BTreeMap<Field, FieldFn> = BTreeMap::new();
        let mut record_id = None;
        let mut is_deleted = None;

        for layer in layers {
            for (field, handler) in layer.fields {
                handlers.insert(*field, *handler);
            }
            record_id = layer.record_id.or(record_id);
            is_deleted = layer.is_deleted.or(is_deleted);
        }

        let names: Vec<&'static str> = layers.iter().map(|l| l.name).collect();

        let missing: Vec<String> = Field::MANDATORY
            .iter()
            .filter(|field| !handlers.contains_key(*field))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(TransformError::Configuration(format!(
                "layers [{}] provide no handler for mandatory attribute(s): {}",
                names.join(", "),
                missing.join(", ")
            )));
        }

        let record_id = record_id.ok_or_else(|| {
            TransformError::Configuration(format!(
                "layers [{}] provide no record identifier hook",
                names.join(", ")
            ))
        })?;
        let is_deleted = is_deleted.ok_or_else(|| {
            TransformError::Configuration(format!(
                "layers [{}] provide no deletion hook",
                names.join(", ")
            ))
        })?;

        Ok(Self {
            layers: names,
            handlers,
            record_id,
            is_deleted,
        })
    }

    /// Names of the folded layers, in override order.
    #[must_use]
    pub fn layers(&self) -> &[&'static str] {
        &self.layers
    }

    /// Handlers for the mandatory attributes.
    pub fn mandatory(&self) -> impl Iterator<Item = (Field, FieldFn)> + '_ {
        self.handlers
            .iter()
            .filter(|(field, _)| field.is_mandatory())
            .map(|(field, handler)| (*field, *handler))
    }

    /// Handlers for the optional attributes, in canonical order.
    pub fn optional(&self) -> impl Iterator<Item = (Field, FieldFn)> + '_ {
        self.handlers
            .iter()
            .filter(|(field, _)| !field.is_mandatory())
            .map(|(field, handler)| (*field, *handler))
    }

    /// Handler for one attribute, if any.
    #[must_use]
    pub fn handler(&self, field: Field) -> Option<FieldFn> {
        self.handlers.get(&field).copied()
    }

    /// Check if a handler is registered for an attribute.
    #[must_use]
    pub fn has_handler(&self, field: Field) -> bool {
        self.handlers.contains_key(&field)
    }

    /// The resolved record identifier hook.
    #[must_use]
    pub fn record_id_hook(&self) -> RecordIdFn {
        self.record_id
    }

    /// The resolved deletion hook.
    #[must_use]
    pub fn deletion_hook(&self) -> DeletedFn {
        self.is_deleted
    }
}
