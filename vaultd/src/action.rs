//! Action definitions and the registry that holds them.
//!
//! An [`ActionDefinition`] pairs a name with an input schema and a pure
//! encoder. Definitions are collected once at startup through
//! [`ActionRegistryBuilder`]; the resulting [`ActionRegistry`] has no
//! mutating methods and is shared behind an `Arc` for the life of the
//! process.

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::Bytes;

use crate::error::{ActionError, EncodingError, RegistryError, ValidationError};
use crate::schema::{FieldSpec, RawArgs, ValidatedArgs, validate_args};

/// Encoder from validated arguments to contract calldata.
///
/// Must be pure and total over input that passed the definition's schema.
pub type EncodeFn = fn(&ValidatedArgs) -> Result<Bytes, EncodingError>;

/// A named, schema-validated operation.
#[derive(Clone)]
pub struct ActionDefinition {
    name: &'static str,
    description: &'static str,
    fields: Vec<FieldSpec>,
    encode: EncodeFn,
}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields.iter().map(|field| field.name).collect();
        f.debug_struct("ActionDefinition")
            .field("name", &self.name)
            .field("fields", &fields)
            .finish_non_exhaustive()
    }
}

impl ActionDefinition {
    /// Creates a definition with no fields.
    #[must_use]
    pub const fn new(name: &'static str, description: &'static str, encode: EncodeFn) -> Self {
        Self {
            name,
            description,
            fields: Vec::new(),
            encode,
        }
    }

    /// Appends a field to the input schema.
    #[must_use]
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// The unique action name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Human-readable description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.description
    }

    /// The ordered input schema.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validates raw caller arguments against this definition's schema.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    pub fn validate(&self, raw: &RawArgs, decimals: u8) -> Result<ValidatedArgs, ValidationError> {
        validate_args(&self.fields, raw, decimals)
    }

    /// Produces calldata from validated arguments.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if the encoder's precondition does not hold.
    pub fn encode(&self, args: &ValidatedArgs) -> Result<Bytes, EncodingError> {
        (self.encode)(args)
    }
}

/// Immutable table of action definitions keyed by name.
#[derive(Default)]
pub struct ActionRegistry {
    definitions: Vec<ActionDefinition>,
    index: HashMap<&'static str, usize>,
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names().collect();
        f.debug_tuple("ActionRegistry").field(&names).finish()
    }
}

impl ActionRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder::default()
    }

    /// Returns the definition registered under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActionDefinition> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    /// Looks up a definition by name.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnknownAction`] if `name` is not registered.
    pub fn lookup(&self, name: &str) -> Result<&ActionDefinition, ActionError> {
        self.get(name).ok_or_else(|| ActionError::UnknownAction {
            name: name.to_owned(),
        })
    }

    /// Iterates over definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.definitions.iter()
    }

    /// Iterates over registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions.iter().map(ActionDefinition::name)
    }

    /// Number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Startup-time builder for [`ActionRegistry`].
#[derive(Debug, Default)]
pub struct ActionRegistryBuilder {
    registry: ActionRegistry,
}

impl ActionRegistryBuilder {
    /// Adds a definition.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the name is taken or the definition
    /// repeats a field name.
    pub fn register(&mut self, definition: ActionDefinition) -> Result<&mut Self, RegistryError> {
        let name = definition.name();
        if self.registry.index.contains_key(name) {
            return Err(RegistryError::Duplicate(name));
        }
        for (i, field) in definition.fields().iter().enumerate() {
            if definition.fields()[..i].iter().any(|f| f.name == field.name) {
                return Err(RegistryError::DuplicateField {
                    action: name,
                    field: field.name,
                });
            }
        }
        self.registry
            .index
            .insert(name, self.registry.definitions.len());
        self.registry.definitions.push(definition);
        Ok(self)
    }

    /// Adds a definition and returns the builder for chaining.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub fn and_register(mut self, definition: ActionDefinition) -> Result<Self, RegistryError> {
        self.register(definition)?;
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> ActionRegistry {
        self.registry
    }
}
