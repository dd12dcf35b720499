//! # Model binding
//!
//! Glue between field declarations, per-instance slots, and a
//! [`ColumnStore`]. A [`Model`] is the shared declaration of a set of
//! fields; an [`Instance`] is one row's worth of lazily-decoded slots.
//!
//! Saving materializes every slot first (a raw write must decode before it
//! can be re-encoded for storage), then writes each field's prepared text.
//! Loading fills slots with raw column text and defers every decode to the
//! first read of that attribute.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::field::{FieldInput, FieldSlot, JsonField};
use crate::store::ColumnStore;
use crate::value::Value;

/// An ordered set of field declarations, shared across instances.
#[derive(Debug, Clone, Default)]
pub struct Model {
    fields: Vec<JsonField>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field: JsonField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&JsonField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &JsonField> {
        self.fields.iter()
    }

    /// Fresh instance with every slot holding its field's default text.
    pub fn instance(&self) -> Instance<'_> {
        let slots = self
            .fields
            .iter()
            .map(|f| (f.name().to_string(), FieldSlot::with_default(f)))
            .collect();
        Instance {
            model: self,
            id: Uuid::new_v4(),
            slots,
        }
    }

    /// Load a row: slots are filled with raw column text and stay
    /// unmaterialized until read.
    pub fn load<S: ColumnStore>(&self, store: &S, id: Uuid) -> StoreResult<Instance<'_>> {
        let mut slots = IndexMap::new();
        for field in &self.fields {
            let text = store.read_column(id, field.name())?;
            slots.insert(field.name().to_string(), FieldSlot::from_stored(text));
        }
        Ok(Instance {
            model: self,
            id,
            slots,
        })
    }
}

/// One row's slot table.
#[derive(Debug, Clone)]
pub struct Instance<'m> {
    model: &'m Model,
    id: Uuid,
    slots: IndexMap<String, FieldSlot>,
}

impl<'m> Instance<'m> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Field names as plain attributes — the slot table must stay visible to
    /// generic "list all attributes" introspection.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    fn pair(&mut self, name: &str) -> StoreResult<(&'m JsonField, &mut FieldSlot)> {
        let model: &'m Model = self.model;
        let field = model
            .field(name)
            .ok_or_else(|| StoreError::UnknownField(name.to_string()))?;
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownField(name.to_string()))?;
        Ok((field, slot))
    }

    /// Write an attribute: raw text or a native value, routed through the
    /// field's materialization policy.
    pub fn set(&mut self, name: &str, input: impl Into<FieldInput>) -> StoreResult<()> {
        let (field, slot) = self.pair(name)?;
        slot.write(input.into(), field)?;
        Ok(())
    }

    /// Read an attribute, decoding on first access and returning the cached
    /// value afterwards.
    pub fn get(&mut self, name: &str) -> StoreResult<Option<&Value>> {
        let (field, slot) = self.pair(name)?;
        Ok(slot.read(field)?)
    }

    /// The `get_F_json` accessor: current value re-encoded, bypassing null
    /// suppression.
    pub fn get_json(&mut self, name: &str) -> StoreResult<String> {
        let (field, slot) = self.pair(name)?;
        let value = slot.read(field)?;
        let text = field.db_prep(value, true)?;
        Ok(text.unwrap_or_else(|| "null".to_string()))
    }

    /// The `set_F_json` accessor: decode text and store the native value.
    pub fn set_json(&mut self, name: &str, text: &str) -> StoreResult<()> {
        let (field, slot) = self.pair(name)?;
        let value = field.to_value(text)?;
        slot.write(FieldInput::Native(value), field)?;
        Ok(())
    }

    /// Persist every field. Each slot is materialized first, then encoded
    /// with the field's null handling.
    pub fn save<S: ColumnStore>(&mut self, store: &mut S) -> StoreResult<()> {
        let model = self.model;
        for field in &model.fields {
            let slot = self
                .slots
                .get_mut(field.name())
                .ok_or_else(|| StoreError::UnknownField(field.name().to_string()))?;
            let value = slot.read(field)?;
            let text = field.db_prep(value, false)?;
            store.write_column(self.id, field.name(), text.as_deref())?;
        }
        Ok(())
    }
}
