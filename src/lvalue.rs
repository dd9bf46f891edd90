//! Assignable and readable handles to storage locations of the debug target.
//!
//! An [`ExpressionValue`] is what the walker hands back for every node: either
//! a view onto a real location (local slot, instance field, static field,
//! array element) or a [`ReadOnlyValue`] wrapping a literal or an operator
//! result.  Location variants fetch lazily and keep what they fetched until
//! the next write; `set_value` always writes through to the [`Storage`] and
//! then replaces the cache with the written value.

use crate::error::{EvalError, Result};

use log::debug;
use std::fmt;

/// Raw value type of a storage backend.
pub type ValueOf<S> = <S as Storage>::Value;

/// Read/write primitives of a suspended debug target, one pair per kind of
/// location.  Handles carry the backend's own identifiers for threads,
/// objects, fields and classes.
pub trait Storage {
    type Value: Clone + fmt::Debug;
    type Thread: Clone + fmt::Debug;
    type Slot: Clone + fmt::Debug;
    type Object: Clone + fmt::Debug;
    type Field: Clone + fmt::Debug;
    type Class: Clone + fmt::Debug;

    /// Fails when the thread has no inspectable top frame.
    fn read_local(&self, thread: &Self::Thread, slot: &Self::Slot) -> Result<Self::Value>;

    fn write_local(
        &self,
        thread: &Self::Thread,
        slot: &Self::Slot,
        value: Self::Value,
    ) -> Result<()>;

    /// Fails when `field` is not defined on the runtime type of `object`.
    fn read_field(&self, object: &Self::Object, field: &Self::Field) -> Result<Self::Value>;

    fn write_field(
        &self,
        object: &Self::Object,
        field: &Self::Field,
        value: Self::Value,
    ) -> Result<()>;

    fn read_static(&self, class: &Self::Class, field: &Self::Field) -> Result<Self::Value>;

    fn write_static(&self, class: &Self::Class, field: &Self::Field, value: Self::Value)
        -> Result<()>;

    /// Whether static fields of `class` may be written (false for interfaces).
    fn is_concrete_class(&self, class: &Self::Class) -> bool;

    fn read_element(&self, array: &Self::Object, index: i32) -> Result<Self::Value>;

    fn write_element(&self, array: &Self::Object, index: i32, value: Self::Value) -> Result<()>;
}

/// Returns the cached value, fetching it first if the cache is empty.
fn cached<V: Clone>(cache: &mut Option<V>, fetch: impl FnOnce() -> Result<V>) -> Result<V> {
    if let Some(value) = cache {
        return Ok(value.clone());
    }

    let value: V = fetch()?;
    *cache = Some(value.clone());

    Ok(value)
}

/// A local variable: slot of the top frame of a thread.
pub struct LocalVariableValue<'s, S: Storage> {
    storage: &'s S,
    thread: S::Thread,
    slot: S::Slot,
    cache: Option<S::Value>,
}

impl<'s, S: Storage> LocalVariableValue<'s, S> {
    pub fn new(storage: &'s S, thread: S::Thread, slot: S::Slot) -> Self {
        Self {
            storage,
            thread,
            slot,
            cache: None,
        }
    }

    pub fn thread(&self) -> &S::Thread {
        &self.thread
    }

    pub fn slot(&self) -> &S::Slot {
        &self.slot
    }

    pub fn value(&mut self) -> Result<S::Value> {
        let (storage, thread, slot) = (self.storage, &self.thread, &self.slot);

        cached(&mut self.cache, || storage.read_local(thread, slot))
    }

    pub fn set_value(&mut self, value: S::Value) -> Result<()> {
        debug!("Writing local {:?} of thread {:?}", self.slot, self.thread);

        self.storage
            .write_local(&self.thread, &self.slot, value.clone())?;
        self.cache = Some(value);

        Ok(())
    }
}

/// A non‑static field of a particular object.
pub struct InstanceFieldValue<'s, S: Storage> {
    storage: &'s S,
    object: S::Object,
    field: S::Field,
    cache: Option<S::Value>,
}

impl<'s, S: Storage> InstanceFieldValue<'s, S> {
    pub fn new(storage: &'s S, object: S::Object, field: S::Field) -> Self {
        Self {
            storage,
            object,
            field,
            cache: None,
        }
    }

    pub fn object(&self) -> &S::Object {
        &self.object
    }

    pub fn field(&self) -> &S::Field {
        &self.field
    }

    pub fn value(&mut self) -> Result<S::Value> {
        let (storage, object, field) = (self.storage, &self.object, &self.field);

        cached(&mut self.cache, || storage.read_field(object, field))
    }

    pub fn set_value(&mut self, value: S::Value) -> Result<()> {
        debug!("Writing field {:?} of {:?}", self.field, self.object);

        self.storage
            .write_field(&self.object, &self.field, value.clone())?;
        self.cache = Some(value);

        Ok(())
    }
}

/// A static field, bound to the type that declares it.
pub struct StaticFieldValue<'s, S: Storage> {
    storage: &'s S,
    class: S::Class,
    field: S::Field,
    cache: Option<S::Value>,
}

impl<'s, S: Storage> StaticFieldValue<'s, S> {
    pub fn new(storage: &'s S, class: S::Class, field: S::Field) -> Self {
        Self {
            storage,
            class,
            field,
            cache: None,
        }
    }

    pub fn class(&self) -> &S::Class {
        &self.class
    }

    pub fn field(&self) -> &S::Field {
        &self.field
    }

    pub fn value(&mut self) -> Result<S::Value> {
        let (storage, class, field) = (self.storage, &self.class, &self.field);

        cached(&mut self.cache, || storage.read_static(class, field))
    }

    /// Rejected up front, before any write, unless the declaring type is a
    /// concrete class.
    pub fn set_value(&mut self, value: S::Value) -> Result<()> {
        if !self.storage.is_concrete_class(&self.class) {
            return Err(EvalError::storage(format!(
                "Cannot set static field {:?}: declaring type {:?} is not a class",
                self.field, self.class
            )));
        }

        debug!("Writing static field {:?} of {:?}", self.field, self.class);

        self.storage
            .write_static(&self.class, &self.field, value.clone())?;
        self.cache = Some(value);

        Ok(())
    }
}

/// One element of an array object.
pub struct ArrayElementValue<'s, S: Storage> {
    storage: &'s S,
    array: S::Object,
    index: i32,
    cache: Option<S::Value>,
}

impl<'s, S: Storage> ArrayElementValue<'s, S> {
    pub fn new(storage: &'s S, array: S::Object, index: i32) -> Self {
        Self {
            storage,
            array,
            index,
            cache: None,
        }
    }

    pub fn array(&self) -> &S::Object {
        &self.array
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn value(&mut self) -> Result<S::Value> {
        let (storage, array, index) = (self.storage, &self.array, self.index);

        cached(&mut self.cache, || storage.read_element(array, index))
    }

    pub fn set_value(&mut self, value: S::Value) -> Result<()> {
        debug!("Writing element {} of {:?}", self.index, self.array);

        self.storage
            .write_element(&self.array, self.index, value.clone())?;
        self.cache = Some(value);

        Ok(())
    }
}

/// A computed value with no backing location.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOnlyValue<V> {
    value: V,
}

impl<V: Clone> ReadOnlyValue<V> {
    pub fn new(value: V) -> Self {
        Self { value }
    }

    pub fn value(&self) -> V {
        self.value.clone()
    }
}

/// Result of evaluating any expression node.
pub enum ExpressionValue<'s, S: Storage> {
    Local(LocalVariableValue<'s, S>),
    InstanceField(InstanceFieldValue<'s, S>),
    StaticField(StaticFieldValue<'s, S>),
    ArrayElement(ArrayElementValue<'s, S>),
    ReadOnly(ReadOnlyValue<S::Value>),
}

impl<'s, S: Storage> ExpressionValue<'s, S> {
    pub fn read_only(value: S::Value) -> Self {
        ExpressionValue::ReadOnly(ReadOnlyValue::new(value))
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, ExpressionValue::ReadOnly(_))
    }

    /// Current value of the location; fetched on first use, then cached.
    pub fn value(&mut self) -> Result<S::Value> {
        match self {
            ExpressionValue::Local(v) => v.value(),
            ExpressionValue::InstanceField(v) => v.value(),
            ExpressionValue::StaticField(v) => v.value(),
            ExpressionValue::ArrayElement(v) => v.value(),
            ExpressionValue::ReadOnly(v) => Ok(v.value()),
        }
    }

    /// Store `value` into the location.
    pub fn set_value(&mut self, value: S::Value) -> Result<()> {
        match self {
            ExpressionValue::Local(v) => v.set_value(value),
            ExpressionValue::InstanceField(v) => v.set_value(value),
            ExpressionValue::StaticField(v) => v.set_value(value),
            ExpressionValue::ArrayElement(v) => v.set_value(value),
            ExpressionValue::ReadOnly(_) => Err(EvalError::ImmutableValue),
        }
    }

    /// Kind of location, used in logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ExpressionValue::Local(_) => "local variable",
            ExpressionValue::InstanceField(_) => "instance field",
            ExpressionValue::StaticField(_) => "static field",
            ExpressionValue::ArrayElement(_) => "array element",
            ExpressionValue::ReadOnly(_) => "computed value",
        }
    }
}

impl<'s, S: Storage> From<LocalVariableValue<'s, S>> for ExpressionValue<'s, S> {
    fn from(v: LocalVariableValue<'s, S>) -> Self {
        ExpressionValue::Local(v)
    }
}

impl<'s, S: Storage> From<InstanceFieldValue<'s, S>> for ExpressionValue<'s, S> {
    fn from(v: InstanceFieldValue<'s, S>) -> Self {
        ExpressionValue::InstanceField(v)
    }
}

impl<'s, S: Storage> From<StaticFieldValue<'s, S>> for ExpressionValue<'s, S> {
    fn from(v: StaticFieldValue<'s, S>) -> Self {
        ExpressionValue::StaticField(v)
    }
}

impl<'s, S: Storage> From<ArrayElementValue<'s, S>> for ExpressionValue<'s, S> {
    fn from(v: ArrayElementValue<'s, S>) -> Self {
        ExpressionValue::ArrayElement(v)
    }
}

impl<'s, S: Storage> fmt::Debug for ExpressionValue<'s, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionValue::Local(v) => f
                .debug_struct("Local")
                .field("thread", &v.thread)
                .field("slot", &v.slot)
                .field("cache", &v.cache)
                .finish(),

            ExpressionValue::InstanceField(v) => f
                .debug_struct("InstanceField")
                .field("object", &v.object)
                .field("field", &v.field)
                .field("cache", &v.cache)
                .finish(),

            ExpressionValue::StaticField(v) => f
                .debug_struct("StaticField")
                .field("class", &v.class)
                .field("field", &v.field)
                .field("cache", &v.cache)
                .finish(),

            ExpressionValue::ArrayElement(v) => f
                .debug_struct("ArrayElement")
                .field("array", &v.array)
                .field("index", &v.index)
                .field("cache", &v.cache)
                .finish(),

            ExpressionValue::ReadOnly(v) => f.debug_tuple("ReadOnly").field(&v.value).finish(),
        }
    }
}
