//! In‑memory debug target backing the reference evaluator.
//!
//! [`Memory`] owns a [`Snapshot`] behind a `RefCell` and implements
//! [`Storage`], so lvalues produced by the mirror evaluator read and write
//! the snapshot directly.  The checks a live VM would perform are enforced
//! here: the thread must be suspended with a frame, fields must exist on the
//! runtime class, `final` fields and interface statics are immutable, values
//! must convert to the declared type, and array indices must be in range.

use crate::error::{EvalError, Result};
use crate::lvalue::Storage;
use crate::snapshot::{ClassKind, FrameState, HeapEntry, Snapshot};
use crate::value::{ObjectId, Value};

use log::{debug, info};
use std::cell::RefCell;

/// Field descriptor: what a field lvalue needs to read and write it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub name: String,
    pub ty: String,
    pub declaring_class: String,
    pub is_static: bool,
    pub is_final: bool,
}

pub struct Memory {
    snapshot: RefCell<Snapshot>,
}

impl Memory {
    pub fn new(snapshot: Snapshot) -> Self {
        info!(
            "Memory created: {} heap object(s), {} class(es)",
            snapshot.heap.len(),
            snapshot.classes.len()
        );

        Self {
            snapshot: RefCell::new(snapshot),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;

        Ok(Self::new(snapshot))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&*self.snapshot.borrow())?)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn thread_name(&self) -> String {
        self.snapshot.borrow().thread.name.clone()
    }

    /// Slot of the local called `name` in the top frame.
    pub fn local_slot(&self, name: &str) -> Result<Option<usize>> {
        let snapshot = self.snapshot.borrow();
        let frame: &FrameState = top_frame(&snapshot, &snapshot.thread.name)?;

        Ok(frame.locals.iter().position(|local| local.name == name))
    }

    /// `this` of the top frame; `None` in a static frame.
    pub fn this_ref(&self) -> Result<Option<ObjectId>> {
        let snapshot = self.snapshot.borrow();

        Ok(top_frame(&snapshot, &snapshot.thread.name)?.this)
    }

    pub fn declaring_class(&self) -> Result<String> {
        let snapshot = self.snapshot.borrow();

        Ok(top_frame(&snapshot, &snapshot.thread.name)?
            .declaring_class
            .clone())
    }

    /// Runtime class of a heap object (`int[]` for arrays).
    pub fn class_of(&self, id: ObjectId) -> Result<String> {
        match self.snapshot.borrow().heap.get(&id) {
            Some(HeapEntry::Instance { class, .. }) => Ok(class.clone()),
            Some(HeapEntry::Array { component, .. }) => Ok(format!("{}[]", component)),
            None => Err(invalid_reference(id)),
        }
    }

    /// `Some(length)` if `id` is an array.
    pub fn array_length(&self, id: ObjectId) -> Result<Option<i32>> {
        match self.snapshot.borrow().heap.get(&id) {
            Some(HeapEntry::Array { elements, .. }) => Ok(Some(
                i32::try_from(elements.len()).map_err(|_| EvalError::storage("Array too large"))?,
            )),
            Some(HeapEntry::Instance { .. }) => Ok(None),
            None => Err(invalid_reference(id)),
        }
    }

    /// Non‑static field `name` declared by `class` or one of its supertypes.
    pub fn instance_field(&self, class: &str, name: &str) -> Option<FieldRef> {
        find_field(&self.snapshot.borrow(), class, name, false)
    }

    /// Static field `name` declared by `class` or one of its supertypes.
    pub fn static_field(&self, class: &str, name: &str) -> Option<FieldRef> {
        find_field(&self.snapshot.borrow(), class, name, true)
    }

    /// `toString()` rendering: strings as is, objects as `Class@hex`.
    pub fn describe(&self, value: &Value) -> String {
        match value {
            Value::Ref(id) => match self.class_of(*id) {
                Ok(class) => format!("{}@{:x}", class, id),
                Err(_) => value.to_string(),
            },
            other => other.to_string(),
        }
    }
}

impl Storage for Memory {
    type Value = Value;
    type Thread = String;
    type Slot = usize;
    type Object = ObjectId;
    type Field = FieldRef;
    type Class = String;

    fn read_local(&self, thread: &String, slot: &usize) -> Result<Value> {
        let snapshot = self.snapshot.borrow();

        top_frame(&snapshot, thread)?
            .locals
            .get(*slot)
            .map(|local| local.value.clone())
            .ok_or_else(|| invalid_slot(*slot))
    }

    fn write_local(&self, thread: &String, slot: &usize, value: Value) -> Result<()> {
        let mut snapshot = self.snapshot.borrow_mut();

        let ty: String = top_frame(&snapshot, thread)?
            .locals
            .get(*slot)
            .map(|local| local.ty.clone())
            .ok_or_else(|| invalid_slot(*slot))?;

        let value: Value = coerce(&snapshot, &ty, value)?;

        if let Some(local) = snapshot
            .frame
            .as_mut()
            .and_then(|frame| frame.locals.get_mut(*slot))
        {
            debug!("Local '{}' <- {}", local.name, value);
            local.value = value;
        }

        Ok(())
    }

    fn read_field(&self, object: &ObjectId, field: &FieldRef) -> Result<Value> {
        let snapshot = self.snapshot.borrow();

        match snapshot.heap.get(object) {
            Some(HeapEntry::Instance { class, fields }) => {
                if find_field(&snapshot, class, &field.name, false).is_none() {
                    return Err(undefined_field(&field.name, class));
                }

                Ok(fields
                    .get(&field.name)
                    .cloned()
                    .unwrap_or_else(|| default_value(&field.ty)))
            }

            Some(HeapEntry::Array { component, .. }) => {
                Err(undefined_field(&field.name, &format!("{}[]", component)))
            }

            None => Err(invalid_reference(*object)),
        }
    }

    fn write_field(&self, object: &ObjectId, field: &FieldRef, value: Value) -> Result<()> {
        let mut snapshot = self.snapshot.borrow_mut();

        let class: String = match snapshot.heap.get(object) {
            Some(HeapEntry::Instance { class, .. }) => class.clone(),
            Some(HeapEntry::Array { component, .. }) => {
                return Err(undefined_field(&field.name, &format!("{}[]", component)));
            }
            None => return Err(invalid_reference(*object)),
        };

        let Some(declared) = find_field(&snapshot, &class, &field.name, false) else {
            return Err(undefined_field(&field.name, &class));
        };

        if declared.is_final {
            return Err(final_field(&field.name));
        }

        let value: Value = coerce(&snapshot, &declared.ty, value)?;

        if let Some(HeapEntry::Instance { fields, .. }) = snapshot.heap.get_mut(object) {
            debug!("Field '{}' of #{} <- {}", field.name, object, value);
            fields.insert(field.name.clone(), value);
        }

        Ok(())
    }

    fn read_static(&self, class: &String, field: &FieldRef) -> Result<Value> {
        self.snapshot
            .borrow()
            .classes
            .get(class)
            .and_then(|state| {
                state
                    .fields
                    .iter()
                    .find(|decl| decl.is_static && decl.name == field.name)
            })
            .map(|decl| decl.value.clone())
            .ok_or_else(|| undefined_field(&field.name, class))
    }

    fn write_static(&self, class: &String, field: &FieldRef, value: Value) -> Result<()> {
        let mut snapshot = self.snapshot.borrow_mut();

        let (ty, is_final): (String, bool) = snapshot
            .classes
            .get(class)
            .and_then(|state| {
                state
                    .fields
                    .iter()
                    .find(|decl| decl.is_static && decl.name == field.name)
            })
            .map(|decl| (decl.ty.clone(), decl.is_final))
            .ok_or_else(|| undefined_field(&field.name, class))?;

        if is_final {
            return Err(final_field(&field.name));
        }

        let value: Value = coerce(&snapshot, &ty, value)?;

        if let Some(decl) = snapshot.classes.get_mut(class).and_then(|state| {
            state
                .fields
                .iter_mut()
                .find(|decl| decl.is_static && decl.name == field.name)
        }) {
            debug!("Static '{}.{}' <- {}", class, field.name, value);
            decl.value = value;
        }

        Ok(())
    }

    fn is_concrete_class(&self, class: &String) -> bool {
        self.snapshot
            .borrow()
            .classes
            .get(class)
            .is_some_and(|state| state.kind != ClassKind::Interface)
    }

    fn read_element(&self, array: &ObjectId, index: i32) -> Result<Value> {
        let snapshot = self.snapshot.borrow();

        match snapshot.heap.get(array) {
            Some(HeapEntry::Array { elements, .. }) => usize::try_from(index)
                .ok()
                .and_then(|i| elements.get(i))
                .cloned()
                .ok_or_else(|| out_of_bounds(index, elements.len())),

            Some(HeapEntry::Instance { class, .. }) => Err(not_an_array(class)),

            None => Err(invalid_reference(*array)),
        }
    }

    fn write_element(&self, array: &ObjectId, index: i32, value: Value) -> Result<()> {
        let mut snapshot = self.snapshot.borrow_mut();

        let (component, length): (String, usize) = match snapshot.heap.get(array) {
            Some(HeapEntry::Array {
                component,
                elements,
            }) => (component.clone(), elements.len()),
            Some(HeapEntry::Instance { class, .. }) => return Err(not_an_array(class)),
            None => return Err(invalid_reference(*array)),
        };

        let position: usize = usize::try_from(index)
            .ok()
            .filter(|i| *i < length)
            .ok_or_else(|| out_of_bounds(index, length))?;

        let value: Value = coerce(&snapshot, &component, value)?;

        if let Some(HeapEntry::Array { elements, .. }) = snapshot.heap.get_mut(array) {
            debug!("Element {} of #{} <- {}", index, array, value);
            elements[position] = value;
        }

        Ok(())
    }
}

// ─────────────────────────── lookups ───────────────────────────

/// Top frame of `thread`, provided the thread is suspended.
fn top_frame<'s>(snapshot: &'s Snapshot, thread: &str) -> Result<&'s FrameState> {
    if snapshot.thread.name != thread {
        return Err(EvalError::storage(format!("Unknown thread '{}'", thread)));
    }

    if !snapshot.thread.suspended {
        return Err(EvalError::storage(format!(
            "Thread '{}' is not suspended",
            thread
        )));
    }

    snapshot
        .frame
        .as_ref()
        .ok_or_else(|| EvalError::storage(format!("Thread '{}' has no stack frames", thread)))
}

/// `class` followed by its superclasses and interfaces, breadth first.
fn ancestors(snapshot: &Snapshot, class: &str) -> Vec<String> {
    let mut seen: Vec<String> = vec![class.to_string()];
    let mut next: usize = 0;

    while let Some(current) = seen.get(next).cloned() {
        next += 1;

        if let Some(state) = snapshot.classes.get(&current) {
            for parent in state.superclass.iter().chain(state.interfaces.iter()) {
                if !seen.contains(parent) {
                    seen.push(parent.clone());
                }
            }
        }
    }

    seen
}

fn find_field(snapshot: &Snapshot, class: &str, name: &str, is_static: bool) -> Option<FieldRef> {
    ancestors(snapshot, class).into_iter().find_map(|owner| {
        snapshot.classes.get(&owner).and_then(|state| {
            state
                .fields
                .iter()
                .find(|decl| decl.name == name && decl.is_static == is_static)
                .map(|decl| FieldRef {
                    name: decl.name.clone(),
                    ty: decl.ty.clone(),
                    declaring_class: owner.clone(),
                    is_static,
                    is_final: decl.is_final,
                })
        })
    })
}

// ─────────────────────────── conversion ────────────────────────

fn is_object_type(ty: &str) -> bool {
    matches!(ty, "Object" | "java.lang.Object")
}

fn is_string_type(ty: &str) -> bool {
    matches!(ty, "String" | "java.lang.String" | "CharSequence" | "java.lang.CharSequence")
}

/// Assignment conversion of `value` to the declared type `ty`: identity,
/// primitive widening, `int` narrowing when the value fits, and reference
/// assignability along the snapshot's class hierarchy.
fn coerce(snapshot: &Snapshot, ty: &str, value: Value) -> Result<Value> {
    let found: &'static str = value.type_name();

    let coerced: Option<Value> = match ty {
        "boolean" => match value {
            Value::Boolean(_) => Some(value),
            _ => None,
        },

        "byte" => match value {
            Value::Byte(_) => Some(value),
            Value::Int(n) => i8::try_from(n).ok().map(Value::Byte),
            _ => None,
        },

        "short" => match value {
            Value::Byte(n) => Some(Value::Short(n.into())),
            Value::Short(_) => Some(value),
            Value::Int(n) => i16::try_from(n).ok().map(Value::Short),
            _ => None,
        },

        "char" => match value {
            Value::Char(_) => Some(value),
            Value::Int(n) => u16::try_from(n)
                .ok()
                .and_then(|unit| char::from_u32(unit.into()))
                .map(Value::Char),
            _ => None,
        },

        "int" => match value {
            Value::Byte(_) | Value::Short(_) | Value::Char(_) | Value::Int(_) => {
                value.as_integral().map(|n| Value::Int(n as i32))
            }
            _ => None,
        },

        "long" => value.as_integral().map(Value::Long),

        "float" => match value {
            Value::Float(_) => Some(value),
            Value::Double(_) => None,
            _ => value.as_integral().map(|n| Value::Float(n as f32)),
        },

        "double" => value.as_floating().map(Value::Double),

        _ => match value {
            Value::Null => Some(value),
            Value::Str(_) if is_string_type(ty) || is_object_type(ty) => Some(value),
            Value::Ref(id) if reference_assignable(snapshot, id, ty) => Some(value),
            _ => None,
        },
    };

    coerced.ok_or_else(|| EvalError::type_mismatch(ty, found))
}

fn reference_assignable(snapshot: &Snapshot, id: ObjectId, ty: &str) -> bool {
    match snapshot.heap.get(&id) {
        Some(_) if is_object_type(ty) => true,

        Some(HeapEntry::Instance { class, .. }) => {
            ancestors(snapshot, class).iter().any(|name| name == ty)
        }

        Some(HeapEntry::Array { component, .. }) => ty.strip_suffix("[]") == Some(component.as_str()),

        None => false,
    }
}

/// Value of a field that was declared but never assigned.
fn default_value(ty: &str) -> Value {
    match ty {
        "boolean" => Value::Boolean(false),
        "byte" => Value::Byte(0),
        "short" => Value::Short(0),
        "char" => Value::Char('\0'),
        "int" => Value::Int(0),
        "long" => Value::Long(0),
        "float" => Value::Float(0.0),
        "double" => Value::Double(0.0),
        _ => Value::Null,
    }
}

// ─────────────────────────── errors ────────────────────────────

fn invalid_reference(id: ObjectId) -> EvalError {
    EvalError::storage(format!("Invalid object reference #{}", id))
}

fn invalid_slot(slot: usize) -> EvalError {
    EvalError::storage(format!("Invalid local variable slot {}", slot))
}

fn undefined_field(name: &str, class: &str) -> EvalError {
    EvalError::storage(format!("Field '{}' is not defined on '{}'", name, class))
}

fn final_field(name: &str) -> EvalError {
    EvalError::storage(format!("Cannot modify final field '{}'", name))
}

fn not_an_array(class: &str) -> EvalError {
    EvalError::storage(format!("Object of class '{}' is not an array", class))
}

fn out_of_bounds(index: i32, length: usize) -> EvalError {
    EvalError::storage(format!(
        "Index {} out of bounds for length {}",
        index, length
    ))
}
