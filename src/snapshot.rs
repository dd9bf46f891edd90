//! Serializable picture of a suspended thread: its top frame, the heap it
//! can reach, and the classes involved.  Loaded from and written back to
//! JSON by the CLI.
//!
//! ```json
//! {
//!   "thread": { "name": "main", "suspended": true },
//!   "frame": {
//!     "declaring_class": "Counter",
//!     "this": 1,
//!     "locals": [ { "name": "step", "type": "int", "value": { "type": "int", "value": 2 } } ]
//!   },
//!   "heap": {
//!     "1": { "kind": "instance", "class": "Counter",
//!            "fields": { "count": { "type": "int", "value": 5 } } }
//!   },
//!   "classes": {
//!     "Counter": { "fields": [ { "name": "count", "type": "int" } ] }
//!   }
//! }
//! ```

use crate::value::{ObjectId, Value};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub thread: ThreadState,

    /// Top frame of the thread; absent when the thread has no Java frames.
    #[serde(default)]
    pub frame: Option<FrameState>,

    #[serde(default)]
    pub heap: BTreeMap<ObjectId, HeapEntry>,

    #[serde(default)]
    pub classes: BTreeMap<String, ClassState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadState {
    pub name: String,
    pub suspended: bool,
}

impl Default for ThreadState {
    fn default() -> Self {
        Self {
            name: "main".to_string(),
            suspended: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameState {
    pub declaring_class: String,

    /// `None` in a static method.
    #[serde(default)]
    pub this: Option<ObjectId>,

    /// Visible locals in slot order.
    #[serde(default)]
    pub locals: Vec<LocalState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalState {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HeapEntry {
    Instance {
        class: String,
        #[serde(default)]
        fields: BTreeMap<String, Value>,
    },

    Array {
        /// Element type, e.g. `int` or `java.lang.String`.
        component: String,
        #[serde(default)]
        elements: Vec<Value>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassState {
    #[serde(default)]
    pub kind: ClassKind,

    #[serde(default)]
    pub superclass: Option<String>,

    #[serde(default)]
    pub interfaces: Vec<String>,

    /// Declared fields, instance and static.  Instance values live in the
    /// heap; static values live here.
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default, rename = "static")]
    pub is_static: bool,

    #[serde(default, rename = "final")]
    pub is_final: bool,

    /// Current value of a static field.
    #[serde(default)]
    pub value: Value,
}
