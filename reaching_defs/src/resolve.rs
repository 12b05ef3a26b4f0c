// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field resolution: mapping a field reference at an access site to the field it denotes.
//!
//! Two writes alias exactly when they resolve to the same id, so the resolver decides what a
//! kill set contains. A write through a subclass (`Sub.count = ..`) and one through the
//! declaring class (`Base.count = ..`) must resolve to the same declared field.

use alloc::boxed::Box;
use core::hash::Hash;

use hashbrown::{HashMap, HashSet};

use crate::cfg::FieldRef;

/// Maps field references to stable, comparable field identities.
pub trait FieldResolver<Ref: ?Sized> {
    /// Identity of a resolved field.
    type FieldId: Clone + Eq + Hash;

    /// Resolves `field`, or returns `None` if it cannot be resolved.
    fn resolve(&self, field: &Ref) -> Option<Self::FieldId>;
}

impl<Ref, Id, F> FieldResolver<Ref> for F
where
    Ref: ?Sized,
    Id: Clone + Eq + Hash,
    F: Fn(&Ref) -> Option<Id>,
{
    type FieldId = Id;

    fn resolve(&self, field: &Ref) -> Option<Id> {
        self(field)
    }
}

/// A field as declared: the declaring class plus the field name.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DeclaredField {
    /// Class that declares the field.
    pub class: Box<str>,
    /// Field name.
    pub name: Box<str>,
}

#[derive(Clone, Debug, Default)]
struct ClassInfo {
    superclass: Option<Box<str>>,
    fields: HashSet<Box<str>>,
}

/// In-memory class table resolving field references along the superclass chain.
///
/// Resolution starts at the class named by the reference and walks superclasses until a class
/// declaring the field is found. Unknown classes, missing declarations and superclass cycles
/// resolve to `None`.
#[derive(Clone, Debug, Default)]
pub struct ClassTable {
    classes: HashMap<Box<str>, ClassInfo>,
}

impl ClassTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or updates) `name` with an optional superclass.
    pub fn add_class(&mut self, name: &str, superclass: Option<&str>) {
        let info = self.classes.entry(name.into()).or_default();
        info.superclass = superclass.map(Into::into);
    }

    /// Declares field `field` on `class`, adding the class if it is unknown.
    pub fn declare_field(&mut self, class: &str, field: &str) {
        self.classes
            .entry(class.into())
            .or_default()
            .fields
            .insert(field.into());
    }

    /// Resolves `field` to its declaring class.
    #[must_use]
    pub fn resolve_field(&self, field: &FieldRef) -> Option<DeclaredField> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut class: &str = &field.class;
        loop {
            if !seen.insert(class) {
                return None;
            }
            let info = self.classes.get(class)?;
            if info.fields.contains(&*field.name) {
                return Some(DeclaredField {
                    class: class.into(),
                    name: field.name.clone(),
                });
            }
            class = info.superclass.as_deref()?;
        }
    }
}

impl FieldResolver<FieldRef> for ClassTable {
    type FieldId = DeclaredField;

    fn resolve(&self, field: &FieldRef) -> Option<DeclaredField> {
        self.resolve_field(field)
    }
}
