//! Draft store: the editable copy of one committed value.
//!
//! # Responsibility
//! - Own a draft that is structurally independent from the committed value.
//! - Apply typed field and list-element mutations to the draft only.
//!
//! # Invariants
//! - Mutations are synchronous and never reach the record repository.
//! - Mutations never touch validation state; validation is pulled separately.
//! - Element ids stay pairwise distinct across any add/remove sequence.
//! - Removing or updating an absent element is a no-op.

use crate::model::ids::{fresh_element_id, ElementId};

/// A record whose scalar fields can be replaced through a typed key.
pub trait FieldSet {
    type Field: Copy + std::fmt::Debug;

    /// Replaces one scalar field with `value`.
    fn set_field(&mut self, field: Self::Field, value: String);
}

/// A list element carrying a stable identity.
pub trait Identified {
    fn id(&self) -> &ElementId;
    fn set_id(&mut self, id: ElementId);
}

/// A record holding one editable collection of identified elements.
pub trait ElementList {
    type Element: Identified + FieldSet;

    fn elements(&self) -> &[Self::Element];
    fn elements_mut(&mut self) -> &mut Vec<Self::Element>;
}

/// Holds the in-memory draft of one entity or entity collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftStore<T> {
    draft: T,
}

impl<T: Clone> DraftStore<T> {
    pub fn new(draft: T) -> Self {
        Self { draft }
    }

    /// Replaces the draft with an independent copy of `committed`.
    pub fn seed(&mut self, committed: &T) {
        self.draft = committed.clone();
    }

    pub fn draft(&self) -> &T {
        &self.draft
    }
}

impl<T: FieldSet> DraftStore<T> {
    pub fn set_field(&mut self, field: T::Field, value: impl Into<String>) {
        self.draft.set_field(field, value.into());
    }
}

impl<T: ElementList> DraftStore<T> {
    /// Appends `defaults` under a freshly generated identity and returns it.
    ///
    /// Any id already present in `defaults` is replaced.
    pub fn add_element(&mut self, mut defaults: T::Element) -> ElementId {
        let id = fresh_element_id(self.draft.elements().iter().map(|element| element.id()));
        defaults.set_id(id.clone());
        self.draft.elements_mut().push(defaults);
        id
    }

    /// Removes the element with identity `id`. Returns whether one was removed.
    pub fn remove_element(&mut self, id: &ElementId) -> bool {
        let elements = self.draft.elements_mut();
        let before = elements.len();
        elements.retain(|element| element.id() != id);
        elements.len() != before
    }

    /// Replaces one field of the element with identity `id`.
    ///
    /// Returns whether a matching element was found.
    pub fn update_element(
        &mut self,
        id: &ElementId,
        field: <T::Element as FieldSet>::Field,
        value: impl Into<String>,
    ) -> bool {
        match self
            .draft
            .elements_mut()
            .iter_mut()
            .find(|element| element.id() == id)
        {
            Some(element) => {
                element.set_field(field, value.into());
                true
            }
            None => false,
        }
    }

    /// Identities of the draft's elements in list order.
    pub fn element_ids(&self) -> Vec<ElementId> {
        self.draft
            .elements()
            .iter()
            .map(|element| element.id().clone())
            .collect()
    }
}
