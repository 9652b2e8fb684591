//! Per-call address registry.
//!
//! The survey pass promotes every address it meets `unseen -> Possible ->
//! Confirmed`; the render pass then flips `Confirmed -> Rendered` on the first
//! full rendering. A registry lives for exactly one top-level capture call.

use std::any::type_name;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

/// Key of the synthetic field carrying an aliased node's address.
pub const ADDRESS_NOTE_KEY: &str = "";

/// Identity of a pointee: its address, its size in bytes and its type name.
///
/// The type name keeps a struct and its first field, which share an
/// address, from being mistaken for the same node. The size keeps
/// overlapping slices that start at the same element apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    addr: usize,
    size: usize,
    type_name: &'static str,
}

impl Address {
    /// Identity of `value`, or `None` for zero-sized values (their addresses
    /// are dangling and shared by unrelated values).
    pub fn of<T: ?Sized>(value: &T) -> Option<Self> {
        let size = std::mem::size_of_val(value);
        if size == 0 {
            return None;
        }
        Some(Self {
            addr: value as *const T as *const () as usize,
            size,
            type_name: type_name::<T>(),
        })
    }

    pub fn addr(&self) -> usize {
        self.addr
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Value of the [`ADDRESS_NOTE_KEY`] field.
    pub fn note(&self) -> String {
        format!("Address: {}", self)
    }

    /// Placeholder substituted for every visit after the first rendering.
    pub fn back_reference(&self) -> String {
        format!("(pointer: {})", self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.addr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressState {
    /// Seen once by the survey.
    Possible,
    /// Seen at least twice by the survey; not yet rendered.
    Confirmed,
    /// Fully rendered once by the render pass.
    Rendered,
}

/// What the survey does at an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Survey {
    /// First visit: keep walking into the pointee.
    Descend,
    /// Revisit: stop here, the graph has aliasing.
    Aliased,
}

/// What the render pass does at an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Render {
    /// Not aliased: render without bookkeeping.
    Plain,
    /// Aliased, first visit: render in full and attach the address note.
    First,
    /// Aliased, already rendered: emit a back reference.
    BackReference,
}

#[derive(Debug, Default)]
pub struct AddressRegistry {
    states: HashMap<Address, AddressState>,
}

impl AddressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn survey(&mut self, address: Address) -> Survey {
        match self.states.entry(address) {
            Entry::Vacant(slot) => {
                slot.insert(AddressState::Possible);
                Survey::Descend
            }
            Entry::Occupied(mut slot) => {
                if *slot.get() == AddressState::Possible {
                    slot.insert(AddressState::Confirmed);
                }
                Survey::Aliased
            }
        }
    }

    pub fn render(&mut self, address: Address) -> Render {
        match self.states.get_mut(&address) {
            Some(state @ AddressState::Confirmed) => {
                *state = AddressState::Rendered;
                Render::First
            }
            Some(AddressState::Rendered) => Render::BackReference,
            Some(AddressState::Possible) | None => Render::Plain,
        }
    }

    pub fn state(&self, address: &Address) -> Option<AddressState> {
        self.states.get(address).copied()
    }

    /// Number of distinct addresses surveyed.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survey_promotes_possible_then_confirmed() {
        let value = 7u32;
        let address = Address::of(&value).unwrap();
        let mut registry = AddressRegistry::new();

        assert_eq!(registry.survey(address), Survey::Descend);
        assert_eq!(registry.state(&address), Some(AddressState::Possible));
        assert_eq!(registry.survey(address), Survey::Aliased);
        assert_eq!(registry.state(&address), Some(AddressState::Confirmed));
        assert_eq!(registry.survey(address), Survey::Aliased);
        assert_eq!(registry.state(&address), Some(AddressState::Confirmed));
    }

    #[test]
    fn test_render_flips_confirmed_once() {
        let value = 7u32;
        let address = Address::of(&value).unwrap();
        let mut registry = AddressRegistry::new();
        registry.survey(address);
        registry.survey(address);

        assert_eq!(registry.render(address), Render::First);
        assert_eq!(registry.render(address), Render::BackReference);
        assert_eq!(registry.render(address), Render::BackReference);
    }

    #[test]
    fn test_single_visit_renders_plain() {
        let value = 7u32;
        let address = Address::of(&value).unwrap();
        let mut registry = AddressRegistry::new();
        registry.survey(address);
        assert_eq!(registry.render(address), Render::Plain);
    }

    #[test]
    fn test_struct_and_first_field_are_distinct() {
        struct Outer {
            inner: u64,
        }
        let outer = Outer { inner: 1 };
        let a = Address::of(&outer).unwrap();
        let b = Address::of(&outer.inner).unwrap();
        assert_eq!(a.addr(), b.addr());
        assert_ne!(a, b);
    }

    #[test]
    fn test_prefix_slice_and_whole_slice_are_distinct() {
        let buf = [1u32, 2, 3, 4, 5];
        let head = Address::of(&buf[..2]).unwrap();
        let all = Address::of(&buf[..]).unwrap();
        assert_eq!(head.addr(), all.addr());
        assert_eq!(head.type_name(), all.type_name());
        assert_ne!(head, all);
        assert_eq!(Address::of(&buf[..]), Some(all));
    }

    #[test]
    fn test_zero_sized_values_have_no_identity() {
        assert!(Address::of(&()).is_none());
        assert!(Address::of(&[0u8; 0][..]).is_none());
    }

    #[test]
    fn test_address_text_forms() {
        let value = 1u8;
        let address = Address::of(&value).unwrap();
        assert!(address.note().starts_with("Address: 0x"));
        assert!(address.back_reference().starts_with("(pointer: 0x"));
        assert!(address.back_reference().ends_with(')'));
    }
}
