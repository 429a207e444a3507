//! Core traits shared by the domain entities.

/// Trait for entities with a unique identifier.
pub trait Entity {
    /// The identifier type.
    type Id: PartialEq;

    /// Returns the entity's unique identifier.
    fn id(&self) -> &Self::Id;
}

/// Finds the first entity in `items` whose identifier equals `id`.
pub fn find_by_id<'a, T: Entity>(items: &'a [T], id: &T::Id) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}
