//! Records with a stable identity (inventory items, transactions).

/// Something stored under its own id, whose fields may change over time.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

/// Look up an entity by id in a loaded collection snapshot.
pub fn find_by_id<'a, E: Entity>(entities: &'a [E], id: &E::Id) -> Option<&'a E> {
    entities.iter().find(|e| e.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Shelf {
        id: u32,
        label: &'static str,
    }

    impl Entity for Shelf {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    #[test]
    fn finds_by_identity() {
        let shelves = [Shelf { id: 1, label: "front" }, Shelf { id: 2, label: "back" }];
        assert_eq!(find_by_id(&shelves, &2).map(|s| s.label), Some("back"));
        assert!(find_by_id(&shelves, &3).is_none());
    }
}
