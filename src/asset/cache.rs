use super::Handle;

enum Slot<T> {
    Occupied { generation: u32, item: T },
    Vacant { generation: u32, next_free: Option<u32> },
}

/// Growable slot arena. Freed slots are recycled through a free list and
/// their generation is bumped so older handles stop resolving.
pub struct AssetCache<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> AssetCache<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    pub fn insert(&mut self, item: T) -> Handle<T> {
        self.len += 1;

        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index as usize];
            let Slot::Vacant {
                generation,
                next_free,
            } = *slot
            else {
                unreachable!("free list points at an occupied slot");
            };
            self.free_head = next_free;
            *slot = Slot::Occupied { generation, item };
            return Handle::new(index, generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot::Occupied {
            generation: 0,
            item,
        });
        Handle::new(index, 0)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        match self.slots.get(handle.index())? {
            Slot::Occupied { generation, item } if *generation == handle.generation() => {
                Some(item)
            }
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        match self.slots.get_mut(handle.index())? {
            Slot::Occupied { generation, item } if *generation == handle.generation() => {
                Some(item)
            }
            _ => None,
        }
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Frees the slot and returns the item. Stale handles return `None`.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let index = handle.index();
        match self.slots.get(index) {
            Some(Slot::Occupied { generation, .. }) if *generation == handle.generation() => {}
            _ => return None,
        }

        let vacant = Slot::Vacant {
            generation: handle.generation().wrapping_add(1),
            next_free: self.free_head,
        };
        let Slot::Occupied { item, .. } = std::mem::replace(&mut self.slots[index], vacant) else {
            return None;
        };
        self.free_head = Some(index as u32);
        self.len -= 1;
        Some(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Occupied { generation, item } => {
                    Some((Handle::new(index as u32, *generation), item))
                }
                Slot::Vacant { .. } => None,
            })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for AssetCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
