//! Generational arena for class instances.

use std::fmt;

use classmodel_core::{ObjectHandle, TypeHash, Value};

/// Storage of one instance: its class and one slot per data member.
///
/// Slot indices come from the class's layout. Public, protected and private
/// data all live here side by side; visibility is decided at resolution
/// time, never by where the value is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceData {
    pub class: TypeHash,
    pub slots: Vec<Value>,
}

/// Heap storage for instances with generational indices.
///
/// Instances are stored in a Vec with generation tracking. When an instance
/// is released its slot is reused but the generation is incremented, so
/// handles to the old instance are detected as stale.
pub struct InstanceHeap {
    slots: Vec<HeapSlot>,
    free_list: Vec<u32>,
}

struct HeapSlot {
    generation: u32,
    value: Option<InstanceData>,
}

impl InstanceHeap {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Store a new instance.
    pub fn allocate(&mut self, data: InstanceData) -> ObjectHandle {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(data);
            ObjectHandle::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(HeapSlot {
                generation: 0,
                value: Some(data),
            });
            ObjectHandle::new(index, 0)
        }
    }

    /// Returns None if the handle is stale.
    pub fn get(&self, handle: ObjectHandle) -> Option<&InstanceData> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Returns None if the handle is stale.
    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut InstanceData> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Free an instance.
    ///
    /// Returns false if the handle was already stale.
    pub fn free(&mut self, handle: ObjectHandle) -> bool {
        if let Some(slot) = self.slots.get_mut(handle.index as usize)
            && slot.generation == handle.generation
            && slot.value.is_some()
        {
            slot.value = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(handle.index);
            return true;
        }
        false
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InstanceHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InstanceHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHeap")
            .field("live", &self.len())
            .field("capacity", &self.slots.len())
            .finish()
    }
}
