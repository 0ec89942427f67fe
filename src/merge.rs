//! Highest-takes-precedence merge of up to two ArtDmx senders.
//!
//! The first two distinct sender addresses each own one source buffer. Every
//! update rewrites that source and recomputes the composite as the per-slot
//! maximum of both. A third sender is dropped until [`Merger::cancel`] frees
//! both sources.

use core::net::Ipv4Addr;

use crate::dmx::DMX_UNIVERSE_SIZE;

/// Up to 512 slot levels with a count of how many are valid.
///
/// Slots at or beyond `len` are always zero.
#[derive(Clone, PartialEq, Eq)]
pub struct SlotBuffer {
    slots: [u8; DMX_UNIVERSE_SIZE],
    len: usize,
}

impl Default for SlotBuffer {
    fn default() -> Self {
        Self {
            slots: [0; DMX_UNIVERSE_SIZE],
            len: 0,
        }
    }
}

impl core::fmt::Debug for SlotBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlotBuffer")
            .field("len", &self.len)
            .field("slots", &self.as_slice())
            .finish()
    }
}

impl SlotBuffer {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid slots.
    pub fn as_slice(&self) -> &[u8] {
        &self.slots[..self.len]
    }

    /// All 512 slots, including the zeroed tail.
    pub fn slots(&self) -> &[u8; DMX_UNIVERSE_SIZE] {
        &self.slots
    }

    /// Level at zero-based `index`; 0 past the valid count.
    pub fn get(&self, index: usize) -> u8 {
        if index < self.len {
            self.slots[index]
        } else {
            0
        }
    }

    /// Sets the level at zero-based `index`. Returns false past the valid count.
    pub fn set(&mut self, index: usize, level: u8) -> bool {
        match self.slots[..self.len].get_mut(index) {
            Some(slot) => {
                *slot = level;
                true
            }
            None => false,
        }
    }

    /// Changes the valid count, zeroing any slots it drops.
    pub fn set_len(&mut self, len: usize) {
        let len = len.min(DMX_UNIVERSE_SIZE);
        if len < self.len {
            self.slots[len..self.len].fill(0);
        }
        self.len = len;
    }

    /// Replaces the contents with `data` (at most 512 slots).
    pub fn copy_from(&mut self, data: &[u8]) {
        let data = &data[..data.len().min(DMX_UNIVERSE_SIZE)];
        self.set_len(data.len());
        self.slots[..data.len()].copy_from_slice(data);
    }

    pub fn clear(&mut self) {
        self.slots.fill(0);
        self.len = 0;
    }
}

/// Which of the two merge sources a sender is bound to.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum MergeSlot {
    A,
    B,
}

impl MergeSlot {
    fn index(self) -> usize {
        match self {
            MergeSlot::A => 0,
            MergeSlot::B => 1,
        }
    }
}

/// What happened to an ArtDmx offered to the merger.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum MergeOutcome {
    /// The sender's source was updated and the composite recomputed.
    Merged(MergeSlot),
    /// Both sources belong to other senders; nothing changed.
    Rejected,
}

#[derive(Debug, Clone, Default)]
struct Source {
    sender: Option<Ipv4Addr>,
    buffer: SlotBuffer,
}

#[derive(Debug, Clone, Default)]
pub struct Merger {
    sources: [Source; 2],
    composite: SlotBuffer,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one ArtDmx payload from `sender`.
    pub fn merge(&mut self, sender: Ipv4Addr, data: &[u8]) -> MergeOutcome {
        let Some(slot) = self.bind(sender) else {
            log::debug!("dropping ArtDmx from {}: both merge sources taken", sender);
            return MergeOutcome::Rejected;
        };

        self.sources[slot.index()].buffer.copy_from(data);
        self.recompute();

        MergeOutcome::Merged(slot)
    }

    fn bind(&mut self, sender: Ipv4Addr) -> Option<MergeSlot> {
        let slot = if self.sources[0].sender == Some(sender) {
            MergeSlot::A
        } else if self.sources[1].sender == Some(sender) {
            MergeSlot::B
        } else if self.sources[0].sender.is_none() {
            MergeSlot::A
        } else if self.sources[1].sender.is_none() {
            MergeSlot::B
        } else {
            return None;
        };

        let source = &mut self.sources[slot.index()];
        if source.sender.is_none() {
            log::debug!("merge source {:?} bound to {}", slot, sender);
            source.sender = Some(sender);
        }

        Some(slot)
    }

    // Covers the previous composite extent too, so slots a shrinking source
    // gave up fall back to the other source (or 0).
    fn recompute(&mut self) {
        let [a, b] = &self.sources;
        let len = a.buffer.len().max(b.buffer.len());
        let span = len.max(self.composite.len());

        let (a, b) = (a.buffer.slots(), b.buffer.slots());
        for (i, slot) in self.composite.slots[..span].iter_mut().enumerate() {
            *slot = a[i].max(b[i]);
        }
        self.composite.len = len;
    }

    /// Releases both sources and zeroes their buffers. The composite keeps
    /// its last levels until the next update.
    pub fn cancel(&mut self) {
        for source in &mut self.sources {
            source.sender = None;
            source.buffer.clear();
        }
        log::debug!("merge cancelled");
    }

    /// Two senders are currently bound.
    pub fn is_merging(&self) -> bool {
        self.sources.iter().all(|source| source.sender.is_some())
    }

    pub fn sender(&self, slot: MergeSlot) -> Option<Ipv4Addr> {
        self.sources[slot.index()].sender
    }

    pub fn source(&self, slot: MergeSlot) -> &SlotBuffer {
        &self.sources[slot.index()].buffer
    }

    /// The merged output.
    pub fn output(&self) -> &SlotBuffer {
        &self.composite
    }

    pub fn output_mut(&mut self) -> &mut SlotBuffer {
        &mut self.composite
    }
}
