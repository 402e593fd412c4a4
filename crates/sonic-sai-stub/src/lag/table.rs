//! Fixed-capacity LAG table.
//!
//! The table is a bounded array of slots. A slot is occupied iff it holds a
//! LAG object ID; membership is one bit per port in the slot's [`PortMask`].
//! Only [`LagApi`](super::LagApi) mutates the table, and every mutator
//! touches a single slot.

use std::fmt;

use crate::types::LagOid;

/// Number of ports a [`PortMask`] can hold.
pub const PORT_MASK_CAPACITY: u32 = 128;

const PORT_MASK_WORDS: usize = (PORT_MASK_CAPACITY / u64::BITS) as usize;

/// Bounded set of port indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PortMask {
    words: [u64; PORT_MASK_WORDS],
}

impl PortMask {
    /// Creates an empty mask.
    pub const fn new() -> Self {
        Self {
            words: [0; PORT_MASK_WORDS],
        }
    }

    fn locate(port: u32) -> Option<(usize, u64)> {
        if port >= PORT_MASK_CAPACITY {
            return None;
        }
        Some(((port / u64::BITS) as usize, 1u64 << (port % u64::BITS)))
    }

    /// Returns true if `port` is in the mask.
    pub fn contains(&self, port: u32) -> bool {
        Self::locate(port).is_some_and(|(word, bit)| self.words[word] & bit != 0)
    }

    /// Adds `port`; returns false if it was already present or out of range.
    pub fn insert(&mut self, port: u32) -> bool {
        match Self::locate(port) {
            Some((word, bit)) if self.words[word] & bit == 0 => {
                self.words[word] |= bit;
                true
            }
            _ => false,
        }
    }

    /// Removes `port`; returns false if it was not present.
    pub fn remove(&mut self, port: u32) -> bool {
        match Self::locate(port) {
            Some((word, bit)) if self.words[word] & bit != 0 => {
                self.words[word] &= !bit;
                true
            }
            _ => false,
        }
    }

    /// Number of ports in the mask.
    pub fn len(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Returns true if no port is in both masks.
    pub fn is_disjoint(&self, other: &PortMask) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & b == 0)
    }

    /// Iterates the ports in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..PORT_MASK_CAPACITY).filter(move |port| self.contains(*port))
    }
}

impl fmt::LowerHex for PortMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for word in self.words.iter().rev() {
            write!(f, "{:016x}", word)?;
        }
        Ok(())
    }
}

/// One LAG table slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LagEntry {
    oid: Option<LagOid>,
    ports: PortMask,
    member_count: u32,
}

impl LagEntry {
    /// Object ID of the LAG in this slot, if occupied.
    pub fn oid(&self) -> Option<LagOid> {
        self.oid
    }

    pub fn is_occupied(&self) -> bool {
        self.oid.is_some()
    }

    /// Member ports of the LAG.
    pub fn ports(&self) -> &PortMask {
        &self.ports
    }

    /// Number of member ports, maintained on every add/remove.
    pub fn member_count(&self) -> u32 {
        self.member_count
    }
}

/// Bounded table of LAG slots.
#[derive(Debug, Clone)]
pub struct LagTable {
    entries: Vec<LagEntry>,
}

impl LagTable {
    /// Creates a table with `capacity` empty slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![LagEntry::default(); capacity],
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_occupied()).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.entries.iter().any(LagEntry::is_occupied)
    }

    /// Returns the slot at `slot`.
    pub fn entry(&self, slot: usize) -> Option<&LagEntry> {
        self.entries.get(slot)
    }

    /// Iterates occupied slots with their index.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &LagEntry)> {
        self.entries.iter().enumerate().filter(|(_, e)| e.is_occupied())
    }

    /// Finds the slot holding the LAG `oid`.
    pub fn find_by_oid(&self, oid: LagOid) -> Option<usize> {
        if oid.is_null() {
            return None;
        }
        self.entries.iter().position(|e| e.oid == Some(oid))
    }

    /// Finds the lowest-indexed free slot.
    pub fn find_free_slot(&self) -> Option<usize> {
        self.entries.iter().position(|e| !e.is_occupied())
    }

    /// Finds the occupied slot whose LAG contains `port`.
    pub fn find_owner_of_port(&self, port: u32) -> Option<usize> {
        self.occupied()
            .find(|(_, e)| e.ports.contains(port))
            .map(|(slot, _)| slot)
    }

    pub(crate) fn occupy(&mut self, slot: usize, oid: LagOid) {
        let entry = &mut self.entries[slot];
        debug_assert!(!entry.is_occupied(), "LAG slot {} already occupied", slot);
        *entry = LagEntry {
            oid: Some(oid),
            ports: PortMask::new(),
            member_count: 0,
        };
    }

    pub(crate) fn clear(&mut self, slot: usize) {
        debug_assert_eq!(self.entries[slot].member_count, 0);
        self.entries[slot] = LagEntry::default();
    }

    /// Sets `port` in the slot's mask; returns false if nothing changed.
    pub(crate) fn add_port(&mut self, slot: usize, port: u32) -> bool {
        let entry = &mut self.entries[slot];
        let added = entry.ports.insert(port);
        if added {
            entry.member_count += 1;
        }
        added
    }

    pub(crate) fn remove_port(&mut self, slot: usize, port: u32) {
        let entry = &mut self.entries[slot];
        if entry.ports.remove(port) {
            entry.member_count -= 1;
        }
    }

    /// Renders every slot, occupied or not, for debugging.
    pub fn dump(&self) -> LagTableDump<'_> {
        LagTableDump(self)
    }
}

/// Display adapter returned by [`LagTable::dump`].
pub struct LagTableDump<'a>(&'a LagTable);

impl fmt::Display for LagTableDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[ LAGs table dump ]")?;
        for (slot, entry) in self.0.entries.iter().enumerate() {
            let raw = entry.oid.map(|oid| oid.as_raw()).unwrap_or(0);
            writeln!(
                f,
                "LAG[{}].oid = 0x{:010x} .port_mask = 0x{:x} .members = {}",
                slot, raw, entry.ports, entry.member_count
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_mask_basic() {
        let mut mask = PortMask::new();
        assert!(mask.is_empty());

        assert!(mask.insert(3));
        assert!(mask.insert(70));
        assert!(!mask.insert(3));
        assert!(!mask.insert(PORT_MASK_CAPACITY));

        assert!(mask.contains(3));
        assert!(mask.contains(70));
        assert!(!mask.contains(4));
        assert_eq!(mask.len(), 2);
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![3, 70]);

        assert!(mask.remove(3));
        assert!(!mask.remove(3));
        assert_eq!(mask.len(), 1);
    }

    #[test]
    fn test_port_mask_disjoint() {
        let mut a = PortMask::new();
        let mut b = PortMask::new();
        a.insert(1);
        b.insert(65);
        assert!(a.is_disjoint(&b));
        b.insert(1);
        assert!(!a.is_disjoint(&b));
    }

    #[test]
    fn test_port_mask_hex() {
        let mut mask = PortMask::new();
        mask.insert(0);
        mask.insert(64);
        assert_eq!(
            format!("{:x}", mask),
            "00000000000000010000000000000001"
        );
    }

    #[test]
    fn test_free_slot_is_lowest() {
        let mut table = LagTable::new(3);
        assert_eq!(table.find_free_slot(), Some(0));

        table.occupy(0, LagOid::from_index(0));
        table.occupy(1, LagOid::from_index(1));
        assert_eq!(table.find_free_slot(), Some(2));

        table.clear(0);
        assert_eq!(table.find_free_slot(), Some(0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_find_by_oid() {
        let mut table = LagTable::new(2);
        let oid = LagOid::from_index(1);
        table.occupy(1, oid);

        assert_eq!(table.find_by_oid(oid), Some(1));
        assert_eq!(table.find_by_oid(LagOid::from_index(0)), None);
        assert_eq!(table.find_by_oid(LagOid::NULL), None);
    }

    #[test]
    fn test_member_count_follows_mask() {
        let mut table = LagTable::new(1);
        table.occupy(0, LagOid::from_index(0));

        assert!(table.add_port(0, 5));
        assert!(!table.add_port(0, 5));
        assert!(table.add_port(0, 7));
        assert!(!table.add_port(0, PORT_MASK_CAPACITY));
        let entry = table.entry(0).unwrap();
        assert_eq!(entry.member_count(), 2);
        assert_eq!(entry.member_count(), entry.ports().len());

        table.remove_port(0, 5);
        table.remove_port(0, 5);
        assert_eq!(table.entry(0).unwrap().member_count(), 1);
    }

    #[test]
    fn test_find_owner_skips_free_slots() {
        let mut table = LagTable::new(2);
        table.occupy(1, LagOid::from_index(1));
        table.add_port(1, 9);

        assert_eq!(table.find_owner_of_port(9), Some(1));
        assert_eq!(table.find_owner_of_port(8), None);
    }

    #[test]
    fn test_dump_lists_every_slot() {
        let mut table = LagTable::new(2);
        table.occupy(0, LagOid::from_index(0));
        table.add_port(0, 1);

        let dump = table.dump().to_string();
        assert!(dump.starts_with("[ LAGs table dump ]"));
        assert!(dump.contains("LAG[0].oid = 0x2000000000000"));
        assert!(dump.contains("LAG[1].oid = 0x0000000000"));
        assert!(dump.contains(".members = 1"));
    }
}
