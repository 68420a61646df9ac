/// Node index meaning "no entry"; slot 0 of the arena is never handed out.
pub(crate) const NIL: u32 = 0;

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BucketEntry {
    /// Slot of the referenced entity in the owning index.
    pub(crate) slot: u32,
    pub(crate) next: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub capacity: usize,
    pub in_use: usize,
    pub chunks: usize,
}

/// Pool of bucket-list nodes shared by every index of a [`GridContext`](crate::GridContext).
///
/// Free nodes form an intrusive list threaded through `next`. The pool grows
/// one chunk at a time and never shrinks.
#[derive(Debug)]
pub struct BucketArena {
    nodes: Vec<BucketEntry>,
    free_head: u32,
    in_use: usize,
    chunk_size: usize,
    chunks: usize,
}

impl BucketArena {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            nodes: vec![BucketEntry::default()],
            free_head: NIL,
            in_use: 0,
            chunk_size: chunk_size.max(1),
            chunks: 0,
        }
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            capacity: self.nodes.len() - 1,
            in_use: self.in_use,
            chunks: self.chunks,
        }
    }

    #[inline(always)]
    pub(crate) fn acquire(&mut self, slot: u32, next: u32) -> u32 {
        if self.free_head == NIL {
            self.grow();
        }
        let node = self.free_head;
        let entry = &mut self.nodes[node as usize];
        self.free_head = entry.next;
        *entry = BucketEntry { slot, next };
        self.in_use += 1;
        node
    }

    #[inline(always)]
    pub(crate) fn release(&mut self, node: u32) {
        debug_assert!(node != NIL, "released the sentinel node");
        self.nodes[node as usize].next = self.free_head;
        self.free_head = node;
        self.in_use -= 1;
    }

    #[inline(always)]
    pub(crate) fn entry(&self, node: u32) -> BucketEntry {
        self.nodes[node as usize]
    }

    #[inline(always)]
    pub(crate) fn set_next(&mut self, node: u32, next: u32) {
        self.nodes[node as usize].next = next;
    }

    fn grow(&mut self) {
        let start = self.nodes.len();
        let end = start + self.chunk_size;
        if end > u32::MAX as usize {
            log::error!(
                "bucket arena exhausted: {} nodes in use, cannot index more",
                self.in_use
            );
            panic!("bucket arena exhausted at {} nodes", start - 1);
        }
        if let Err(err) = self.nodes.try_reserve_exact(self.chunk_size) {
            log::error!("bucket arena failed to grow past {} nodes: {}", start - 1, err);
            panic!("bucket arena allocation failed: {err}");
        }
        for node in start..end {
            let next = if node + 1 < end { node as u32 + 1 } else { NIL };
            self.nodes.push(BucketEntry { slot: 0, next });
        }
        self.free_head = start as u32;
        self.chunks += 1;
        log::debug!(
            "bucket arena grew to {} nodes ({} chunks)",
            end - 1,
            self.chunks
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{BucketArena, NIL};

    #[test]
    fn arena_grows_in_chunks() {
        let mut arena = BucketArena::new(4);
        assert_eq!(arena.stats().capacity, 0);

        let nodes: Vec<u32> = (0..5).map(|slot| arena.acquire(slot, NIL)).collect();
        let stats = arena.stats();
        assert_eq!(stats.capacity, 8);
        assert_eq!(stats.chunks, 2);
        assert_eq!(stats.in_use, 5);
        assert!(nodes.iter().all(|&node| node != NIL));
        assert_eq!(arena.entry(nodes[3]).slot, 3);
    }

    #[test]
    fn released_nodes_are_reused_without_growth() {
        let mut arena = BucketArena::new(2);
        let a = arena.acquire(1, NIL);
        let b = arena.acquire(2, a);
        assert_eq!(arena.entry(b).next, a);

        arena.release(a);
        arena.release(b);
        assert_eq!(arena.stats().in_use, 0);

        let c = arena.acquire(7, NIL);
        let d = arena.acquire(8, NIL);
        let mut reused = [c, d];
        reused.sort_unstable();
        let mut original = [a, b];
        original.sort_unstable();
        assert_eq!(reused, original);
        assert_eq!(arena.stats().capacity, 2);
        assert_eq!(arena.stats().chunks, 1);
    }
}
