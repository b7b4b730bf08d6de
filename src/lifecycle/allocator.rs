use super::stack::Stack;

/// Where an allocated id came from. A recycled id is only removed from the
/// pool once the caller commits it after a successful insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    Recycled(i64),
    Fresh(i64),
}

impl Allocation {
    pub fn id(&self) -> i64 {
        match *self {
            Allocation::Recycled(id) | Allocation::Fresh(id) => id,
        }
    }
}

/// Hands out ids for new returns, reusing the most recently released one first.
///
/// The pool is LIFO: delete 5 then 3 and the next create gets 3. Only when
/// the pool is empty does allocation fall back to `max + 1` over live records,
/// or `1` when there are none.
#[derive(Debug, Default)]
pub struct IdAllocator {
    released: Stack<i64>,
}

impl IdAllocator {
    /// Whether allocation needs the repository's max id at all.
    pub fn has_released(&self) -> bool {
        !self.released.is_empty()
    }

    /// Proposes the next id without consuming anything. `max_live` is only
    /// consulted when the pool is empty.
    pub fn allocate(&self, max_live: Option<i64>) -> Allocation {
        match self.released.peek() {
            Some(&id) => Allocation::Recycled(id),
            None => Allocation::Fresh(max_live.map_or(1, |max| max + 1)),
        }
    }

    /// Consumes a recycled id once its insert has succeeded.
    pub fn commit(&mut self, allocation: Allocation) {
        if let Allocation::Recycled(id) = allocation {
            let popped = self.released.pop();
            debug_assert_eq!(popped, Some(id), "pool top changed under the lock");
        }
    }

    pub fn release(&mut self, id: i64) {
        self.released.push(id);
    }

    /// Drops the top of the pool when it matches `id`.
    pub fn discard(&mut self, id: i64) -> bool {
        if self.released.peek() == Some(&id) {
            self.released.pop();
            true
        } else {
            false
        }
    }

    /// Released ids, next-to-reuse first.
    pub fn released(&self) -> Vec<i64> {
        self.released.iter_top_down().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_everything_starts_at_one() {
        let alloc = IdAllocator::default();
        assert_eq!(alloc.allocate(None), Allocation::Fresh(1));
    }

    #[test]
    fn falls_back_to_max_plus_one() {
        let alloc = IdAllocator::default();
        assert_eq!(alloc.allocate(Some(7)), Allocation::Fresh(8));
    }

    #[test]
    fn recycled_id_beats_max() {
        let mut alloc = IdAllocator::default();
        alloc.release(2);
        assert_eq!(alloc.allocate(Some(10)), Allocation::Recycled(2));
    }

    #[test]
    fn most_recently_released_is_reused_first() {
        let mut alloc = IdAllocator::default();
        alloc.release(5);
        alloc.release(3);

        let first = alloc.allocate(Some(9));
        assert_eq!(first, Allocation::Recycled(3));
        alloc.commit(first);

        let second = alloc.allocate(Some(9));
        assert_eq!(second, Allocation::Recycled(5));
        alloc.commit(second);

        assert_eq!(alloc.allocate(Some(9)), Allocation::Fresh(10));
    }

    #[test]
    fn allocate_without_commit_leaves_pool_alone() {
        let mut alloc = IdAllocator::default();
        alloc.release(4);
        let _ = alloc.allocate(None);
        let _ = alloc.allocate(None);
        assert_eq!(alloc.released(), vec![4]);
    }

    #[test]
    fn committing_fresh_id_is_a_no_op() {
        let mut alloc = IdAllocator::default();
        alloc.release(4);
        alloc.commit(Allocation::Fresh(12));
        assert_eq!(alloc.released(), vec![4]);
    }

    #[test]
    fn discard_only_removes_matching_top() {
        let mut alloc = IdAllocator::default();
        alloc.release(1);
        alloc.release(2);
        assert!(!alloc.discard(1));
        assert!(alloc.discard(2));
        assert_eq!(alloc.released(), vec![1]);
    }
}
