/// Last-in-first-out sequence; push and pop only touch the top.
///
/// Backs both the undo history (`Stack<ReturnRecord>`) and the pool of
/// released ids (`Stack<i64>`).
#[derive(Debug, Clone)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Stack<T> {
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Removes and returns the most recently pushed item.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Items from top (next to pop) to bottom.
    pub fn iter_top_down(&self) -> impl Iterator<Item = &T> {
        self.items.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_reverse_push_order() {
        let mut s = Stack::default();
        s.push("a");
        s.push("b");
        s.push("c");
        assert_eq!(s.pop(), Some("c"));
        assert_eq!(s.pop(), Some("b"));
        assert_eq!(s.pop(), Some("a"));
        assert_eq!(s.pop(), None);
    }

    #[test]
    fn empty_stack_reports_empty() {
        let mut s: Stack<i64> = Stack::default();
        assert!(s.is_empty());
        assert_eq!(s.peek(), None);
        assert_eq!(s.pop(), None);
        s.push(1);
        assert!(!s.is_empty());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn peek_does_not_remove() {
        let mut s = Stack::default();
        s.push(5);
        s.push(3);
        assert_eq!(s.peek(), Some(&3));
        assert_eq!(s.len(), 2);
        let order: Vec<i64> = s.iter_top_down().copied().collect();
        assert_eq!(order, vec![3, 5]);
    }
}
