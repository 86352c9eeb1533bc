use super::FileHandle;
use crate::error::{PdfStackError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The working page order.
///
/// Position `i` becomes page `i + 1` of the output. All mutation goes through
/// `replace`, `swap` and `reorder_to`; while an [`AssemblyTicket`] is alive
/// every mutation is rejected with [`PdfStackError::SelectionLocked`].
#[derive(Debug, Default)]
pub struct SelectionStore {
    order: Vec<FileHandle>,
    assembling: Arc<AtomicBool>,
}

impl SelectionStore {
    pub fn new(files: Vec<FileHandle>) -> Self {
        Self {
            order: files,
            assembling: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FileHandle> {
        self.order.get(index)
    }

    /// Borrowed view of the current order
    pub fn as_slice(&self) -> &[FileHandle] {
        &self.order
    }

    /// Owned copy of the current order for consumers that outlive the borrow
    pub fn snapshot(&self) -> Vec<FileHandle> {
        self.order.clone()
    }

    /// True while an assembly holds the store
    pub fn is_locked(&self) -> bool {
        self.assembling.load(Ordering::SeqCst)
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.is_locked() {
            tracing::debug!("rejected mutation while assembly is in flight");
            return Err(PdfStackError::SelectionLocked);
        }
        Ok(())
    }

    /// Overwrites the order with a fresh selection
    pub fn replace(&mut self, files: Vec<FileHandle>) -> Result<()> {
        self.ensure_unlocked()?;
        tracing::debug!(count = files.len(), "selection replaced");
        self.order = files;
        Ok(())
    }

    /// Exchanges the handles at two positions.
    ///
    /// An out-of-range index leaves the order untouched and reports
    /// [`PdfStackError::IndexOutOfRange`].
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        self.ensure_unlocked()?;

        let len = self.order.len();
        if let Some(index) = [a, b].into_iter().find(|&i| i >= len) {
            return Err(PdfStackError::IndexOutOfRange { index, len });
        }

        self.order.swap(a, b);
        tracing::debug!(from = a, to = b, "swapped pages");
        Ok(())
    }

    /// Replaces the order wholesale with a permutation of the current contents
    pub fn reorder_to(&mut self, new_order: Vec<FileHandle>) -> Result<()> {
        self.ensure_unlocked()?;

        if !is_permutation(&self.order, &new_order) {
            tracing::warn!(
                current = self.order.len(),
                proposed = new_order.len(),
                "rejected reorder that is not a permutation"
            );
            return Err(PdfStackError::NotAPermutation);
        }

        self.order = new_order;
        Ok(())
    }

    /// Locks the store and hands out the order to assemble.
    ///
    /// The lock is released when the returned ticket is dropped.
    pub fn begin_assembly(&self) -> Result<AssemblyTicket> {
        if self
            .assembling
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PdfStackError::SelectionLocked);
        }

        Ok(AssemblyTicket {
            order: self.order.clone(),
            lock: Arc::clone(&self.assembling),
        })
    }
}

/// Multiset comparison by handle identity
fn is_permutation(current: &[FileHandle], proposed: &[FileHandle]) -> bool {
    if current.len() != proposed.len() {
        return false;
    }

    let mut counts: HashMap<usize, isize> = HashMap::new();
    for handle in current {
        *counts.entry(handle.id()).or_default() += 1;
    }
    for handle in proposed {
        *counts.entry(handle.id()).or_default() -= 1;
    }

    counts.values().all(|&c| c == 0)
}

/// Exclusive right to assemble the order captured at [`SelectionStore::begin_assembly`]
#[derive(Debug)]
pub struct AssemblyTicket {
    order: Vec<FileHandle>,
    lock: Arc<AtomicBool>,
}

impl AssemblyTicket {
    pub fn order(&self) -> &[FileHandle] {
        &self.order
    }
}

impl Drop for AssemblyTicket {
    fn drop(&mut self) {
        self.lock.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{handle, handles, names};
    use proptest::prelude::*;

    #[test]
    fn test_store_new_and_snapshot() {
        let store = SelectionStore::new(handles(&["a", "b", "c"]));

        assert_eq!(store.len(), 3);
        assert!(!store.is_empty());
        assert_eq!(names(&store.snapshot()), vec!["a", "b", "c"]);
        assert_eq!(store.get(1).unwrap().name, "b");
        assert!(store.get(3).is_none());
    }

    #[test]
    fn test_replace_accepts_empty() {
        let mut store = SelectionStore::new(handles(&["a", "b"]));
        store.replace(Vec::new()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_swap_exchanges_positions() {
        let mut store = SelectionStore::new(handles(&["a", "b", "c"]));
        store.swap(0, 2).unwrap();
        assert_eq!(names(store.as_slice()), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_swap_same_index_is_noop() {
        let mut store = SelectionStore::new(handles(&["a", "b"]));
        store.swap(1, 1).unwrap();
        assert_eq!(names(store.as_slice()), vec!["a", "b"]);
    }

    #[test]
    fn test_swap_out_of_range_leaves_store_unchanged() {
        let mut store = SelectionStore::new(handles(&["a", "b"]));

        let result = store.swap(0, 5);
        assert!(matches!(
            result,
            Err(PdfStackError::IndexOutOfRange { index: 5, len: 2 })
        ));
        assert_eq!(names(store.as_slice()), vec!["a", "b"]);
    }

    #[test]
    fn test_reorder_to_permutation() {
        let order = handles(&["a", "b", "c"]);
        let mut store = SelectionStore::new(order.clone());

        let permuted = vec![order[2].clone(), order[0].clone(), order[1].clone()];
        store.reorder_to(permuted).unwrap();

        assert_eq!(names(store.as_slice()), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_reorder_to_rejects_foreign_handle() {
        let order = handles(&["a", "b"]);
        let mut store = SelectionStore::new(order.clone());

        // Same name, different identity
        let result = store.reorder_to(vec![order[0].clone(), handle("b")]);

        assert!(matches!(result, Err(PdfStackError::NotAPermutation)));
        assert_eq!(store.as_slice(), order.as_slice());
    }

    #[test]
    fn test_reorder_to_rejects_wrong_length_and_duplicates() {
        let order = handles(&["a", "b"]);
        let mut store = SelectionStore::new(order.clone());

        assert!(store.reorder_to(vec![order[0].clone()]).is_err());
        assert!(store
            .reorder_to(vec![order[0].clone(), order[0].clone()])
            .is_err());
        assert_eq!(store.as_slice(), order.as_slice());
    }

    #[test]
    fn test_reorder_to_allows_duplicate_handles_in_same_multiset() {
        let a = handle("a");
        let b = handle("b");
        let mut store = SelectionStore::new(vec![a.clone(), a.clone(), b.clone()]);

        store
            .reorder_to(vec![b.clone(), a.clone(), a.clone()])
            .unwrap();
        assert_eq!(names(store.as_slice()), vec!["b", "a", "a"]);
    }

    #[test]
    fn test_assembly_ticket_locks_until_dropped() {
        let mut store = SelectionStore::new(handles(&["a", "b"]));

        let ticket = store.begin_assembly().unwrap();
        assert!(store.is_locked());
        assert_eq!(names(ticket.order()), vec!["a", "b"]);

        assert!(matches!(store.swap(0, 1), Err(PdfStackError::SelectionLocked)));
        assert!(matches!(
            store.replace(Vec::new()),
            Err(PdfStackError::SelectionLocked)
        ));
        assert!(matches!(
            store.begin_assembly(),
            Err(PdfStackError::SelectionLocked)
        ));
        assert_eq!(names(store.as_slice()), vec!["a", "b"]);

        drop(ticket);
        assert!(!store.is_locked());
        store.swap(0, 1).unwrap();
        assert_eq!(names(store.as_slice()), vec!["b", "a"]);
    }

    proptest! {
        #[test]
        fn prop_swap_is_self_inverse(len in 1usize..12, i in 0usize..12, j in 0usize..12) {
            let i = i % len;
            let j = j % len;
            let labels: Vec<String> = (0..len).map(|n| format!("img{}", n)).collect();
            let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
            let original = handles(&refs);
            let mut store = SelectionStore::new(original.clone());

            store.swap(i, j).unwrap();
            store.swap(i, j).unwrap();

            prop_assert_eq!(store.as_slice(), original.as_slice());
        }
    }
}
