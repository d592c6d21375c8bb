use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::watch;

use super::Element;

struct RegionInner {
    element: Mutex<Element>,
    revision: watch::Sender<u64>,
}

/// A shared container whose children are rebuilt wholesale
#[derive(Clone)]
pub struct Region {
    inner: Arc<RegionInner>,
}

impl Region {
    pub fn new(element: Element) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(RegionInner {
                element: Mutex::new(element),
                revision,
            }),
        }
    }

    /// Clear every child, append `children`, and bump the revision
    pub fn replace_children(&self, children: Vec<Element>) {
        let mut element = self.inner.element.lock();
        self.rebuild(&mut element, children);
    }

    /// Rebuild only while `live` is set.
    ///
    /// The flag is read under the region lock, so a writer that clears it
    /// and then calls [`Region::clear`] sees no rebuild after `clear` returns.
    pub fn replace_children_if(&self, live: &AtomicBool, children: Vec<Element>) -> bool {
        let mut element = self.inner.element.lock();
        if !live.load(Ordering::Acquire) {
            return false;
        }
        self.rebuild(&mut element, children);
        true
    }

    /// Drop every child. An already empty region keeps its revision.
    pub fn clear(&self) {
        let mut element = self.inner.element.lock();
        if !element.children.is_empty() {
            self.rebuild(&mut element, Vec::new());
        }
    }

    // Revision moves while the lock is held
    fn rebuild(&self, element: &mut Element, children: Vec<Element>) {
        element.clear_children();
        for child in children {
            element.append(child);
        }
        self.inner.revision.send_modify(|rev| *rev += 1);
    }

    pub fn snapshot(&self) -> Element {
        self.inner.element.lock().clone()
    }

    pub fn children(&self) -> Vec<Element> {
        self.inner.element.lock().children.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.element.lock().children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    /// Receiver notified after every rebuild
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }
}
