use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Pointer,
    Keyboard,
}

type Registrations = RefCell<HashMap<ListenerKind, usize>>;

/// Input listener registrations of one scene.
///
/// Input of a kind is only routed while at least one [`ListenerGuard`] for
/// that kind is alive.
#[derive(Debug, Default)]
pub struct ListenerSet {
    registrations: Rc<Registrations>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, kind: ListenerKind) -> ListenerGuard {
        *self.registrations.borrow_mut().entry(kind).or_insert(0) += 1;
        log::debug!("registered {kind:?} listener");
        ListenerGuard {
            registrations: Rc::downgrade(&self.registrations),
            kind,
        }
    }

    pub fn is_registered(&self, kind: ListenerKind) -> bool {
        self.registrations
            .borrow()
            .get(&kind)
            .is_some_and(|count| *count > 0)
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.registrations.borrow().values().sum()
    }
}

/// Keeps one listener registered until dropped.
#[derive(Debug)]
#[must_use = "dropping the guard deregisters the listener"]
pub struct ListenerGuard {
    registrations: Weak<Registrations>,
    kind: ListenerKind,
}

impl ListenerGuard {
    #[cfg(test)]
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        // The scene may already be gone during teardown.
        let Some(registrations) = self.registrations.upgrade() else {
            return;
        };
        let Ok(mut registrations) = registrations.try_borrow_mut() else {
            return;
        };

        if let Some(count) = registrations.get_mut(&self.kind) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                registrations.remove(&self.kind);
            }
        }
        log::debug!("released {:?} listener", self.kind);
    }
}
