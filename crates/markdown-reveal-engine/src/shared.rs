//! Reference-counted, lazily constructed shared resources.
//!
//! The first [`SharedResource::acquire`] builds the value, later holders
//! share it, and dropping the last [`SharedHandle`] disposes of it. A later
//! acquire builds a fresh value.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

type Factory<T> = dyn Fn() -> Rc<T>;

struct Slot<T: ?Sized> {
    factory: Box<Factory<T>>,
    value: RefCell<Option<Rc<T>>>,
    holders: Cell<usize>,
}

impl<T: ?Sized> Slot<T> {
    fn release(&self) {
        let remaining = self.holders.get().saturating_sub(1);
        self.holders.set(remaining);
        if remaining == 0 && self.value.borrow_mut().take().is_some() {
            log::debug!("shared resource disposed");
        }
    }
}

/// Owner of a lazily built value shared by all current holders.
pub struct SharedResource<T: ?Sized> {
    slot: Rc<Slot<T>>,
}

impl<T: ?Sized + 'static> SharedResource<T> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Rc<T> + 'static,
    {
        Self {
            slot: Rc::new(Slot {
                factory: Box::new(factory),
                value: RefCell::new(None),
                holders: Cell::new(0),
            }),
        }
    }

    /// Get a handle, building the value if nobody holds it.
    pub fn acquire(&self) -> SharedHandle<T> {
        let value = {
            let mut value = self.slot.value.borrow_mut();
            match value.as_ref() {
                Some(existing) => Rc::clone(existing),
                None => {
                    log::debug!("shared resource initialised");
                    let created = (self.slot.factory)();
                    *value = Some(Rc::clone(&created));
                    created
                }
            }
        };
        self.slot.holders.set(self.slot.holders.get() + 1);
        SharedHandle {
            value,
            slot: Rc::clone(&self.slot),
        }
    }

    pub fn holders(&self) -> usize {
        self.slot.holders.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.value.borrow().is_some()
    }
}

impl<T: ?Sized> Clone for SharedResource<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: ?Sized> fmt::Debug for SharedResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedResource")
            .field("holders", &self.slot.holders.get())
            .field("initialized", &self.slot.value.borrow().is_some())
            .finish()
    }
}

/// A counted hold on a shared value. Dropping the last one disposes it.
pub struct SharedHandle<T: ?Sized> {
    value: Rc<T>,
    slot: Rc<Slot<T>>,
}

impl<T: ?Sized> Deref for SharedHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: ?Sized> Clone for SharedHandle<T> {
    fn clone(&self) -> Self {
        self.slot.holders.set(self.slot.holders.get() + 1);
        Self {
            value: Rc::clone(&self.value),
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T: ?Sized> Drop for SharedHandle<T> {
    fn drop(&mut self) {
        self.slot.release();
    }
}

impl<T: ?Sized> fmt::Debug for SharedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHandle")
            .field("holders", &self.slot.holders.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting() -> (SharedResource<String>, Rc<Cell<usize>>) {
        let built = Rc::new(Cell::new(0));
        let counter = built.clone();
        let resource = SharedResource::new(move || {
            counter.set(counter.get() + 1);
            Rc::new(format!("instance-{}", counter.get()))
        });
        (resource, built)
    }

    #[test]
    fn first_acquire_builds_and_later_holders_share() {
        let (resource, built) = counting();
        assert!(!resource.is_initialized());

        let a = resource.acquire();
        let b = resource.acquire();

        assert_eq!(built.get(), 1);
        assert_eq!(resource.holders(), 2);
        assert_eq!(*a, *b);
    }

    #[test]
    fn last_release_disposes() {
        let (resource, built) = counting();
        let a = resource.acquire();
        let b = a.clone();

        drop(a);
        assert!(resource.is_initialized());
        drop(b);
        assert!(!resource.is_initialized());
        assert_eq!(resource.holders(), 0);

        let c = resource.acquire();
        assert_eq!(built.get(), 2);
        assert_eq!(*c, "instance-2");
    }
}
