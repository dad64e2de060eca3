//! Shared ownership for the single-threaded pipeline.
//!
//! Adapter objects that several highlight strategies write into (the
//! off-screen target list, the link edge board) are `Rc<RefCell<T>>`.

use std::cell::RefCell;
use std::rc::Rc;

pub type Shared<T> = Rc<RefCell<T>>;

#[inline]
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}
