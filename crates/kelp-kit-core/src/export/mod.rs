//! Pick list rendering.

mod pick_list;

pub use pick_list::*;
