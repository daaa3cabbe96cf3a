//! Type system utilities and aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: `Rc<RefCell<T>>` sharing, state maps, and bus adjacency sets.

pub mod aliases;

pub use aliases::*;
