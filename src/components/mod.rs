//! Reference component adapters.
//!
//! These cover the generic containers plus a few leaves; applications register their own types
//! with a [`Registry`](crate::Registry) next to these.

mod button;
pub(crate) mod decorator;
mod scroll;
mod sequence;
mod text;

pub use button::Button;
pub use decorator::{Align, Margin};
pub use scroll::Scroll;
pub use sequence::{Sequence, Stack};
pub use text::Text;
