pub mod hover_reveal;
pub mod reveal;
pub mod typing;

pub use hover_reveal::{HoverReveal, RevealState};
pub use reveal::{SectionReveal, Slide};
pub use typing::TypingText;
