//! Scrawl Core Library
//!
//! Platform-agnostic data structures and logic for the Scrawl collaborative
//! whiteboard: the shape model, the drawing-session state machine, and the
//! wire-protocol message types shared with the relay server.

pub mod input;
pub mod protocol;
pub mod session;
pub mod shapes;

pub use input::{Key, KeyEvent, Modifiers, PointerEvent};
pub use protocol::{ClientEvent, Participant, ServerEvent};
pub use session::{DrawingSession, Tool};
pub use shapes::{Color, Freehand, Line, Rectangle, Shape, TextBlock};
