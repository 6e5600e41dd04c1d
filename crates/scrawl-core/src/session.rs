//! Drawing-session state machine.
//!
//! Owns the committed shape list, the in-progress shape, the undo/redo
//! stacks, and the text-entry typing state. Pointer and keyboard events
//! drive all transitions; out-of-order events (a move with no prior down,
//! a key with no open text entry) are no-ops rather than errors.

use crate::input::{Key, KeyEvent, Modifiers, PointerEvent};
use crate::shapes::{Color, Freehand, Line, Rectangle, Shape, TextBlock};
use kurbo::Point;

/// Available drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Freehand,
    Erase,
    Line,
    Rectangle,
    Text,
}

/// Live typing state for the text tool. Text has no pointer-drag phase, so
/// it is kept apart from the in-progress drag shape.
#[derive(Debug, Clone)]
struct PendingText {
    origin: Point,
    buffer: String,
}

/// A drawing session: one user's view of the canvas model.
///
/// The committed list is mutated only by commit, undo, redo and clear;
/// committed shapes are never edited in place.
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    /// Committed shapes; index order is commit order and z-order.
    committed: Vec<Shape>,
    /// Undone shapes, most recently undone last.
    redo_stack: Vec<Shape>,
    /// Shape currently under construction by a pointer drag.
    in_progress: Option<Shape>,
    /// Open text entry, if the text tool has an anchor placed.
    pending_text: Option<PendingText>,
    /// Active tool.
    tool: Tool,
    /// Active stroke color.
    color: Color,
    /// Held modifier keys, tracked across events.
    modifiers: Modifiers,
}

impl DrawingSession {
    /// Create an empty session (at room-join time).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn committed(&self) -> &[Shape] {
        &self.committed
    }

    pub fn can_undo(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Switch tool. An open text entry with a non-empty buffer is committed
    /// first; in-flight text is always finalized before being abandoned.
    pub fn set_tool(&mut self, tool: Tool) {
        self.flush_pending_text();
        log::debug!("tool switched to {tool:?}");
        self.tool = tool;
    }

    /// Set the active stroke color for subsequently created shapes.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Feed a pointer event through the state machine.
    pub fn pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position } => self.pointer_up(position),
        }
    }

    fn pointer_down(&mut self, point: Point) {
        match self.tool {
            Tool::Freehand => {
                self.in_progress = Some(Shape::Freehand(Freehand::new(point, self.color)));
            }
            Tool::Erase => {
                // Erase strokes paint in the background color.
                self.in_progress = Some(Shape::Erase(Freehand::new(point, Color::white())));
            }
            Tool::Line => {
                self.in_progress = Some(Shape::Line(Line::new(point, self.color)));
            }
            Tool::Rectangle => {
                self.in_progress = Some(Shape::Rectangle(Rectangle::new(point, self.color)));
            }
            Tool::Text => {
                // Starting a new entry finalizes the previous one.
                self.flush_pending_text();
                self.pending_text = Some(PendingText {
                    origin: point,
                    buffer: String::new(),
                });
            }
        }
    }

    fn pointer_move(&mut self, point: Point) {
        match &mut self.in_progress {
            Some(Shape::Freehand(stroke)) | Some(Shape::Erase(stroke)) => {
                stroke.add_point(point);
            }
            Some(Shape::Line(line)) => line.drag_to(point),
            Some(Shape::Rectangle(rect)) => rect.drag_to(point),
            // No active construction, or text (which has no drag geometry).
            Some(Shape::Text(_)) | None => {}
        }
    }

    fn pointer_up(&mut self, point: Point) {
        let Some(mut shape) = self.in_progress.take() else {
            // Text commits via the keyboard flow, not pointer-up.
            return;
        };
        match &mut shape {
            Shape::Line(line) => line.drag_to(point),
            Shape::Rectangle(rect) => rect.drag_to(point),
            _ => {}
        }
        self.commit(shape);
    }

    /// Feed a keyboard event. Modifier state is updated on every event;
    /// text editing applies only while an entry is open.
    pub fn key_event(&mut self, event: KeyEvent) {
        self.modifiers.apply(&event);

        let KeyEvent::Pressed(key) = event else {
            return;
        };
        let Some(entry) = &mut self.pending_text else {
            return;
        };
        match key {
            Key::Enter => entry.buffer.push('\n'),
            Key::Backspace => {
                entry.buffer.pop();
            }
            Key::Tab => entry.buffer.push_str("  "),
            Key::Char(c) => {
                if self.modifiers.uppercase() {
                    entry.buffer.extend(c.to_uppercase());
                } else {
                    entry.buffer.push(c);
                }
            }
            Key::Shift | Key::CapsLock | Key::Other => {}
        }
    }

    /// Commit an open text entry: a non-empty buffer becomes a committed
    /// text shape, an empty one is discarded without materializing.
    pub fn flush_pending_text(&mut self) {
        let Some(entry) = self.pending_text.take() else {
            return;
        };
        if entry.buffer.is_empty() {
            return;
        }
        let shape = Shape::Text(TextBlock::new(entry.origin, entry.buffer, self.color));
        self.commit(shape);
    }

    /// Undo the most recent commit. No-op with nothing committed.
    pub fn undo(&mut self) {
        if let Some(shape) = self.committed.pop() {
            self.redo_stack.push(shape);
        }
    }

    /// Redo the most recently undone commit. No-op with nothing undone.
    pub fn redo(&mut self) {
        if let Some(shape) = self.redo_stack.pop() {
            self.committed.push(shape);
        }
    }

    /// Clear the canvas: committed shapes, redo history, and any in-flight
    /// construction or text entry.
    pub fn clear(&mut self) {
        log::debug!("canvas cleared ({} shapes dropped)", self.committed.len());
        self.committed.clear();
        self.redo_stack.clear();
        self.in_progress = None;
        self.pending_text = None;
    }

    /// Derive the full render sequence: committed shapes in commit order,
    /// then the in-progress shape, then an ephemeral text shape for a
    /// non-empty open entry. Pure with respect to the session.
    pub fn display_list(&self) -> Vec<Shape> {
        let mut shapes = self.committed.clone();
        if let Some(shape) = &self.in_progress {
            shapes.push(shape.clone());
        }
        if let Some(entry) = &self.pending_text {
            if !entry.buffer.is_empty() {
                shapes.push(Shape::Text(TextBlock::new(
                    entry.origin,
                    entry.buffer.clone(),
                    self.color,
                )));
            }
        }
        shapes
    }

    fn commit(&mut self, shape: Shape) {
        self.committed.push(shape);
        // A fresh commit discards the undone branch.
        self.redo_stack.clear();
    }
}
