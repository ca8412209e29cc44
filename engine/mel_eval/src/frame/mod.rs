//! The evaluator's frame stack.
//!
//! Every function call, loop body, iterator block and scoped block
//! pushes a frame. Frames carry role flags, a lazily allocated local
//! map and, for iterator blocks, the list of collected yields. The
//! label is carried into error traces.

use mel_ir::Name;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::value::Value;


bitflags::bitflags! {
    /// Roles a frame plays beyond holding locals.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FrameFlags: u8 {
        /// Variable lookup stops after this frame; function bodies and
        /// the engine root are boundaries.
        const SCOPE_BOUNDARY = 1 << 0;
        /// `yield` targets the nearest frame with this flag.
        const COLLECTOR = 1 << 1;
    }
}

/// One entry of the frame stack.
#[derive(Debug)]
pub struct Frame {
    pub label: &'static str,
    pub flags: FrameFlags,
    /// Allocated on first definition; most frames never bind anything.
    locals: Option<FxHashMap<Name, Value>>,
    /// Yields collected so far, present only on collector frames.
    collected: Option<Vec<Value>>,
}

impl Frame {
    fn new(label: &'static str, flags: FrameFlags) -> Self {
        Frame {
            label,
            flags,
            locals: None,
            collected: if flags.contains(FrameFlags::COLLECTOR) {
                Some(Vec::new())
            } else {
                None
            },
        }
    }

    fn get(&self, name: Name) -> Option<&Value> {
        self.locals.as_ref()?.get(&name)
    }

    fn get_mut(&mut self, name: Name) -> Option<&mut Value> {
        self.locals.as_mut()?.get_mut(&name)
    }

    fn define(&mut self, name: Name, value: Value) {
        self.locals
            .get_or_insert_with(FxHashMap::default)
            .insert(name, value);
    }

    fn is_boundary(&self) -> bool {
        self.flags.contains(FrameFlags::SCOPE_BOUNDARY)
    }
}

/// The stack of active frames. Always holds at least the engine root
/// frame, which is a scope boundary.
#[derive(Debug)]
pub struct FrameStack {
    /// Inline storage covers typical nesting without heap traffic.
    frames: SmallVec<[Frame; 8]>,
}

impl FrameStack {
    pub fn new() -> Self {
        let mut frames = SmallVec::new();
        frames.push(Frame::new("<root>", FrameFlags::SCOPE_BOUNDARY));
        FrameStack { frames }
    }

    pub fn push(&mut self, label: &'static str, flags: FrameFlags) {
        self.frames.push(Frame::new(label, flags));
    }

    /// Pop the top frame; the root frame is never popped.
    pub fn pop(&mut self) -> Option<Frame> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Read a variable, walking outward and stopping after the first
    /// scope-boundary frame. A function body sees its own locals and
    /// parameters but nothing of its caller.
    pub fn lookup(&self, name: Name) -> Option<&Value> {
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.get(name) {
                return Some(value);
            }
            if frame.is_boundary() {
                break;
            }
        }
        None
    }

    /// Define in the current frame (`var` declarations and parameter
    /// binding).
    pub fn define(&mut self, name: Name, value: Value) {
        // The stack is never empty.
        if let Some(frame) = self.frames.last_mut() {
            frame.define(name, value);
        }
    }

    /// Plain assignment. Updates the nearest visible binding; an
    /// undeclared name is created one frame up from the current one,
    /// but never across a scope boundary.
    pub fn assign(&mut self, name: Name, value: Value) {
        let mut boundary = self.frames.len();
        for (i, frame) in self.frames.iter_mut().enumerate().rev() {
            if let Some(slot) = frame.get_mut(name) {
                *slot = value;
                return;
            }
            if frame.is_boundary() {
                boundary = i;
                break;
            }
        }
        // Auto-vivify one frame up within the visible region.
        let top = self.frames.len() - 1;
        let target = if top > boundary { top - 1 } else { top };
        // target < frames.len() by construction.
        if let Some(frame) = self.frames.get_mut(target) {
            frame.define(name, value);
        }
    }

    /// Append a yielded value to the nearest collector frame, crossing
    /// scope boundaries. `false` when no collector is active.
    pub fn yield_value(&mut self, value: Value) -> bool {
        for frame in self.frames.iter_mut().rev() {
            if let Some(collected) = frame.collected.as_mut() {
                collected.push(value);
                return true;
            }
        }
        false
    }

    /// Pop a collector frame and take its collected values.
    pub fn pop_collected(&mut self) -> Vec<Value> {
        self.pop()
            .and_then(|frame| frame.collected)
            .unwrap_or_default()
    }
}

impl Default for FrameStack {
    fn default() -> Self {
        FrameStack::new()
    }
}
