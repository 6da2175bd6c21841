//! Dotted step labels for dynamic views.
//!
//! Numbering is an explicit stack of frames. The root frame counts `1`, `2`,
//! `3`. A child frame prefixes its own counter with the label of the frame
//! below it (`2.1`, `2.2`). A parallel frame holds no counter of its own: every
//! step inside it takes the label the frame below it would give its next step,
//! without advancing that frame. After step `1`, every step of every parallel
//! block is `2`.
//!
//! # Example
//!
//! ```
//! use archgraph::view::SequenceNumber;
//!
//! let mut sequence = SequenceNumber::new();
//! assert_eq!(sequence.increment(), "1");
//!
//! sequence.start_parallel_sequence();
//! assert_eq!(sequence.increment(), "2");
//! assert_eq!(sequence.increment(), "2");
//! sequence.end_parallel_sequence(false).unwrap();
//!
//! sequence.start_parallel_sequence();
//! assert_eq!(sequence.increment(), "2");
//! sequence.end_parallel_sequence(false).unwrap();
//!
//! assert_eq!(sequence.increment(), "2");
//! ```

use crate::error::ViewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Child,
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    kind: FrameKind,
    /// Always zero for parallel frames.
    value: u32,
}

/// Generator of step labels such as `1`, `2.1` and `2.2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceNumber {
    /// Never empty; the first frame is the root.
    frames: Vec<Frame>,
}

impl SequenceNumber {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame {
                kind: FrameKind::Root,
                value: 0,
            }],
        }
    }

    /// Advances the innermost counting frame and returns its label.
    ///
    /// Inside a parallel block nothing advances; the label is the one the
    /// enclosing sequence would give its next step.
    pub fn increment(&mut self) -> String {
        let top = self.frames.len() - 1;
        if self.frames[top].kind == FrameKind::Parallel {
            return self.label_at(top, 0);
        }
        self.frames[top].value += 1;
        self.label_at(top, self.frames[top].value)
    }

    /// Returns the label of the most recent step, `"0"` before the first one.
    ///
    /// Inside a parallel block this is the label shared by the block's steps.
    pub fn current(&self) -> String {
        let top = self.frames.len() - 1;
        self.label_at(top, self.frames[top].value)
    }

    /// Starts numbering sub-steps of the current step.
    pub fn start_child_sequence(&mut self) {
        self.frames.push(Frame {
            kind: FrameKind::Child,
            value: 0,
        });
    }

    /// Ends the innermost child sequence and resumes the enclosing one.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::UnbalancedSequence`] if the innermost frame is
    /// not a child sequence.
    pub fn end_child_sequence(&mut self) -> Result<(), ViewError> {
        self.pop(FrameKind::Child)?;
        Ok(())
    }

    /// Starts a block of steps that run in parallel with the next step of the
    /// enclosing sequence.
    pub fn start_parallel_sequence(&mut self) {
        self.frames.push(Frame {
            kind: FrameKind::Parallel,
            value: 0,
        });
    }

    /// Ends the innermost parallel block.
    ///
    /// With `continue_numbering` unset the enclosing sequence is left exactly
    /// as it was, so the next parallel block starts at the same label. With it
    /// set the enclosing sequence advances once, consuming the label the block
    /// shared, so the next step follows the block.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::UnbalancedSequence`] if the innermost frame is
    /// not a parallel block.
    pub fn end_parallel_sequence(&mut self, continue_numbering: bool) -> Result<(), ViewError> {
        self.pop(FrameKind::Parallel)?;
        if continue_numbering {
            let counting = self.counting_frame();
            self.frames[counting].value += 1;
        }
        Ok(())
    }

    /// Index of the innermost frame that keeps a counter.
    fn counting_frame(&self) -> usize {
        self.frames
            .iter()
            .rposition(|frame| frame.kind != FrameKind::Parallel)
            .unwrap_or(0)
    }

    fn pop(&mut self, expected: FrameKind) -> Result<(), ViewError> {
        match self.frames.last() {
            Some(frame) if frame.kind == expected && self.frames.len() > 1 => {
                self.frames.pop();
                Ok(())
            }
            _ => Err(ViewError::UnbalancedSequence(match expected {
                FrameKind::Child => "no child sequence to end".to_string(),
                FrameKind::Parallel => "no parallel sequence to end".to_string(),
                FrameKind::Root => "the root sequence cannot be ended".to_string(),
            })),
        }
    }

    /// Label of the frame at `index` if its counter were `value`.
    ///
    /// A parallel frame ignores `value` and reads the next label of the frame
    /// below it.
    fn label_at(&self, index: usize, value: u32) -> String {
        match self.frames[index].kind {
            FrameKind::Root => value.to_string(),
            FrameKind::Child => {
                let parent = self.label_at(index - 1, self.frames[index - 1].value);
                format!("{parent}.{value}")
            }
            FrameKind::Parallel => {
                let counting = index - 1;
                self.label_at(counting, self.frames[counting].value + 1)
            }
        }
    }
}

impl Default for SequenceNumber {
    fn default() -> Self {
        Self::new()
    }
}
