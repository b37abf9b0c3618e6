//! Write-stream reassembly.
//!
//! A provisioning client may split one JSON document across any number of
//! characteristic writes, at arbitrary byte boundaries (including inside
//! a multi-byte UTF-8 sequence). Fragments are appended verbatim; after
//! each append the buffer is checked for an apparent end of document.
//!
//! Two gates decide that a document is complete:
//!
//! 1. the whitespace-trimmed text ends with `}`;
//! 2. a string-aware scan of the text finds the top-level object closed,
//!    with no string literal left open.
//!
//! The second gate keeps a `}` inside a string value (`"adv_hex":"}"`)
//! from triggering a parse of a half-received document.

extern crate alloc;
use alloc::vec::Vec;

/// Upper bound on buffered bytes for one document.
pub const MAX_DOCUMENT_LEN: usize = 2048;

/// Result of checking the buffer for an end of document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// More bytes are needed.
    Incomplete,
    /// The buffer holds what looks like one whole document.
    Complete,
}

/// Returned by [`ReassemblyBuffer::append`] when the bound is exceeded.
/// The pending bytes have already been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    /// Pending plus incoming bytes that were thrown away.
    pub discarded: usize,
}

/// Accumulates write fragments for the current session.
#[derive(Debug, Default)]
pub struct ReassemblyBuffer {
    pending: Vec<u8>,
}

impl ReassemblyBuffer {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Append a fragment verbatim.
    ///
    /// If the result would exceed [`MAX_DOCUMENT_LEN`], everything pending
    /// is discarded together with `fragment` and the client has to start
    /// over.
    pub fn append(&mut self, fragment: &[u8]) -> Result<(), Overflow> {
        let total = self.pending.len() + fragment.len();
        if total > MAX_DOCUMENT_LEN {
            self.pending.clear();
            return Err(Overflow { discarded: total });
        }
        self.pending.extend_from_slice(fragment);
        Ok(())
    }

    /// The pending bytes as text, or `None` while they are not valid
    /// UTF-8 (e.g. a fragment boundary split a character).
    pub fn text(&self) -> Option<&str> {
        core::str::from_utf8(&self.pending).ok()
    }

    /// Check for an apparent end of document.
    pub fn framing(&self) -> Framing {
        match self.text() {
            Some(text) => scan_framing(text),
            None => Framing::Incomplete,
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Decide whether `text` holds a closed top-level JSON object.
///
/// Brackets inside string literals are ignored, and `\"` does not end a
/// string. Text that closes more than it opens can never become a
/// document, so it is reported complete and left for the parser to
/// reject.
pub fn scan_framing(text: &str) -> Framing {
    let trimmed = text.trim();
    if !trimmed.ends_with('}') {
        return Framing::Incomplete;
    }

    let mut depth: i32 = 0;
    let mut opened = false;
    let mut in_string = false;
    let mut escaped = false;

    for b in trimmed.bytes() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                opened = true;
            }
            b'}' | b']' => {
                depth -= 1;
                if depth < 0 {
                    return Framing::Complete;
                }
            }
            _ => {}
        }
    }

    if opened && depth == 0 && !in_string {
        Framing::Complete
    } else {
        Framing::Incomplete
    }
}
