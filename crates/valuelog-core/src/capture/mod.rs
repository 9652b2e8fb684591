//! Capture engine.
//!
//! Turns any value implementing [`Capture`] into a [`CapturedValue`] tree of
//! JSON-compatible primitives, terminating on cyclic graphs and rendering
//! each aliased node in full exactly once.
//!
//! ## Two passes
//!
//! Whether a pointee will be reached again cannot be known on the first
//! visit, so every call walks the value twice:
//!
//! 1. **survey**: records every pointee address (`unseen -> possible ->
//!    confirmed`) and stops descending at the second visit;
//! 2. **render**: builds the tree; the first visit of a confirmed address
//!    renders in full with an `"": "Address: 0x..."` note, later visits
//!    become `"(pointer: 0x...)"`.
//!
//! If the survey finds no aliasing the registry is dropped and the render
//! pass runs without bookkeeping.
//!
//! ## Opting in
//!
//! Types opt in by implementing [`Capture`], usually through
//! `#[derive(Capture)]`. Because the impl lives next to the type, private
//! fields are captured too.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use valuelog_core::{capture, Capture};
//!
//! #[derive(Capture)]
//! struct Node {
//!     value: u32,
//!     next: Option<Rc<RefCell<Node>>>,
//! }
//!
//! let node = Rc::new(RefCell::new(Node { value: 1, next: None }));
//! node.borrow_mut().next = Some(node.clone());
//!
//! let tree = capture(&node).unwrap();
//! assert!(tree.get("").is_some()); // address note on the single full rendering
//! ```

pub mod ext;
pub mod impls;
pub mod model;
pub mod registry;
pub mod walker;

pub use impls::{FnName, BORROWED, LOCKED};
pub use model::{
    ByteEncoding, ByteRun, CapturedValue, Complex, Complex32, Complex64, Number, BASE64_THRESHOLD,
};
pub use registry::{Address, ADDRESS_NOTE_KEY};
pub use walker::{
    CaptureResult, ChannelDirection, MapBuilder, RecordBuilder, SeqBuilder, Walker,
};

use crate::errors::Result;
use valuelog_core_types::schema::{EVENT_END, EVENT_END_ERROR, OP_CAPTURE};

/// A value that can describe itself to the capture engine.
///
/// Implementations call back into the [`Walker`]: leaves through its leaf
/// methods, composites through [`Walker::record`], [`Walker::seq`] and
/// [`Walker::map`], and pointer-like wrappers through [`Walker::reference`].
/// The same impl serves both passes.
pub trait Capture {
    fn capture(&self, w: &mut Walker) -> CaptureResult;

    /// Whether a reference to this value takes part in aliasing detection.
    ///
    /// Leaves (numbers, strings, ...) return `false`: they cannot close a
    /// cycle, and identical literals share storage without being aliases.
    fn tracks_identity(&self) -> bool {
        true
    }

    /// Capture a sequence of `Self`. The default renders an array; `u8`
    /// overrides it so that byte sequences become a [`ByteRun`].
    fn capture_elements<'a, I>(items: I, w: &mut Walker) -> CaptureResult
    where
        I: IntoIterator<Item = &'a Self>,
        Self: Sized + 'a,
    {
        w.seq().elements(items).finish()
    }
}

/// Capture `value` into a fresh tree.
///
/// # Errors
///
/// `UnsupportedKind` when a dynamically typed node (`dyn Any`) holds a type
/// with no rendering.
pub fn capture<T: Capture + ?Sized>(value: &T) -> Result<CapturedValue> {
    let start = std::time::Instant::now();
    match run(value) {
        Ok((tree, aliased, addr_count)) => {
            tracing::debug!(
                component = module_path!(),
                op = OP_CAPTURE,
                event = EVENT_END,
                duration_ms = start.elapsed().as_millis() as u64,
                aliased,
                addr_count,
            );
            Ok(tree)
        }
        Err(err) => {
            tracing::debug!(
                component = module_path!(),
                op = OP_CAPTURE,
                event = EVENT_END_ERROR,
                duration_ms = start.elapsed().as_millis() as u64,
                error = %err,
            );
            Err(err)
        }
    }
}

/// Capture `value` and encode the tree as compact JSON.
///
/// # Errors
///
/// `UnsupportedKind` from capture, `Serialization` from encoding.
pub fn capture_json<T: Capture + ?Sized>(value: &T) -> Result<String> {
    capture(value)?.to_json()
}

/// Capture without logging; used for map keys, which get their own registry.
pub(crate) fn capture_detached<T: Capture + ?Sized>(value: &T) -> Result<CapturedValue> {
    run(value).map(|(tree, _, _)| tree)
}

fn run<T: Capture + ?Sized>(value: &T) -> Result<(CapturedValue, bool, usize)> {
    // the root is a pointee too, so a cycle back to it closes on the root
    let mut walker = Walker::survey();
    walker.reference(value)?;
    let addr_count = walker.addr_count();
    let mut walker = walker.into_render();
    let tree = walker.reference(value)?;
    Ok((tree, walker.aliased(), addr_count))
}
