//! [`Capture`] for standard library types.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex, RwLock, TryLockError};
use std::time::Duration;

use super::model::{Complex, Number};
use super::walker::{CaptureResult, ChannelDirection, Walker};
use super::Capture;

/// Rendered for a `RefCell` that is mutably borrowed during capture.
pub const BORROWED: &str = "<borrowed>";
/// Rendered for a `Mutex`/`RwLock` held elsewhere during capture.
pub const LOCKED: &str = "<locked>";

macro_rules! capture_number {
    ($variant:ident as $wide:ty => $($t:ty),+) => {$(
        impl Capture for $t {
            fn capture(&self, w: &mut Walker) -> CaptureResult {
                w.number(Number::$variant(*self as $wide))
            }

            fn tracks_identity(&self) -> bool {
                false
            }
        }
    )+};
}

capture_number!(I64 as i64 => i8, i16, i32, i64, isize);
capture_number!(U64 as u64 => u16, u32, u64, usize);
capture_number!(I128 as i128 => i128);
capture_number!(U128 as u128 => u128);

impl Capture for u8 {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.number(Number::U64(u64::from(*self)))
    }

    fn tracks_identity(&self) -> bool {
        false
    }

    fn capture_elements<'a, I>(items: I, w: &mut Walker) -> CaptureResult
    where
        I: IntoIterator<Item = &'a Self>,
    {
        if w.is_surveying() {
            return w.null();
        }
        let bytes: Vec<u8> = items.into_iter().copied().collect();
        w.bytes(&bytes)
    }
}

impl Capture for f32 {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.float32(*self)
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for f64 {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.float(*self)
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for Complex<f32> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.complex(f64::from(self.re), f64::from(self.im))
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for Complex<f64> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.complex(self.re, self.im)
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for bool {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.bool(*self)
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for char {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        let mut buf = [0u8; 4];
        w.text(self.encode_utf8(&mut buf))
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for str {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.text(self)
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for String {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.text(self)
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl<B> Capture for Cow<'_, B>
where
    B: Capture + ToOwned + ?Sized,
{
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        self.as_ref().capture(w)
    }

    fn tracks_identity(&self) -> bool {
        self.as_ref().tracks_identity()
    }
}

impl Capture for Path {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.text(&self.to_string_lossy())
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for PathBuf {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        self.as_path().capture(w)
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for Duration {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        if w.is_surveying() {
            return w.null();
        }
        w.text(&format!("{:?}", self))
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for () {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.null()
    }
}

impl<T: ?Sized> Capture for PhantomData<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.null()
    }
}

impl<T: Capture> Capture for Option<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        match self {
            Some(value) => value.capture(w),
            None => w.null(),
        }
    }

    fn tracks_identity(&self) -> bool {
        self.as_ref().is_some_and(Capture::tracks_identity)
    }
}

impl<T: Capture, E: Capture> Capture for Result<T, E> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        match self {
            Ok(value) => w.record().field("Ok", value).finish(),
            Err(err) => w.record().field("Err", err).finish(),
        }
    }
}

// ----- pointers -----

// A pointer to a leaf is itself treated as a leaf.

impl<T: Capture + ?Sized> Capture for &T {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.reference(&**self)
    }

    fn tracks_identity(&self) -> bool {
        (**self).tracks_identity()
    }
}

impl<T: Capture + ?Sized> Capture for &mut T {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.reference(&**self)
    }

    fn tracks_identity(&self) -> bool {
        (**self).tracks_identity()
    }
}

impl<T: Capture + ?Sized> Capture for Box<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.reference(&**self)
    }

    fn tracks_identity(&self) -> bool {
        (**self).tracks_identity()
    }
}

impl<T: Capture + ?Sized> Capture for Rc<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.reference(&**self)
    }

    fn tracks_identity(&self) -> bool {
        (**self).tracks_identity()
    }
}

impl<T: Capture + ?Sized> Capture for Arc<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.reference(&**self)
    }

    fn tracks_identity(&self) -> bool {
        (**self).tracks_identity()
    }
}

impl<T: Capture + ?Sized> Capture for std::rc::Weak<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        match self.upgrade() {
            Some(strong) => w.reference(&*strong),
            None => w.null(),
        }
    }
}

impl<T: Capture + ?Sized> Capture for std::sync::Weak<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        match self.upgrade() {
            Some(strong) => w.reference(&*strong),
            None => w.null(),
        }
    }
}

// ----- interior mutability -----

impl<T: Capture + Copy> Capture for Cell<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        self.get().capture(w)
    }
}

impl<T: Capture + ?Sized> Capture for RefCell<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        match self.try_borrow() {
            Ok(value) => (*value).capture(w),
            Err(_) => w.text(BORROWED),
        }
    }
}

impl<T: Capture + ?Sized> Capture for Mutex<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        match self.try_lock() {
            Ok(guard) => (*guard).capture(w),
            Err(TryLockError::Poisoned(poisoned)) => (**poisoned.get_ref()).capture(w),
            Err(TryLockError::WouldBlock) => w.text(LOCKED),
        }
    }
}

impl<T: Capture + ?Sized> Capture for RwLock<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        match self.try_read() {
            Ok(guard) => (*guard).capture(w),
            Err(TryLockError::Poisoned(poisoned)) => (**poisoned.get_ref()).capture(w),
            Err(TryLockError::WouldBlock) => w.text(LOCKED),
        }
    }
}

// ----- sequences -----

impl<T: Capture> Capture for [T] {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        T::capture_elements(self, w)
    }
}

impl<T: Capture, const N: usize> Capture for [T; N] {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        T::capture_elements(self, w)
    }
}

impl<T: Capture> Capture for Vec<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        T::capture_elements(self, w)
    }
}

impl<T: Capture> Capture for VecDeque<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        T::capture_elements(self, w)
    }
}

impl<T: Capture> Capture for BTreeSet<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.seq().elements(self).finish()
    }
}

impl<T: Capture, S> Capture for HashSet<T, S> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.seq().elements(self).finish()
    }
}

macro_rules! capture_tuple {
    ($($name:ident)+) => {
        impl<$($name: Capture),+> Capture for ($($name,)+) {
            #[allow(non_snake_case)]
            fn capture(&self, w: &mut Walker) -> CaptureResult {
                let ($($name,)+) = self;
                let mut seq = w.seq();
                $(seq.element($name);)+
                seq.finish()
            }
        }
    };
}

capture_tuple!(A);
capture_tuple!(A B);
capture_tuple!(A B C);
capture_tuple!(A B C D);
capture_tuple!(A B C D E);
capture_tuple!(A B C D E F);

// ----- maps -----

impl<K: Capture, V: Capture> Capture for BTreeMap<K, V> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.map().entries(self).finish()
    }
}

impl<K: Capture, V: Capture, S> Capture for HashMap<K, V, S> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.map().entries(self).finish()
    }
}

// ----- channels -----

impl<T> Capture for Sender<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.channel::<T>(ChannelDirection::Send)
    }
}

impl<T> Capture for SyncSender<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.channel::<T>(ChannelDirection::Send)
    }
}

impl<T> Capture for Receiver<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.channel::<T>(ChannelDirection::Receive)
    }
}

// ----- functions -----

macro_rules! capture_fn_pointer {
    ($($arg:ident)*) => {
        impl<R, $($arg),*> Capture for fn($($arg),*) -> R {
            fn capture(&self, w: &mut Walker) -> CaptureResult {
                w.function::<Self>()
            }
        }
    };
}

capture_fn_pointer!();
capture_fn_pointer!(A);
capture_fn_pointer!(A B);
capture_fn_pointer!(A B C);
capture_fn_pointer!(A B C D);

/// Captures a function item or closure by the name of its type, e.g.
/// `FnName(my_app::on_event)` renders as `"my_app::on_event"`.
#[derive(Debug, Clone, Copy)]
pub struct FnName<F>(pub F);

impl<F> Capture for FnName<F> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.function::<F>()
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}
