//! The walker handed to [`Capture`] implementations.
//!
//! Every capture call walks the value twice with the same code: once in the
//! survey pass, where leaves are not materialised and only addresses are
//! recorded, and once in the render pass, which builds the tree. Impls do not
//! need to know which pass is running; the builders and leaf methods take care
//! of it.

use std::any::type_name;
use std::collections::BTreeMap;

use super::model::{ByteRun, CapturedValue, Number};
use super::registry::{Address, AddressRegistry, Render, Survey, ADDRESS_NOTE_KEY};
use super::{capture_detached, Capture};
use crate::errors::Result;

/// Result of capturing one node.
pub type CaptureResult = Result<CapturedValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Survey,
    Render,
}

/// Direction of a channel endpoint, rendered like a channel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelDirection {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Receive,
}

pub struct Walker {
    pass: Pass,
    registry: Option<AddressRegistry>,
    aliased: bool,
}

impl Walker {
    pub(crate) fn survey() -> Self {
        Self {
            pass: Pass::Survey,
            registry: Some(AddressRegistry::new()),
            aliased: false,
        }
    }

    /// Switch to the render pass. The registry is kept only if the survey
    /// found aliasing; otherwise rendering runs without any bookkeeping.
    pub(crate) fn into_render(self) -> Self {
        let registry = if self.aliased { self.registry } else { None };
        Self {
            pass: Pass::Render,
            registry,
            aliased: self.aliased,
        }
    }

    pub(crate) fn aliased(&self) -> bool {
        self.aliased
    }

    pub(crate) fn addr_count(&self) -> usize {
        self.registry.as_ref().map_or(0, AddressRegistry::len)
    }

    /// True while the survey pass runs. Leaves built during the survey are
    /// discarded, so impls may use this to skip expensive formatting.
    pub fn is_surveying(&self) -> bool {
        self.pass == Pass::Survey
    }

    pub fn null(&mut self) -> CaptureResult {
        Ok(CapturedValue::Null)
    }

    pub fn bool(&mut self, value: bool) -> CaptureResult {
        Ok(CapturedValue::Bool(value))
    }

    pub fn number(&mut self, value: Number) -> CaptureResult {
        Ok(CapturedValue::Number(value))
    }

    /// A float; infinities and NaN become `"+Inf"`, `"-Inf"` and `"NaN"`.
    pub fn float(&mut self, value: f64) -> CaptureResult {
        if value.is_finite() {
            self.number(Number::F64(value))
        } else {
            self.text(non_finite_text(value))
        }
    }

    pub fn float32(&mut self, value: f32) -> CaptureResult {
        if value.is_finite() {
            self.number(Number::F32(value))
        } else {
            self.text(non_finite_text(f64::from(value)))
        }
    }

    pub fn text(&mut self, value: &str) -> CaptureResult {
        if self.is_surveying() {
            return self.null();
        }
        Ok(CapturedValue::Text(value.to_owned()))
    }

    /// A byte sequence, classified once for its rendering.
    pub fn bytes(&mut self, value: &[u8]) -> CaptureResult {
        if self.is_surveying() {
            return self.null();
        }
        Ok(CapturedValue::Bytes(ByteRun::new(value.to_vec())))
    }

    /// A complex number as `"(re+imi)"`.
    pub fn complex(&mut self, re: f64, im: f64) -> CaptureResult {
        if self.is_surveying() {
            return self.null();
        }
        let im_text = float_text(im);
        let sign = if im_text.starts_with(['+', '-']) { "" } else { "+" };
        Ok(CapturedValue::Text(format!(
            "({}{}{}i)",
            float_text(re),
            sign,
            im_text
        )))
    }

    /// A channel endpoint, described by its element type.
    pub fn channel<T: ?Sized>(&mut self, direction: ChannelDirection) -> CaptureResult {
        if self.is_surveying() {
            return self.null();
        }
        let element = type_name::<T>();
        Ok(CapturedValue::Text(match direction {
            ChannelDirection::Both => format!("chan {}", element),
            ChannelDirection::Send => format!("chan<- {}", element),
            ChannelDirection::Receive => format!("<-chan {}", element),
        }))
    }

    /// A function, rendered as the fully-qualified name of its type.
    ///
    /// For fn items and closures that is the path of the item, e.g.
    /// `my_app::handlers::on_event`.
    pub fn function<F: ?Sized>(&mut self) -> CaptureResult {
        self.text(type_name::<F>())
    }

    /// Same as [`Walker::function`], inferring `F` from a reference.
    pub fn function_of<F: ?Sized>(&mut self, _function: &F) -> CaptureResult {
        self.function::<F>()
    }

    /// Capture `target` as the pointee of a reference-like node, tracking its
    /// identity so that cycles terminate and aliased nodes render once.
    pub fn reference<T: Capture + ?Sized>(&mut self, target: &T) -> CaptureResult {
        let address = match Address::of(target) {
            Some(address) if target.tracks_identity() => address,
            _ => return target.capture(self),
        };
        match self.pass {
            Pass::Survey => {
                let registry = self.registry.get_or_insert_with(AddressRegistry::new);
                match registry.survey(address) {
                    Survey::Descend => target.capture(self),
                    Survey::Aliased => {
                        self.aliased = true;
                        self.null()
                    }
                }
            }
            Pass::Render => {
                let outcome = match self.registry.as_mut() {
                    Some(registry) => registry.render(address),
                    None => Render::Plain,
                };
                match outcome {
                    Render::Plain => target.capture(self),
                    Render::BackReference => Ok(CapturedValue::Text(address.back_reference())),
                    Render::First => {
                        let mut value = target.capture(self)?;
                        if let CapturedValue::Object(fields) = &mut value {
                            fields.insert(
                                ADDRESS_NOTE_KEY.to_owned(),
                                CapturedValue::Text(address.note()),
                            );
                        }
                        Ok(value)
                    }
                }
            }
        }
    }

    /// Start a struct-like object.
    pub fn record(&mut self) -> RecordBuilder<'_> {
        RecordBuilder {
            walker: self,
            fields: BTreeMap::new(),
            result: Ok(()),
        }
    }

    /// Start an array.
    pub fn seq(&mut self) -> SeqBuilder<'_> {
        SeqBuilder {
            walker: self,
            items: Vec::new(),
            result: Ok(()),
        }
    }

    /// Start a map-like object whose keys are stringified.
    pub fn map(&mut self) -> MapBuilder<'_> {
        MapBuilder {
            walker: self,
            entries: BTreeMap::new(),
            result: Ok(()),
        }
    }
}

fn non_finite_text(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value.is_sign_positive() {
        "+Inf"
    } else {
        "-Inf"
    }
}

fn float_text(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        non_finite_text(value).to_owned()
    }
}

/// Default textual rendering of a map key.
fn key_text<K: Capture + ?Sized>(key: &K) -> Result<String> {
    Ok(match capture_detached(key)? {
        CapturedValue::Text(text) => text,
        CapturedValue::Null => "<nil>".to_owned(),
        CapturedValue::Bool(b) => b.to_string(),
        CapturedValue::Number(n) => n.to_string(),
        other => other.to_json()?,
    })
}

/// Builds an [`CapturedValue::Object`] from named fields.
///
/// The first error short-circuits the remaining fields and is returned by
/// [`RecordBuilder::finish`].
pub struct RecordBuilder<'w> {
    walker: &'w mut Walker,
    fields: BTreeMap<String, CapturedValue>,
    result: Result<()>,
}

impl RecordBuilder<'_> {
    pub fn field<T: Capture + ?Sized>(&mut self, name: &str, value: &T) -> &mut Self {
        self.field_with(name, |w| value.capture(w))
    }

    /// Add a field whose value is produced by `f`, e.g. an enum payload or a
    /// function name.
    pub fn field_with<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: FnOnce(&mut Walker) -> CaptureResult,
    {
        if self.result.is_err() {
            return self;
        }
        match f(&mut *self.walker) {
            Ok(value) => {
                if !self.walker.is_surveying() {
                    self.fields.insert(name.to_owned(), value);
                }
            }
            Err(err) => self.result = Err(err),
        }
        self
    }

    pub fn finish(&mut self) -> CaptureResult {
        std::mem::replace(&mut self.result, Ok(()))?;
        Ok(CapturedValue::Object(std::mem::take(&mut self.fields)))
    }
}

/// Builds an [`CapturedValue::Array`].
pub struct SeqBuilder<'w> {
    walker: &'w mut Walker,
    items: Vec<CapturedValue>,
    result: Result<()>,
}

impl SeqBuilder<'_> {
    pub fn element<T: Capture + ?Sized>(&mut self, value: &T) -> &mut Self {
        self.element_with(|w| value.capture(w))
    }

    pub fn element_with<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Walker) -> CaptureResult,
    {
        if self.result.is_err() {
            return self;
        }
        match f(&mut *self.walker) {
            Ok(value) => {
                if !self.walker.is_surveying() {
                    self.items.push(value);
                }
            }
            Err(err) => self.result = Err(err),
        }
        self
    }

    pub fn elements<'a, T, I>(&mut self, values: I) -> &mut Self
    where
        T: Capture + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        for value in values {
            self.element(value);
        }
        self
    }

    pub fn finish(&mut self) -> CaptureResult {
        std::mem::replace(&mut self.result, Ok(()))?;
        Ok(CapturedValue::Array(std::mem::take(&mut self.items)))
    }
}

/// Builds a map-like [`CapturedValue::Object`].
///
/// Keys are captured on their own (with a fresh registry) and stringified;
/// when two keys stringify alike the later entry wins.
pub struct MapBuilder<'w> {
    walker: &'w mut Walker,
    entries: BTreeMap<String, CapturedValue>,
    result: Result<()>,
}

impl MapBuilder<'_> {
    pub fn entry<K, V>(&mut self, key: &K, value: &V) -> &mut Self
    where
        K: Capture + ?Sized,
        V: Capture + ?Sized,
    {
        if self.result.is_err() {
            return self;
        }
        let outcome = value.capture(&mut *self.walker).and_then(|value| {
            if self.walker.is_surveying() {
                return Ok(());
            }
            self.entries.insert(key_text(key)?, value);
            Ok(())
        });
        if let Err(err) = outcome {
            self.result = Err(err);
        }
        self
    }

    pub fn entries<'a, K, V, I>(&mut self, entries: I) -> &mut Self
    where
        K: Capture + ?Sized + 'a,
        V: Capture + ?Sized + 'a,
        I: IntoIterator<Item = (&'a K, &'a V)>,
    {
        for (key, value) in entries {
            self.entry(key, value);
        }
        self
    }

    pub fn finish(&mut self) -> CaptureResult {
        std::mem::replace(&mut self.result, Ok(()))?;
        Ok(CapturedValue::Object(std::mem::take(&mut self.entries)))
    }
}
