//! Pluggable value coercion.
//!
//! When a patch value does not have exactly the shape of its target field,
//! the walker asks each registered [`Coercer`] in turn to convert it. The first
//! conversion that the field accepts wins. No coercers are registered by
//! default; a field with no successful coercion is simply left untouched.

use crate::{FieldDescriptor, FieldShape};
use serde_json::{Number, Value};
use std::fmt;
use std::sync::Arc;

/// A single conversion attempt.
pub trait Coercer: Send + Sync {
    /// Short name used in trace output.
    fn name(&self) -> &str;

    /// Convert `value` for `field`, or return `None` if this coercer does not
    /// apply.
    fn coerce(&self, field: &FieldDescriptor, value: &Value) -> Option<Value>;
}

/// Ordered list of coercers.
#[derive(Clone, Default)]
pub struct CoercerRegistry {
    coercers: Vec<Arc<dyn Coercer>>,
}

impl CoercerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a coercer; it runs after all previously registered ones.
    pub fn register(&mut self, coercer: impl Coercer + 'static) {
        self.coercers.push(Arc::new(coercer));
    }

    /// Append an already shared coercer.
    pub fn register_shared(&mut self, coercer: Arc<dyn Coercer>) {
        self.coercers.push(coercer);
    }

    /// Number of registered coercers.
    pub fn len(&self) -> usize {
        self.coercers.len()
    }

    /// Whether no coercers are registered.
    pub fn is_empty(&self) -> bool {
        self.coercers.is_empty()
    }

    /// Coercers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Coercer> {
        self.coercers.iter().map(|c| c.as_ref())
    }

    /// Run coercers in order and return the first converted value for which
    /// `accept` succeeds.
    pub fn apply<F>(&self, field: &FieldDescriptor, value: &Value, mut accept: F) -> Option<Value>
    where
        F: FnMut(Value) -> bool,
    {
        for coercer in self.iter() {
            let Some(converted) = coercer.coerce(field, value) else {
                continue;
            };
            if accept(converted.clone()) {
                tracing::trace!(
                    field = field.name,
                    coercer = coercer.name(),
                    "coerced patch value"
                );
                return Some(converted);
            }
        }
        None
    }
}

impl fmt::Debug for CoercerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.coercers.iter().map(|c| c.name()))
            .finish()
    }
}

/// Coercer backed by a closure.
pub struct FnCoercer<F> {
    name: String,
    func: F,
}

impl<F> Coercer for FnCoercer<F>
where
    F: Fn(&FieldDescriptor, &Value) -> Option<Value> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn coerce(&self, field: &FieldDescriptor, value: &Value) -> Option<Value> {
        (self.func)(field, value)
    }
}

/// Wrap a closure as a named coercer.
///
/// # Examples
///
/// ```
/// use tirea_patch::{coercer_fn, FieldShape};
/// use serde_json::Value;
///
/// let upper = coercer_fn("uppercase", |field, value| match (field.shape, value) {
///     (FieldShape::String, Value::String(s)) => Some(Value::String(s.to_uppercase())),
///     _ => None,
/// });
/// ```
pub fn coercer_fn<F>(name: impl Into<String>, func: F) -> FnCoercer<F>
where
    F: Fn(&FieldDescriptor, &Value) -> Option<Value> + Send + Sync,
{
    FnCoercer {
        name: name.into(),
        func,
    }
}

/// Lossless conversions between integer and float numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericWidening;

impl Coercer for NumericWidening {
    fn name(&self) -> &str {
        "numeric_widening"
    }

    fn coerce(&self, field: &FieldDescriptor, value: &Value) -> Option<Value> {
        let Value::Number(n) = value else {
            return None;
        };
        match field.shape.innermost() {
            FieldShape::Float if !n.is_f64() => exact_float(n).map(Value::Number),
            FieldShape::Int => integral(n).and_then(to_i64).map(Value::from),
            FieldShape::Uint => integral(n).and_then(to_u64).map(Value::from),
            _ => None,
        }
    }
}

const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

fn integral(n: &Number) -> Option<f64> {
    if !n.is_f64() {
        return None;
    }
    n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0)
}

fn to_i64(f: f64) -> Option<i64> {
    (f >= -TWO_POW_63 && f < TWO_POW_63).then_some(f as i64)
}

fn to_u64(f: f64) -> Option<u64> {
    (f >= 0.0 && f < TWO_POW_64).then_some(f as u64)
}

/// The integer as a float, if it converts back to the same integer.
fn exact_float(n: &Number) -> Option<Number> {
    let f = n.as_f64()?;
    let exact = match (n.as_i64(), n.as_u64()) {
        (Some(i), _) => to_i64(f) == Some(i),
        (None, Some(u)) => to_u64(f) == Some(u),
        (None, None) => false,
    };
    if exact {
        Number::from_f64(f)
    } else {
        None
    }
}

/// Parse numbers and booleans from their string spelling.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericStrings;

impl Coercer for NumericStrings {
    fn name(&self) -> &str {
        "numeric_strings"
    }

    fn coerce(&self, field: &FieldDescriptor, value: &Value) -> Option<Value> {
        let s = value.as_str()?.trim();
        match field.shape.innermost() {
            FieldShape::Bool => s.parse::<bool>().ok().map(Value::Bool),
            FieldShape::Int => s.parse::<i64>().ok().map(Value::from),
            FieldShape::Uint => s.parse::<u64>().ok().map(Value::from),
            FieldShape::Float => s
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RATIO: FieldDescriptor = FieldDescriptor::new("ratio", 0, FieldShape::Float);
    const COUNT: FieldDescriptor = FieldDescriptor::new("count", 1, FieldShape::Int);
    const SIZE: FieldDescriptor =
        FieldDescriptor::new("size", 2, FieldShape::Optional(&FieldShape::Uint));
    const FLAG: FieldDescriptor = FieldDescriptor::new("flag", 3, FieldShape::Bool);

    #[test]
    fn test_empty_registry_converts_nothing() {
        let registry = CoercerRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.apply(&RATIO, &json!(1), |_| true), None);
    }

    #[test]
    fn test_numeric_widening() {
        let c = NumericWidening;
        assert_eq!(c.coerce(&RATIO, &json!(2)), Some(json!(2.0)));
        assert_eq!(c.coerce(&RATIO, &json!(2.5)), None);
        assert_eq!(c.coerce(&COUNT, &json!(7.0)), Some(json!(7)));
        assert_eq!(c.coerce(&COUNT, &json!(7.5)), None);
        assert_eq!(c.coerce(&SIZE, &json!(3.0)), Some(json!(3)));
        assert_eq!(c.coerce(&SIZE, &json!(-3.0)), None);
        assert_eq!(c.coerce(&FLAG, &json!(1)), None);
    }

    #[test]
    fn test_numeric_widening_rejects_out_of_range_floats() {
        let c = NumericWidening;
        assert_eq!(c.coerce(&COUNT, &json!(9_223_372_036_854_775_808.0)), None);
        assert_eq!(
            c.coerce(&COUNT, &json!(-9_223_372_036_854_775_808.0)),
            Some(json!(i64::MIN))
        );
        assert_eq!(c.coerce(&SIZE, &json!(18_446_744_073_709_551_616.0)), None);
        assert_eq!(
            c.coerce(&SIZE, &json!(18_446_744_073_709_549_568.0)),
            Some(json!(18_446_744_073_709_549_568u64))
        );
    }

    #[test]
    fn test_numeric_widening_rejects_inexact_integers() {
        let c = NumericWidening;
        assert_eq!(c.coerce(&RATIO, &json!(9_007_199_254_740_993u64)), None);
        assert_eq!(c.coerce(&RATIO, &json!(-9_007_199_254_740_993i64)), None);
        assert_eq!(
            c.coerce(&RATIO, &json!(9_007_199_254_740_992u64)),
            Some(json!(9_007_199_254_740_992.0))
        );
        assert_eq!(c.coerce(&RATIO, &json!(i64::MAX)), None);
        assert_eq!(c.coerce(&RATIO, &json!(u64::MAX)), None);
    }

    #[test]
    fn test_numeric_strings() {
        let c = NumericStrings;
        assert_eq!(c.coerce(&COUNT, &json!(" 42 ")), Some(json!(42)));
        assert_eq!(c.coerce(&RATIO, &json!("0.25")), Some(json!(0.25)));
        assert_eq!(c.coerce(&FLAG, &json!("true")), Some(json!(true)));
        assert_eq!(c.coerce(&SIZE, &json!("-1")), None);
        assert_eq!(c.coerce(&COUNT, &json!(42)), None);
    }

    #[test]
    fn test_registry_runs_in_order_and_stops_at_first_accepted() {
        let mut registry = CoercerRegistry::new();
        registry.register(coercer_fn("first", |_, _| Some(json!("first"))));
        registry.register(coercer_fn("second", |_, _| Some(json!("second"))));

        let mut seen = Vec::new();
        let out = registry.apply(&COUNT, &json!(1), |v| {
            seen.push(v);
            true
        });
        assert_eq!(out, Some(json!("first")));
        assert_eq!(seen, vec![json!("first")]);
    }

    #[test]
    fn test_registry_skips_rejected_conversions() {
        let mut registry = CoercerRegistry::new();
        registry.register(coercer_fn("bad", |_, _| Some(json!("not a number"))));
        registry.register(NumericStrings);

        let out = registry.apply(&COUNT, &json!("9"), |v| v.is_number());
        assert_eq!(out, Some(json!(9)));
        assert_eq!(format!("{registry:?}"), "[\"bad\", \"numeric_strings\"]");
    }
}
