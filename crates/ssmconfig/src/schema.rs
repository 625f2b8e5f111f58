//! Field schemas describing how parameters land in a target value.

use std::fmt;
use std::sync::Arc;

/// Writes a parameter value into one field of `T`.
pub type Setter<T> = Arc<dyn Fn(&mut T, &str) + Send + Sync>;

/// Types whose fields can be loaded from parameters.
///
/// Usually derived with `#[derive(Parameters)]`:
///
/// ```ignore
/// #[derive(Default, ssmconfig::Parameters)]
/// struct Config {
///     #[ssm("Foo")]
///     foo: String,
///     #[ssm("OptionalBar,optional")]
///     optional_bar: String,
/// }
/// ```
///
/// Generic structs work as long as tagged field types convert from `String`:
///
/// ```
/// use ssmconfig::Parameters;
///
/// #[derive(Parameters)]
/// struct Wrapper<V: From<String> + 'static> {
///     #[ssm("value")]
///     value: V,
/// }
///
/// let tags: Vec<_> = Wrapper::<String>::schema().fields().iter().map(|spec| spec.tag.clone()).collect();
/// assert_eq!(tags, ["value"]);
/// ```
///
/// Enums are rejected:
///
/// ```compile_fail
/// #[derive(ssmconfig::Parameters)]
/// enum Mode {
///     Fast,
///     Slow,
/// }
/// ```
///
/// So are tuple structs:
///
/// ```compile_fail
/// #[derive(ssmconfig::Parameters)]
/// struct Pair(#[ssm("a")] String, String);
/// ```
///
/// Tagged fields must convert from `String`:
///
/// ```compile_fail
/// #[derive(ssmconfig::Parameters)]
/// struct Limits {
///     #[ssm("max")]
///     max: u32,
/// }
/// ```
///
/// A field carries at most one tag:
///
/// ```compile_fail
/// #[derive(ssmconfig::Parameters)]
/// struct Twice {
///     #[ssm("a")]
///     #[ssm("b")]
///     value: String,
/// }
/// ```
///
/// And the tag is a string literal:
///
/// ```compile_fail
/// #[derive(ssmconfig::Parameters)]
/// struct Numeric {
///     #[ssm(123)]
///     value: String,
/// }
/// ```
pub trait Parameters: Sized {
    /// Tagged fields of `Self`, in declaration order.
    fn schema() -> Schema<Self>;
}

/// A tagged field slot: diagnostic field name, raw tag and setter.
pub struct FieldSpec<T> {
    pub field: String,
    pub tag: String,
    pub setter: Setter<T>,
}

impl<T> Clone for FieldSpec<T> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            tag: self.tag.clone(),
            setter: Arc::clone(&self.setter),
        }
    }
}

impl<T> fmt::Debug for FieldSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("field", &self.field)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// Ordered list of tagged fields for `T`.
///
/// Built by the derive, or by hand for targets without a fixed shape:
///
/// ```ignore
/// let schema = Schema::<BTreeMap<String, String>>::new()
///     .field("url", "db/url", |map, value| {
///         map.insert("url".into(), value.to_string());
///     });
/// ```
pub struct Schema<T> {
    fields: Vec<FieldSpec<T>>,
}

impl<T> Schema<T> {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Register a field. `tag` uses the `name` / `name,optional` form.
    pub fn field<F>(mut self, field: impl Into<String>, tag: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut T, &str) + Send + Sync + 'static,
    {
        self.fields.push(FieldSpec {
            field: field.into(),
            tag: tag.into(),
            setter: Arc::new(setter),
        });
        self
    }

    /// Registered fields in registration order.
    pub fn fields(&self) -> &[FieldSpec<T>] {
        &self.fields
    }

    /// Number of registered fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn into_fields(self) -> Vec<FieldSpec<T>> {
        self.fields
    }
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.fields).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct Target {
        host: String,
    }

    #[test]
    fn setters_write_into_the_target() {
        let schema = Schema::<Target>::new().field("host", "Host", |target, value| target.host = value.to_string());
        assert_eq!(schema.len(), 1);

        let mut target = Target::default();
        (schema.fields()[0].setter)(&mut target, "db.internal");
        assert_eq!(target.host, "db.internal");
    }

    #[test]
    fn closures_may_capture_keys() {
        let mut schema = Schema::<BTreeMap<String, String>>::new();
        for key in ["a", "b"] {
            let owned = key.to_string();
            schema = schema.field(key, key, move |map, value| {
                map.insert(owned.clone(), value.to_string());
            });
        }

        let mut map = BTreeMap::new();
        for spec in schema.fields() {
            (spec.setter)(&mut map, "v");
        }
        assert_eq!(map.len(), 2);
        assert_eq!(format!("{:?}", schema.fields()[1]), r#"FieldSpec { field: "b", tag: "b", .. }"#);
    }
}
