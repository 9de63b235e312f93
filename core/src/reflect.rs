//! Type descriptions consumed by the engine.
//!
//! The engine works from an explicit description of a type's shape rather
//! than from the type itself. [`Reflect`] produces that description and is
//! implemented here for the std types that map to schema primitives,
//! indirections and collections. User structs implement it by building a
//! [`StructDesc`].
//!
//! Field types are stored as [`TypeRef`]s, which resolve lazily. A struct
//! can therefore refer to itself without producing an infinite value.
//!
//! # Example
//!
//! ```
//! use schema_synth_core::{FieldDesc, Reflect, StructDesc, TypeDesc};
//!
//! struct MyValue {
//!     value: String,
//! }
//!
//! impl Reflect for MyValue {
//!     fn type_desc() -> TypeDesc {
//!         StructDesc::of::<Self>("MyValue")
//!             .field(
//!                 FieldDesc::of::<String>("Value")
//!                     .tags(r#"json:"value" xml:"value,attr" example:"example value""#),
//!             )
//!             .into()
//!     }
//! }
//!
//! let desc = MyValue::type_desc();
//! assert_eq!(desc.name(), "MyValue");
//! assert_eq!(desc.as_struct().unwrap().fields.len(), 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::FieldTags;

/// Types that can describe their own shape.
pub trait Reflect {
    /// Returns the description of this type.
    fn type_desc() -> TypeDesc;
}

/// Lazily resolved reference to a type description.
#[derive(Clone, Copy)]
pub struct TypeRef(fn() -> TypeDesc);

impl TypeRef {
    /// Creates a reference from a description function.
    pub const fn new(describe: fn() -> TypeDesc) -> Self {
        Self(describe)
    }

    /// Creates a reference to a [`Reflect`] type.
    pub fn of<T: Reflect + ?Sized>() -> Self {
        Self(T::type_desc)
    }

    /// Produces the referenced description.
    pub fn resolve(&self) -> TypeDesc {
        (self.0)()
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only one level is resolved, so self-referential types print finitely.
        f.debug_tuple("TypeRef").field(&self.resolve().kind_name()).finish()
    }
}

/// Kind of a primitive value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `true` or `false`.
    Boolean,
    /// Whole number.
    Integer {
        /// OpenAPI format (`int32`, `int64`).
        format: Option<&'static str>,
        /// Whether negative values are impossible.
        unsigned: bool,
    },
    /// Floating point number.
    Number {
        /// OpenAPI format (`float`, `double`).
        format: Option<&'static str>,
    },
    /// Text.
    String,
}

/// Description of a primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveDesc {
    /// Short type name, also used as the schema name.
    pub name: &'static str,
    /// Value kind.
    pub kind: PrimitiveKind,
}

/// Description of one declared struct field.
#[derive(Debug, Clone)]
pub struct FieldDesc {
    /// Declared field name.
    pub name: String,
    /// Field type.
    pub ty: TypeRef,
    /// Whether the field is an embedded struct whose fields are flattened
    /// into the owner.
    pub embedded: bool,
    /// Declarative metadata.
    pub tags: FieldTags,
}

impl FieldDesc {
    /// Creates a field of the given type with no tags.
    pub fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            ty,
            embedded: false,
            tags: FieldTags::new(),
        }
    }

    /// Creates a field of a [`Reflect`] type.
    pub fn of<T: Reflect + ?Sized>(name: &str) -> Self {
        Self::new(name, TypeRef::of::<T>())
    }

    /// Creates an embedded field named after the embedded type, looking
    /// through one pointer.
    pub fn embed<T: Reflect + ?Sized>() -> Self {
        let ty = TypeRef::of::<T>();
        let name = match ty.resolve() {
            TypeDesc::Pointer(target) => target.resolve().name().to_string(),
            other => other.name().to_string(),
        };
        Self {
            name,
            ty,
            embedded: true,
            tags: FieldTags::new(),
        }
    }

    /// Replaces the tags with ones parsed from a struct-tag string.
    pub fn tags(mut self, raw: &str) -> Self {
        self.tags = FieldTags::parse(raw);
        self
    }

    /// Sets a single tag.
    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.tags = self.tags.with(key, value);
        self
    }
}

/// Description of a struct type.
#[derive(Debug, Clone)]
pub struct StructDesc {
    /// Short type name, used as the schema name.
    pub name: String,
    /// Qualified identity used to detect name collisions.
    pub identity: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDesc>,
    /// Custom schema description.
    pub description: Option<String>,
    /// Index of the payload field when this struct is a transparent
    /// wrapper.
    pub payload: Option<usize>,
    /// XML element name of the struct when it is the document root.
    pub xml_name: Option<String>,
}

impl StructDesc {
    /// Creates a struct description whose identity is its name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            identity: name.to_string(),
            fields: Vec::new(),
            description: None,
            payload: None,
            xml_name: None,
        }
    }

    /// Creates a struct description identified by `T`'s full type path.
    pub fn of<T: ?Sized>(name: &str) -> Self {
        Self {
            identity: std::any::type_name::<T>().to_string(),
            ..Self::new(name)
        }
    }

    /// Appends a field.
    pub fn field(mut self, field: FieldDesc) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends the payload field and marks the struct as a transparent
    /// wrapper around it.
    ///
    /// The payload does not have to be the first field.
    pub fn payload(mut self, field: FieldDesc) -> Self {
        self.payload = Some(self.fields.len());
        self.fields.push(field);
        self
    }

    /// Sets a custom schema description.
    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Sets the XML element name used when the struct is serialized as a
    /// root element.
    pub fn xml_root(mut self, name: &str) -> Self {
        self.xml_name = Some(name.to_string());
        self
    }

    /// Returns the payload field of a transparent wrapper.
    pub fn payload_field(&self) -> Option<&FieldDesc> {
        self.payload.and_then(|idx| self.fields.get(idx))
    }
}

impl From<StructDesc> for TypeDesc {
    fn from(desc: StructDesc) -> Self {
        Self::Struct(desc)
    }
}

/// Description of a type's shape.
#[derive(Debug, Clone)]
pub enum TypeDesc {
    /// Boolean, number or string.
    Primitive(PrimitiveDesc),
    /// Named struct.
    Struct(StructDesc),
    /// Pointer or owning indirection.
    Pointer(TypeRef),
    /// Key-value map.
    Map {
        /// Key type.
        key: TypeRef,
        /// Value type.
        value: TypeRef,
    },
    /// Channel carrying values of a type.
    Channel(TypeRef),
    /// Function, described by its result type.
    Function(TypeRef),
    /// Untyped pointer to a value of a type.
    OpaquePointer(TypeRef),
    /// Growable sequence.
    Slice(TypeRef),
    /// Fixed-length sequence.
    Array {
        /// Element type.
        element: TypeRef,
        /// Number of elements.
        len: usize,
    },
}

impl TypeDesc {
    /// Short name of a leaf type; empty for indirections and collections.
    pub fn name(&self) -> &str {
        match self {
            Self::Primitive(p) => p.name,
            Self::Struct(s) => &s.name,
            _ => "",
        }
    }

    /// Identity used to tell apart types that share a short name.
    pub fn identity(&self) -> &str {
        match self {
            Self::Primitive(p) => p.name,
            Self::Struct(s) => &s.identity,
            _ => "",
        }
    }

    /// Returns the struct description, if this is a struct.
    pub fn as_struct(&self) -> Option<&StructDesc> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the target of an indirection kind.
    ///
    /// Maps resolve to their value type; the key type is not represented.
    pub fn indirection_target(&self) -> Option<TypeRef> {
        match self {
            Self::Pointer(t) | Self::Channel(t) | Self::Function(t) | Self::OpaquePointer(t) => {
                Some(*t)
            }
            Self::Map { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Returns the element of a collection kind.
    pub fn collection_element(&self) -> Option<TypeRef> {
        match self {
            Self::Slice(t) => Some(*t),
            Self::Array { element, .. } => Some(*element),
            _ => None,
        }
    }

    fn kind_name(&self) -> &str {
        match self {
            Self::Primitive(p) => p.name,
            Self::Struct(s) => &s.name,
            Self::Pointer(_) => "pointer",
            Self::Map { .. } => "map",
            Self::Channel(_) => "channel",
            Self::Function(_) => "function",
            Self::OpaquePointer(_) => "opaque-pointer",
            Self::Slice(_) => "slice",
            Self::Array { .. } => "array",
        }
    }
}

macro_rules! reflect_primitive {
    ($($ty:ty => $name:literal, $kind:expr;)*) => {
        $(
            impl Reflect for $ty {
                fn type_desc() -> TypeDesc {
                    TypeDesc::Primitive(PrimitiveDesc { name: $name, kind: $kind })
                }
            }
        )*
    };
}

const fn signed(format: &'static str) -> PrimitiveKind {
    PrimitiveKind::Integer {
        format: Some(format),
        unsigned: false,
    }
}

const fn unsigned(format: &'static str) -> PrimitiveKind {
    PrimitiveKind::Integer {
        format: Some(format),
        unsigned: true,
    }
}

reflect_primitive! {
    bool => "bool", PrimitiveKind::Boolean;
    i8 => "i8", signed("int32");
    i16 => "i16", signed("int32");
    i32 => "i32", signed("int32");
    i64 => "i64", signed("int64");
    isize => "isize", signed("int64");
    u8 => "u8", unsigned("int32");
    u16 => "u16", unsigned("int32");
    u32 => "u32", unsigned("int32");
    u64 => "u64", unsigned("int64");
    usize => "usize", unsigned("int64");
    f32 => "f32", PrimitiveKind::Number { format: Some("float") };
    f64 => "f64", PrimitiveKind::Number { format: Some("double") };
    char => "char", PrimitiveKind::String;
    String => "String", PrimitiveKind::String;
    str => "String", PrimitiveKind::String;
}

impl<T: Reflect + ?Sized> Reflect for &T {
    fn type_desc() -> TypeDesc {
        TypeDesc::Pointer(TypeRef::of::<T>())
    }
}

impl<T: Reflect + ?Sized> Reflect for Box<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::Pointer(TypeRef::of::<T>())
    }
}

impl<T: Reflect + ?Sized> Reflect for Rc<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::Pointer(TypeRef::of::<T>())
    }
}

impl<T: Reflect + ?Sized> Reflect for Arc<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::Pointer(TypeRef::of::<T>())
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::Pointer(TypeRef::of::<T>())
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::Slice(TypeRef::of::<T>())
    }
}

impl<T: Reflect> Reflect for [T] {
    fn type_desc() -> TypeDesc {
        TypeDesc::Slice(TypeRef::of::<T>())
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_desc() -> TypeDesc {
        TypeDesc::Array {
            element: TypeRef::of::<T>(),
            len: N,
        }
    }
}

impl<K: Reflect, V: Reflect> Reflect for HashMap<K, V> {
    fn type_desc() -> TypeDesc {
        TypeDesc::Map {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
        }
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_desc() -> TypeDesc {
        TypeDesc::Map {
            key: TypeRef::of::<K>(),
            value: TypeRef::of::<V>(),
        }
    }
}
