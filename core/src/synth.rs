//! Baseline structural schema synthesis.
//!
//! Maps a [`TypeDesc`] to a [`Schema`] without any of the walker's rules:
//! primitives become primitive schemas, structs become objects whose
//! properties are synthesized recursively and inlined, pointers are
//! followed, collections become arrays and maps become objects with
//! `additionalProperties`. Embedded structs without a JSON name are
//! flattened into their owner.
//!
//! A struct that is already being synthesized further up the stack is
//! emitted as a component reference, so recursive types terminate. The
//! referenced structs are reported back so the registry can store them.
//!
//! Pointer, map and collection steps between two structs spend a depth
//! budget that is refilled at every struct. Running out yields the
//! `default` sentinel reference, the same one the walker uses, which
//! bounds cycles that never pass through a struct.

use tracing::debug;

use crate::tags::{JSON_TAG, split_tag_value};
use crate::{
    DEFAULT_MAX_DEPTH, DEPTH_SENTINEL_NAME, FieldDesc, PrimitiveKind, Schema, SchemaKind,
    SchemaRef, StructDesc, TypeDesc,
};

/// Synthesizes the baseline schema for a type description.
///
/// Kinds with no schema representation (channels, functions, opaque
/// pointers) yield an empty schema. Chains of indirections longer than
/// [`DEFAULT_MAX_DEPTH`] end in the `default` sentinel reference.
///
/// # Examples
///
/// ```
/// use schema_synth_core::{Reflect, SchemaKind, synthesize};
///
/// let schema = synthesize(&Vec::<u32>::type_desc());
/// assert!(schema.is(SchemaKind::Array));
///
/// let items = schema.items.unwrap();
/// let items = items.as_inline().unwrap();
/// assert!(items.is(SchemaKind::Integer));
/// assert_eq!(items.minimum, Some(0.0));
/// ```
pub fn synthesize(ty: &TypeDesc) -> Schema {
    synthesize_bounded(ty, DEFAULT_MAX_DEPTH).0
}

/// Synthesizes `ty` with the given indirection budget.
///
/// Also returns the structs emitted as component references because
/// they recurse into themselves.
pub(crate) fn synthesize_bounded(ty: &TypeDesc, max_depth: usize) -> (Schema, Vec<StructDesc>) {
    let mut synth = Synthesizer {
        max_depth,
        stack: Vec::new(),
        cycles: Vec::new(),
    };
    let schema = match synth.schema_ref(ty, max_depth) {
        Some(SchemaRef::Inline(schema)) => *schema,
        Some(SchemaRef::Ref { .. }) | None => Schema::default(),
    };
    (schema, synth.cycles)
}

struct Synthesizer {
    max_depth: usize,
    /// Identities of the structs currently being synthesized.
    stack: Vec<String>,
    cycles: Vec<StructDesc>,
}

impl Synthesizer {
    fn schema_ref(&mut self, ty: &TypeDesc, budget: usize) -> Option<SchemaRef> {
        if budget == 0 {
            debug!(kind = ?ty.name(), "Depth budget exhausted, using sentinel reference");
            return Some(SchemaRef::component(DEPTH_SENTINEL_NAME));
        }

        match ty {
            TypeDesc::Primitive(p) => Some(SchemaRef::inline(primitive_schema(p.kind))),
            TypeDesc::Struct(desc) => Some(self.struct_schema(desc)),
            TypeDesc::Pointer(target) => self.schema_ref(&target.resolve(), budget - 1),
            TypeDesc::Map { value, .. } => {
                let value = self
                    .schema_ref(&value.resolve(), budget - 1)
                    .unwrap_or_else(|| SchemaRef::inline(Schema::default()));
                Some(SchemaRef::inline(Schema {
                    additional_properties: Some(Box::new(value)),
                    ..Schema::object()
                }))
            }
            TypeDesc::Slice(element) | TypeDesc::Array { element, .. } => {
                let items = self
                    .schema_ref(&element.resolve(), budget - 1)
                    .unwrap_or_else(|| SchemaRef::inline(Schema::default()));
                Some(SchemaRef::inline(Schema::array(items)))
            }
            TypeDesc::Channel(_) | TypeDesc::Function(_) | TypeDesc::OpaquePointer(_) => None,
        }
    }

    fn struct_schema(&mut self, desc: &StructDesc) -> SchemaRef {
        if self.stack.contains(&desc.identity) {
            if !self.cycles.iter().any(|seen| seen.identity == desc.identity) {
                self.cycles.push(desc.clone());
            }
            return SchemaRef::component(&desc.name);
        }

        self.stack.push(desc.identity.clone());
        let mut schema = Schema::object();
        self.collect_properties(desc, &mut schema);
        self.stack.pop();

        SchemaRef::inline(schema)
    }

    fn collect_properties(&mut self, desc: &StructDesc, schema: &mut Schema) {
        for field in &desc.fields {
            let (json_name, _) = split_tag_value(field.tags.get(JSON_TAG));
            if json_name == "-" {
                continue;
            }

            if field.embedded && json_name.is_empty() {
                if let Some(embedded) = embedded_struct(field) {
                    if !self.stack.contains(&embedded.identity) {
                        self.stack.push(embedded.identity.clone());
                        self.collect_properties(&embedded, schema);
                        self.stack.pop();
                    }
                    continue;
                }
            }

            let name = if json_name.is_empty() {
                field.name.as_str()
            } else {
                json_name
            };

            match self.schema_ref(&field.ty.resolve(), self.max_depth) {
                Some(property) => {
                    schema.properties.insert(name.to_string(), property);
                }
                None => debug!(property = %name, "Field type has no schema representation"),
            }
        }
    }
}

fn primitive_schema(kind: PrimitiveKind) -> Schema {
    match kind {
        PrimitiveKind::Boolean => Schema::of_kind(SchemaKind::Boolean),
        PrimitiveKind::Integer { format, unsigned } => Schema {
            format: format.map(String::from),
            minimum: unsigned.then_some(0.0),
            ..Schema::of_kind(SchemaKind::Integer)
        },
        PrimitiveKind::Number { format } => Schema {
            format: format.map(String::from),
            ..Schema::of_kind(SchemaKind::Number)
        },
        PrimitiveKind::String => Schema::of_kind(SchemaKind::String),
    }
}

/// Resolves an embedded field to its struct, following one pointer.
fn embedded_struct(field: &FieldDesc) -> Option<StructDesc> {
    match field.ty.resolve() {
        TypeDesc::Struct(desc) => Some(desc),
        TypeDesc::Pointer(target) => match target.resolve() {
            TypeDesc::Struct(desc) => Some(desc),
            _ => None,
        },
        _ => None,
    }
}
