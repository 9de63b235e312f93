//! Bounded resolution of type descriptions into schema tags.
//!
//! The walker decides what a type looks like from the outside: which
//! registry entry it refers to, whether it is an array of something, or
//! whether it is elided entirely. Only leaf types reach the registry.
//!
//! Every indirection, collection and wrapper step spends one unit of the
//! depth budget. When the budget reaches zero the walker returns the
//! [`SchemaTag::depth_sentinel`] instead of recursing, which also bounds
//! self-referential descriptions.

use tracing::debug;

use crate::error::Result;
use crate::{
    Reflect, Schema, SchemaRegistry, SchemaTag, StructDesc, TypeDesc, UNKNOWN_INTERFACE_NAME,
    component_ref,
};

/// Depth budget used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Resolves `ty` into a schema tag, spending at most `depth` levels.
///
/// - Pointers, maps, channels, functions and opaque pointers resolve to
///   their target; a map's key type is not represented.
/// - Slices and arrays produce a fresh, unregistered `array` schema whose
///   `items` points at the element's schema.
/// - Transparent wrappers resolve to their payload field's type.
/// - Other structs and primitives are registered by name.
///
/// # Errors
///
/// Propagates registry errors for leaf types.
///
/// # Examples
///
/// ```
/// use schema_synth_core::{Reflect, SchemaRegistry, resolve};
///
/// let mut registry = SchemaRegistry::new();
/// let tag = resolve(&mut registry, &Vec::<Option<i64>>::type_desc(), 5).unwrap();
///
/// assert_eq!(tag.name, "i64");
/// assert!(tag.reference.is_none());
/// let items = tag.value.unwrap().items.unwrap();
/// assert_eq!(items.reference(), Some("#/components/schemas/i64"));
/// assert!(registry.contains("i64"));
/// ```
pub fn resolve(registry: &mut SchemaRegistry, ty: &TypeDesc, depth: usize) -> Result<SchemaTag> {
    if depth == 0 {
        debug!(kind = ?ty.name(), "Depth budget exhausted, using sentinel schema");
        return Ok(SchemaTag::depth_sentinel());
    }

    if let Some(target) = ty.indirection_target() {
        return resolve(registry, &target.resolve(), depth - 1);
    }

    if let Some(element) = ty.collection_element() {
        let item = resolve(registry, &element.resolve(), depth - 1)?;
        return Ok(SchemaTag {
            value: Some(Schema::array(item.schema_ref())),
            name: item.name,
            reference: None,
        });
    }

    if let Some(payload) = ty.as_struct().and_then(StructDesc::payload_field) {
        return resolve(registry, &payload.ty.resolve(), depth - 1);
    }

    let name = ty.name();
    let schema = registry.get_or_create(name, ty)?.clone();
    Ok(SchemaTag {
        name: name.to_string(),
        reference: Some(component_ref(name)),
        value: Some(schema),
    })
}

/// Resolves an optional type with the given depth budget.
///
/// An absent type is not an error: it resolves to the `unknown-interface`
/// placeholder, an empty object schema registered on first use.
///
/// # Errors
///
/// Propagates registry errors for leaf types.
///
/// # Examples
///
/// ```
/// use schema_synth_core::{SchemaRegistry, schema_tag_from_type};
///
/// let mut registry = SchemaRegistry::new();
/// let tag = schema_tag_from_type(&mut registry, None, 5).unwrap();
/// assert_eq!(tag.name, "unknown-interface");
/// assert_eq!(
///     tag.reference.as_deref(),
///     Some("#/components/schemas/unknown-interface")
/// );
/// ```
pub fn schema_tag_from_type(
    registry: &mut SchemaRegistry,
    ty: Option<&TypeDesc>,
    max_depth: usize,
) -> Result<SchemaTag> {
    match ty {
        Some(ty) => resolve(registry, ty, max_depth),
        None => {
            let schema = registry.unknown_interface()?.clone();
            Ok(SchemaTag {
                name: UNKNOWN_INTERFACE_NAME.to_string(),
                reference: Some(component_ref(UNKNOWN_INTERFACE_NAME)),
                value: Some(schema),
            })
        }
    }
}

/// Resolves a [`Reflect`] type with the given depth budget.
///
/// # Errors
///
/// Propagates registry errors for leaf types.
pub fn schema_tag_for<T: Reflect + ?Sized>(
    registry: &mut SchemaRegistry,
    max_depth: usize,
) -> Result<SchemaTag> {
    resolve(registry, &T::type_desc(), max_depth)
}
