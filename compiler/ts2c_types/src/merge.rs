//! The type merge lattice.
//!
//! `merge` is the join of a semilattice over [`NativeType`]:
//!
//! ```text
//! void *  <  void  <  { int16_t < int32_t < float, uint8_t, const char *,
//!                       native, arrays, dicts, structs }  <  struct js_var
//! ```
//!
//! Arrays merge element-wise, keeping the larger capacity and becoming
//! dynamic if either side is. Structs union their fields. A struct meeting
//! a dict becomes a dict over every field type. Any other mismatch is a
//! conflict and yields the boxed `struct js_var`.

use crate::native_type::{NativeType, Primitive, StructType};

/// Join two types.
pub fn merge(a: &NativeType, b: &NativeType) -> NativeType {
    merge_with_conflict(a, b).0
}

/// Join two types, also reporting whether a mismatch was boxed anywhere.
pub fn merge_with_conflict(a: &NativeType, b: &NativeType) -> (NativeType, bool) {
    let mut conflict = false;
    let ty = join(a, b, &mut conflict);
    (ty, conflict)
}

/// Merge a sequence; the empty sequence is `void *`.
pub fn merge_all<'a, I>(types: I) -> NativeType
where
    I: IntoIterator<Item = &'a NativeType>,
{
    types
        .into_iter()
        .fold(NativeType::POINTER, |acc, ty| merge(&acc, ty))
}

fn join(a: &NativeType, b: &NativeType, conflict: &mut bool) -> NativeType {
    use NativeType as T;
    use Primitive as P;

    match (a, b) {
        (T::Primitive(P::Pointer), other) | (other, T::Primitive(P::Pointer)) => other.clone(),
        (T::Primitive(P::Void), other) | (other, T::Primitive(P::Void)) => other.clone(),
        (T::Primitive(P::Boxed), _) | (_, T::Primitive(P::Boxed)) => T::BOXED,
        (T::Primitive(x), T::Primitive(y)) => {
            if x == y {
                return a.clone();
            }
            match (x.numeric_rank(), y.numeric_rank()) {
                (Some(rx), Some(ry)) => {
                    if rx >= ry {
                        a.clone()
                    } else {
                        b.clone()
                    }
                }
                _ => {
                    *conflict = true;
                    T::BOXED
                }
            }
        }
        (T::Array(x), T::Array(y)) => T::array(
            join(&x.element, &y.element, conflict),
            x.capacity.max(y.capacity),
            x.dynamic || y.dynamic,
        ),
        (T::Dict(x), T::Dict(y)) => T::dict(join(x, y, conflict)),
        (T::Struct(x), T::Struct(y)) => T::Struct(join_structs(x, y, conflict)),
        (T::Struct(s), T::Dict(e)) | (T::Dict(e), T::Struct(s)) => T::dict(
            s.fields
                .iter()
                .fold((**e).clone(), |acc, (_, ty)| join(&acc, ty, conflict)),
        ),
        _ => {
            *conflict = true;
            T::BOXED
        }
    }
}

fn join_structs(x: &StructType, y: &StructType, conflict: &mut bool) -> StructType {
    let name = match (x.name.is_empty(), y.name.is_empty()) {
        (true, _) => y.name.clone(),
        (_, true) => x.name.clone(),
        _ => x.name.as_str().min(y.name.as_str()).to_string(),
    };

    let mut fields: Vec<(String, NativeType)> = x
        .fields
        .iter()
        .map(|(field, ty)| match y.field(field) {
            Some(other) => (field.clone(), join(ty, other, conflict)),
            None => (field.clone(), ty.clone()),
        })
        .collect();
    for (field, ty) in &y.fields {
        if x.field(field).is_none() {
            fields.push((field.clone(), ty.clone()));
        }
    }

    StructType { name, fields }
}
