//! The shader variable type model.

use compact_str::CompactString;
use std::fmt::Write as _;

use crate::error::TypeError;

/// A shader variable type: a registered scalar, a fixed-length array, or a
/// named struct of members.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShaderType {
    Scalar {
        /// Shader-source name, e.g. `vec3`.
        name: CompactString,
        /// Host-side name used in emitted code, e.g. `glm::vec3`.
        emitted: CompactString,
        /// Size in bytes.
        size: u32,
    },
    Array {
        elem: Box<ShaderType>,
        len: u32,
    },
    Struct {
        name: CompactString,
        /// Members in declaration order.
        members: Vec<(CompactString, ShaderType)>,
    },
}

impl ShaderType {
    /// A fixed-length array of `elem`.
    ///
    /// # Errors
    ///
    /// [`TypeError::NonPositiveArrayLength`] when `len` is zero, and
    /// [`TypeError::OversizedType`] when the total size leaves `u32` range.
    pub fn array(elem: ShaderType, len: u32) -> Result<ShaderType, TypeError> {
        if len == 0 {
            return Err(TypeError::NonPositiveArrayLength {
                context: elem.type_name().to_string(),
            });
        }
        if elem.size().checked_mul(len).is_none() {
            return Err(TypeError::OversizedType {
                context: elem.type_name().to_string(),
            });
        }
        Ok(ShaderType::Array {
            elem: Box::new(elem),
            len,
        })
    }

    /// An array from explicit elements, which must be non-empty and all of
    /// one type.
    ///
    /// # Errors
    ///
    /// [`TypeError::EmptyArray`] for no elements,
    /// [`TypeError::HeterogeneousArray`] when elements disagree on type.
    pub fn array_of(elems: Vec<ShaderType>) -> Result<ShaderType, TypeError> {
        let Some(first) = elems.first() else {
            return Err(TypeError::EmptyArray {
                context: "array literal".to_string(),
            });
        };
        if elems.iter().any(|e| e != first) {
            return Err(TypeError::HeterogeneousArray {
                context: first.type_name().to_string(),
            });
        }
        let len = u32::try_from(elems.len()).map_err(|_| TypeError::NonPositiveArrayLength {
            context: first.type_name().to_string(),
        })?;
        let elem = elems.into_iter().next().expect("non-empty checked above");
        ShaderType::array(elem, len)
    }

    /// A named struct with members in declaration order.
    ///
    /// # Errors
    ///
    /// [`TypeError::DuplicateMember`] when two members share a name, and
    /// [`TypeError::OversizedType`] when the member sizes sum out of `u32`
    /// range.
    pub fn strukt(
        name: impl Into<CompactString>,
        members: Vec<(CompactString, ShaderType)>,
    ) -> Result<ShaderType, TypeError> {
        let name = name.into();
        for (i, (member, _)) in members.iter().enumerate() {
            if members[..i].iter().any(|(seen, _)| seen == member) {
                return Err(TypeError::DuplicateMember {
                    strukt: name.to_string(),
                    member: member.to_string(),
                });
            }
        }
        members
            .iter()
            .try_fold(0u32, |total, (_, ty)| total.checked_add(ty.size()))
            .ok_or_else(|| TypeError::OversizedType {
                context: name.to_string(),
            })?;
        Ok(ShaderType::Struct { name, members })
    }

    /// Total size in bytes: scalars report their registered size, arrays
    /// multiply, structs sum their members.
    ///
    /// [`array`](Self::array) and [`strukt`](Self::strukt) reject types
    /// whose total size leaves `u32` range, so this never wraps.
    #[must_use]
    pub fn size(&self) -> u32 {
        match self {
            Self::Scalar { size, .. } => *size,
            Self::Array { elem, len } => elem.size() * len,
            Self::Struct { members, .. } => members.iter().map(|(_, ty)| ty.size()).sum(),
        }
    }

    /// Shader-source spelling of this type, e.g. `vec3[2][4]`.
    #[must_use]
    pub fn type_name(&self) -> CompactString {
        match self {
            Self::Scalar { name, .. } => name.clone(),
            Self::Array { .. } => {
                let (base, dims) = self.unwrap_dims();
                let mut out = base.type_name();
                for d in dims {
                    let _ = write!(out, "[{d}]");
                }
                out
            }
            Self::Struct { name, .. } => name.clone(),
        }
    }

    /// The innermost non-array type and the array dimensions, outermost
    /// first.
    fn unwrap_dims(&self) -> (&ShaderType, Vec<u32>) {
        let mut dims = Vec::new();
        let mut ty = self;
        while let Self::Array { elem, len } = ty {
            debug_assert!(*len > 0);
            dims.push(*len);
            ty = elem;
        }
        (ty, dims)
    }

    /// The name this type goes by in emitted code.
    #[must_use]
    pub fn emitted_name(&self) -> CompactString {
        match self {
            Self::Scalar { emitted, .. } => emitted.clone(),
            Self::Array { .. } => self.unwrap_dims().0.emitted_name(),
            Self::Struct { name, .. } => name.clone(),
        }
    }

    /// Render this type as host-side source text.
    ///
    /// Structs render as a full declaration block; scalars and arrays render
    /// as the bare emitted type name (array dimensions belong to the
    /// variable, not the type).
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Struct { name, members } => {
                let mut out = String::new();
                let _ = writeln!(out, "struct {name}");
                out.push_str("{\n");
                for (member, ty) in members {
                    let (base, dims) = ty.unwrap_dims();
                    let _ = write!(out, "    {} {member}", base.emitted_name());
                    for d in dims {
                        let _ = write!(out, "[{d}]");
                    }
                    out.push_str(";\n");
                }
                out.push_str("};\n");
                out
            }
            _ => self.emitted_name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::TypeRegistry;

    fn vec3() -> ShaderType {
        TypeRegistry::builtin().scalar("vec3").unwrap()
    }

    #[test]
    fn array_size_multiplies() {
        let arr = ShaderType::array(vec3(), 4).unwrap();
        assert_eq!(arr.size(), 48);
        assert_eq!(arr.type_name(), "vec3[4]");
    }

    #[test]
    fn nested_array_size_multiplies_through() {
        let inner = ShaderType::array(vec3(), 3).unwrap();
        let outer = ShaderType::array(inner, 2).unwrap();
        assert_eq!(outer.size(), 72);
        assert_eq!(outer.type_name(), "vec3[2][3]");
    }

    #[test]
    fn zero_length_arrays_are_rejected() {
        assert!(matches!(
            ShaderType::array(vec3(), 0).unwrap_err(),
            TypeError::NonPositiveArrayLength { .. }
        ));
    }

    #[test]
    fn array_of_checks_homogeneity() {
        let float = TypeRegistry::builtin().scalar("float").unwrap();
        let arr = ShaderType::array_of(vec![vec3(), vec3()]).unwrap();
        assert_eq!(arr.size(), 24);
        assert!(matches!(
            ShaderType::array_of(vec![vec3(), float]).unwrap_err(),
            TypeError::HeterogeneousArray { .. }
        ));
        assert!(matches!(
            ShaderType::array_of(Vec::new()).unwrap_err(),
            TypeError::EmptyArray { .. }
        ));
    }

    #[test]
    fn struct_size_sums_members() {
        let arr = ShaderType::array(vec3(), 4).unwrap();
        let float = TypeRegistry::builtin().scalar("float").unwrap();
        let s = ShaderType::strukt(
            "Lights",
            vec![("positions".into(), arr), ("intensity".into(), float)],
        )
        .unwrap();
        assert_eq!(s.size(), 52);
    }

    #[test]
    fn overflowing_array_size_is_rejected() {
        let float = TypeRegistry::builtin().scalar("float").unwrap();
        // 4 bytes * 2^30 elements leaves u32 range.
        let err = ShaderType::array(float, 1 << 30).unwrap_err();
        assert!(matches!(err, TypeError::OversizedType { .. }));
    }

    #[test]
    fn overflowing_struct_size_is_rejected() {
        let float = TypeRegistry::builtin().scalar("float").unwrap();
        let huge = ShaderType::array(float, (1 << 30) - 1).unwrap();
        let err = ShaderType::strukt(
            "Block",
            vec![("a".into(), huge.clone()), ("b".into(), huge)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TypeError::OversizedType {
                context: "Block".to_string()
            }
        );
    }

    #[test]
    fn duplicate_members_are_rejected() {
        let err = ShaderType::strukt(
            "Lights",
            vec![("color".into(), vec3()), ("color".into(), vec3())],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TypeError::DuplicateMember {
                strukt: "Lights".to_string(),
                member: "color".to_string(),
            }
        );
    }

    #[test]
    fn struct_rendering_places_dims_on_the_member() {
        let inner = ShaderType::array(vec3(), 3).unwrap();
        let grid = ShaderType::array(inner, 2).unwrap();
        let s = ShaderType::strukt("Lights", vec![("grid".into(), grid)]).unwrap();
        assert_eq!(
            s.render(),
            "struct Lights\n{\n    glm::vec3 grid[2][3];\n};\n"
        );
    }

    #[test]
    fn scalars_render_as_their_emitted_name() {
        assert_eq!(vec3().render(), "glm::vec3");
    }
}
