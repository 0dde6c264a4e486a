//! The scalar type registry.

use compact_str::CompactString;
use hashbrown::HashMap;
use std::sync::OnceLock;

use crate::error::TypeError;
use crate::shader::ShaderType;

/// GLSL scalar and vector types with their emitted host-side names and byte
/// sizes. Vector types emit under the `glm::` namespace.
const BUILTIN_SCALARS: &[(&str, &str, u32)] = &[
    ("bool", "bool", 1),
    ("bvec2", "glm::bvec2", 8),
    ("bvec3", "glm::bvec3", 12),
    ("bvec4", "glm::bvec4", 16),
    ("float", "float", 4),
    ("vec2", "glm::vec2", 8),
    ("vec3", "glm::vec3", 12),
    ("vec4", "glm::vec4", 16),
    ("int", "int", 4),
    ("ivec2", "glm::ivec2", 8),
    ("ivec3", "glm::ivec3", 12),
    ("ivec4", "glm::ivec4", 16),
    ("uint", "uint", 4),
    ("uvec2", "glm::uvec2", 8),
    ("uvec3", "glm::uvec3", 12),
    ("uvec4", "glm::uvec4", 16),
];

/// Maps shader-source type names to their emitted names and byte sizes.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    scalars: HashMap<CompactString, (CompactString, u32), ahash::RandomState>,
}

impl TypeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared registry of GLSL built-in scalars and vectors.
    #[must_use]
    pub fn builtin() -> &'static TypeRegistry {
        static BUILTIN: OnceLock<TypeRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut registry = TypeRegistry::new();
            for &(name, emitted, size) in BUILTIN_SCALARS {
                registry.register(name, emitted, size);
            }
            registry
        })
    }

    /// Register a scalar type. Re-registering a name replaces its entry.
    pub fn register(
        &mut self,
        name: impl Into<CompactString>,
        emitted: impl Into<CompactString>,
        size: u32,
    ) {
        self.scalars.insert(name.into(), (emitted.into(), size));
    }

    /// Whether `name` is a registered scalar type.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scalars.contains_key(name)
    }

    /// Look up a scalar type by its shader-source name.
    ///
    /// # Errors
    ///
    /// [`TypeError::UnknownType`] when the name is not registered.
    pub fn scalar(&self, name: &str) -> Result<ShaderType, TypeError> {
        let (emitted, size) = self.scalars.get(name).ok_or_else(|| TypeError::UnknownType {
            name: name.to_string(),
        })?;
        Ok(ShaderType::Scalar {
            name: name.into(),
            emitted: emitted.clone(),
            size: *size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_the_glsl_scalars() {
        let registry = TypeRegistry::builtin();
        for name in ["bool", "float", "int", "uint", "vec3", "bvec4", "uvec2"] {
            assert!(registry.contains(name), "missing {name}");
        }
        assert!(!registry.contains("mat4"));
    }

    #[test]
    fn vector_types_emit_under_glm() {
        let vec3 = TypeRegistry::builtin().scalar("vec3").unwrap();
        assert_eq!(vec3.size(), 12);
        let ShaderType::Scalar { emitted, .. } = &vec3 else {
            panic!("scalar expected");
        };
        assert_eq!(emitted, "glm::vec3");
    }

    #[test]
    fn plain_scalars_emit_verbatim() {
        let uint = TypeRegistry::builtin().scalar("uint").unwrap();
        let ShaderType::Scalar { emitted, size, .. } = &uint else {
            panic!("scalar expected");
        };
        assert_eq!(emitted, "uint");
        assert_eq!(*size, 4);
    }

    #[test]
    fn unknown_types_are_reported_by_name() {
        let err = TypeRegistry::builtin().scalar("mat4").unwrap_err();
        assert_eq!(
            err,
            TypeError::UnknownType {
                name: "mat4".to_string()
            }
        );
    }

    #[test]
    fn custom_registrations_are_looked_up() {
        let mut registry = TypeRegistry::new();
        registry.register("half", "half", 2);
        assert!(registry.contains("half"));
        assert_eq!(registry.scalar("half").unwrap().size(), 2);
    }
}
