//! Reading variable declarations out of parsed shader-interface snippets.

use compact_str::CompactString;

use crate::error::TypeError;
use crate::shader::{ShaderType, TypeRegistry};
use crate::syntax::SyntaxNode;

/// Storage qualifiers recognized in declarations.
pub const STORAGE_QUALIFIERS: &[&str] = &["uniform", "in", "out", "buffer"];

/// Split shader declaration text into parser tokens.
///
/// Words are whitespace-separated, and the punctuation characters
/// `; [ ] ( ) , =` always form their own single-character tokens even when
/// written flush against a word.
///
/// ```rust
/// use shadevar::tokenize;
///
/// let tokens = tokenize("uniform vec3 positions[4];");
/// assert_eq!(tokens, ["uniform", "vec3", "positions", "[", "4", "]", ";"]);
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<CompactString> {
    let mut tokens = Vec::new();
    let mut word = CompactString::default();
    for c in text.chars() {
        if c.is_whitespace() {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
        } else if matches!(c, ';' | '[' | ']' | '(' | ')' | ',' | '=') {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            tokens.push(CompactString::from(c.to_string()));
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

/// One interface variable declaration, read back out of a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarDeclaration {
    /// Storage qualifiers in source order.
    pub qualifiers: Vec<CompactString>,
    /// The `layout ( location = N )` index, when present.
    pub location: Option<u32>,
    pub ty: ShaderType,
    pub name: CompactString,
}

impl VarDeclaration {
    /// Read a declaration from a parsed snippet.
    ///
    /// Only the tree's leaves matter, so any grammar that parses
    /// declarations into the expected token order works. Array dimensions
    /// apply outermost first: `positions[2][4]` is a 2-array of 4-arrays.
    ///
    /// # Errors
    ///
    /// Type names are resolved against `registry`
    /// ([`TypeError::UnknownType`]); structural problems come back as
    /// [`TypeError::MalformedDeclaration`], [`TypeError::MissingType`], or
    /// [`TypeError::MissingName`].
    pub fn from_node(node: &SyntaxNode, registry: &TypeRegistry) -> Result<Self, TypeError> {
        let leaves = node.leaves();
        let snippet = || leaves.join(" ");
        let malformed = |detail: &str| TypeError::MalformedDeclaration {
            detail: detail.to_string(),
            snippet: leaves.join(" "),
        };

        let mut qualifiers = Vec::new();
        let mut location = None;
        let mut pos = 0;

        // Qualifiers and the layout clause come in any order before the type.
        loop {
            match leaves.get(pos) {
                Some(&word) if STORAGE_QUALIFIERS.contains(&word) => {
                    qualifiers.push(CompactString::from(word));
                    pos += 1;
                }
                Some(&"layout") => {
                    let clause = leaves.get(pos + 1..pos + 6).ok_or_else(|| {
                        malformed("truncated layout clause")
                    })?;
                    let [open, key, eq, value, close] = clause else {
                        return Err(malformed("truncated layout clause"));
                    };
                    if *open != "(" || *key != "location" || *eq != "=" || *close != ")" {
                        return Err(malformed("expected layout ( location = N )"));
                    }
                    let index: u32 = value
                        .parse()
                        .map_err(|_| malformed("layout location is not an integer"))?;
                    location = Some(index);
                    pos += 6;
                }
                _ => break,
            }
        }

        let Some(&type_name) = leaves.get(pos) else {
            return Err(TypeError::MissingType { snippet: snippet() });
        };
        let mut ty = registry.scalar(type_name)?;
        pos += 1;

        let Some(&name) = leaves.get(pos) else {
            return Err(TypeError::MissingName { snippet: snippet() });
        };
        pos += 1;

        let mut dims = Vec::new();
        while leaves.get(pos) == Some(&"[") {
            let Some(&len) = leaves.get(pos + 1) else {
                return Err(malformed("truncated array suffix"));
            };
            let len: u32 = len
                .parse()
                .map_err(|_| malformed("array length is not an integer"))?;
            if len == 0 {
                return Err(TypeError::NonPositiveArrayLength {
                    context: name.to_string(),
                });
            }
            if leaves.get(pos + 2) != Some(&"]") {
                return Err(malformed("unclosed array suffix"));
            }
            dims.push(len);
            pos += 3;
        }
        // Fold inside out so the first written dimension ends up outermost.
        for &len in dims.iter().rev() {
            ty = ShaderType::array(ty, len)?;
        }

        if leaves.get(pos) == Some(&";") {
            pos += 1;
        }
        if pos != leaves.len() {
            return Err(malformed("trailing tokens after declaration"));
        }

        Ok(Self {
            qualifiers,
            location,
            ty,
            name: name.into(),
        })
    }

    /// Whether this declaration carries the given storage qualifier.
    #[must_use]
    pub fn has_qualifier(&self, qualifier: &str) -> bool {
        self.qualifiers.iter().any(|q| q == qualifier)
    }
}

/// A uniform variable of a shader interface.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Uniform {
    pub name: CompactString,
    pub ty: ShaderType,
    pub location: Option<u32>,
}

impl Uniform {
    /// Read a `uniform` declaration from a parsed snippet.
    ///
    /// # Errors
    ///
    /// Everything [`VarDeclaration::from_node`] reports, plus
    /// [`TypeError::MalformedDeclaration`] when the `uniform` qualifier is
    /// missing.
    pub fn from_node(node: &SyntaxNode, registry: &TypeRegistry) -> Result<Self, TypeError> {
        let decl = VarDeclaration::from_node(node, registry)?;
        if !decl.has_qualifier("uniform") {
            return Err(TypeError::MalformedDeclaration {
                detail: "missing 'uniform' qualifier".to_string(),
                snippet: node.leaves().join(" "),
            });
        }
        Ok(Self {
            name: decl.name,
            ty: decl.ty,
            location: decl.location,
        })
    }
}

/// A vertex input attribute of a shader interface.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexAttribute {
    pub location: Option<u32>,
    pub name: CompactString,
    pub ty: ShaderType,
}

impl VertexAttribute {
    /// Read an `in` declaration from a parsed snippet.
    ///
    /// # Errors
    ///
    /// Everything [`VarDeclaration::from_node`] reports, plus
    /// [`TypeError::MalformedDeclaration`] when the `in` qualifier is
    /// missing.
    pub fn from_node(node: &SyntaxNode, registry: &TypeRegistry) -> Result<Self, TypeError> {
        let decl = VarDeclaration::from_node(node, registry)?;
        if !decl.has_qualifier("in") {
            return Err(TypeError::MalformedDeclaration {
                detail: "missing 'in' qualifier".to_string(),
                snippet: node.leaves().join(" "),
            });
        }
        Ok(Self {
            location: decl.location,
            name: decl.name,
            ty: decl.ty,
        })
    }
}

/// Collect declarations into a named struct type, members in declaration
/// order.
///
/// # Errors
///
/// [`TypeError::DuplicateMember`] when two declarations share a name.
pub fn struct_of(
    name: impl Into<CompactString>,
    decls: &[VarDeclaration],
) -> Result<ShaderType, TypeError> {
    ShaderType::strukt(
        name,
        decls
            .iter()
            .map(|d| (d.name.clone(), d.ty.clone()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(text: &str) -> SyntaxNode {
        // Declaration reading only looks at leaves, so a flat stand-in tree
        // is as good as a parsed one.
        SyntaxNode::Branch {
            rule: crate::grammar::RuleId::new(0),
            name: "declaration".into(),
            children: tokenize(text).into_iter().map(SyntaxNode::leaf).collect(),
        }
    }

    #[test]
    fn tokenize_splits_punctuation_off_words() {
        assert_eq!(
            tokenize("layout(location=0) in vec3 pos;"),
            ["layout", "(", "location", "=", "0", ")", "in", "vec3", "pos", ";"]
        );
        assert_eq!(tokenize("  \n"), Vec::<CompactString>::new());
    }

    #[test]
    fn reads_a_uniform_array_declaration() {
        let registry = TypeRegistry::builtin();
        let decl =
            VarDeclaration::from_node(&tree_of("uniform vec3 positions[4];"), registry).unwrap();
        assert_eq!(decl.qualifiers, ["uniform"]);
        assert_eq!(decl.name, "positions");
        assert_eq!(decl.ty.size(), 48);
        assert_eq!(decl.ty.type_name(), "vec3[4]");
    }

    #[test]
    fn multidim_suffixes_nest_outermost_first() {
        let registry = TypeRegistry::builtin();
        let decl =
            VarDeclaration::from_node(&tree_of("uniform float grid[2][3];"), registry).unwrap();
        assert_eq!(decl.ty.type_name(), "float[2][3]");
        assert_eq!(decl.ty.size(), 24);
    }

    #[test]
    fn layout_clause_yields_the_location() {
        let registry = TypeRegistry::builtin();
        let attr = VertexAttribute::from_node(
            &tree_of("layout ( location = 2 ) in vec2 uv;"),
            registry,
        )
        .unwrap();
        assert_eq!(attr.location, Some(2));
        assert_eq!(attr.name, "uv");
        assert_eq!(attr.ty.size(), 8);
    }

    #[test]
    fn uniform_requires_its_qualifier() {
        let registry = TypeRegistry::builtin();
        let err = Uniform::from_node(&tree_of("in vec3 pos;"), registry).unwrap_err();
        assert!(matches!(err, TypeError::MalformedDeclaration { .. }));
    }

    #[test]
    fn unknown_type_is_reported() {
        let registry = TypeRegistry::builtin();
        let err = VarDeclaration::from_node(&tree_of("uniform mat4 view;"), registry).unwrap_err();
        assert_eq!(
            err,
            TypeError::UnknownType {
                name: "mat4".to_string()
            }
        );
    }

    #[test]
    fn missing_name_and_type_are_distinguished() {
        let registry = TypeRegistry::builtin();
        assert!(matches!(
            VarDeclaration::from_node(&tree_of("uniform"), registry).unwrap_err(),
            TypeError::MissingType { .. }
        ));
        assert!(matches!(
            VarDeclaration::from_node(&tree_of("uniform vec3"), registry).unwrap_err(),
            TypeError::MissingName { .. }
        ));
    }

    #[test]
    fn zero_length_dimension_is_rejected() {
        let registry = TypeRegistry::builtin();
        let err =
            VarDeclaration::from_node(&tree_of("uniform vec3 p[0];"), registry).unwrap_err();
        assert!(matches!(err, TypeError::NonPositiveArrayLength { .. }));
    }

    #[test]
    fn struct_of_collects_members_in_order() {
        let registry = TypeRegistry::builtin();
        let decls = vec![
            VarDeclaration::from_node(&tree_of("uniform vec3 positions[4];"), registry).unwrap(),
            VarDeclaration::from_node(&tree_of("uniform float intensity;"), registry).unwrap(),
        ];
        let s = struct_of("Lights", &decls).unwrap();
        let rendered = s.render();
        assert!(rendered.starts_with("struct Lights\n{\n"));
        assert!(rendered.contains("    glm::vec3 positions[4];\n"));
        assert!(rendered.contains("    float intensity;\n"));
        assert_eq!(s.size(), 52);
    }
}
