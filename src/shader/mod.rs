//! # Shader Variable Model
//!
//! Shader interface types, the scalar registry, and declaration reading.
//!
//! ## Overview
//!
//! This module turns parsed shader-interface declarations into typed values
//! and back into host-side source text:
//!
//! - [`TypeRegistry`] maps GLSL scalar names (`vec3`, `uint`, ...) to their
//!   emitted names and byte sizes; [`TypeRegistry::builtin`] covers the GLSL
//!   built-ins, with vector types emitting under `glm::`.
//! - [`ShaderType`] models scalars, fixed-length arrays, and structs, with
//!   size computation and struct-text rendering.
//! - [`tokenize`] splits declaration text for the parser, and
//!   [`VarDeclaration`], [`Uniform`], and [`VertexAttribute`] read parsed
//!   snippets back into records. [`struct_of`] packs declarations into a
//!   struct type.
//!
//! ## Usage
//!
//! ```rust
//! use shadevar::shader::{struct_of, TypeRegistry, VarDeclaration};
//! use shadevar::{compile, parse, tokenize};
//!
//! let grammar = compile(
//!     "qualifier : \"uniform\" | \"in\" | \"out\" | \"buffer\" ;
//!      type_name : \"vec3\" | \"float\" ;
//!      var_name : \"positions\" | \"intensity\" ;
//!      digit : '0' | '1' | '2' | '3' | '4' | '5' | '6' | '7' | '8' | '9' ;
//!      declaration : qualifier , type_name , var_name ,
//!                    [ LEFT_BRACKET , digit , RIGHT_BRACKET ] , SEMICOLON ;",
//! )?;
//!
//! let tokens = tokenize("uniform vec3 positions[4];");
//! let tree = parse(&grammar, &tokens)?;
//! let decl = VarDeclaration::from_node(&tree, TypeRegistry::builtin())?;
//! assert_eq!(decl.ty.size(), 48);
//!
//! let lights = struct_of("Lights", &[decl])?;
//! assert!(lights.render().contains("glm::vec3 positions[4];"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod decl;
mod registry;
mod ty;

pub use decl::{struct_of, tokenize, Uniform, VarDeclaration, VertexAttribute, STORAGE_QUALIFIERS};
pub use registry::TypeRegistry;
pub use ty::ShaderType;
