//! Symbol table (spec §4.3): "a stack of scopes (one per macro invocation /
//! include); identifiers carry a type tag... `#declare` creates an
//! identifier in the outermost scope; `#local` in the current scope.
//! Redefinition across different types is an error; same-type redefinition
//! replaces and destroys the previous value."

use crate::color::Color;
use crate::matrix::Matrix;
use crate::raytracer::parser::lexer::Token;
use crate::tuple::Tuple;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentType {
    Float,
    Vector,
    Uv,
    Vector4,
    Color,
    Pigment,
    Normal,
    Finish,
    Texture,
    Interior,
    Material,
    Media,
    Density,
    Transform,
    Camera,
    Rainbow,
    Fog,
    SkySphere,
    Object,
    ColorMap,
    PigmentMap,
    NormalMap,
    SlopeMap,
    TextureMap,
    DensityMap,
    Array,
    Macro,
    String,
    File,
}

impl IdentType {
    pub fn name(&self) -> &'static str {
        match self {
            IdentType::Float => "float",
            IdentType::Vector => "vector",
            IdentType::Uv => "uv",
            IdentType::Vector4 => "vector4",
            IdentType::Color => "color",
            IdentType::Pigment => "pigment",
            IdentType::Normal => "normal",
            IdentType::Finish => "finish",
            IdentType::Texture => "texture",
            IdentType::Interior => "interior",
            IdentType::Material => "material",
            IdentType::Media => "media",
            IdentType::Density => "density",
            IdentType::Transform => "transform",
            IdentType::Camera => "camera",
            IdentType::Rainbow => "rainbow",
            IdentType::Fog => "fog",
            IdentType::SkySphere => "sky_sphere",
            IdentType::Object => "object",
            IdentType::ColorMap => "color_map",
            IdentType::PigmentMap => "pigment_map",
            IdentType::NormalMap => "normal_map",
            IdentType::SlopeMap => "slope_map",
            IdentType::TextureMap => "texture_map",
            IdentType::DensityMap => "density_map",
            IdentType::Array => "array",
            IdentType::Macro => "macro",
            IdentType::String => "string",
            IdentType::File => "file",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MacroDef {
    pub params: Vec<String>,
    pub body: Vec<Token>,
}

/// Opaque blocks (pigment/normal/finish/texture/interior/material/media/
/// density/rainbow/fog/sky_sphere/*_map) are captured for balanced-brace
/// consumption and redeclaration type-checking only - spec §1 puts their
/// evaluation out of scope ("Lighting, shadows, shading, textures,
/// pigments..."); the parser's job is to recognize and attach a *reference*
/// (spec §3's "Texture reference, Interior reference"), not evaluate one.
/// A best-effort `base_color` is kept when a plain `color <...>` was found
/// directly inside the block, so the example renderer shell can still paint
/// something recognizable without the core committing to shading semantics.
#[derive(Debug, Clone)]
pub struct OpaqueBlock {
    pub raw: String,
    pub base_color: Option<Color>,
}

#[derive(Debug, Clone)]
pub enum Value {
    Float(f64),
    Vector(Tuple),
    Vector4(f64, f64, f64, f64),
    Color(Color),
    Str(String),
    Transform(Matrix),
    /// Object-typed identifiers hold the registry id of an already-built
    /// `Arc<dyn Object>` (spec §9: sharing is "by reference count, not by
    /// parent pointer" - Rust's `Arc` already gives every shape this for
    /// free, so the symbol table only needs the id, not a clone).
    ObjectId(usize),
    Array(Vec<Value>),
    Macro(Arc<MacroDef>),
    Opaque(IdentType, Arc<OpaqueBlock>),
}

impl Value {
    pub fn type_tag(&self) -> IdentType {
        match self {
            Value::Float(_) => IdentType::Float,
            Value::Vector(_) => IdentType::Vector,
            Value::Vector4(..) => IdentType::Vector4,
            Value::Color(_) => IdentType::Color,
            Value::Str(_) => IdentType::String,
            Value::Transform(_) => IdentType::Transform,
            Value::ObjectId(_) => IdentType::Object,
            Value::Array(_) => IdentType::Array,
            Value::Macro(_) => IdentType::Macro,
            Value::Opaque(t, _) => *t,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<Tuple> {
        match self {
            Value::Vector(v) => Some(*v),
            Value::Float(f) => Some(Tuple::vector(*f, *f, *f)),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            Value::Vector(v) => Some(Color::new(v.x, v.y, v.z)),
            _ => None,
        }
    }
}

struct Scope {
    vars: HashMap<String, Value>,
}

/// Scope 0 is the "outermost" scope `#declare` always targets; later scopes
/// are pushed for macro invocations and includes and popped on return, per
/// spec §4.3.
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable { scopes: vec![Scope { vars: HashMap::new() }] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope { vars: HashMap::new() });
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// `#declare`: always targets the outermost scope.
    pub fn declare(&mut self, name: &str, value: Value) -> Result<(), String> {
        if let Some(existing) = self.scopes[0].vars.get(name) {
            if existing.type_tag() != value.type_tag() {
                return Err(format!(
                    "redefinition of '{}' as {} (was {})",
                    name,
                    value.type_tag().name(),
                    existing.type_tag().name()
                ));
            }
        }
        self.scopes[0].vars.insert(name.to_string(), value);
        Ok(())
    }

    /// `#local`: targets the current (innermost) scope.
    pub fn declare_local(&mut self, name: &str, value: Value) -> Result<(), String> {
        let idx = self.scopes.len() - 1;
        if let Some(existing) = self.scopes[idx].vars.get(name) {
            if existing.type_tag() != value.type_tag() {
                return Err(format!(
                    "redefinition of '{}' as {} (was {})",
                    name,
                    value.type_tag().name(),
                    existing.type_tag().name()
                ));
            }
        }
        self.scopes[idx].vars.insert(name.to_string(), value);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        for scope in self.scopes.iter().rev() {
            if let Some(v) = scope.vars.get(name) {
                return Some(v);
            }
        }
        None
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}
