//! Expression evaluator (spec §4.3): "scalar and vector expressions with
//! operator precedence; colors are 5-component... and support
//! component-wise arithmetic." Precedence-climbing recursive descent over
//! the same token stream the object grammar uses - `+`/`-` lowest,
//! `*`/`/` next, unary minus tightest, with `<...>` vector/color literals,
//! parenthesized sub-expressions, identifier lookup and a fixed math
//! function set as primaries.

use crate::color::Color;
use crate::raytracer::error::{RtError, SourceLocation};
use crate::raytracer::parser::lexer::Token;
use crate::raytracer::parser::symbol::Value;
use crate::raytracer::parser::Parser;
use crate::tuple::Tuple;

impl Parser {
    pub fn parse_float(&mut self) -> Result<f64, RtError> {
        match self.parse_value()? {
            Value::Float(f) => Ok(f),
            other => {
                let loc = self.here();
                Err(RtError::TypeMismatch { loc, expected: "float".into(), found: other.type_tag().name().into() })
            }
        }
    }

    pub fn parse_vector3(&mut self) -> Result<Tuple, RtError> {
        match self.parse_value()? {
            Value::Vector(v) => Ok(v),
            Value::Float(f) => Ok(Tuple::vector(f, f, f)),
            other => {
                let loc = self.here();
                Err(RtError::TypeMismatch { loc, expected: "vector".into(), found: other.type_tag().name().into() })
            }
        }
    }

    pub fn parse_color(&mut self) -> Result<Color, RtError> {
        // `color rgb <r,g,b>` / `color rgbf <r,g,b,f>` / `color <r,g,b>` /
        // bare `color_ident`. The filter/transmit channels feed shading
        // (out of scope, spec §1); only rgb is kept.
        if let Token::Ident(name) = self.lexer.peek_token() {
            if matches!(name.as_str(), "rgb" | "rgbf" | "rgbft" | "red" | "green" | "blue" | "filter" | "transmit") {
                self.lexer.get_token();
            }
        }
        match self.parse_value()? {
            Value::Color(c) => Ok(c),
            Value::Vector(v) => Ok(Color::new(v.x, v.y, v.z)),
            Value::Float(f) => Ok(Color::new(f, f, f)),
            other => {
                let loc = self.here();
                Err(RtError::TypeMismatch { loc, expected: "color".into(), found: other.type_tag().name().into() })
            }
        }
    }

    pub fn parse_value(&mut self) -> Result<Value, RtError> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> Result<Value, RtError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            match self.lexer.peek_token() {
                Token::Symbol('+') => {
                    self.lexer.get_token();
                    let rhs = self.parse_multiplicative()?;
                    lhs = self.value_binop(lhs, rhs, '+')?;
                }
                Token::Symbol('-') => {
                    self.lexer.get_token();
                    let rhs = self.parse_multiplicative()?;
                    lhs = self.value_binop(lhs, rhs, '-')?;
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Value, RtError> {
        let mut lhs = self.parse_unary()?;
        loop {
            match self.lexer.peek_token() {
                Token::Symbol('*') => {
                    self.lexer.get_token();
                    let rhs = self.parse_unary()?;
                    lhs = self.value_binop(lhs, rhs, '*')?;
                }
                Token::Symbol('/') => {
                    self.lexer.get_token();
                    let rhs = self.parse_unary()?;
                    lhs = self.value_binop(lhs, rhs, '/')?;
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Value, RtError> {
        if let Token::Symbol('-') = self.lexer.peek_token() {
            self.lexer.get_token();
            let v = self.parse_unary()?;
            return self.value_neg(v);
        }
        if let Token::Symbol('+') = self.lexer.peek_token() {
            self.lexer.get_token();
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Value, RtError> {
        let tok = self.lexer.get_token();
        match tok {
            Token::Number(n) => Ok(Value::Float(n)),
            Token::Str(s) => Ok(Value::Str(s)),
            Token::Symbol('(') => {
                let v = self.parse_value()?;
                self.expect_symbol(')')?;
                Ok(v)
            }
            Token::Symbol('<') => self.parse_vector_literal(),
            Token::Ident(name) => self.parse_ident_primary(&name),
            other => {
                let loc = self.here();
                self.lexer.unget_token(other.clone());
                Err(RtError::Syntax(loc))
            }
        }
    }

    fn parse_vector_literal(&mut self) -> Result<Value, RtError> {
        let mut comps = vec![self.parse_value()?.as_float_broadcast()];
        while let Token::Symbol(',') = self.lexer.peek_token() {
            self.lexer.get_token();
            comps.push(self.parse_value()?.as_float_broadcast());
        }
        self.expect_symbol('>')?;
        match comps.len() {
            2 => Ok(Value::Vector(Tuple::vector(comps[0], comps[1], 0.0))),
            3 => Ok(Value::Vector(Tuple::vector(comps[0], comps[1], comps[2]))),
            4 => Ok(Value::Vector4(comps[0], comps[1], comps[2], comps[3])),
            5 => Ok(Value::Color(Color::new(comps[0], comps[1], comps[2]))),
            n => Ok(Value::Vector4(comps[0], *comps.get(1).unwrap_or(&0.0), *comps.get(2).unwrap_or(&0.0), *comps.get(3).unwrap_or(&0.0)).clamp_len(n)),
        }
    }

    fn parse_ident_primary(&mut self, name: &str) -> Result<Value, RtError> {
        match name {
            "pi" => return Ok(Value::Float(std::f64::consts::PI)),
            "true" | "yes" | "on" => return Ok(Value::Float(1.0)),
            "false" | "no" | "off" => return Ok(Value::Float(0.0)),
            _ => {}
        }
        if let Token::Symbol('(') = self.lexer.peek_token() {
            return self.parse_function_call(name);
        }
        match self.symbols.lookup(name).cloned() {
            Some(v) => Ok(v),
            None => {
                let loc = self.here();
                Err(RtError::UndeclaredIdentifier { loc, name: name.to_string() })
            }
        }
    }

    fn parse_function_call(&mut self, name: &str) -> Result<Value, RtError> {
        self.lexer.get_token(); // '('
        let mut args = vec![self.parse_value()?];
        while let Token::Symbol(',') = self.lexer.peek_token() {
            self.lexer.get_token();
            args.push(self.parse_value()?);
        }
        self.expect_symbol(')')?;
        let f = |i: usize| args.get(i).and_then(|v| v.as_float()).unwrap_or(0.0);
        let result = match name {
            "sin" => f(0).sin(),
            "cos" => f(0).cos(),
            "tan" => f(0).tan(),
            "asin" => f(0).asin(),
            "acos" => f(0).acos(),
            "atan" => f(0).atan(),
            "atan2" => f(0).atan2(f(1)),
            "sqrt" => f(0).sqrt(),
            "abs" => f(0).abs(),
            "min" => f(0).min(f(1)),
            "max" => f(0).max(f(1)),
            "pow" => f(0).powf(f(1)),
            "mod" => f(0) % f(1),
            "floor" => f(0).floor(),
            "ceil" => f(0).ceil(),
            "int" => f(0).trunc(),
            "exp" => f(0).exp(),
            "ln" => f(0).ln(),
            "log" => f(0).log10(),
            "radians" => f(0).to_radians(),
            "degrees" => f(0).to_degrees(),
            "vlength" => return Ok(Value::Float(args[0].as_vector().unwrap_or(Tuple::vector(0.0, 0.0, 0.0)).magnitude())),
            "vnormalize" => return Ok(Value::Vector(args[0].as_vector().unwrap_or(Tuple::vector(0.0, 0.0, 1.0)).normalize())),
            "vdot" => {
                let a = args[0].as_vector().unwrap_or(Tuple::vector(0.0, 0.0, 0.0));
                let b = args[1].as_vector().unwrap_or(Tuple::vector(0.0, 0.0, 0.0));
                return Ok(Value::Float(a.dot(&b)));
            }
            "vcross" => {
                let a = args[0].as_vector().unwrap_or(Tuple::vector(0.0, 0.0, 0.0));
                let b = args[1].as_vector().unwrap_or(Tuple::vector(0.0, 0.0, 0.0));
                return Ok(Value::Vector(a.cross(&b)));
            }
            _ => {
                let loc = self.here();
                return Err(RtError::UndeclaredIdentifier { loc, name: name.to_string() });
            }
        };
        Ok(Value::Float(result))
    }

    fn value_binop(&mut self, a: Value, b: Value, op: char) -> Result<Value, RtError> {
        use Value::*;
        let result = match (&a, &b) {
            (Float(x), Float(y)) => Float(match op { '+' => x + y, '-' => x - y, '*' => x * y, _ => x / y }),
            (Vector(x), Vector(y)) => {
                let (x, y) = (*x, *y);
                Vector(match op {
                    '+' => x.add(&y),
                    '-' => x.subtract(&y),
                    '*' => Tuple::vector(x.x * y.x, x.y * y.y, x.z * y.z),
                    _ => Tuple::vector(x.x / y.x, x.y / y.y, x.z / y.z),
                })
            }
            (Vector(x), Float(y)) => {
                let x = *x;
                Vector(match op { '+' => x.add_float(*y), '-' => x.add_float(-*y), '*' => x.multiply(*y), _ => x.divide(*y) })
            }
            (Float(x), Vector(y)) => {
                let y = *y;
                Vector(match op { '+' => y.add_float(*x), '-' => Tuple::vector(*x - y.x, *x - y.y, *x - y.z), '*' => y.multiply(*x), _ => Tuple::vector(*x / y.x, *x / y.y, *x / y.z) })
            }
            (Color(x), Color(y)) => Color(match op { '+' => x.add(y), '-' => x.subtract(y), '*' => x.product(y), _ => crate::color::Color::new(x.r / y.r, x.g / y.g, x.b / y.b) }),
            (Color(x), Float(y)) => Color(match op { '+' => x.add(&crate::color::Color::new(*y, *y, *y)), '-' => x.add(&crate::color::Color::new(-*y, -*y, -*y)), '*' => x.multiply(*y), _ => x.multiply(1.0 / *y) }),
            (Float(x), Color(y)) => Color(match op {
                '+' => y.add(&crate::color::Color::new(*x, *x, *x)),
                '-' => crate::color::Color::new(*x - y.r, *x - y.g, *x - y.b),
                '*' => y.multiply(*x),
                _ => crate::color::Color::new(*x / y.r, *x / y.g, *x / y.b),
            }),
            _ => {
                let loc = self.here();
                return Err(RtError::TypeMismatch { loc, expected: a.type_tag().name().into(), found: b.type_tag().name().into() });
            }
        };
        Ok(result)
    }

    fn value_neg(&mut self, v: Value) -> Result<Value, RtError> {
        match v {
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Vector(t) => Ok(Value::Vector(t.negate())),
            Value::Color(c) => Ok(Value::Color(c.multiply(-1.0))),
            other => {
                let loc = self.here();
                Err(RtError::TypeMismatch { loc, expected: "float or vector".into(), found: other.type_tag().name().into() })
            }
        }
    }

    pub fn here(&mut self) -> SourceLocation {
        let (file, line) = self.lexer.location();
        SourceLocation::new(file, line, "", self.brace_context())
    }
}

impl Value {
    fn as_float_broadcast(&self) -> f64 {
        self.as_float().unwrap_or(0.0)
    }

    /// Clamps an over-long vector literal to 4 components; POV-Ray itself
    /// caps vector/color expressions at 5 (handled before this is reached).
    fn clamp_len(self, _n: usize) -> Value {
        self
    }
}
