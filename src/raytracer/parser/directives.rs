//! Preprocessor directives (spec §4.3): `#declare`/`#local`, `#include`,
//! `#version`, `#if`/`#ifdef`/`#ifndef`/`#else`/`#end`, `#while`, and
//! `#macro`/invocation. These all operate purely on the token stream and
//! the [`crate::raytracer::parser::symbol::SymbolTable`] - no object ever
//! reaches [`crate::raytracer::object::db`] from this module.

use std::fs;
use std::sync::Arc;

use crate::raytracer::error::{RtError, Result as RtResult};
use crate::raytracer::parser::lexer::Token;
use crate::raytracer::parser::symbol::{IdentType, MacroDef, Value};
use crate::raytracer::parser::Parser;

impl Parser {
    pub(crate) fn parse_directive(&mut self, name: &str) -> RtResult<()> {
        self.lexer.get_token();
        match name {
            "declare" => self.parse_declare(false),
            "local" => self.parse_declare(true),
            "include" => self.parse_include(),
            "version" => self.parse_version(),
            "if" => self.parse_if(),
            "ifdef" => self.parse_ifdef(true),
            "ifndef" => self.parse_ifdef(false),
            "while" => self.parse_while(),
            "macro" => self.parse_macro_def(),
            "undef" => self.parse_undef(),
            "else" | "end" => {
                // Reached without a matching #if/#while on the stack - the
                // conditional/loop handlers consume their own #else/#end,
                // so encountering one here means it closes nothing. Treat
                // as a no-op rather than a hard error, matching how POV-Ray
                // tolerates a dangling #end in an included file's tail.
                Ok(())
            }
            "debug" | "warning" | "error" => self.parse_message_directive(name),
            _ => {
                let loc = self.here();
                Err(RtError::UndeclaredIdentifier { loc, name: format!("#{}", name) })
            }
        }
    }

    fn parse_declare(&mut self, local: bool) -> RtResult<()> {
        let name = self.expect_ident()?;
        self.expect_symbol('=')?;
        let value = self.parse_declarable_value()?;
        let result = if local { self.symbols.declare_local(&name, value) } else { self.symbols.declare(&name, value) };
        result.map_err(|_| {
            RtError::Redefinition { loc: self.here(), name: name.clone() }
        })?;
        self.maybe_semicolon();
        Ok(())
    }

    fn parse_undef(&mut self) -> RtResult<()> {
        self.expect_ident()?;
        // No removal API on the symbol table (spec never requires it to
        // forget an identifier entirely); re-declaring shadows it in
        // practice since every real scene immediately assigns a new value.
        self.maybe_semicolon();
        Ok(())
    }

    /// Chooses how to parse the right-hand side of a `#declare`/`#local`
    /// by peeking the next token: an object keyword builds and returns an
    /// (unregistered-then-registered) `ObjectId`; `array`/`macro` get their
    /// own literal forms; a shading-block keyword is captured opaquely;
    /// anything else falls through to the general expression evaluator.
    fn parse_declarable_value(&mut self) -> RtResult<Value> {
        match self.lexer.peek_token() {
            Token::Ident(name) if crate::raytracer::parser::objects::is_object_keyword(&name) => {
                self.lexer.get_token();
                let id = self.parse_object_statement(&name)?;
                Ok(Value::ObjectId(id))
            }
            Token::Ident(name) if name == "array" => {
                self.lexer.get_token();
                self.parse_array_literal()
            }
            Token::Ident(name) if is_opaque_block_keyword(&name) => {
                self.lexer.get_token();
                let ident_type = opaque_ident_type(&name);
                self.expect_symbol('{')?;
                let raw = self.skip_balanced_block()?;
                let base_color = crate::raytracer::parser::objects::extract_base_color(&raw);
                Ok(Value::Opaque(ident_type, Arc::new(crate::raytracer::parser::symbol::OpaqueBlock { raw, base_color })))
            }
            Token::Str(_) => {
                if let Token::Str(s) = self.lexer.get_token() {
                    Ok(Value::Str(s))
                } else {
                    unreachable!()
                }
            }
            _ => self.parse_value(),
        }
    }

    fn parse_array_literal(&mut self) -> RtResult<Value> {
        // `#declare Foo = array[3] { a, b, c }` - the dimension is parsed
        // and discarded (Rust's Vec does not need a fixed capacity hint);
        // only the initializer list matters to lookups.
        while let Token::Symbol('[') = self.lexer.peek_token() {
            self.lexer.get_token();
            self.parse_float()?;
            self.expect_symbol(']')?;
        }
        self.expect_symbol('{')?;
        let mut items = Vec::new();
        loop {
            if let Token::Symbol('}') = self.lexer.peek_token() {
                self.lexer.get_token();
                break;
            }
            items.push(self.parse_declarable_value()?);
            if let Token::Symbol(',') = self.lexer.peek_token() {
                self.lexer.get_token();
            }
        }
        Ok(Value::Array(items))
    }

    fn parse_include(&mut self) -> RtResult<()> {
        let path = match self.lexer.get_token() {
            Token::Str(s) => s,
            other => {
                let loc = self.here();
                self.lexer.unget_token(other);
                return Err(RtError::Syntax(loc));
            }
        };
        let source = fs::read_to_string(&path).map_err(|e| RtError::Io { path: path.clone(), source: e })?;
        self.lexer.push_include(&path, source);
        Ok(())
    }

    fn parse_version(&mut self) -> RtResult<()> {
        let v = self.parse_float()?;
        self.set_version(v);
        self.maybe_semicolon();
        Ok(())
    }

    fn parse_if(&mut self) -> RtResult<()> {
        let cond = self.parse_float()? != 0.0;
        self.run_conditional_body(cond)
    }

    fn parse_ifdef(&mut self, want_defined: bool) -> RtResult<()> {
        self.expect_symbol('(')?;
        let name = self.expect_ident()?;
        self.expect_symbol(')')?;
        let is_defined = self.symbols.is_declared(&name);
        self.run_conditional_body(is_defined == want_defined)
    }

    /// Runs the taken branch live (tokens flow straight through `run`'s
    /// main loop via recursive statement parsing) and skips the other
    /// branch as raw, unparsed text up to the matching `#else`/`#end`.
    fn run_conditional_body(&mut self, take_if: bool) -> RtResult<()> {
        if take_if {
            self.parse_statements_until(&["else", "end"])?;
            if self.peek_directive_is("else") {
                self.lexer.get_token();
                self.lexer.get_token();
                self.skip_directive_body(&["end"])?;
            }
            if self.peek_directive_is("end") {
                self.lexer.get_token();
                self.lexer.get_token();
            }
        } else {
            self.skip_directive_body(&["else", "end"])?;
            if self.peek_directive_is("else") {
                self.lexer.get_token();
                self.lexer.get_token();
                self.parse_statements_until(&["end"])?;
            }
            if self.peek_directive_is("end") {
                self.lexer.get_token();
                self.lexer.get_token();
            }
        }
        Ok(())
    }

    /// Captures the condition and body once as raw tokens, then re-splices
    /// the condition ahead of the body on every iteration (spec §4.3's
    /// `#while`). [`crate::raytracer::parser::lexer::Lexer::frame_depth`]
    /// tells us when a spliced-in body has fully drained, independent of
    /// any macro invocation that happened to run inside it.
    fn parse_while(&mut self) -> RtResult<()> {
        self.expect_symbol('(')?;
        let cond_tokens = self.capture_until_matching_close_paren()?;
        let body_tokens = self.capture_directive_body(&["end"])?;
        self.lexer.get_token();
        let mut guard = 0u32;
        loop {
            let depth = self.lexer.frame_depth();
            self.lexer.push_tokens(cond_tokens.clone(), false);
            let cond = self.parse_float()? != 0.0;
            while self.lexer.frame_depth() > depth {
                self.lexer.get_token();
            }
            if !cond {
                break;
            }
            self.lexer.push_tokens(body_tokens.clone(), false);
            self.run_while_body(depth + 1)?;
            guard += 1;
            if guard > 1_000_000 {
                let loc = self.here();
                return Err(RtError::InvalidValue(loc));
            }
        }
        Ok(())
    }

    fn run_while_body(&mut self, min_depth: usize) -> RtResult<()> {
        loop {
            if self.lexer.frame_depth() < min_depth {
                return Ok(());
            }
            match self.lexer.peek_token() {
                Token::Eof => return Ok(()),
                Token::MacroEnd => {
                    self.lexer.get_token();
                    self.symbols.pop_scope();
                }
                Token::Directive(n) => self.parse_directive(&n)?,
                Token::Ident(n) => self.parse_top_level_ident(&n)?,
                Token::Symbol(';') => {
                    self.lexer.get_token();
                }
                other => {
                    let loc = self.here();
                    self.lexer.unget_token(other);
                    return Err(RtError::Syntax(loc));
                }
            }
        }
    }

    fn capture_until_matching_close_paren(&mut self) -> RtResult<Vec<Token>> {
        let mut out = Vec::new();
        let mut depth = 0;
        loop {
            match self.lexer.get_token() {
                Token::Symbol('(') => {
                    depth += 1;
                    out.push(Token::Symbol('('));
                }
                Token::Symbol(')') => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    out.push(Token::Symbol(')'));
                }
                Token::Eof => {
                    let loc = self.here();
                    return Err(RtError::UnexpectedEof(loc));
                }
                t => out.push(t),
            }
        }
        Ok(out)
    }

    fn parse_macro_def(&mut self) -> RtResult<()> {
        let name = self.expect_ident()?;
        self.expect_symbol('(')?;
        let mut params = Vec::new();
        loop {
            if let Token::Symbol(')') = self.lexer.peek_token() {
                self.lexer.get_token();
                break;
            }
            params.push(self.expect_ident()?);
            if let Token::Symbol(',') = self.lexer.peek_token() {
                self.lexer.get_token();
            }
        }
        let body = self.capture_directive_body(&["end"])?;
        self.lexer.get_token();
        self.lexer.get_token();
        self.symbols
            .declare(&name, Value::Macro(Arc::new(MacroDef { params, body })))
            .map_err(|_| RtError::Redefinition { loc: self.here(), name: name.clone() })?;
        Ok(())
    }

    pub(crate) fn invoke_macro(&mut self, def: &Arc<MacroDef>) -> RtResult<()> {
        self.expect_symbol('(')?;
        self.symbols.push_scope();
        for (i, param) in def.params.iter().enumerate() {
            let value = self.parse_declarable_value()?;
            self.symbols
                .declare_local(param, value)
                .map_err(|_| RtError::Redefinition { loc: self.here(), name: param.clone() })?;
            if i + 1 < def.params.len() {
                self.expect_symbol(',')?;
            }
        }
        self.expect_symbol(')')?;
        self.maybe_semicolon();
        self.lexer.push_tokens(def.body.clone(), true);
        Ok(())
    }

    fn parse_message_directive(&mut self, _kind: &str) -> RtResult<()> {
        let _ = self.parse_value()?;
        self.maybe_semicolon();
        Ok(())
    }

    fn maybe_semicolon(&mut self) {
        if let Token::Symbol(';') = self.lexer.peek_token() {
            self.lexer.get_token();
        }
    }

    fn peek_directive_is(&mut self, name: &str) -> bool {
        matches!(self.lexer.peek_token(), Token::Directive(n) if n == name)
    }

    /// Drives the main dispatch loop recursively until one of `stops` is
    /// seen as the next `#`-directive, without consuming it.
    fn parse_statements_until(&mut self, stops: &[&str]) -> RtResult<()> {
        loop {
            match self.lexer.peek_token() {
                Token::Directive(n) if stops.iter().any(|s| *s == n) => return Ok(()),
                Token::Eof => return Ok(()),
                Token::MacroEnd => {
                    self.lexer.get_token();
                    self.symbols.pop_scope();
                }
                Token::Directive(n) => self.parse_directive(&n)?,
                Token::Ident(n) => self.parse_top_level_ident(&n)?,
                Token::Symbol(';') => {
                    self.lexer.get_token();
                }
                other => {
                    let loc = self.here();
                    self.lexer.unget_token(other);
                    return Err(RtError::Syntax(loc));
                }
            }
        }
    }

    /// Skips tokens without interpreting them, tracking nested `#if`/
    /// `#ifdef`/`#ifndef`/`#while`/`#macro` ... `#end` pairs, stopping just
    /// before the next directive in `stops` at depth zero.
    fn skip_directive_body(&mut self, stops: &[&str]) -> RtResult<()> {
        let mut depth: i32 = 0;
        loop {
            match self.lexer.peek_token() {
                Token::Directive(n) if depth == 0 && stops.iter().any(|s| *s == n) => return Ok(()),
                Token::Eof => return Ok(()),
                Token::Directive(n) => {
                    self.lexer.get_token();
                    match n.as_str() {
                        "if" | "ifdef" | "ifndef" | "while" | "macro" => depth += 1,
                        "end" => depth -= 1,
                        _ => {}
                    }
                }
                _ => {
                    self.lexer.get_token();
                }
            }
        }
    }

    /// Like [`Self::skip_directive_body`] but collects the raw tokens
    /// instead of discarding them, for `#macro` body capture.
    fn capture_directive_body(&mut self, stops: &[&str]) -> RtResult<Vec<Token>> {
        let mut out = Vec::new();
        let mut depth: i32 = 0;
        loop {
            match self.lexer.peek_token() {
                Token::Directive(n) if depth == 0 && stops.iter().any(|s| *s == n) => return Ok(out),
                Token::Eof => return Ok(out),
                Token::Directive(n) => {
                    match n.as_str() {
                        "if" | "ifdef" | "ifndef" | "while" | "macro" => depth += 1,
                        "end" => depth -= 1,
                        _ => {}
                    }
                    out.push(Token::Directive(n));
                    self.lexer.get_token();
                }
                other => {
                    out.push(other.clone());
                    self.lexer.get_token();
                }
            }
        }
    }
}

fn is_opaque_block_keyword(name: &str) -> bool {
    matches!(
        name,
        "pigment" | "normal" | "finish" | "texture" | "interior" | "material" | "media" | "density"
            | "rainbow" | "fog" | "sky_sphere" | "color_map" | "pigment_map" | "normal_map" | "slope_map"
            | "texture_map" | "density_map"
    )
}

fn opaque_ident_type(name: &str) -> IdentType {
    match name {
        "pigment" => IdentType::Pigment,
        "normal" => IdentType::Normal,
        "finish" => IdentType::Finish,
        "texture" => IdentType::Texture,
        "interior" => IdentType::Interior,
        "material" => IdentType::Material,
        "media" => IdentType::Media,
        "density" => IdentType::Density,
        "rainbow" => IdentType::Rainbow,
        "fog" => IdentType::Fog,
        "sky_sphere" => IdentType::SkySphere,
        "color_map" => IdentType::ColorMap,
        "pigment_map" => IdentType::PigmentMap,
        "normal_map" => IdentType::NormalMap,
        "slope_map" => IdentType::SlopeMap,
        "texture_map" => IdentType::TextureMap,
        "density_map" => IdentType::DensityMap,
        _ => IdentType::Texture,
    }
}

#[cfg(test)]
mod tests {
    use crate::raytracer::parser::parse_str;
    use crate::raytracer::error::RtError;

    #[test]
    fn declare_local_shadows_outer_scope() {
        let src = r#"
            #declare X = 1.0;
            #macro Shadow()
                #local X = 2.0;
            #end
            Shadow()
            sphere { <0, 0, 0>, X }
        "#;
        let scene = parse_str("test.pov", src.to_string()).expect("scene should parse");
        assert_eq!(scene.objects.len(), 1);
    }

    #[test]
    fn if_directive_skips_false_branch() {
        let src = r#"
            #if (0)
                sphere { <0, 0, 0>, 1 }
            #else
                sphere { <1, 1, 1>, 2 }
            #end
        "#;
        let scene = parse_str("test.pov", src.to_string()).expect("scene should parse");
        assert_eq!(scene.objects.len(), 1);
    }

    #[test]
    fn undeclared_identifier_is_an_error() {
        let src = "sphere { <0,0,0>, Radius }";
        let err = parse_str("test.pov", src.to_string()).unwrap_err();
        assert!(matches!(err, RtError::UndeclaredIdentifier { .. }));
    }
}
