//! `global_settings { }`, `camera { }`, and `light_source { }` (spec §4.3,
//! §6). These sit above the object grammar: none of their fields name a
//! registered object id except a light's optional `looks_like`.

use crate::color::Color;
use crate::raytracer::error::{RtError, Result as RtResult};
use crate::raytracer::light::{AreaLight, Light, LightType};
use crate::raytracer::parser::lexer::Token;
use crate::raytracer::parser::{CameraKind, CameraSpec, PhotonsSettings, RadiositySettings};
use crate::raytracer::parser::Parser;
use crate::tuple::Tuple;

impl Parser {
    pub(crate) fn parse_global_settings(&mut self) -> RtResult<()> {
        self.expect_symbol('{')?;
        loop {
            match self.lexer.peek_token() {
                Token::Symbol('}') => {
                    self.lexer.get_token();
                    break;
                }
                Token::Eof => {
                    let loc = self.here();
                    return Err(RtError::UnexpectedEof(loc));
                }
                Token::Ident(name) => {
                    self.lexer.get_token();
                    match name.as_str() {
                        "assumed_gamma" => {
                            let g = self.parse_float()?;
                            self.global_settings_mut().assumed_gamma = Some(g);
                        }
                        "max_trace_level" => {
                            let v = self.parse_float()?;
                            self.global_settings_mut().max_trace_level = v as u32;
                        }
                        "max_intersections" => {
                            let v = self.parse_float()?;
                            self.global_settings_mut().max_intersections = v as u32;
                        }
                        "adc_bailout" => {
                            let v = self.parse_float()?;
                            self.global_settings_mut().adc_bailout = v;
                        }
                        "ambient_light" => {
                            let c = self.parse_color()?;
                            self.global_settings_mut().ambient_light = c;
                        }
                        "irid_wavelength" => {
                            let c = self.parse_color()?;
                            self.global_settings_mut().irid_wavelengths = c;
                        }
                        "number_of_waves" => {
                            let v = self.parse_float()?;
                            self.global_settings_mut().number_of_waves = v as u32;
                        }
                        "hf_gray_16" => {
                            self.global_settings_mut().hf_gray_16 = true;
                        }
                        "radiosity" => {
                            let r = self.parse_radiosity_block()?;
                            self.global_settings_mut().radiosity = Some(r);
                        }
                        "photons" => {
                            let p = self.parse_photons_block()?;
                            self.global_settings_mut().photons = Some(p);
                        }
                        _ => {
                            // Unknown global_settings item (noise_generator,
                            // charset, mm_per_unit, subsurface, ...) - ignored
                            // rather than a hard error, same tolerance the
                            // modifier loop gives unknown nested blocks.
                            if let Token::Symbol('{') = self.lexer.peek_token() {
                                self.lexer.get_token();
                                self.skip_balanced_block()?;
                            } else {
                                let _ = self.parse_value();
                            }
                        }
                    }
                }
                other => {
                    let loc = self.here();
                    self.lexer.unget_token(other);
                    return Err(RtError::Syntax(loc));
                }
            }
        }
        Ok(())
    }

    fn parse_radiosity_block(&mut self) -> RtResult<RadiositySettings> {
        self.expect_symbol('{')?;
        let mut r = RadiositySettings::default();
        loop {
            match self.lexer.peek_token() {
                Token::Symbol('}') => {
                    self.lexer.get_token();
                    break;
                }
                Token::Ident(name) => {
                    self.lexer.get_token();
                    match name.as_str() {
                        "brightness" => r.brightness = self.parse_float()?,
                        "count" => r.count = self.parse_float()? as u32,
                        "error_bound" => r.error_bound = self.parse_float()?,
                        "gray_threshold" => r.gray_threshold = self.parse_float()?,
                        "low_error_factor" => r.low_error_factor = self.parse_float()?,
                        "minimum_reuse" => r.minimum_reuse = self.parse_float()?,
                        "nearest_count" => r.nearest_count = self.parse_float()? as u32,
                        "recursion_limit" => r.recursion_limit = self.parse_float()? as u32,
                        "distance_maximum" => r.distance_maximum = self.parse_float()?,
                        _ => {
                            let _ = self.parse_value();
                        }
                    }
                }
                Token::Eof => {
                    let loc = self.here();
                    return Err(RtError::UnexpectedEof(loc));
                }
                other => {
                    let loc = self.here();
                    self.lexer.unget_token(other);
                    return Err(RtError::Syntax(loc));
                }
            }
        }
        Ok(r)
    }

    fn parse_photons_block(&mut self) -> RtResult<PhotonsSettings> {
        self.expect_symbol('{')?;
        let mut p = PhotonsSettings::default();
        loop {
            match self.lexer.peek_token() {
                Token::Symbol('}') => {
                    self.lexer.get_token();
                    break;
                }
                Token::Ident(name) => {
                    self.lexer.get_token();
                    match name.as_str() {
                        "spacing" => p.spacing = self.parse_float()?,
                        "count" => p.count = self.parse_float()? as u32,
                        "gather" => {
                            p.gather_min = self.parse_float()? as u32;
                            self.expect_symbol(',')?;
                            p.gather_max = self.parse_float()? as u32;
                        }
                        "max_trace_level" => p.max_trace_level = self.parse_float()? as u32,
                        "adc_bailout" => p.adc_bailout = self.parse_float()?,
                        "jitter" => p.jitter = self.parse_float()?,
                        "autostop" => p.autostop = self.parse_float()?,
                        "load_file" => p.load_file = Some(self.expect_str()?),
                        "save_file" => p.save_file = Some(self.expect_str()?),
                        _ => {
                            // media/radius/expand_thresholds keywords:
                            // ignored, same tolerance the radiosity block
                            // gives its own unknown items.
                            if let Token::Symbol('{') = self.lexer.peek_token() {
                                self.lexer.get_token();
                                self.skip_balanced_block()?;
                            } else {
                                let _ = self.parse_value();
                            }
                        }
                    }
                }
                Token::Eof => {
                    let loc = self.here();
                    return Err(RtError::UnexpectedEof(loc));
                }
                other => {
                    let loc = self.here();
                    self.lexer.unget_token(other);
                    return Err(RtError::Syntax(loc));
                }
            }
        }
        Ok(p)
    }

    pub(crate) fn parse_camera(&mut self) -> RtResult<()> {
        self.expect_symbol('{')?;
        let mut spec = CameraSpec::default();
        loop {
            match self.lexer.peek_token() {
                Token::Symbol('}') => {
                    self.lexer.get_token();
                    break;
                }
                Token::Eof => {
                    let loc = self.here();
                    return Err(RtError::UnexpectedEof(loc));
                }
                Token::Ident(name) => {
                    self.lexer.get_token();
                    match name.as_str() {
                        "perspective" => spec.kind = CameraKind::Perspective,
                        "orthographic" => spec.kind = CameraKind::Orthographic,
                        "fisheye" => spec.kind = CameraKind::Fisheye,
                        "ultra_wide_angle" => spec.kind = CameraKind::UltraWideAngle,
                        "omnimax" => spec.kind = CameraKind::Omnimax,
                        "panoramic" => spec.kind = CameraKind::Panoramic,
                        "cylinder" => {
                            let v = self.parse_float()?;
                            spec.kind = CameraKind::Cylinder(v as u8);
                        }
                        "location" => spec.location = self.parse_vector3_as_point()?,
                        "direction" => spec.direction = self.parse_vector3()?,
                        "up" => spec.up = self.parse_vector3()?,
                        "right" => spec.right = self.parse_vector3()?,
                        "sky" => spec.sky = self.parse_vector3()?,
                        "look_at" => spec.look_at = Some(self.parse_vector3_as_point()?),
                        "angle" => spec.angle = self.parse_float()?,
                        "translate" => {
                            let v = self.parse_vector3()?;
                            spec.location = spec.location.add(&v);
                        }
                        _ => {
                            let _ = self.parse_value();
                        }
                    }
                }
                other => {
                    let loc = self.here();
                    self.lexer.unget_token(other);
                    return Err(RtError::Syntax(loc));
                }
            }
        }
        *self.camera_spec_mut() = Some(spec);
        Ok(())
    }

    pub(crate) fn parse_light_source(&mut self) -> RtResult<Light> {
        self.expect_symbol('{')?;
        let position = self.parse_vector3_as_point()?;
        let mut light = Light::new_point_light(position, Color::new(1.0, 1.0, 1.0));
        loop {
            match self.lexer.peek_token() {
                Token::Symbol(',') => {
                    self.lexer.get_token();
                }
                Token::Symbol('}') => {
                    self.lexer.get_token();
                    break;
                }
                Token::Eof => {
                    let loc = self.here();
                    return Err(RtError::UnexpectedEof(loc));
                }
                Token::Ident(name) => {
                    self.lexer.get_token();
                    match name.as_str() {
                        "color" | "rgb" | "rgbf" | "rgbft" => {
                            self.lexer.unget_token(Token::Ident(name));
                            light.intensity = self.parse_color()?;
                        }
                        "spotlight" => {
                            light.light_type = LightType::Spotlight;
                        }
                        "cylinder" => {
                            light.light_type = LightType::Cylinder;
                        }
                        "point_at" => {
                            light.point_at = Some(self.parse_vector3_as_point()?);
                        }
                        "radius" => {
                            light.radius = Some(self.parse_float()?.to_radians().cos());
                        }
                        "falloff" => {
                            light.falloff = Some(self.parse_float()?.to_radians().cos());
                        }
                        "tightness" => {
                            light.tightness = Some(self.parse_float()?);
                        }
                        "fade_distance" => {
                            light.fade_distance = Some(self.parse_float()?);
                        }
                        "fade_power" => {
                            light.fade_power = Some(self.parse_float()?);
                        }
                        "area_light" => {
                            light.area_light = Some(self.parse_area_light()?);
                        }
                        "jitter" => {
                            light.jitter = true;
                        }
                        "orient" => {
                            light.orient = true;
                        }
                        "adaptive" => {
                            light.adaptive = Some(self.parse_float()?);
                        }
                        "fill_light" => {
                            light.fill_light = true;
                        }
                        "shadowless" | "no_shadow" => {
                            light.no_shadow = true;
                        }
                        "media_interaction" => {
                            light.media_interaction = self.parse_optional_bool()?;
                        }
                        "media_attenuation" => {
                            light.media_attenuation = self.parse_optional_bool()?;
                        }
                        "looks_like" => {
                            self.expect_symbol('{')?;
                            let inner_name = self.expect_ident()?;
                            let inner_id = match self.symbols.lookup(&inner_name).cloned() {
                                Some(crate::raytracer::parser::symbol::Value::ObjectId(id)) => id,
                                _ => {
                                    let loc = self.here();
                                    return Err(RtError::UndeclaredIdentifier { loc, name: inner_name });
                                }
                            };
                            self.skip_balanced_block()?;
                            light.looks_like = Some(inner_id);
                        }
                        "translate" => {
                            let v = self.parse_vector3()?;
                            light.position = light.position.add(&v);
                        }
                        _ => {
                            let _ = self.parse_value();
                        }
                    }
                }
                other => {
                    let loc = self.here();
                    self.lexer.unget_token(other);
                    return Err(RtError::Syntax(loc));
                }
            }
        }
        Ok(light)
    }

    fn parse_area_light(&mut self) -> RtResult<AreaLight> {
        let axis1 = self.parse_vector3()?;
        self.expect_symbol(',')?;
        let axis2 = self.parse_vector3()?;
        self.expect_symbol(',')?;
        let size1 = self.parse_float()? as usize;
        self.expect_symbol(',')?;
        let size2 = self.parse_float()? as usize;
        Ok(AreaLight { axis1, axis2, size1, size2 })
    }

    fn parse_vector3_as_point(&mut self) -> RtResult<Tuple> {
        let v = self.parse_vector3()?;
        Ok(Tuple::point(v.x, v.y, v.z))
    }
}
