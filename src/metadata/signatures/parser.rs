//! Recursive-descent parser for signature blobs (ECMA-335 §II.23.2).

use crate::{
    file::parser::Parser,
    metadata::signatures::types::{
        CallingConvention, CustomModifier, SignatureArray, SignatureField, SignatureMethod,
        SignatureMethodSpec, SignatureParameter, SignatureProperty, TypeSignature, ELEMENT_TYPE,
        SIGNATURE_HEADER,
    },
    Error::RecursionLimit,
    Result,
};

/// Maximum nesting of types inside one signature.
const MAX_RECURSION_DEPTH: usize = 50;

/// Parses signature blobs into [`TypeSignature`] trees.
///
/// The parser owns a [`Parser`] over a single blob and tracks the nesting depth so that
/// self-referencing or absurdly deep blobs fail with [`crate::Error::RecursionLimit`] instead of
/// exhausting the stack.
pub struct SignatureParser<'a> {
    parser: Parser<'a>,
    depth: usize,
}

impl<'a> SignatureParser<'a> {
    /// Creates a parser over the bytes of one blob entry.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        SignatureParser {
            parser: Parser::new(data),
            depth: 0,
        }
    }

    /// Wraps an existing blob parser, e.g. one returned by [`crate::metadata::streams::Blob::get`].
    #[must_use]
    pub fn from_parser(parser: Parser<'a>) -> Self {
        SignatureParser { parser, depth: 0 }
    }

    /// Parses a single `Type` production.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an unknown element type, or
    /// [`crate::Error::RecursionLimit`] when types nest too deeply.
    pub fn parse_type(&mut self) -> Result<TypeSignature> {
        self.depth += 1;
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        let result = self.parse_type_inner();
        self.depth -= 1;
        result
    }

    fn parse_type_inner(&mut self) -> Result<TypeSignature> {
        let current_byte = self.parser.read_le::<u8>()?;
        match current_byte {
            ELEMENT_TYPE::VOID => Ok(TypeSignature::Void),
            ELEMENT_TYPE::BOOLEAN => Ok(TypeSignature::Boolean),
            ELEMENT_TYPE::CHAR => Ok(TypeSignature::Char),
            ELEMENT_TYPE::I1 => Ok(TypeSignature::I1),
            ELEMENT_TYPE::U1 => Ok(TypeSignature::U1),
            ELEMENT_TYPE::I2 => Ok(TypeSignature::I2),
            ELEMENT_TYPE::U2 => Ok(TypeSignature::U2),
            ELEMENT_TYPE::I4 => Ok(TypeSignature::I4),
            ELEMENT_TYPE::U4 => Ok(TypeSignature::U4),
            ELEMENT_TYPE::I8 => Ok(TypeSignature::I8),
            ELEMENT_TYPE::U8 => Ok(TypeSignature::U8),
            ELEMENT_TYPE::R4 => Ok(TypeSignature::R4),
            ELEMENT_TYPE::R8 => Ok(TypeSignature::R8),
            ELEMENT_TYPE::STRING => Ok(TypeSignature::String),
            ELEMENT_TYPE::TYPEDBYREF => Ok(TypeSignature::TypedByRef),
            ELEMENT_TYPE::I => Ok(TypeSignature::I),
            ELEMENT_TYPE::U => Ok(TypeSignature::U),
            ELEMENT_TYPE::OBJECT => Ok(TypeSignature::Object),
            ELEMENT_TYPE::PTR => {
                // modifiers on pointee types carry no meaning for member matching
                self.skip_custom_mods()?;
                Ok(TypeSignature::Ptr(Box::new(self.parse_type()?)))
            }
            ELEMENT_TYPE::BYREF => Ok(TypeSignature::ByRef(Box::new(self.parse_type()?))),
            ELEMENT_TYPE::VALUETYPE => Ok(TypeSignature::ValueType(
                self.parser.read_compressed_token()?,
            )),
            ELEMENT_TYPE::CLASS => Ok(TypeSignature::Class(self.parser.read_compressed_token()?)),
            ELEMENT_TYPE::VAR => Ok(TypeSignature::GenericParamType(
                self.parser.read_compressed_uint()?,
            )),
            ELEMENT_TYPE::MVAR => Ok(TypeSignature::GenericParamMethod(
                self.parser.read_compressed_uint()?,
            )),
            ELEMENT_TYPE::ARRAY => {
                let elem_type = self.parse_type()?;
                let rank = self.parser.read_compressed_uint()?;
                if rank == 0 {
                    return Err(malformed_error!("ARRAY - rank must not be zero"));
                }

                let num_sizes = self.parser.read_compressed_uint()?;
                if num_sizes > rank {
                    return Err(malformed_error!(
                        "ARRAY - {} sizes for rank {}",
                        num_sizes,
                        rank
                    ));
                }
                let mut sizes = Vec::with_capacity(num_sizes as usize);
                for _ in 0..num_sizes {
                    sizes.push(self.parser.read_compressed_uint()?);
                }

                let num_lo_bounds = self.parser.read_compressed_uint()?;
                if num_lo_bounds > rank {
                    return Err(malformed_error!(
                        "ARRAY - {} lower bounds for rank {}",
                        num_lo_bounds,
                        rank
                    ));
                }
                let mut lower_bounds = Vec::with_capacity(num_lo_bounds as usize);
                for _ in 0..num_lo_bounds {
                    lower_bounds.push(self.parser.read_compressed_int()?);
                }

                Ok(TypeSignature::Array(SignatureArray {
                    base: Box::new(elem_type),
                    rank,
                    sizes,
                    lower_bounds,
                }))
            }
            ELEMENT_TYPE::SZARRAY => {
                self.skip_custom_mods()?;
                Ok(TypeSignature::SzArray(Box::new(self.parse_type()?)))
            }
            ELEMENT_TYPE::GENERICINST => {
                let peek_byte = self.parser.peek_byte()?;
                if peek_byte != ELEMENT_TYPE::CLASS && peek_byte != ELEMENT_TYPE::VALUETYPE {
                    return Err(malformed_error!(
                        "GENERICINST - Next byte is not TYPE_CLASS or TYPE_VALUE - {}",
                        peek_byte
                    ));
                }

                let base_type = self.parse_type()?;
                let arg_count = self.parser.read_compressed_uint()?;
                if arg_count == 0 {
                    return Err(malformed_error!("GENERICINST - no type arguments"));
                }

                let mut type_args = Vec::with_capacity(arg_count.min(64) as usize);
                for _ in 0..arg_count {
                    type_args.push(self.parse_type()?);
                }

                Ok(TypeSignature::GenericInst(Box::new(base_type), type_args))
            }
            ELEMENT_TYPE::FNPTR => Ok(TypeSignature::FnPtr(Box::new(
                self.parse_method_signature()?,
            ))),
            ELEMENT_TYPE::PINNED => Ok(TypeSignature::Pinned(Box::new(self.parse_type()?))),
            ELEMENT_TYPE::CMOD_REQD | ELEMENT_TYPE::CMOD_OPT => {
                // nested modifier in front of a type, e.g. inside generic arguments
                self.parser.read_compressed_token()?;
                self.parse_type_inner()
            }
            _ => Err(malformed_error!(
                "Unsupported ELEMENT_TYPE - {:#x}",
                current_byte
            )),
        }
    }

    /// Parse custom modifiers (`CMOD_OPT` or `CMOD_REQD`)
    fn parse_custom_mods(&mut self) -> Result<Vec<CustomModifier>> {
        let mut mods = Vec::new();

        while self.parser.has_more_data() {
            let next_byte = self.parser.peek_byte()?;
            if next_byte != ELEMENT_TYPE::CMOD_OPT && next_byte != ELEMENT_TYPE::CMOD_REQD {
                break;
            }

            self.parser.advance()?;
            mods.push(CustomModifier {
                required: next_byte == ELEMENT_TYPE::CMOD_REQD,
                modifier: self.parser.read_compressed_token()?,
            });
        }

        Ok(mods)
    }

    fn skip_custom_mods(&mut self) -> Result<()> {
        self.parse_custom_mods().map(|_| ())
    }

    /// Parse a parameter including custom modifiers (the return type counts as parameter)
    fn parse_param(&mut self) -> Result<SignatureParameter> {
        let modifiers = self.parse_custom_mods()?;

        let mut by_ref = false;
        if self.parser.peek_byte()? == ELEMENT_TYPE::BYREF {
            self.parser.advance()?;
            by_ref = true;
        }

        Ok(SignatureParameter {
            modifiers,
            by_ref,
            base: self.parse_type()?,
        })
    }

    /// Parses a `MethodDefSig`, `MethodRefSig` or `StandAloneMethodSig`.
    ///
    /// For vararg signatures the parameters after the `SENTINEL` marker are returned in
    /// [`SignatureMethod::varargs`].
    ///
    /// # Errors
    /// Returns an error if the blob is truncated, uses an unknown calling convention, or holds
    /// an invalid type.
    pub fn parse_method_signature(&mut self) -> Result<SignatureMethod> {
        let convention_byte = self.parser.read_le::<u8>()?;
        let calling_convention = match convention_byte & SIGNATURE_HEADER::KIND_MASK {
            SIGNATURE_HEADER::DEFAULT => CallingConvention::Default,
            SIGNATURE_HEADER::C => CallingConvention::C,
            SIGNATURE_HEADER::STDCALL => CallingConvention::StdCall,
            SIGNATURE_HEADER::THISCALL => CallingConvention::ThisCall,
            SIGNATURE_HEADER::FASTCALL => CallingConvention::FastCall,
            SIGNATURE_HEADER::VARARG => CallingConvention::VarArg,
            other => {
                return Err(malformed_error!(
                    "Invalid method calling convention - {:#x}",
                    other
                ))
            }
        };

        let generic_param_count = if convention_byte & SIGNATURE_HEADER::GENERIC != 0 {
            self.parser.read_compressed_uint()?
        } else {
            0
        };

        let param_count = self.parser.read_compressed_uint()?;
        let return_type = self.parse_param()?;

        let mut params = Vec::with_capacity(param_count.min(256) as usize);
        let mut varargs = Vec::new();
        let mut after_sentinel = false;
        for _ in 0..param_count {
            if self.parser.peek_byte()? == ELEMENT_TYPE::SENTINEL {
                self.parser.advance()?;
                after_sentinel = true;
            }

            let param = self.parse_param()?;
            if after_sentinel {
                varargs.push(param);
            } else {
                params.push(param);
            }
        }

        Ok(SignatureMethod {
            has_this: convention_byte & SIGNATURE_HEADER::HAS_THIS != 0,
            explicit_this: convention_byte & SIGNATURE_HEADER::EXPLICIT_THIS != 0,
            calling_convention,
            generic_param_count,
            return_type,
            params,
            varargs,
        })
    }

    /// Parses a `FieldSig`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the blob does not start with the `FIELD` marker.
    pub fn parse_field_signature(&mut self) -> Result<SignatureField> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte != SIGNATURE_HEADER::FIELD {
            return Err(malformed_error!(
                "SignatureField - invalid start - {:#x}",
                head_byte
            ));
        }

        Ok(SignatureField {
            modifiers: self.parse_custom_mods()?,
            base: self.parse_type()?,
        })
    }

    /// Parses a `PropertySig`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the `PROPERTY` bit is missing from the header.
    pub fn parse_property_signature(&mut self) -> Result<SignatureProperty> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte & SIGNATURE_HEADER::PROPERTY == 0 {
            return Err(malformed_error!(
                "SignatureProperty - invalid start - {:#x}",
                head_byte
            ));
        }

        let param_count = self.parser.read_compressed_uint()?;
        let modifiers = self.parse_custom_mods()?;
        let base = self.parse_type()?;

        let mut params = Vec::with_capacity(param_count.min(256) as usize);
        for _ in 0..param_count {
            params.push(self.parse_param()?);
        }

        Ok(SignatureProperty {
            has_this: head_byte & SIGNATURE_HEADER::HAS_THIS != 0,
            modifiers,
            base,
            params,
        })
    }

    /// Parses a `TypeSpec` blob, which is a single `Type` production.
    ///
    /// # Errors
    /// Returns an error if the blob holds an invalid type.
    pub fn parse_type_spec_signature(&mut self) -> Result<TypeSignature> {
        self.parse_type()
    }

    /// Parses a `MethodSpec` instantiation blob.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the blob does not start with `GENERIC_INST`.
    pub fn parse_method_spec_signature(&mut self) -> Result<SignatureMethodSpec> {
        let head_byte = self.parser.read_le::<u8>()?;
        if head_byte != SIGNATURE_HEADER::GENERIC_INST {
            return Err(malformed_error!(
                "SignatureMethodSpec - invalid start - {:#x}",
                head_byte
            ));
        }

        let arg_count = self.parser.read_compressed_uint()?;
        let mut generic_args = Vec::with_capacity(arg_count.min(64) as usize);
        for _ in 0..arg_count {
            generic_args.push(self.parse_type()?);
        }

        Ok(SignatureMethodSpec { generic_args })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::token::Token, Error};

    #[test]
    fn primitives() {
        let cases: [(u8, TypeSignature); 8] = [
            (0x01, TypeSignature::Void),
            (0x02, TypeSignature::Boolean),
            (0x08, TypeSignature::I4),
            (0x0b, TypeSignature::U8),
            (0x0e, TypeSignature::String),
            (0x18, TypeSignature::I),
            (0x1c, TypeSignature::Object),
            (0x16, TypeSignature::TypedByRef),
        ];

        for (byte, expected) in cases {
            let data = [byte];
            let mut parser = SignatureParser::new(&data);
            assert_eq!(parser.parse_type().unwrap(), expected);
        }
    }

    #[test]
    fn class_and_valuetype() {
        // CLASS TypeRef row 3, VALUETYPE TypeDef row 2
        let mut parser = SignatureParser::new(&[0x12, 0x0D]);
        assert_eq!(
            parser.parse_type().unwrap(),
            TypeSignature::Class(Token::new(0x0100_0003))
        );

        let mut parser = SignatureParser::new(&[0x11, 0x08]);
        assert_eq!(
            parser.parse_type().unwrap(),
            TypeSignature::ValueType(Token::new(0x0200_0002))
        );
    }

    #[test]
    fn generic_instance() {
        // List<!0, int32> where List is TypeRef row 1
        let data = [0x15, 0x12, 0x05, 0x02, 0x13, 0x00, 0x08];
        let mut parser = SignatureParser::new(&data);
        assert_eq!(
            parser.parse_type().unwrap(),
            TypeSignature::GenericInst(
                Box::new(TypeSignature::Class(Token::new(0x0100_0001))),
                vec![TypeSignature::GenericParamType(0), TypeSignature::I4]
            )
        );

        let mut parser = SignatureParser::new(&[0x15, 0x08, 0x01, 0x08]);
        assert!(matches!(parser.parse_type(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn arrays() {
        // int32[0...3, -2...]
        let data = [0x14, 0x08, 0x02, 0x01, 0x04, 0x02, 0x00, 0x7D];
        let mut parser = SignatureParser::new(&data);
        let TypeSignature::Array(array) = parser.parse_type().unwrap() else {
            panic!("expected array");
        };
        assert_eq!(*array.base, TypeSignature::I4);
        assert_eq!(array.rank, 2);
        assert_eq!(array.sizes, vec![4]);
        assert_eq!(array.lower_bounds, vec![0, -2]);

        let mut parser = SignatureParser::new(&[0x1d, 0x1d, 0x0e]);
        assert_eq!(
            parser.parse_type().unwrap(),
            TypeSignature::SzArray(Box::new(TypeSignature::SzArray(Box::new(
                TypeSignature::String
            ))))
        );
    }

    #[test]
    fn method_signature() {
        // instance generic<1> void (int32&, modopt(TypeRef 1) string)
        let data = [0x30, 0x01, 0x02, 0x01, 0x10, 0x08, 0x20, 0x05, 0x0e];
        let mut parser = SignatureParser::new(&data);
        let method = parser.parse_method_signature().unwrap();

        assert!(method.has_this);
        assert!(!method.explicit_this);
        assert_eq!(method.calling_convention, CallingConvention::Default);
        assert_eq!(method.generic_param_count, 1);
        assert_eq!(method.return_type.base, TypeSignature::Void);
        assert_eq!(method.params.len(), 2);
        assert!(method.params[0].by_ref);
        assert_eq!(method.params[0].base, TypeSignature::I4);
        assert_eq!(
            method.params[1].modifiers,
            vec![CustomModifier {
                required: false,
                modifier: Token::new(0x0100_0001)
            }]
        );
        assert!(method.varargs.is_empty());
    }

    #[test]
    fn vararg_method_signature() {
        // vararg void (int32, ..., float64)
        let data = [0x05, 0x02, 0x01, 0x08, 0x41, 0x0d];
        let mut parser = SignatureParser::new(&data);
        let method = parser.parse_method_signature().unwrap();

        assert_eq!(method.calling_convention, CallingConvention::VarArg);
        assert_eq!(method.params.len(), 1);
        assert_eq!(method.varargs.len(), 1);
        assert_eq!(method.varargs[0].base, TypeSignature::R8);
    }

    #[test]
    fn field_and_property() {
        let mut parser = SignatureParser::new(&[0x06, 0x1f, 0x09, 0x08]);
        let field = parser.parse_field_signature().unwrap();
        assert!(field.modifiers[0].required);
        assert_eq!(field.base, TypeSignature::I4);

        let mut parser = SignatureParser::new(&[0x07, 0x08]);
        assert!(matches!(
            parser.parse_field_signature(),
            Err(Error::Malformed { .. })
        ));

        // instance string this[int32]
        let mut parser = SignatureParser::new(&[0x28, 0x01, 0x0e, 0x08]);
        let property = parser.parse_property_signature().unwrap();
        assert!(property.has_this);
        assert_eq!(property.base, TypeSignature::String);
        assert_eq!(property.params.len(), 1);
    }

    #[test]
    fn method_spec() {
        let mut parser = SignatureParser::new(&[0x0a, 0x02, 0x08, 0x1e, 0x00]);
        let spec = parser.parse_method_spec_signature().unwrap();
        assert_eq!(
            spec.generic_args,
            vec![TypeSignature::I4, TypeSignature::GenericParamMethod(0)]
        );
    }

    #[test]
    fn errors() {
        let mut parser = SignatureParser::new(&[0xFF]);
        assert!(matches!(parser.parse_type(), Err(Error::Malformed { .. })));

        let mut parser = SignatureParser::new(&[0x1d]);
        assert!(matches!(parser.parse_type(), Err(Error::OutOfBounds { .. })));

        let mut parser = SignatureParser::new(&[0x0f]);
        assert!(parser.parse_type().is_err());

        let deep = [0x1d; 200];
        let mut parser = SignatureParser::new(&deep);
        assert!(matches!(
            parser.parse_type(),
            Err(Error::RecursionLimit(MAX_RECURSION_DEPTH))
        ));
    }
}
