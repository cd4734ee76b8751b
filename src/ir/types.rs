//! Result data types of IR values.

use core::fmt;

/// The data type of the value an instruction produces.
///
/// Control instructions produce `Void`. `Undefined` is the type of an
/// instruction whose type has not been assigned yet; no well-formed procedure
/// dumps it, but it is part of the closed set so a partially built graph can
/// still be printed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Type {
    /// 8-bit signed integer.
    I8,
    /// 16-bit signed integer.
    I16,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// 8-bit unsigned integer.
    U8,
    /// 16-bit unsigned integer.
    U16,
    /// 32-bit unsigned integer.
    U32,
    /// 64-bit unsigned integer.
    U64,
    /// No value; produced by control instructions.
    Void,
    /// Not yet assigned.
    Undefined,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Void => "void",
            Self::Undefined => "undefined",
        })
    }
}
