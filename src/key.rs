//! Key categories and the per-category ordering.
//!
//! Every key belongs to exactly one of four families. Integer and float keys
//! are widened to 64 bits when routed, so `3u8` and `3u64` address the same
//! entry; strings are compared byte-wise.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use crate::Error;

/// The four key families, one subtree each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `i8`, `i16`, `i32`, `i64`, `isize`.
    Signed,
    /// `u8`, `u16`, `u32`, `u64`, `usize`.
    Unsigned,
    /// `f32`, `f64`.
    Float,
    /// `&str`, `String`, `Box<str>`.
    String,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Signed,
        Category::Unsigned,
        Category::Float,
        Category::String,
    ];

    /// Category of a dynamically typed value, or `None` if it belongs to no
    /// supported family.
    pub fn of_any(value: &dyn Any) -> Option<Self> {
        KeyRef::from_any(value).ok().map(|key| key.category())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Signed => "signed",
            Self::Unsigned => "unsigned",
            Self::Float => "float",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// A borrowed key, tagged with its category.
///
/// Numeric keys are carried by value; string keys borrow the caller's (or the
/// tree's) storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyRef<'a> {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Str(&'a str),
}

macro_rules! downcast_family {
    ($value:expr, $variant:ident, $stored:ty: $($ty:ty),+) => {
        $(
            if let Some(v) = $value.downcast_ref::<$ty>() {
                return Ok(KeyRef::$variant(*v as $stored));
            }
        )+
    };
}

impl<'a> KeyRef<'a> {
    #[inline]
    pub fn category(&self) -> Category {
        match self {
            Self::Signed(_) => Category::Signed,
            Self::Unsigned(_) => Category::Unsigned,
            Self::Float(_) => Category::Float,
            Self::Str(_) => Category::String,
        }
    }

    /// Routes a dynamically typed value to its key family.
    ///
    /// Anything outside the four families (`bool`, `char`, `i128`, `u128`,
    /// user types) yields [`Error::UnsupportedCategory`].
    pub fn from_any(value: &'a dyn Any) -> Result<Self, Error> {
        downcast_family!(value, Signed, i64: i8, i16, i32, i64, isize);
        downcast_family!(value, Unsigned, u64: u8, u16, u32, u64, usize);
        downcast_family!(value, Float, f64: f32, f64);
        if let Some(s) = value.downcast_ref::<&'static str>() {
            return Ok(Self::Str(*s));
        }
        if let Some(s) = value.downcast_ref::<String>() {
            return Ok(Self::Str(s.as_str()));
        }
        if let Some(s) = value.downcast_ref::<Box<str>>() {
            return Ok(Self::Str(&**s));
        }
        Err(Error::UnsupportedCategory)
    }
}

impl fmt::Display for KeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

macro_rules! impl_from_primitive {
    ($variant:ident, $stored:ty: $($ty:ty),+) => {
        $(
            impl From<$ty> for KeyRef<'_> {
                #[inline]
                fn from(v: $ty) -> Self {
                    KeyRef::$variant(v as $stored)
                }
            }
        )+
    };
}

impl_from_primitive!(Signed, i64: i8, i16, i32, i64, isize);
impl_from_primitive!(Unsigned, u64: u8, u16, u32, u64, usize);
impl_from_primitive!(Float, f64: f32, f64);

impl<'a> From<&'a str> for KeyRef<'a> {
    #[inline]
    fn from(s: &'a str) -> Self {
        KeyRef::Str(s)
    }
}

impl<'a> From<&'a String> for KeyRef<'a> {
    #[inline]
    fn from(s: &'a String) -> Self {
        KeyRef::Str(s.as_str())
    }
}

impl<'a> From<&'a Box<str>> for KeyRef<'a> {
    #[inline]
    fn from(s: &'a Box<str>) -> Self {
        KeyRef::Str(s)
    }
}

/// Ordering used inside one subtree.
///
/// Implemented for the stored representation of each family. Insertion
/// descends right on `Greater` and left otherwise.
pub trait KeyOrd {
    fn key_cmp(&self, other: &Self) -> Ordering;

    /// `false` for keys with no place in the ordering (NaN).
    #[inline]
    fn is_orderable(&self) -> bool {
        true
    }
}

impl KeyOrd for i64 {
    #[inline]
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl KeyOrd for u64 {
    #[inline]
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl KeyOrd for f64 {
    /// Numeric comparison; `-0.0` and `0.0` are equal. NaN never reaches a
    /// comparison because it is filtered by [`KeyOrd::is_orderable`].
    #[inline]
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Less)
    }

    #[inline]
    fn is_orderable(&self) -> bool {
        !self.is_nan()
    }
}

impl KeyOrd for str {
    #[inline]
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl KeyOrd for Box<str> {
    #[inline]
    fn key_cmp(&self, other: &Self) -> Ordering {
        (**self).key_cmp(&**other)
    }
}
