/// Asserts a condition that should always hold for well-formed movies, but
/// where real-world files have occasionally turned up malformed samples.
/// Bails with a message inviting the offending file.
#[macro_export]
macro_rules! ensure_sample {
    ($test:expr, $msg:expr) => {
        ::anyhow::ensure!($test, "{}. Please send this file for analysis.", $msg)
    };
    ($test:expr, $fmt:expr, $($arg:tt)+) => {
        $crate::ensure_sample!($test, format_args!($fmt, $($arg)+))
    };
}

/// A declarative shorthand for a newtype wrapping an integer, with the usual
/// `Display`/`From`/`Deref` impls. Covers only the conversions this codebase
/// actually needs.
#[macro_export]
macro_rules! newtype_index {
    ($(#[$meta:meta])* $vis:vis struct $ident:ident($inner:ty);) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
        $vis struct $ident(pub $inner);

        impl ::core::fmt::Display for $ident {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::convert::From<$inner> for $ident {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl ::core::convert::From<$ident> for $inner {
            fn from(value: $ident) -> Self {
                value.0
            }
        }
    };
}
