use std::fmt;
use std::path::Path;


/// How packed bits are laid out in a compressed artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {

    /// Packed bytes only, no header. The end of the stream is unknown, so
    /// decoding drops the last decoded character to get rid of the symbol
    /// the zero padding usually decodes to.
    #[default]
    Raw,

    /// One leading byte holds the number of padding bits in the last byte.
    /// Decoding stops at the exact end of the encoded bits.
    PaddingHeader,

}


/// What encoding does with a symbol that has no code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownSymbolPolicy {

    /// Leave the symbol out of the output.
    #[default]
    Skip,

    /// Abort encoding with [`crate::Error::UnknownSymbol`].
    Fail,

}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecOptions {

    pub framing: Framing,
    pub unknown_symbols: UnknownSymbolPolicy

}

impl CodecOptions {

    pub const fn framed() -> Self {
        Self {
            framing: Framing::PaddingHeader,
            unknown_symbols: UnknownSymbolPolicy::Skip
        }
    }


    pub const fn with_unknown_symbols(self, unknown_symbols: UnknownSymbolPolicy) -> Self {
        Self {
            unknown_symbols,
            ..self
        }
    }

}


/// Decides whether an existing output file gets replaced.
pub enum OverwritePolicy<'a> {

    Always,
    Never,
    /// Ask the callback, which receives the existing path.
    Ask(Box<dyn FnMut(&Path) -> bool + 'a>),

}

impl<'a> OverwritePolicy<'a> {

    pub fn ask(confirm: impl FnMut(&Path) -> bool + 'a) -> Self {
        Self::Ask(Box::new(confirm))
    }


    /// Whether writing to `path` may go ahead.
    pub fn allows(&mut self, path: &Path) -> bool {

        if !path.exists() {
            return true;
        }

        match self {
            OverwritePolicy::Always => true,
            OverwritePolicy::Never => false,
            OverwritePolicy::Ask(confirm) => confirm(path)
        }
    }

}

impl fmt::Debug for OverwritePolicy<'_> {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverwritePolicy::Always => f.write_str("Always"),
            OverwritePolicy::Never => f.write_str("Never"),
            OverwritePolicy::Ask(_) => f.write_str("Ask(..)")
        }
    }

}
