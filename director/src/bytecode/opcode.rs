//! The Lingo bytecode instruction set.
//!
//! Raw opcode bytes are "canonicalized" before dispatch: an opcode below
//! `0x40` takes no operand, while one at or above `0x40` is really a
//! (canonical opcode, operand width) pair packed into one byte —
//! `canonical = 0x40 + (raw % 0x40)`, and the *band* the raw byte falls in
//! (`0x40..0x80`, `0x80..0xC0`, `0xC0..0x100`) says how wide the operand
//! that follows is. The canonical space runs `0x01..0x73`; not every value
//! in that range is assigned, and an unassigned one decodes to `Unknown`.

use libcommon::Stream;

use crate::error::Result;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperandWidth {
    None,
    Byte,
    Word,
    Variable,
}

#[must_use]
pub fn canonical_opcode(raw: u8) -> u8 {
    if raw < 0x40 {
        raw
    } else {
        0x40 + (raw % 0x40)
    }
}

#[must_use]
pub fn operand_width(raw: u8) -> OperandWidth {
    match raw {
        0x00..=0x3F => OperandWidth::None,
        0x40..=0x7F => OperandWidth::Byte,
        0x80..=0xBF => OperandWidth::Word,
        0xC0..=0xFF => OperandWidth::Variable,
    }
}

pub fn read_operand(stream: &mut Stream, width: OperandWidth) -> Result<i64> {
    Ok(match width {
        OperandWidth::None => 0,
        OperandWidth::Byte => i64::from(stream.read_u8()?),
        OperandWidth::Word => i64::from(stream.read_u16()?),
        OperandWidth::Variable => i64::from(stream.read_var_int()?),
    })
}

/// One decoded instruction: its canonical opcode and the operand that
/// followed it (`0` when the opcode is operand-less).
#[derive(Clone, Copy, Debug)]
pub struct Instruction {
    pub raw_opcode: u8,
    pub opcode: Opcode,
    pub operand: i64,
    /// Byte offset of this instruction within the handler's bytecode,
    /// used by the loop tagger and AST lifter to resolve jump targets.
    pub offset: u32,
}

macro_rules! opcodes {
    ($($id:literal => $name:ident),+ $(,)?) => {
        #[derive(Clone, Copy, Debug, Eq, PartialEq)]
        pub enum Opcode {
            $($name,)+
            Unknown(u8),
        }

        impl Opcode {
            #[must_use]
            pub fn from_canonical(canonical: u8) -> Self {
                match canonical {
                    $($id => Self::$name,)+
                    other => Self::Unknown(other),
                }
            }
        }
    };
}

opcodes! {
    // No-operand (raw < 0x40): arithmetic/logic, the no-operand half of
    // string/chunk handling, sprite membership, and the handler-exit and
    // tell-block brackets.
    0x01 => Ret,
    0x02 => RetFactory,
    0x03 => PushZero,
    0x04 => Mul,
    0x05 => Add,
    0x06 => Sub,
    0x07 => Div,
    0x08 => Modulo,
    0x09 => Negate,
    0x0A => AmpConcat,
    0x0B => AmpAmpConcat,
    0x0C => Lt,
    0x0D => Le,
    0x0E => Gt,
    0x0F => Ge,
    0x10 => Eq,
    0x11 => Ne,
    0x12 => And,
    0x13 => Or,
    0x14 => Not,
    0x15 => Contains,
    0x16 => Starts,
    0x17 => HiliteChunk,
    0x18 => OntoSprite,
    0x19 => IntoSprite,
    0x1A => GetChunk,
    0x1C => GetField,
    0x1D => StartTell,
    0x1E => EndTell,

    // Operand-taking (canonical 0x40..0x73). The operand's actual width on
    // the wire is decided by which raw band (0x40s/0x80s/0xC0s) the
    // instruction was read from, not by the opcode itself — the same
    // canonical opcode can show up with a byte, word, or varint operand in
    // different handlers (e.g. a `PushInt` built from a literal too big
    // for a byte operand).
    0x40 => PushInt,
    0x41 => PushFloat,
    0x42 => PushArgList,
    0x43 => PushArgListNoRet,
    0x44 => PushList,
    0x45 => PushPropList,
    0x46 => PushConstant,
    0x47 => PushSymbol,
    0x48 => PushVarRef,
    0x49 => Swap,
    0x4A => Peek,
    0x4B => Pop,
    0x4C => PutChunk,
    0x4D => DeleteChunk,
    0x4E => PushChunkVarRef,
    0x4F => GetGlobal,
    0x50 => GetGlobal2,
    0x51 => GetProperty,
    0x52 => GetParam,
    0x53 => GetLocal,
    0x54 => SetGlobal,
    0x55 => SetGlobal2,
    0x56 => SetProperty,
    0x57 => SetParam,
    0x58 => SetLocal,
    0x59 => GetTopLevelProp,
    0x5A => Jmp,
    0x5B => EndRepeat,
    0x5C => JmpIfZero,
    0x5D => LocalCall,
    0x5E => ExtCall,
    0x5F => TellCall,
    0x60 => ObjCall,
    0x61 => ObjCallV4,
    0x62 => NewObj,
    0x63 => TheBuiltin,
    0x64 => Get,
    0x65 => Set,
    0x66 => GetMovieProp,
    0x67 => SetMovieProp,
    0x68 => GetObjProp,
    0x69 => SetObjProp,
    0x6A => GetChainedProp,
    0x6B => Put,
}

impl Opcode {
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        Self::from_canonical(canonical_opcode(raw))
    }
}
