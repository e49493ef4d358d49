use std::fmt;

use static_assertions::const_assert_eq;
use thiserror::Error;

use crate::{
    machine::DataRegister,
    nibble_ints::{U12, U4},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid opcode `{0:04X}`")]
pub struct InvalidOpcodeError(pub u16);

/// A raw 16-bit instruction word with accessors for its operand fields.
///
/// ```text
/// F X Y N
///     K K
///   N N N
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode(pub u16);

impl Opcode {
    /// Combine two bytes fetched from memory, high byte first.
    pub const fn from_bytes(high: u8, low: u8) -> Self {
        Self((high as u16) << 8 | low as u16)
    }

    pub fn family(self) -> Family {
        Family::from(U4::from_masked((self.0 >> 12) as u8))
    }

    pub fn x(self) -> DataRegister {
        DataRegister::from(U4::from_masked((self.0 >> 8) as u8))
    }

    pub fn y(self) -> DataRegister {
        DataRegister::from(U4::from_masked((self.0 >> 4) as u8))
    }

    pub fn n(self) -> U4 {
        U4::from_masked(self.0 as u8)
    }

    pub fn kk(self) -> u8 {
        self.0 as u8
    }

    pub fn nnn(self) -> U12 {
        U12::from_masked(self.0)
    }
}

/// The top nibble of an opcode, selecting a group of instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// `00E0`, `00EE` and `0nnn`
    System = 0x0,
    Jump = 0x1,
    Call = 0x2,
    SkipIfEqByte = 0x3,
    SkipIfNeByte = 0x4,
    SkipIfEq = 0x5,
    SetByte = 0x6,
    AddByte = 0x7,
    /// Register to register arithmetic and logic, `8xyN`
    Alu = 0x8,
    SkipIfNe = 0x9,
    SetIndex = 0xA,
    JumpIndexed = 0xB,
    Random = 0xC,
    Draw = 0xD,
    /// Key skips, `ExNN`
    Key = 0xE,
    /// Timers, index register and memory transfers, `FxNN`
    Misc = 0xF,
}

impl Family {
    pub const ALL: [Family; 16] = [
        Self::System,
        Self::Jump,
        Self::Call,
        Self::SkipIfEqByte,
        Self::SkipIfNeByte,
        Self::SkipIfEq,
        Self::SetByte,
        Self::AddByte,
        Self::Alu,
        Self::SkipIfNe,
        Self::SetIndex,
        Self::JumpIndexed,
        Self::Random,
        Self::Draw,
        Self::Key,
        Self::Misc,
    ];
}

const_assert_eq!(Family::ALL.len(), U4::MAX.into_u8() as usize + 1);

impl From<U4> for Family {
    fn from(nibble: U4) -> Self {
        Self::ALL[nibble.into_u8() as usize]
    }
}

/// A decoded CHIP-8 instruction.
///
/// Names of operand fields follow the usual opcode notation:
/// `x` and `y` are registers, `byte` the low byte, `address` the low 12 bits.
///
/// References used are
/// <http://devernay.free.fr/hacks/chip8/C8TECH10.HTM> (Cowgod's Chip-8 Technical Reference)
/// and <https://github.com/mattmikolay/chip-8/wiki/CHIP%E2%80%908-Instruction-Set>.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Instruction {
    /// `00E0` Clear the display.
    ClearScreen,
    /// `00EE` Return from a subroutine.
    Return,
    /// `0nnn` Call a machine code routine of the original host computer.
    MachineCall { address: U12 },
    /// `1nnn`
    Jump { address: U12 },
    /// `2nnn` Call the subroutine at `address`.
    Call { address: U12 },
    /// `3xkk` Skip the next instruction if `x == byte`.
    SkipIfEqByte { x: DataRegister, byte: u8 },
    /// `4xkk` Skip the next instruction if `x != byte`.
    SkipIfNeByte { x: DataRegister, byte: u8 },
    /// `5xy0` Skip the next instruction if `x == y`.
    SkipIfEq { x: DataRegister, y: DataRegister },
    /// `6xkk`
    SetByte { x: DataRegister, byte: u8 },
    /// `7xkk` Add without touching [`DataRegister::VF`].
    AddByte { x: DataRegister, byte: u8 },
    /// `8xy0`
    Assign { x: DataRegister, y: DataRegister },
    /// `8xy1`
    Or { x: DataRegister, y: DataRegister },
    /// `8xy2`
    And { x: DataRegister, y: DataRegister },
    /// `8xy3`
    Xor { x: DataRegister, y: DataRegister },
    /// `8xy4` `VF` is the carry.
    Add { x: DataRegister, y: DataRegister },
    /// `8xy5` `x -= y`, `VF` is 1 if no borrow occurred.
    Sub { x: DataRegister, y: DataRegister },
    /// `8xy6` Shift `x` right, `VF` is the bit shifted out. `y` is ignored.
    ShiftRight { x: DataRegister, y: DataRegister },
    /// `8xy7` `x = y - x`, `VF` is 1 if no borrow occurred.
    SubReverse { x: DataRegister, y: DataRegister },
    /// `8xyE` Shift `x` left, `VF` is the bit shifted out. `y` is ignored.
    ShiftLeft { x: DataRegister, y: DataRegister },
    /// `9xy0` Skip the next instruction if `x != y`.
    SkipIfNe { x: DataRegister, y: DataRegister },
    /// `Annn`
    SetIndex { address: U12 },
    /// `Bnnn` Jump to `address + V0`.
    JumpIndexed { address: U12 },
    /// `Cxkk` Assign a random byte masked with `mask`.
    Random { x: DataRegister, mask: u8 },
    /// `Dxyn` Draw the `rows` bytes long sprite at `I` to position (`x`, `y`).
    Draw {
        x: DataRegister,
        y: DataRegister,
        rows: U4,
    },
    /// `Ex9E`
    SkipIfPressed { x: DataRegister },
    /// `ExA1`
    SkipIfNotPressed { x: DataRegister },
    /// `Fx07`
    LoadDelay { x: DataRegister },
    /// `Fx0A` Block until a key is pressed and store it in `x`.
    WaitForKey { x: DataRegister },
    /// `Fx15`
    SetDelay { x: DataRegister },
    /// `Fx18`
    SetSound { x: DataRegister },
    /// `Fx1E`
    AddToIndex { x: DataRegister },
    /// `Fx29` Point `I` at the font glyph for the digit in `x`.
    FontAddress { x: DataRegister },
    /// `Fx33` Store the decimal digits of `x` at `I`, `I+1` and `I+2`.
    StoreBcd { x: DataRegister },
    /// `Fx55` Store `V0` through `last` at `I` onwards.
    DumpRegisters { last: DataRegister },
    /// `Fx65` Load `V0` through `last` from `I` onwards.
    LoadRegisters { last: DataRegister },
}

impl Instruction {
    pub fn family(&self) -> Family {
        Opcode(u16::from(*self)).family()
    }

    fn decode_system(op: Opcode) -> Result<Self, InvalidOpcodeError> {
        Ok(match op.0 {
            0x00E0 => Self::ClearScreen,
            0x00EE => Self::Return,
            _ => Self::MachineCall { address: op.nnn() },
        })
    }

    fn decode_alu(op: Opcode) -> Result<Self, InvalidOpcodeError> {
        let (x, y) = (op.x(), op.y());
        Ok(match op.n().into_u8() {
            0x0 => Self::Assign { x, y },
            0x1 => Self::Or { x, y },
            0x2 => Self::And { x, y },
            0x3 => Self::Xor { x, y },
            0x4 => Self::Add { x, y },
            0x5 => Self::Sub { x, y },
            0x6 => Self::ShiftRight { x, y },
            0x7 => Self::SubReverse { x, y },
            0xE => Self::ShiftLeft { x, y },
            _ => return Err(InvalidOpcodeError(op.0)),
        })
    }

    fn decode_key(op: Opcode) -> Result<Self, InvalidOpcodeError> {
        let x = op.x();
        Ok(match op.kk() {
            0x9E => Self::SkipIfPressed { x },
            0xA1 => Self::SkipIfNotPressed { x },
            _ => return Err(InvalidOpcodeError(op.0)),
        })
    }

    fn decode_misc(op: Opcode) -> Result<Self, InvalidOpcodeError> {
        let x = op.x();
        Ok(match op.kk() {
            0x07 => Self::LoadDelay { x },
            0x0A => Self::WaitForKey { x },
            0x15 => Self::SetDelay { x },
            0x18 => Self::SetSound { x },
            0x1E => Self::AddToIndex { x },
            0x29 => Self::FontAddress { x },
            0x33 => Self::StoreBcd { x },
            0x55 => Self::DumpRegisters { last: x },
            0x65 => Self::LoadRegisters { last: x },
            _ => return Err(InvalidOpcodeError(op.0)),
        })
    }

    /// Register pair instructions whose low nibble must be zero.
    fn decode_register_pair(
        op: Opcode,
        make: fn(DataRegister, DataRegister) -> Self,
    ) -> Result<Self, InvalidOpcodeError> {
        if op.n() == U4::MIN {
            Ok(make(op.x(), op.y()))
        } else {
            Err(InvalidOpcodeError(op.0))
        }
    }
}

impl TryFrom<Opcode> for Instruction {
    type Error = InvalidOpcodeError;

    fn try_from(op: Opcode) -> Result<Self, Self::Error> {
        match op.family() {
            Family::System => Self::decode_system(op),
            Family::Jump => Ok(Self::Jump { address: op.nnn() }),
            Family::Call => Ok(Self::Call { address: op.nnn() }),
            Family::SkipIfEqByte => Ok(Self::SkipIfEqByte {
                x: op.x(),
                byte: op.kk(),
            }),
            Family::SkipIfNeByte => Ok(Self::SkipIfNeByte {
                x: op.x(),
                byte: op.kk(),
            }),
            Family::SkipIfEq => Self::decode_register_pair(op, |x, y| Self::SkipIfEq { x, y }),
            Family::SetByte => Ok(Self::SetByte {
                x: op.x(),
                byte: op.kk(),
            }),
            Family::AddByte => Ok(Self::AddByte {
                x: op.x(),
                byte: op.kk(),
            }),
            Family::Alu => Self::decode_alu(op),
            Family::SkipIfNe => Self::decode_register_pair(op, |x, y| Self::SkipIfNe { x, y }),
            Family::SetIndex => Ok(Self::SetIndex { address: op.nnn() }),
            Family::JumpIndexed => Ok(Self::JumpIndexed { address: op.nnn() }),
            Family::Random => Ok(Self::Random {
                x: op.x(),
                mask: op.kk(),
            }),
            Family::Draw => Ok(Self::Draw {
                x: op.x(),
                y: op.y(),
                rows: op.n(),
            }),
            Family::Key => Self::decode_key(op),
            Family::Misc => Self::decode_misc(op),
        }
    }
}

impl TryFrom<u16> for Instruction {
    type Error = InvalidOpcodeError;

    fn try_from(word: u16) -> Result<Self, Self::Error> {
        Self::try_from(Opcode(word))
    }
}

impl TryFrom<[u8; 2]> for Instruction {
    type Error = InvalidOpcodeError;

    fn try_from([high, low]: [u8; 2]) -> Result<Self, Self::Error> {
        Self::try_from(Opcode::from_bytes(high, low))
    }
}

/// Assemble an opcode from its four nibbles, most significant first.
const fn nibbles(n0: u8, n1: u8, n2: u8, n3: u8) -> u16 {
    (n0 as u16) << 12 | (n1 as u16 & 0xF) << 8 | (n2 as u16 & 0xF) << 4 | (n3 as u16 & 0xF)
}

const fn with_address(family: u8, address: U12) -> u16 {
    (family as u16) << 12 | address.into_u16()
}

const fn with_byte(family: u8, x: DataRegister, byte: u8) -> u16 {
    (family as u16) << 12 | (x as u16) << 8 | byte as u16
}

impl From<Instruction> for u16 {
    fn from(instruction: Instruction) -> Self {
        use Instruction::*;

        let r = |register: DataRegister| register as u8;

        match instruction {
            ClearScreen => 0x00E0,
            Return => 0x00EE,
            MachineCall { address } => with_address(0x0, address),
            Jump { address } => with_address(0x1, address),
            Call { address } => with_address(0x2, address),
            SkipIfEqByte { x, byte } => with_byte(0x3, x, byte),
            SkipIfNeByte { x, byte } => with_byte(0x4, x, byte),
            SkipIfEq { x, y } => nibbles(0x5, r(x), r(y), 0x0),
            SetByte { x, byte } => with_byte(0x6, x, byte),
            AddByte { x, byte } => with_byte(0x7, x, byte),
            Assign { x, y } => nibbles(0x8, r(x), r(y), 0x0),
            Or { x, y } => nibbles(0x8, r(x), r(y), 0x1),
            And { x, y } => nibbles(0x8, r(x), r(y), 0x2),
            Xor { x, y } => nibbles(0x8, r(x), r(y), 0x3),
            Add { x, y } => nibbles(0x8, r(x), r(y), 0x4),
            Sub { x, y } => nibbles(0x8, r(x), r(y), 0x5),
            ShiftRight { x, y } => nibbles(0x8, r(x), r(y), 0x6),
            SubReverse { x, y } => nibbles(0x8, r(x), r(y), 0x7),
            ShiftLeft { x, y } => nibbles(0x8, r(x), r(y), 0xE),
            SkipIfNe { x, y } => nibbles(0x9, r(x), r(y), 0x0),
            SetIndex { address } => with_address(0xA, address),
            JumpIndexed { address } => with_address(0xB, address),
            Random { x, mask } => with_byte(0xC, x, mask),
            Draw { x, y, rows } => nibbles(0xD, r(x), r(y), rows.into_u8()),
            SkipIfPressed { x } => with_byte(0xE, x, 0x9E),
            SkipIfNotPressed { x } => with_byte(0xE, x, 0xA1),
            LoadDelay { x } => with_byte(0xF, x, 0x07),
            WaitForKey { x } => with_byte(0xF, x, 0x0A),
            SetDelay { x } => with_byte(0xF, x, 0x15),
            SetSound { x } => with_byte(0xF, x, 0x18),
            AddToIndex { x } => with_byte(0xF, x, 0x1E),
            FontAddress { x } => with_byte(0xF, x, 0x29),
            StoreBcd { x } => with_byte(0xF, x, 0x33),
            DumpRegisters { last } => with_byte(0xF, last, 0x55),
            LoadRegisters { last } => with_byte(0xF, last, 0x65),
        }
    }
}

impl From<Instruction> for [u8; 2] {
    fn from(instruction: Instruction) -> Self {
        u16::from(instruction).to_be_bytes()
    }
}

impl fmt::Display for Instruction {
    /// Conventional assembly mnemonics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            MachineCall { address } => write!(f, "SYS {:#05X}", address.into_u16()),
            Jump { address } => write!(f, "JP {:#05X}", address.into_u16()),
            Call { address } => write!(f, "CALL {:#05X}", address.into_u16()),
            SkipIfEqByte { x, byte } => write!(f, "SE {x}, {byte:#04X}"),
            SkipIfNeByte { x, byte } => write!(f, "SNE {x}, {byte:#04X}"),
            SkipIfEq { x, y } => write!(f, "SE {x}, {y}"),
            SetByte { x, byte } => write!(f, "LD {x}, {byte:#04X}"),
            AddByte { x, byte } => write!(f, "ADD {x}, {byte:#04X}"),
            Assign { x, y } => write!(f, "LD {x}, {y}"),
            Or { x, y } => write!(f, "OR {x}, {y}"),
            And { x, y } => write!(f, "AND {x}, {y}"),
            Xor { x, y } => write!(f, "XOR {x}, {y}"),
            Add { x, y } => write!(f, "ADD {x}, {y}"),
            Sub { x, y } => write!(f, "SUB {x}, {y}"),
            ShiftRight { x, .. } => write!(f, "SHR {x}"),
            SubReverse { x, y } => write!(f, "SUBN {x}, {y}"),
            ShiftLeft { x, .. } => write!(f, "SHL {x}"),
            SkipIfNe { x, y } => write!(f, "SNE {x}, {y}"),
            SetIndex { address } => write!(f, "LD I, {:#05X}", address.into_u16()),
            JumpIndexed { address } => write!(f, "JP V0, {:#05X}", address.into_u16()),
            Random { x, mask } => write!(f, "RND {x}, {mask:#04X}"),
            Draw { x, y, rows } => write!(f, "DRW {x}, {y}, {rows}"),
            SkipIfPressed { x } => write!(f, "SKP {x}"),
            SkipIfNotPressed { x } => write!(f, "SKNP {x}"),
            LoadDelay { x } => write!(f, "LD {x}, DT"),
            WaitForKey { x } => write!(f, "LD {x}, K"),
            SetDelay { x } => write!(f, "LD DT, {x}"),
            SetSound { x } => write!(f, "LD ST, {x}"),
            AddToIndex { x } => write!(f, "ADD I, {x}"),
            FontAddress { x } => write!(f, "LD F, {x}"),
            StoreBcd { x } => write!(f, "LD B, {x}"),
            DumpRegisters { last } => write!(f, "LD [I], {last}"),
            LoadRegisters { last } => write!(f, "LD {last}, [I]"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    mod instruction_try_from_opcode {
        use super::*;

        #[test]
        fn case_ok() {
            assert_eq!(
                Instruction::try_from([0x64_u8, 0x07]),
                Ok(Instruction::SetByte {
                    x: DataRegister::V4,
                    byte: 7,
                })
            );
            assert_eq!(
                Instruction::try_from(0xA553_u16),
                Ok(Instruction::SetIndex {
                    address: U12::from_masked(0x553)
                })
            );
            assert_eq!(
                Instruction::try_from(0xD9_35_u16),
                Ok(Instruction::Draw {
                    x: DataRegister::V9,
                    y: DataRegister::V3,
                    rows: U4::from_masked(5),
                })
            );
        }

        #[test]
        fn case_system() {
            assert_eq!(Instruction::try_from(0x00E0_u16), Ok(Instruction::ClearScreen));
            assert_eq!(Instruction::try_from(0x00EE_u16), Ok(Instruction::Return));
            assert_eq!(
                Instruction::try_from(0x0123_u16),
                Ok(Instruction::MachineCall {
                    address: U12::from_masked(0x123)
                })
            );
        }

        macro_rules! generate_invalid_test {
            ($test_name:ident, $opcode:literal) => {
                #[test]
                fn $test_name() {
                    assert_eq!(
                        Instruction::try_from($opcode as u16),
                        Err(InvalidOpcodeError($opcode))
                    );
                }
            };
        }

        generate_invalid_test!(case_err_skip_eq_low_nibble, 0x5121);
        generate_invalid_test!(case_err_skip_ne_low_nibble, 0x912F);
        generate_invalid_test!(case_err_alu_8, 0x8128);
        generate_invalid_test!(case_err_alu_d, 0x812D);
        generate_invalid_test!(case_err_alu_f, 0x812F);
        generate_invalid_test!(case_err_key, 0xE19F);
        generate_invalid_test!(case_err_misc, 0xF140);
        generate_invalid_test!(case_err_misc_fx75, 0xF175);
    }

    #[test]
    fn opcode_fields() {
        let op = Opcode::from_bytes(0xD9, 0x35);
        assert_eq!(op, Opcode(0xD935));
        assert_eq!(op.family(), Family::Draw);
        assert_eq!(op.x(), DataRegister::V9);
        assert_eq!(op.y(), DataRegister::V3);
        assert_eq!(op.n().into_u8(), 5);
        assert_eq!(op.kk(), 0x35);
        assert_eq!(op.nnn().into_u16(), 0x935);
    }

    #[test]
    fn every_valid_opcode_encodes_back_to_itself() {
        for word in 0..=u16::MAX {
            if let Ok(instruction) = Instruction::try_from(word) {
                assert_eq!(u16::from(instruction), word, "{instruction:?}");
                assert_eq!(instruction.family(), Opcode(word).family());
            }
        }
    }

    #[test]
    fn u8x2_from_instruction() {
        let instr = Instruction::Draw {
            x: DataRegister::V9,
            y: DataRegister::V3,
            rows: U4::from_masked(5),
        };

        assert_eq!(<[u8; 2]>::from(instr), [0xD9_u8, 0x35]);
    }

    #[test]
    fn mnemonics() {
        let rendered = |word: u16| Instruction::try_from(word).unwrap().to_string();

        assert_eq!(rendered(0x00E0), "CLS");
        assert_eq!(rendered(0x1228), "JP 0x228");
        assert_eq!(rendered(0x7105), "ADD V1, 0x05");
        assert_eq!(rendered(0x8AB4), "ADD VA, VB");
        assert_eq!(rendered(0xA553), "LD I, 0x553");
        assert_eq!(rendered(0xB300), "JP V0, 0x300");
        assert_eq!(rendered(0xD015), "DRW V0, V1, 5");
        assert_eq!(rendered(0xF30A), "LD V3, K");
        assert_eq!(rendered(0xF855), "LD [I], V8");
        assert_eq!(rendered(0xF865), "LD V8, [I]");
    }
}
