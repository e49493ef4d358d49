//! Instruction handlers.
//!
//! Every handler decides how the program counter moves on by returning an [`Advance`],
//! the dispatcher only applies it.

use rand::Rng;
use tracing::debug;

use crate::{
    font,
    instruction::Instruction,
    nibble_ints::{U12, U4},
};

use super::{DataRegister, Fault, Key, MachineCallPolicy, MachineState, Options};

/// Size of an instruction in bytes.
const INSTRUCTION_LEN: u16 = std::mem::size_of::<u16>() as u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Advance {
    /// Continue with the following instruction.
    Next,
    /// Skip the following instruction.
    SkipNext,
    To(u16),
    /// Execute the same instruction again next cycle.
    Stay,
}

impl Advance {
    pub(super) fn apply(self, program_counter: u16) -> u16 {
        match self {
            Self::Next => program_counter.wrapping_add(INSTRUCTION_LEN),
            Self::SkipNext => program_counter.wrapping_add(2 * INSTRUCTION_LEN),
            Self::To(address) => address,
            Self::Stay => program_counter,
        }
    }

    fn skip_if(condition: bool) -> Self {
        if condition {
            Self::SkipNext
        } else {
            Self::Next
        }
    }
}

pub(super) fn execute(
    state: &mut MachineState,
    rng: &mut impl Rng,
    options: &Options,
    instruction: Instruction,
) -> Result<Advance, Fault> {
    use Instruction::*;

    match instruction {
        ClearScreen => Ok(clear_screen(state)),
        Return => ret(state),
        MachineCall { address } => machine_call(options, address),
        Jump { address } => Ok(Advance::To(address.into_u16())),
        Call { address } => call(state, address),
        SkipIfEqByte { x, byte } => Ok(Advance::skip_if(state.register(x) == byte)),
        SkipIfNeByte { x, byte } => Ok(Advance::skip_if(state.register(x) != byte)),
        SkipIfEq { x, y } => Ok(Advance::skip_if(state.register(x) == state.register(y))),
        SkipIfNe { x, y } => Ok(Advance::skip_if(state.register(x) != state.register(y))),
        JumpIndexed { address } => Ok(jump_indexed(state, address)),

        SetByte { x, byte } => Ok(set_byte(state, x, byte)),
        AddByte { x, byte } => Ok(add_byte(state, x, byte)),
        Assign { x, y } => Ok(alu(state, x, y, |_, vy| (vy, None))),
        Or { x, y } => Ok(alu(state, x, y, |vx, vy| (vx | vy, None))),
        And { x, y } => Ok(alu(state, x, y, |vx, vy| (vx & vy, None))),
        Xor { x, y } => Ok(alu(state, x, y, |vx, vy| (vx ^ vy, None))),
        Add { x, y } => Ok(alu(state, x, y, |vx, vy| {
            let (sum, carry) = vx.overflowing_add(vy);
            (sum, Some(carry as u8))
        })),
        Sub { x, y } => Ok(alu(state, x, y, |vx, vy| {
            let (difference, borrow) = vx.overflowing_sub(vy);
            (difference, Some(!borrow as u8))
        })),
        SubReverse { x, y } => Ok(alu(state, x, y, |vx, vy| {
            let (difference, borrow) = vy.overflowing_sub(vx);
            (difference, Some(!borrow as u8))
        })),
        ShiftRight { x, .. } => Ok(alu(state, x, x, |vx, _| (vx >> 1, Some(vx & 0b1)))),
        ShiftLeft { x, .. } => Ok(alu(state, x, x, |vx, _| (vx << 1, Some(vx >> 7)))),
        Random { x, mask } => Ok(random(state, rng, x, mask)),

        SetIndex { address } => {
            state.index = address.into_u16();
            Ok(Advance::Next)
        }
        AddToIndex { x } => {
            state.index = state.index.wrapping_add(state.register(x) as u16);
            Ok(Advance::Next)
        }
        FontAddress { x } => {
            state.index = font::glyph_address(state.register(x));
            Ok(Advance::Next)
        }
        StoreBcd { x } => store_bcd(state, x),
        DumpRegisters { last } => dump_registers(state, last),
        LoadRegisters { last } => load_registers(state, last),

        Draw { x, y, rows } => draw(state, x, y, rows),

        SkipIfPressed { x } => Ok(Advance::skip_if(key_pressed(state, x)?)),
        SkipIfNotPressed { x } => Ok(Advance::skip_if(!key_pressed(state, x)?)),
        WaitForKey { x } => Ok(wait_for_key(state, x)),

        LoadDelay { x } => {
            state.set_register(x, state.delay_timer);
            Ok(Advance::Next)
        }
        SetDelay { x } => {
            state.delay_timer = state.register(x);
            Ok(Advance::Next)
        }
        SetSound { x } => {
            state.sound_timer = state.register(x);
            Ok(Advance::Next)
        }
    }
}

fn clear_screen(state: &mut MachineState) -> Advance {
    state.display.clear();
    Advance::Next
}

/// The stack keeps the address of the call instruction itself.
fn call(state: &mut MachineState, address: U12) -> Result<Advance, Fault> {
    state
        .stack
        .push(state.program_counter)
        .map_err(|_| Fault::StackOverflow)?;
    Ok(Advance::To(address.into_u16()))
}

/// Resume with the instruction following the call.
fn ret(state: &mut MachineState) -> Result<Advance, Fault> {
    let call_address = state.stack.pop().ok_or(Fault::StackUnderflow)?;
    Ok(Advance::To(call_address.wrapping_add(INSTRUCTION_LEN)))
}

fn machine_call(options: &Options, address: U12) -> Result<Advance, Fault> {
    match options.machine_calls {
        MachineCallPolicy::Skip => {
            debug!(address = address.into_u16(), "ignoring machine code routine call");
            Ok(Advance::Next)
        }
        MachineCallPolicy::Reject => Err(Fault::MachineCall),
    }
}

fn jump_indexed(state: &MachineState, address: U12) -> Advance {
    let offset = state.register(DataRegister::V0) as u16;
    Advance::To(address.into_u16() + offset)
}

fn set_byte(state: &mut MachineState, x: DataRegister, byte: u8) -> Advance {
    state.set_register(x, byte);
    Advance::Next
}

fn add_byte(state: &mut MachineState, x: DataRegister, byte: u8) -> Advance {
    state.set_register(x, state.register(x).wrapping_add(byte));
    Advance::Next
}

/// Register to register operation. `op` maps `(Vx, Vy)` to the new `Vx` and optionally a flag.
///
/// Both operands are read before anything is written, and the flag is written last,
/// so with `x == VF` the flag is what remains in `VF`.
fn alu(
    state: &mut MachineState,
    x: DataRegister,
    y: DataRegister,
    op: impl FnOnce(u8, u8) -> (u8, Option<u8>),
) -> Advance {
    let (result, flag) = op(state.register(x), state.register(y));
    state.set_register(x, result);
    if let Some(flag) = flag {
        state.set_register(DataRegister::VF, flag);
    }
    Advance::Next
}

fn random(state: &mut MachineState, rng: &mut impl Rng, x: DataRegister, mask: u8) -> Advance {
    state.set_register(x, rng.gen::<u8>() & mask);
    Advance::Next
}

/// Return decimal digits of a u8 value, most significant first.
///
/// 3 digits are always enough, since the maximum value of a u8 is 255.
fn decimal_digits_of_u8(num: u8) -> [u8; 3] {
    [num / 100, num / 10 % 10, num % 10]
}

fn store_bcd(state: &mut MachineState, x: DataRegister) -> Result<Advance, Fault> {
    let digits = decimal_digits_of_u8(state.register(x));
    state
        .memory
        .slice_mut(state.index as usize, digits.len())?
        .copy_from_slice(&digits);
    Ok(Advance::Next)
}

fn dump_registers(state: &mut MachineState, last: DataRegister) -> Result<Advance, Fault> {
    let count = last.index() + 1;
    state
        .memory
        .slice_mut(state.index as usize, count)?
        .copy_from_slice(&state.registers[..count]);
    Ok(Advance::Next)
}

fn load_registers(state: &mut MachineState, last: DataRegister) -> Result<Advance, Fault> {
    let count = last.index() + 1;
    let bytes = state.memory.slice(state.index as usize, count)?;
    state.registers[..count].copy_from_slice(bytes);
    Ok(Advance::Next)
}

fn draw(
    state: &mut MachineState,
    x: DataRegister,
    y: DataRegister,
    rows: U4,
) -> Result<Advance, Fault> {
    let (pos_x, pos_y) = (state.register(x), state.register(y));
    let sprite = state
        .memory
        .slice(state.index as usize, rows.into_u8() as usize)?;
    let collision = state.display.draw_sprite(pos_x, pos_y, sprite);
    state.set_register(DataRegister::VF, collision as u8);
    Ok(Advance::Next)
}

fn key_pressed(state: &MachineState, x: DataRegister) -> Result<bool, Fault> {
    let key_id = state.register(x);
    let key = Key::try_from(key_id).map_err(|_| Fault::InvalidKey { key: key_id })?;
    Ok(state.keypad.is_pressed(key))
}

fn wait_for_key(state: &mut MachineState, x: DataRegister) -> Advance {
    match state.keypad.first_pressed() {
        Some(key) => {
            state.set_register(x, key as u8);
            Advance::Next
        }
        None => Advance::Stay,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn advance_policy() {
        assert_eq!(Advance::Next.apply(0x200), 0x202);
        assert_eq!(Advance::SkipNext.apply(0x200), 0x204);
        assert_eq!(Advance::To(0x345).apply(0x200), 0x345);
        assert_eq!(Advance::Stay.apply(0x200), 0x200);
    }

    #[test]
    fn decimal_digits() {
        assert_eq!(decimal_digits_of_u8(0), [0, 0, 0]);
        assert_eq!(decimal_digits_of_u8(7), [0, 0, 7]);
        assert_eq!(decimal_digits_of_u8(42), [0, 4, 2]);
        assert_eq!(decimal_digits_of_u8(234), [2, 3, 4]);
        assert_eq!(decimal_digits_of_u8(255), [2, 5, 5]);
    }
}
