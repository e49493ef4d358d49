use crate::{
    display::Display,
    font,
    memory::{AddressOutOfRangeError, Memory},
};

use super::{CallStack, DataRegister, Keypad, StackPointerOutOfRangeError};

/// Everything a running machine consists of, apart from its random source.
///
/// Cloning a state and handing it to [`Machine::restore`](super::Machine::restore)
/// resumes execution exactly where the clone was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    pub(super) registers: [u8; DataRegister::COUNT],
    pub(super) index: u16,
    pub(super) program_counter: u16,
    pub(super) stack: CallStack,
    pub(super) delay_timer: u8,
    pub(super) sound_timer: u8,
    pub(super) memory: Memory,
    pub(super) display: Display,
    pub(super) keypad: Keypad,
    /// The instruction word fetched by the latest cycle.
    pub(super) opcode: u16,
}

impl Default for MachineState {
    /// Zeroed registers and memory, the font at [`font::FONT_START`]
    /// and the program counter at [`Memory::PROGRAM_START`].
    fn default() -> Self {
        let mut memory = [0; Memory::LEN];
        memory[font::FONT_START..font::FONT_START + font::FONT_LEN].copy_from_slice(&font::FONT);

        Self {
            registers: [0; DataRegister::COUNT],
            index: 0,
            program_counter: Memory::PROGRAM_START,
            stack: CallStack::default(),
            delay_timer: 0,
            sound_timer: 0,
            memory: Memory::from(memory),
            display: Display::default(),
            keypad: Keypad::default(),
            opcode: 0,
        }
    }
}

impl MachineState {
    pub fn register(&self, register: DataRegister) -> u8 {
        self.registers[register.index()]
    }

    pub fn set_register(&mut self, register: DataRegister, value: u8) {
        self.registers[register.index()] = value;
    }

    pub fn registers(&self) -> &[u8; DataRegister::COUNT] {
        &self.registers
    }

    /// The index register `I`.
    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn set_index(&mut self, index: u16) {
        self.index = index;
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn set_program_counter(&mut self, program_counter: u16) {
        self.program_counter = program_counter;
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack.pointer()
    }

    pub fn set_stack_pointer(&mut self, pointer: u8) -> Result<(), StackPointerOutOfRangeError> {
        self.stack.set_pointer(pointer)
    }

    /// Content of stack slot `index`, `None` past the stack depth.
    pub fn stack_slot(&self, index: usize) -> Option<u16> {
        self.stack.slot(index)
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn read_memory(&self, address: usize) -> Result<u8, AddressOutOfRangeError> {
        self.memory.read(address)
    }

    pub fn write_memory(&mut self, address: usize, value: u8) -> Result<(), AddressOutOfRangeError> {
        self.memory.write(address, value)
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn set_delay_timer(&mut self, value: u8) {
        self.delay_timer = value;
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn set_sound_timer(&mut self, value: u8) {
        self.sound_timer = value;
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    /// Count both timers down by one, stopping at zero.
    pub(super) fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}
