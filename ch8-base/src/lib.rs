//! Execution engine of a CHIP-8 interpreter.
//!
//! ```
//! use ch8_base::machine::{DataRegister, Machine, Step};
//!
//! let mut machine = Machine::builder()
//!     .program(&[0x71, 0x05])
//!     .unwrap()
//!     .seed(0)
//!     .build();
//! machine.state_mut().set_register(DataRegister::V1, 5);
//!
//! assert!(matches!(machine.run_cycle(), Ok(Step::Executed(_))));
//! assert_eq!(machine.state().register(DataRegister::V1), 10);
//! assert_eq!(machine.state().program_counter(), 0x202);
//! ```

pub mod display;
pub mod font;
pub mod instruction;
pub mod machine;
pub mod memory;
pub mod nibble_ints;
