use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
#[error("call stack depth exceeded, pushing of address {address_not_pushed:X} failed")]
pub struct CallStackOverflowError {
    pub address_not_pushed: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stack pointer {requested} exceeds the stack depth {}", CallStack::DEPTH)]
pub struct StackPointerOutOfRangeError {
    pub requested: u8,
}

/// Return addresses of the subroutines currently being executed.
///
/// `pointer` is the number of occupied slots and the index of the next free one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallStack {
    slots: [u16; Self::DEPTH],
    pointer: u8,
}

impl CallStack {
    /// Maximum number of nested calls.
    pub const DEPTH: usize = 16;

    pub fn pointer(&self) -> u8 {
        self.pointer
    }

    pub fn set_pointer(&mut self, pointer: u8) -> Result<(), StackPointerOutOfRangeError> {
        if pointer as usize > Self::DEPTH {
            return Err(StackPointerOutOfRangeError { requested: pointer });
        }
        self.pointer = pointer;
        Ok(())
    }

    /// Content of a slot, occupied or not.
    pub fn slot(&self, index: usize) -> Option<u16> {
        self.slots.get(index).copied()
    }

    pub fn push(&mut self, address: u16) -> Result<(), CallStackOverflowError> {
        let slot = self
            .slots
            .get_mut(self.pointer as usize)
            .ok_or(CallStackOverflowError {
                address_not_pushed: address,
            })?;
        *slot = address;
        self.pointer += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Option<u16> {
        self.pointer = self.pointer.checked_sub(1)?;
        Some(self.slots[self.pointer as usize])
    }
}

impl<const N: usize> From<[u16; N]> for CallStack {
    /// Builds a stack with the given addresses pushed in order.
    /// Addresses beyond [`CallStack::DEPTH`] are dropped.
    fn from(addresses: [u16; N]) -> Self {
        let mut stack = Self::default();
        for address in addresses.into_iter().take(Self::DEPTH) {
            stack.slots[stack.pointer as usize] = address;
            stack.pointer += 1;
        }
        stack
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn push_pop() {
        let mut stack = CallStack::default();
        assert_eq!(stack.pop(), None);

        stack.push(0x202).unwrap();
        stack.push(0x30A).unwrap();
        assert_eq!(stack.pointer(), 2);
        assert_eq!(stack.slot(1), Some(0x30A));

        assert_eq!(stack.pop(), Some(0x30A));
        assert_eq!(stack.pop(), Some(0x202));
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.pointer(), 0);
    }

    #[test]
    fn overflow_at_depth() {
        let mut stack = CallStack::default();
        for i in 0..CallStack::DEPTH as u16 {
            stack.push(0x200 + 2 * i).unwrap();
        }
        assert_eq!(
            stack.push(0x400),
            Err(CallStackOverflowError {
                address_not_pushed: 0x400
            })
        );
        assert_eq!(stack.pointer() as usize, CallStack::DEPTH);
    }

    #[test]
    fn set_pointer_bounds() {
        let mut stack = CallStack::default();
        assert_eq!(stack.set_pointer(16), Ok(()));
        assert_eq!(
            stack.set_pointer(17),
            Err(StackPointerOutOfRangeError { requested: 17 })
        );
        assert_eq!(stack.slot(16), None);
    }
}
