use alloc::string::String;
use alloc::vec::Vec;

/// Generates the short alphabetic reference ids `a`, `b`, ..., `z`, `aa`,
/// `ab`, ...
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    next: usize,
}

impl IdGenerator {
    pub fn next_id(&mut self) -> String {
        // Bijective base 26: no digit stands for zero.
        let mut n = self.next + 1;
        self.next += 1;

        let mut digits = Vec::new();
        while n > 0 {
            n -= 1;
            digits.push(b'a' + (n % 26) as u8);
            n /= 26;
        }
        digits.iter().rev().map(|&b| char::from(b)).collect()
    }
}
