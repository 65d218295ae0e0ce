/// The interfaces through which the core reaches its co-emulated Z80.
///
/// The Z80 itself — instruction decode, timing, the 64 KiB bus it steps
/// over — is an external collaborator and out of scope here (see
/// `zilog-z80`/`emu-core` for a cycle-accurate implementation). This
/// module only defines the two seams the core's native primitives
/// dispatch through, plus a minimal, non-cycle-accurate stand-in good
/// enough to exercise `regr`/`regw` without a real CPU attached.
use std::collections::HashMap;

/// Byte-addressed memory/IO bus a Z80-flavored native primitive reads
/// or writes through.
pub trait Bus {
    fn read(&mut self, address: u16) -> u8;
    fn write(&mut self, address: u16, value: u8);
}

/// Register peek/poke, addressed by name (`"A"`, `"BC"`, `"IX"`, ...)
/// rather than index, matching how `regr`/`regw` take a register name
/// out of string space.
pub trait RegisterFile {
    fn get(&self, name: &str) -> Option<u16>;
    fn set(&mut self, name: &str, value: u16) -> bool;
}

const REGISTER_NAMES: &[&str] = &[
    "A", "F", "B", "C", "D", "E", "H", "L", "IX", "IY", "SP", "PC", "AF'", "BC'", "DE'", "HL'",
    "I", "R",
];

/// A conforming but non-cycle-accurate register file: a name -> value
/// map seeded with the standard Z80 register set. Sufficient to drive
/// `regr`/`regw` in tests; not a substitute for a real CPU.
pub struct StubRegisters {
    values: HashMap<&'static str, u16>,
}

impl StubRegisters {
    pub fn new() -> StubRegisters {
        let mut values = HashMap::new();
        for name in REGISTER_NAMES {
            values.insert(*name, 0u16);
        }
        StubRegisters { values }
    }
}

impl Default for StubRegisters {
    fn default() -> Self {
        StubRegisters::new()
    }
}

impl RegisterFile for StubRegisters {
    fn get(&self, name: &str) -> Option<u16> {
        REGISTER_NAMES
            .iter()
            .find(|&&n| n.eq_ignore_ascii_case(name))
            .and_then(|&n| self.values.get(n))
            .copied()
    }

    fn set(&mut self, name: &str, value: u16) -> bool {
        match REGISTER_NAMES.iter().find(|&&n| n.eq_ignore_ascii_case(name)) {
            Some(&canonical) => {
                self.values.insert(canonical, value);
                true
            }
            None => false,
        }
    }
}

/// A flat `Vec<u8>`-backed bus: the simplest conforming `Bus`, used as
/// the default when no real Z80 memory is attached.
pub struct StubBus {
    memory: Vec<u8>,
}

impl StubBus {
    pub fn new() -> StubBus {
        StubBus {
            memory: vec![0; 0x10000],
        }
    }
}

impl Default for StubBus {
    fn default() -> Self {
        StubBus::new()
    }
}

impl Bus for StubBus {
    fn read(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_register_name_is_none() {
        let regs = StubRegisters::new();
        assert_eq!(regs.get("ZZ"), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut regs = StubRegisters::new();
        assert!(regs.set("hl'", 0x1234));
        assert_eq!(regs.get("HL'"), Some(0x1234));
    }

    #[test]
    fn set_unknown_register_returns_false() {
        let mut regs = StubRegisters::new();
        assert!(!regs.set("nope", 1));
    }

    #[test]
    fn bus_write_then_read_round_trips() {
        let mut bus = StubBus::new();
        bus.write(0x4000, 0xAB);
        assert_eq!(bus.read(0x4000), 0xAB);
    }
}
