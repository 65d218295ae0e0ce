/// The inner interpreter: given a dictionary offset, run whatever is
/// there. Compiled definitions walk their body recursively — a word
/// call inside a definition re-enters `execute`, so call depth tracks
/// Forth nesting depth directly rather than through an explicit return
/// stack.
use crate::internals::body::{self, BodyItem};
use crate::internals::dictionary::{self, EntryKind};
use crate::runtime::Runtime;

/// Run the word at `offset`. Checks the quitting flag before doing
/// anything, so a word that triggers an abort partway through a
/// caller's definition unwinds the whole call chain on return.
pub fn execute(rt: &mut Runtime, offset: usize) {
    if rt.mem.is_quitting() {
        return;
    }
    let entry = dictionary::entry_at(&rt.mem, offset)
        .unwrap_or_else(|| panic!("execute: offset {offset:#06x} is not a dictionary entry"));
    match entry.kind {
        EntryKind::Native => {
            let index = rt.mem.read_word_le(entry.payload()) as usize;
            let func = rt.builtins[index].func;
            func(rt);
        }
        EntryKind::Cell => {
            // A variable or CREATEd word: executing it pushes the
            // address of its own parameter field.
            rt.mem.push(entry.payload() as u16);
        }
        EntryKind::Compiled => run_body(rt, entry.payload()),
    }
}

fn run_body(rt: &mut Runtime, mut offset: usize) {
    loop {
        if rt.mem.is_quitting() {
            return;
        }
        let (item, next) = body::read_item(&rt.mem, offset);
        match item {
            BodyItem::Stop => return,
            BodyItem::Literal(v) => {
                rt.mem.push(v);
                offset = next;
            }
            BodyItem::WordCall(callee) => {
                execute(rt, callee);
                offset = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internals::body::write_item;
    use crate::internals::dictionary::create;
    use crate::runtime::Runtime;

    #[test]
    fn cell_entry_pushes_its_own_payload_address() {
        let mut rt = Runtime::new();
        let entry = create(&mut rt.mem, "v", EntryKind::Cell, 2);
        execute(&mut rt, entry.offset);
        assert_eq!(rt.mem.pop(), Some(entry.payload() as u16));
    }

    #[test]
    fn compiled_body_pushes_literals_in_order() {
        let mut rt = Runtime::new();
        let entry = create(&mut rt.mem, "two-lits", EntryKind::Compiled, 0);
        write_item(&mut rt.mem, BodyItem::Literal(10));
        write_item(&mut rt.mem, BodyItem::Literal(20));
        write_item(&mut rt.mem, BodyItem::Stop);
        execute(&mut rt, entry.offset);
        assert_eq!(rt.mem.pop(), Some(20));
        assert_eq!(rt.mem.pop(), Some(10));
    }

    #[test]
    fn compiled_body_calling_another_word_recurses() {
        let mut rt = Runtime::new();
        let inner_word = create(&mut rt.mem, "five", EntryKind::Compiled, 0);
        write_item(&mut rt.mem, BodyItem::Literal(5));
        write_item(&mut rt.mem, BodyItem::Stop);

        let outer = create(&mut rt.mem, "outer", EntryKind::Compiled, 0);
        write_item(&mut rt.mem, BodyItem::WordCall(inner_word.offset));
        write_item(&mut rt.mem, BodyItem::Literal(1));
        write_item(&mut rt.mem, BodyItem::Stop);

        execute(&mut rt, outer.offset);
        assert_eq!(rt.mem.pop(), Some(1));
        assert_eq!(rt.mem.pop(), Some(5));
    }

    #[test]
    fn quitting_flag_short_circuits_remaining_body() {
        let mut rt = Runtime::new();
        let entry = create(&mut rt.mem, "w", EntryKind::Compiled, 0);
        write_item(&mut rt.mem, BodyItem::Literal(1));
        write_item(&mut rt.mem, BodyItem::Literal(2));
        write_item(&mut rt.mem, BodyItem::Stop);
        rt.mem.set_quitting(true);
        execute(&mut rt, entry.offset);
        assert_eq!(rt.mem.pop(), None);
    }
}
