/// The native primitive word set. Each entry is a small Rust function
/// operating directly on the runtime; the dictionary only stores the
/// index into `table()` that `inner::execute` dispatches through.
use crate::internals::dictionary::{self, EntryKind};
use crate::internals::files::InputSource;
use crate::internals::inner;
use crate::runtime::Runtime;
use std::path::Path;

pub type BuiltinFn = fn(&mut Runtime);

pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
    pub doc: &'static str,
}

macro_rules! pop_or_abort {
    ($rt:expr, $caller:expr) => {
        match $rt.mem.pop() {
            Some(v) => v,
            None => {
                $rt.msg.error($caller, "Stack underflow", None::<bool>);
                $rt.mem.set_quitting(true);
                return;
            }
        }
    };
}

fn op_plus(rt: &mut Runtime) {
    let b = pop_or_abort!(rt, "+");
    let a = pop_or_abort!(rt, "+");
    rt.mem.push(a.wrapping_add(b));
}

fn op_minus(rt: &mut Runtime) {
    let b = pop_or_abort!(rt, "-");
    let a = pop_or_abort!(rt, "-");
    rt.mem.push(a.wrapping_sub(b));
}

fn op_times(rt: &mut Runtime) {
    let b = pop_or_abort!(rt, "*");
    let a = pop_or_abort!(rt, "*");
    rt.mem.push(a.wrapping_mul(b));
}

fn op_divide(rt: &mut Runtime) {
    let b = pop_or_abort!(rt, "/");
    let a = pop_or_abort!(rt, "/");
    if b == 0 {
        rt.msg.error("/", "division by zero", None::<bool>);
        rt.mem.set_quitting(true);
        return;
    }
    rt.mem.push(a / b);
}

fn op_and(rt: &mut Runtime) {
    let b = pop_or_abort!(rt, "and");
    let a = pop_or_abort!(rt, "and");
    rt.mem.push(a & b);
}

fn op_or(rt: &mut Runtime) {
    let b = pop_or_abort!(rt, "or");
    let a = pop_or_abort!(rt, "or");
    rt.mem.push(a | b);
}

fn op_lshift(rt: &mut Runtime) {
    let n = pop_or_abort!(rt, "lshift");
    let a = pop_or_abort!(rt, "lshift");
    rt.mem.push(a.wrapping_shl(n as u32));
}

fn op_rshift(rt: &mut Runtime) {
    let n = pop_or_abort!(rt, "rshift");
    let a = pop_or_abort!(rt, "rshift");
    rt.mem.push(a.wrapping_shr(n as u32));
}

fn op_dup(rt: &mut Runtime) {
    let a = pop_or_abort!(rt, "dup");
    rt.mem.push(a);
    rt.mem.push(a);
}

fn op_swap(rt: &mut Runtime) {
    let b = pop_or_abort!(rt, "swap");
    let a = pop_or_abort!(rt, "swap");
    rt.mem.push(b);
    rt.mem.push(a);
}

fn op_over(rt: &mut Runtime) {
    let b = pop_or_abort!(rt, "over");
    let a = pop_or_abort!(rt, "over");
    rt.mem.push(a);
    rt.mem.push(b);
    rt.mem.push(a);
}

fn op_rot(rt: &mut Runtime) {
    let c = pop_or_abort!(rt, "rot");
    let b = pop_or_abort!(rt, "rot");
    let a = pop_or_abort!(rt, "rot");
    rt.mem.push(b);
    rt.mem.push(c);
    rt.mem.push(a);
}

fn op_store(rt: &mut Runtime) {
    let addr = pop_or_abort!(rt, "!");
    let val = pop_or_abort!(rt, "!");
    rt.mem.write_word_le(addr as usize, val);
}

fn op_fetch(rt: &mut Runtime) {
    let addr = pop_or_abort!(rt, "@");
    rt.mem.push(rt.mem.read_word_le(addr as usize));
}

fn op_cstore(rt: &mut Runtime) {
    let addr = pop_or_abort!(rt, "C!");
    let val = pop_or_abort!(rt, "C!");
    rt.mem.write_byte(addr as usize, val as u8);
}

fn op_cfetch(rt: &mut Runtime) {
    let addr = pop_or_abort!(rt, "C@");
    rt.mem.push(rt.mem.read_byte(addr as usize) as u16);
}

/// Pushes the *address* of the HERE system variable, not its value —
/// `here` is executed just like any other variable, so `allot`/`,`
/// reach the dictionary pointer the same way they reach a user cell:
/// `here @` for the value, `here !` to move it.
fn op_here(rt: &mut Runtime) {
    rt.mem.push(crate::kernel::HERE as u16);
}

fn op_current(rt: &mut Runtime) {
    rt.mem.push(crate::kernel::CURRENT as u16);
}

fn op_dot(rt: &mut Runtime) {
    let v = pop_or_abort!(rt, ".");
    print!("{} ", v as i16);
}

fn op_dot_x(rt: &mut Runtime) {
    let v = pop_or_abort!(rt, ".x");
    print!("{:02X} ", v as u8);
}

fn op_emit(rt: &mut Runtime) {
    let v = pop_or_abort!(rt, "emit");
    print!("{}", v as u8 as char);
}

fn op_bye(rt: &mut Runtime) {
    rt.should_exit = true;
}

fn op_execute(rt: &mut Runtime) {
    let xt = pop_or_abort!(rt, "execute") as usize;
    inner::execute(rt, xt);
}

fn op_create(rt: &mut Runtime) {
    let name = match rt.token_queue.pop_front() {
        Some(n) => n,
        None => {
            rt.msg.error("create", "missing name", None::<bool>);
            rt.mem.set_quitting(true);
            return;
        }
    };
    dictionary::create(&mut rt.mem, &name, EntryKind::Cell, 0);
}

fn op_forget(rt: &mut Runtime) {
    let name = match rt.token_queue.pop_front() {
        Some(n) => n,
        None => {
            rt.msg.error("forget", "missing name", None::<bool>);
            rt.mem.set_quitting(true);
            return;
        }
    };
    if dictionary::forget(&mut rt.mem, &name).is_err() {
        rt.msg.error("forget", "Name not found", Some(name));
        rt.mem.set_quitting(true);
    }
}

fn op_loadf(rt: &mut Runtime) {
    let name = match rt.token_queue.pop_front() {
        Some(n) => n,
        None => {
            rt.msg.error("loadf", "missing filename", None::<bool>);
            rt.mem.set_quitting(true);
            return;
        }
    };
    match InputSource::open(Path::new(&name), &rt.msg) {
        Some(source) => rt.input.push(source),
        None => rt.mem.set_quitting(true),
    }
}

fn op_tick(rt: &mut Runtime) {
    let name = match rt.token_queue.pop_front() {
        Some(n) => n,
        None => {
            rt.msg.error("'", "missing name", None::<bool>);
            rt.mem.set_quitting(true);
            return;
        }
    };
    match dictionary::find(&rt.mem, &name) {
        Some((entry, _)) => rt.mem.push(entry.offset as u16),
        None => {
            rt.msg.error("'", "Name not found", Some(name));
            rt.mem.set_quitting(true);
        }
    }
}

fn op_see(rt: &mut Runtime) {
    let name = match rt.token_queue.pop_front() {
        Some(n) => n,
        None => {
            rt.msg.error("see", "missing name", None::<bool>);
            rt.mem.set_quitting(true);
            return;
        }
    };
    match dictionary::find(&rt.mem, &name) {
        None => rt.msg.warning("see", "word not found", Some(name)),
        Some((entry, _)) => match entry.kind {
            EntryKind::Native => {
                let index = rt.mem.read_word_le(entry.payload()) as usize;
                println!("builtin: {}", rt.builtins[index].doc);
            }
            EntryKind::Cell => {
                println!("variable: {} = {}", name, rt.mem.read_word_le(entry.payload()));
            }
            EntryKind::Compiled => {
                print!(": {name} ");
                let mut offset = entry.payload();
                loop {
                    let (item, next) = crate::internals::body::read_item(&rt.mem, offset);
                    match item {
                        crate::internals::body::BodyItem::Stop => {
                            println!(";");
                            break;
                        }
                        crate::internals::body::BodyItem::Literal(v) => print!("{v} "),
                        crate::internals::body::BodyItem::WordCall(callee) => {
                            match dictionary::entry_at(&rt.mem, callee) {
                                Some(callee_entry) => {
                                    let name_bytes = callee_entry.name(&rt.mem);
                                    let len = name_bytes.iter().position(|&b| b == 0).unwrap_or(8);
                                    print!("{} ", String::from_utf8_lossy(&name_bytes[..len]));
                                }
                                None => print!("<{callee:#06x}> "),
                            }
                        }
                    }
                    offset = next;
                }
            }
        },
    }
}

fn op_depth(rt: &mut Runtime) {
    let d = rt.mem.stack_depth() as u16;
    rt.mem.push(d);
}

fn op_show_stack(rt: &mut Runtime) {
    rt.show_stack = true;
}

fn op_hide_stack(rt: &mut Runtime) {
    rt.show_stack = false;
}

fn op_dbg(rt: &mut Runtime) {
    let level = pop_or_abort!(rt, "dbg");
    use crate::internals::messages::DebugLevel;
    rt.msg.set_level(match level {
        0 => DebugLevel::Error,
        1 => DebugLevel::Warning,
        2 => DebugLevel::Info,
        _ => DebugLevel::Debug,
    });
}

fn op_debuglevel(rt: &mut Runtime) {
    use crate::internals::messages::DebugLevel;
    let level = match rt.msg.get_level() {
        DebugLevel::Error => 0,
        DebugLevel::Warning => 1,
        DebugLevel::Info => 2,
        DebugLevel::Debug => 3,
    };
    rt.mem.push(level);
}

fn op_regr(rt: &mut Runtime) {
    use crate::internals::z80::RegisterFile;
    let name = match rt.token_queue.pop_front() {
        Some(n) => n,
        None => {
            rt.msg.error("regr", "missing register name", None::<bool>);
            rt.mem.set_quitting(true);
            return;
        }
    };
    match rt.registers.get(&name) {
        Some(v) => rt.mem.push(v),
        None => {
            rt.msg.error("regr", "Invalid register", Some(name));
            rt.mem.set_quitting(true);
        }
    }
}

fn op_regw(rt: &mut Runtime) {
    use crate::internals::z80::RegisterFile;
    let name = match rt.token_queue.pop_front() {
        Some(n) => n,
        None => {
            rt.msg.error("regw", "missing register name", None::<bool>);
            rt.mem.set_quitting(true);
            return;
        }
    };
    let value = pop_or_abort!(rt, "regw");
    if !rt.registers.set(&name, value) {
        rt.msg.error("regw", "Invalid register", Some(name));
        rt.mem.set_quitting(true);
    }
}

/// The fixed order here becomes the dictionary's Native payload index,
/// so don't reorder entries once a saved image could reference them —
/// in practice the image is rebuilt fresh at `cold_start` every run.
pub fn table() -> Vec<Builtin> {
    vec![
        Builtin { name: "+", func: op_plus, doc: "( a b -- a+b ) add" },
        Builtin { name: "-", func: op_minus, doc: "( a b -- a-b ) subtract" },
        Builtin { name: "*", func: op_times, doc: "( a b -- a*b ) multiply" },
        Builtin { name: "/", func: op_divide, doc: "( a b -- a/b ) divide" },
        Builtin { name: "and", func: op_and, doc: "( a b -- a&b ) bitwise and" },
        Builtin { name: "or", func: op_or, doc: "( a b -- a|b ) bitwise or" },
        Builtin { name: "lshift", func: op_lshift, doc: "( a n -- a<<n )" },
        Builtin { name: "rshift", func: op_rshift, doc: "( a n -- a>>n )" },
        Builtin { name: "dup", func: op_dup, doc: "( a -- a a )" },
        Builtin { name: "swap", func: op_swap, doc: "( a b -- b a )" },
        Builtin { name: "over", func: op_over, doc: "( a b -- a b a )" },
        Builtin { name: "rot", func: op_rot, doc: "( a b c -- b c a )" },
        Builtin { name: "!", func: op_store, doc: "( val addr -- ) store a word" },
        Builtin { name: "@", func: op_fetch, doc: "( addr -- val ) fetch a word" },
        Builtin { name: "C!", func: op_cstore, doc: "( val addr -- ) store a byte" },
        Builtin { name: "C@", func: op_cfetch, doc: "( addr -- val ) fetch a byte" },
        Builtin { name: "here", func: op_here, doc: "( -- addr ) address of the HERE system variable" },
        Builtin { name: "current", func: op_current, doc: "( -- addr ) address of the CURRENT system variable" },
        Builtin { name: ".", func: op_dot, doc: "( n -- ) print signed decimal" },
        Builtin { name: ".x", func: op_dot_x, doc: "( n -- ) print low byte as two-digit hex" },
        Builtin { name: "emit", func: op_emit, doc: "( c -- ) print as a character" },
        Builtin { name: "bye", func: op_bye, doc: "( -- ) exit the interpreter" },
        Builtin { name: "execute", func: op_execute, doc: "( xt -- ) run the word at xt" },
        Builtin { name: "create", func: op_create, doc: "create <name> ( -- ) make a new entry" },
        Builtin { name: "forget", func: op_forget, doc: "forget <name> ( -- ) remove an entry" },
        Builtin { name: "loadf", func: op_loadf, doc: "loadf <name> ( -- ) load a source file" },
        Builtin { name: "'", func: op_tick, doc: "' <name> ( -- xt ) look up a word's address" },
        Builtin { name: "see", func: op_see, doc: "see <name> ( -- ) decompile a word" },
        Builtin { name: "depth", func: op_depth, doc: "( -- n ) data stack depth" },
        Builtin { name: "show-stack", func: op_show_stack, doc: "( -- ) print the stack after each line" },
        Builtin { name: "hide-stack", func: op_hide_stack, doc: "( -- ) stop printing the stack" },
        Builtin { name: "dbg", func: op_dbg, doc: "( level -- ) set the diagnostic level" },
        Builtin { name: "debuglevel", func: op_debuglevel, doc: "( -- level ) current diagnostic level" },
        Builtin { name: "regr", func: op_regr, doc: "regr <reg> ( -- val ) read a Z80 register" },
        Builtin { name: "regw", func: op_regw, doc: "regw <reg> ( val -- ) write a Z80 register" },
    ]
}

/// Register every table entry in the dictionary as a Native word whose
/// payload is the table index, matching `compiler::classify`'s lookup.
pub fn install(rt: &mut Runtime) {
    let names: Vec<&'static str> = rt.builtins.iter().map(|b| b.name).collect();
    for (index, name) in names.into_iter().enumerate() {
        let entry = dictionary::create(&mut rt.mem, name, EntryKind::Native, 2);
        rt.mem.write_word_le(entry.payload(), index as u16);
    }
}
