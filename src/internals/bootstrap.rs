/// Words defined in the language itself rather than as native
/// primitives, interpreted once at `cold_start` before the first
/// prompt is shown. Keeping these out of `builtins.rs` means the
/// primitive set stays the minimal core the rest of the dictionary is
/// built from.
///
/// `here` and `current` push the *addresses* of their system
/// variables, exactly like executing a user-defined variable does, so
/// these words read and write the dictionary pointer through the same
/// `@`/`!`/`C!` any caller would use on a variable of their own.
pub fn source() -> String {
    "
: allot ( n -- ) here @ + here ! ;
: , ( n -- ) here @ ! 2 allot ;
: C, ( n -- ) here @ C! 1 allot ;
: +! ( n addr -- ) dup @ rot + swap ! ;
: +1! ( addr -- ) 1 swap +! ;
: ? ( addr -- ) @ . ;
: variable create 2 allot ;
: splitb ( n -- lo hi ) dup 255 and swap 8 rshift ;
"
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_mentions_every_bootstrap_word() {
        let src = source();
        for word in [
            ": allot",
            ": ,",
            ": C,",
            ": +!",
            ": +1!",
            ": ?",
            ": variable",
            ": splitb",
        ] {
            assert!(src.contains(word), "missing {word}");
        }
    }
}
