//! The symbols and keywords used when rendering core terms.

/// The symbol `->`
pub const ARROW: &str = "->";

/// The symbol `**`
pub const TIMES: &str = "**";

/// The symbol `\`
pub const LAMBDA: &str = "\\";

/// The symbol `,`
pub const COMMA: &str = ",";

/// The symbol `:`
pub const COLON: &str = ":";

/// The symbol `.`
pub const DOT: &str = ".";

/// The symbol `@`
pub const AT: &str = "@";

/// The symbol `?`
pub const QUESTION_MARK: &str = "?";

/// The symbol `=`
pub const EQUALS: &str = "=";

/// The symbol `:=`
pub const COLONEQ: &str = ":=";

/// The symbol `^`
pub const CARET: &str = "^";

/// The keyword `Pi`
pub const PI: &str = "Pi";

/// The keyword `Sig`
pub const SIGMA: &str = "Sig";

/// The keyword `Path`
pub const PATH: &str = "Path";

/// The keyword `Type`
pub const TYPE: &str = "Type";

/// The keyword `Set`
pub const SET: &str = "Set";

/// The keyword `ISet`
pub const ISET: &str = "ISet";

/// The keyword `I`
pub const INTERVAL: &str = "I";

/// The keyword `Partial`
pub const PARTIAL: &str = "Partial";

/// The keyword `coe`
pub const COE: &str = "coe";

/// The keyword `new`
pub const NEW: &str = "new";

/// The keyword `let`
pub const LET: &str = "let";

/// The keyword `as`
pub const AS: &str = "as";

/// The keyword `String`
pub const STRING: &str = "String";

/// The keyword `concat`
pub const CONCAT: &str = "concat";

/// The endpoint `0`
pub const I0: &str = "0";

/// The endpoint `1`
pub const I1: &str = "1";
