use pretty::termcolor::ColorSpec;

use crate::PrintExt;

pub type Alloc<'a> = pretty::Arena<'a, ColorSpec>;
pub type Builder<'a> = pretty::DocBuilder<'a, Alloc<'a>, ColorSpec>;

/// Operator precedences
pub type Precedence = u32;

/// Top level, or directly inside delimiters.
pub const PREC_NONE: Precedence = 0;
/// Binders and arrows extend as far to the right as possible.
pub const PREC_ARROW: Precedence = 1;
/// The argument position of an application.
pub const PREC_ARG: Precedence = 3;

pub trait Print {
    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        self.print_prec(cfg, alloc, PREC_NONE)
    }

    /// Print with precedence information about the enclosing context.
    ///
    /// * `_prec` The precedence of the surrounding context.
    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        _prec: Precedence,
    ) -> Builder<'a> {
        self.print(cfg, alloc)
    }

    fn print_to_string(&self, cfg: Option<&PrintCfg>) -> String
    where
        Self: Sized,
    {
        let default = PrintCfg::default();
        let cfg = cfg.unwrap_or(&default);
        let mut buf = Vec::new();
        self.print_io(cfg, &mut buf).expect("Failed to print to string");
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Render on one long line with metavariable ids, for use in `log::trace!`.
    fn print_trace(&self) -> String
    where
        Self: Sized,
    {
        let cfg = PrintCfg { width: 1 << 16, print_metavar_ids: true, ..Default::default() };
        self.print_to_string(Some(&cfg))
    }
}

impl<T: Print> Print for Box<T> {
    fn print<'a>(&'a self, cfg: &PrintCfg, alloc: &'a Alloc<'a>) -> Builder<'a> {
        T::print(self, cfg, alloc)
    }

    fn print_prec<'a>(
        &'a self,
        cfg: &PrintCfg,
        alloc: &'a Alloc<'a>,
        prec: Precedence,
    ) -> Builder<'a> {
        T::print_prec(self, cfg, alloc, prec)
    }
}

#[derive(Debug, Clone)]
pub struct PrintCfg {
    /// The width of the output terminal/device. Width is used for
    /// the insertion of linebreaks.
    pub width: usize,
    /// How many spaces of indentation are used
    pub indent: isize,
    /// Whether to print the unique id next to the name of a metavariable
    pub print_metavar_ids: bool,
    /// Whether to print universe lifts of calls that are not lifted
    pub print_zero_lifts: bool,
}

impl Default for PrintCfg {
    fn default() -> Self {
        Self {
            width: crate::DEFAULT_WIDTH,
            indent: 2,
            print_metavar_ids: false,
            print_zero_lifts: false,
        }
    }
}
