use super::types::*;

pub trait ParensIfExt<'a> {
    /// Wrap the document in parentheses when `cond` holds.
    fn parens_if(self, cond: bool) -> Builder<'a>;
}

impl<'a> ParensIfExt<'a> for Builder<'a> {
    fn parens_if(self, cond: bool) -> Builder<'a> {
        if cond { self.parens() } else { self }
    }
}

