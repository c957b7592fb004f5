use std::borrow::Cow;

use pretty::{
    DocAllocator,
    termcolor::{Color, ColorSpec},
};

use super::types::*;

const KEYWORD: Color = Color::Magenta;
const CTOR: Color = Color::Blue;
const TYPE: Color = Color::Red;
const META: Color = Color::Yellow;

pub trait ThemeExt<'a> {
    fn keyword<U: Into<Cow<'a, str>>>(&'a self, text: U) -> Builder<'a>;
    fn ctor<U: Into<Cow<'a, str>>>(&'a self, text: U) -> Builder<'a>;
    fn typ<U: Into<Cow<'a, str>>>(&'a self, text: U) -> Builder<'a>;
    fn meta<U: Into<Cow<'a, str>>>(&'a self, text: U) -> Builder<'a>;
}

impl<'a> ThemeExt<'a> for Alloc<'a> {
    fn keyword<U: Into<Cow<'a, str>>>(&'a self, text: U) -> Builder<'a> {
        self.text(text).annotate(KEYWORD.spec())
    }

    fn ctor<U: Into<Cow<'a, str>>>(&'a self, text: U) -> Builder<'a> {
        self.text(text).annotate(CTOR.spec())
    }

    fn typ<U: Into<Cow<'a, str>>>(&'a self, text: U) -> Builder<'a> {
        self.text(text).annotate(TYPE.spec())
    }

    fn meta<U: Into<Cow<'a, str>>>(&'a self, text: U) -> Builder<'a> {
        self.text(text).annotate(META.spec())
    }
}

pub trait ColorExt {
    fn spec(self) -> ColorSpec;
}

impl ColorExt for Color {
    fn spec(self) -> ColorSpec {
        ColorSpec::new().set_fg(Some(self)).clone()
    }
}
