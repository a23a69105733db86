use std::io::{self, IsTerminal};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Semantic style of an output line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LineStyle {
    Header,
    Error,
}

impl LineStyle {
    fn spec(self) -> ColorSpec {
        let mut spec = ColorSpec::new();
        match self {
            LineStyle::Header => spec.set_bold(true).set_underline(true),
            LineStyle::Error => spec.set_fg(Some(Color::Red)).set_bold(true),
        };
        spec
    }
}

/// Line-oriented terminal output.
pub struct Ui<W> {
    out: W,
}

impl Ui<StandardStream> {
    pub fn stdout() -> Self {
        Self::new(StandardStream::stdout(color_choice(io::stdout().is_terminal())))
    }

    pub fn stderr() -> Self {
        Self::new(StandardStream::stderr(color_choice(io::stderr().is_terminal())))
    }
}

impl<W: WriteColor> Ui<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Writes `text` followed by a newline unless it already ends with one.
    pub fn output(&mut self, text: &str, style: Option<LineStyle>) -> io::Result<()> {
        if let Some(style) = style {
            self.out.set_color(&style.spec())?;
        }
        self.out.write_all(text.as_bytes())?;
        if style.is_some() {
            self.out.reset()?;
        }
        if !text.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn color_choice(terminal: bool) -> ColorChoice {
    // 输出被重定向时不着色；Auto 还会遵循 NO_COLOR 与 TERM=dumb。
    if terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}
